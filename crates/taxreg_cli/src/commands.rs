//! Subcommand handlers; each maps one registry operation to terminal output.

use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use taxreg_core::{RegistryService, TaxpayerRecord, TaxpayerStore};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print a JSON array instead of text lines.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub tid: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    pub tid: String,

    /// Print the record (or `null`) as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn list<S: TaxpayerStore>(service: &RegistryService<S>, args: &ListArgs) -> Result<()> {
    let records = service.get_tax_payers()?;
    let mut out = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &records)?;
        writeln!(out)?;
        return Ok(());
    }
    if records.is_empty() {
        writeln!(out, "no taxpayers registered")?;
    }
    for record in &records {
        writeln!(out, "{}", format_record(record))?;
    }
    Ok(())
}

pub fn add<S: TaxpayerStore>(service: &RegistryService<S>, args: &AddArgs) -> Result<()> {
    service.add_tax_payer(&args.tid, &args.first_name, &args.last_name, &args.address)?;
    writeln!(io::stdout().lock(), "registered {}", args.tid.trim())?;
    Ok(())
}

pub fn search<S: TaxpayerStore>(service: &RegistryService<S>, args: &SearchArgs) -> Result<()> {
    let found = service.search_tax_payer(&args.tid)?;
    let mut out = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &found)?;
        writeln!(out)?;
        return Ok(());
    }
    match found {
        Some(record) => writeln!(out, "{}", format_record(&record))?,
        None => writeln!(out, "no match")?,
    }
    Ok(())
}

fn format_record(record: &TaxpayerRecord) -> String {
    format!(
        "TID: {}, Name: {} {}, Address: {}",
        record.tid, record.first_name, record.last_name, record.address
    )
}
