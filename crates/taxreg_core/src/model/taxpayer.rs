//! Taxpayer record model.
//!
//! # Responsibility
//! - Define the four-field record shape used by store, service and callers.
//! - Provide the canonical (trimmed) form and the non-empty validation rule.
//!
//! # Invariants
//! - Serialized shape has exactly `tid`, `firstName`, `lastName`, `address`.
//! - `validate()` checks fields in argument order and reports the first failure.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Tax identifier, the primary key of the registry.
pub type Tid = String;

/// Names one of the four record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxpayerField {
    Tid,
    FirstName,
    LastName,
    Address,
}

impl TaxpayerField {
    /// All fields in the argument order used by `add_tax_payer`.
    pub const ALL: [TaxpayerField; 4] = [
        TaxpayerField::Tid,
        TaxpayerField::FirstName,
        TaxpayerField::LastName,
        TaxpayerField::Address,
    ];

    /// Stable label matching the serialized field name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Tid => "tid",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Address => "address",
        }
    }
}

impl Display for TaxpayerField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Validation failure for a taxpayer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxpayerValidationError {
    /// Field is empty or whitespace-only.
    EmptyField(TaxpayerField),
}

impl Display for TaxpayerValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{field} is required"),
        }
    }
}

impl Error for TaxpayerValidationError {}

/// Canonical taxpayer record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaxpayerRecord {
    pub tid: Tid,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
}

impl TaxpayerRecord {
    /// Builds a record in canonical form (surrounding whitespace removed).
    ///
    /// Does not validate; call [`TaxpayerRecord::validate`] before persisting.
    pub fn new(
        tid: impl AsRef<str>,
        first_name: impl AsRef<str>,
        last_name: impl AsRef<str>,
        address: impl AsRef<str>,
    ) -> Self {
        Self {
            tid: tid.as_ref().trim().to_string(),
            first_name: first_name.as_ref().trim().to_string(),
            last_name: last_name.as_ref().trim().to_string(),
            address: address.as_ref().trim().to_string(),
        }
    }

    /// Returns the value stored for `field`.
    pub fn field(&self, field: TaxpayerField) -> &str {
        match field {
            TaxpayerField::Tid => &self.tid,
            TaxpayerField::FirstName => &self.first_name,
            TaxpayerField::LastName => &self.last_name,
            TaxpayerField::Address => &self.address,
        }
    }

    /// Checks that all four fields are non-empty after trimming.
    pub fn validate(&self) -> Result<(), TaxpayerValidationError> {
        for field in TaxpayerField::ALL {
            if self.field(field).trim().is_empty() {
                return Err(TaxpayerValidationError::EmptyField(field));
            }
        }
        Ok(())
    }
}
