//! Taxpayer registry service.
//!
//! # Responsibility
//! - Expose `add_tax_payer`, `get_tax_payers` and `search_tax_payer`.
//! - Enforce non-empty fields server-side; callers are not trusted.
//!
//! # Invariants
//! - A failed `add_tax_payer` leaves the store unchanged.
//! - Existing records are never overwritten.
//! - A search miss is `Ok(None)`, not an error.
//! - Log events carry metadata only, never record contents or TIDs.

use crate::model::taxpayer::{TaxpayerField, TaxpayerRecord, TaxpayerValidationError, Tid};
use crate::repo::taxpayer_repo::{RepoError, TaxpayerStore};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, RegistryError>;

/// Typed failure surfaced by registry operations.
#[derive(Debug)]
pub enum RegistryError {
    /// A required argument is empty after trimming.
    InvalidArgument(TaxpayerField),
    /// The TID is already registered.
    DuplicateKey(Tid),
    /// Backend failure of the underlying store.
    Store(RepoError),
}

impl RegistryError {
    /// Stable machine-readable code used in logs and by transport adapters.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::DuplicateKey(_) => "duplicate_key",
            Self::Store(_) => "store_failure",
        }
    }
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(field) => write!(f, "invalid argument: {field} is required"),
            Self::DuplicateKey(tid) => write!(f, "TID already registered: {tid}"),
            Self::Store(err) => write!(f, "registry store failure: {err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaxpayerValidationError> for RegistryError {
    fn from(value: TaxpayerValidationError) -> Self {
        match value {
            TaxpayerValidationError::EmptyField(field) => Self::InvalidArgument(field),
        }
    }
}

impl From<RepoError> for RegistryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateKey(tid) => Self::DuplicateKey(tid),
            other => Self::Store(other),
        }
    }
}

/// Boundary service over an injected taxpayer store.
pub struct RegistryService<S: TaxpayerStore> {
    store: S,
}

impl<S: TaxpayerStore> RegistryService<S> {
    /// Creates a service owning `store` for its whole lifetime.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a new taxpayer.
    ///
    /// # Contract
    /// - Arguments are trimmed; any empty argument fails with
    ///   `InvalidArgument` naming the first offending field in argument order.
    /// - An already registered TID fails with `DuplicateKey`.
    pub fn add_tax_payer(
        &self,
        tid: &str,
        first_name: &str,
        last_name: &str,
        address: &str,
    ) -> ServiceResult<()> {
        let record = TaxpayerRecord::new(tid, first_name, last_name, address);
        let result = record
            .validate()
            .map_err(RegistryError::from)
            .and_then(|()| self.store.insert(&record).map_err(RegistryError::from));
        log_outcome("taxpayer_add", &result);
        result
    }

    /// Returns every registered taxpayer (ordering is backend-defined).
    pub fn get_tax_payers(&self) -> ServiceResult<Vec<TaxpayerRecord>> {
        let result = self.store.list_all().map_err(RegistryError::from);
        if let Ok(records) = &result {
            debug!(
                "event=taxpayer_list module=service status=ok count={}",
                records.len()
            );
        } else {
            log_outcome("taxpayer_list", &result);
        }
        result
    }

    /// Looks up one taxpayer by TID.
    ///
    /// Returns `Ok(None)` when no record matches.
    pub fn search_tax_payer(&self, tid: &str) -> ServiceResult<Option<TaxpayerRecord>> {
        let tid = tid.trim();
        let result = if tid.is_empty() {
            Err(RegistryError::InvalidArgument(TaxpayerField::Tid))
        } else {
            self.store.get(tid).map_err(RegistryError::from)
        };
        if let Ok(found) = &result {
            debug!(
                "event=taxpayer_search module=service status=ok hit={}",
                found.is_some()
            );
        } else {
            log_outcome("taxpayer_search", &result);
        }
        result
    }
}

fn log_outcome<T>(event: &str, result: &ServiceResult<T>) {
    match result {
        Ok(_) => info!("event={event} module=service status=ok"),
        Err(RegistryError::InvalidArgument(field)) => warn!(
            "event={event} module=service status=error error_code=invalid_argument field={field}"
        ),
        Err(err @ RegistryError::DuplicateKey(_)) => warn!(
            "event={event} module=service status=error error_code={}",
            err.code()
        ),
        Err(RegistryError::Store(err)) => error!(
            "event={event} module=service status=error error_code=store_failure error={err}"
        ),
    }
}
