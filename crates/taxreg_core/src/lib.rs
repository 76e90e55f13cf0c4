//! Core domain logic for the taxpayer registry.
//! This crate is the single source of truth for registry invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{open_store, ConfigError, RegistryConfig, StoreBackend};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::taxpayer::{TaxpayerField, TaxpayerRecord, TaxpayerValidationError, Tid};
pub use repo::memory_repo::InMemoryTaxpayerStore;
pub use repo::sqlite_repo::SqliteTaxpayerStore;
pub use repo::taxpayer_repo::{RepoError, RepoResult, TaxpayerStore};
pub use service::registry_service::{RegistryError, RegistryService, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
