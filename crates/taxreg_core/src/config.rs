//! Registry runtime configuration.
//!
//! # Responsibility
//! - Resolve store backend and logging settings from the environment.
//! - Construct the configured store backend.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - `TAXREG_LOG_DIR`, when set, must be absolute.

use crate::logging::{default_log_level, normalize_level};
use crate::repo::memory_repo::InMemoryTaxpayerStore;
use crate::repo::sqlite_repo::SqliteTaxpayerStore;
use crate::repo::taxpayer_repo::{RepoResult, TaxpayerStore};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "TAXREG_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "TAXREG_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "TAXREG_LOG_DIR";

/// `TAXREG_DB_PATH` value selecting the in-memory backend.
pub const MEMORY_DB_PATH: &str = ":memory:";
const DEFAULT_DB_FILE_NAME: &str = "taxreg.sqlite3";

/// Which Record Store backend the registry runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-lifetime map; contents vanish on exit.
    Memory,
    /// SQLite database file.
    Sqlite { path: PathBuf },
}

impl StoreBackend {
    /// Interprets a database path, mapping `:memory:` to [`StoreBackend::Memory`].
    pub fn from_db_path(raw: &str) -> Self {
        match raw.trim() {
            MEMORY_DB_PATH => Self::Memory,
            path => Self::Sqlite {
                path: PathBuf::from(path),
            },
        }
    }

    /// Default file location under the system temp directory.
    pub fn default_sqlite() -> Self {
        Self::Sqlite {
            path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
        }
    }
}

/// Configuration error for environment-provided settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    RelativeLogDir(PathBuf),
    UnsupportedLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativeLogDir(path) => write!(
                f,
                "{LOG_DIR_ENV} must be an absolute path, got `{}`",
                path.display()
            ),
            Self::UnsupportedLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Resolved registry settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub store: StoreBackend,
    pub log_level: String,
    /// File logging is disabled when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            store: StoreBackend::default_sqlite(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl RegistryConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(db_path) = non_blank(DB_PATH_ENV) {
            config.store = StoreBackend::from_db_path(&db_path);
        }
        if let Some(level) = non_blank(LOG_LEVEL_ENV) {
            config.set_log_level(&level)?;
        }
        if let Some(dir) = non_blank(LOG_DIR_ENV) {
            let dir = PathBuf::from(dir);
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir));
            }
            config.log_dir = Some(dir);
        }
        Ok(config)
    }

    /// Replaces the log level with its normalized form.
    ///
    /// Rejects unknown levels even when file logging stays disabled.
    pub fn set_log_level(&mut self, level: &str) -> Result<(), ConfigError> {
        let normalized = normalize_level(level)
            .map_err(|_| ConfigError::UnsupportedLogLevel(level.trim().to_string()))?;
        self.log_level = normalized.to_string();
        Ok(())
    }
}

/// Builds the store selected by `backend`.
pub fn open_store(backend: &StoreBackend) -> RepoResult<Box<dyn TaxpayerStore>> {
    match backend {
        StoreBackend::Memory => Ok(Box::new(InMemoryTaxpayerStore::new())),
        StoreBackend::Sqlite { path } => Ok(Box::new(SqliteTaxpayerStore::open(path)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        open_store, ConfigError, RegistryConfig, StoreBackend, DB_PATH_ENV, LOG_DIR_ENV,
        LOG_LEVEL_ENV,
    };
    use crate::model::taxpayer::TaxpayerRecord;
    use crate::repo::taxpayer_repo::TaxpayerStore;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(vars: &[(&str, &str)]) -> Result<RegistryConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        RegistryConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn memory_marker_selects_in_memory_backend() {
        let config = config_from(&[(DB_PATH_ENV, " :memory: ")]).unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = config_from(&[(DB_PATH_ENV, "  "), (LOG_LEVEL_ENV, "")]).unwrap();
        assert_eq!(config, RegistryConfig::default());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let log_dir = std::env::temp_dir().join("taxreg-logs");
        let config = config_from(&[
            (DB_PATH_ENV, "/var/lib/taxreg/registry.db"),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, log_dir.to_str().unwrap()),
        ])
        .unwrap();
        assert_eq!(
            config.store,
            StoreBackend::Sqlite {
                path: PathBuf::from("/var/lib/taxreg/registry.db")
            }
        );
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(log_dir));
    }

    #[test]
    fn log_level_is_normalized() {
        let config = config_from(&[(LOG_LEVEL_ENV, " Warning ")]).unwrap();
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn unknown_log_level_is_rejected_without_log_dir() {
        let err = config_from(&[(LOG_LEVEL_ENV, "verbose")]).unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedLogLevel("verbose".to_string()));

        let mut config = RegistryConfig::default();
        assert!(config.set_log_level("loud").is_err());
        assert_eq!(config.log_level, RegistryConfig::default().log_level);
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = config_from(&[(LOG_DIR_ENV, "logs")]).unwrap_err();
        assert_eq!(err, ConfigError::RelativeLogDir(PathBuf::from("logs")));
    }

    #[test]
    fn open_store_builds_each_backend() {
        let memory = open_store(&StoreBackend::Memory).unwrap();
        memory
            .insert(&TaxpayerRecord::new("T1", "Ana", "Lee", "12 Oak St"))
            .unwrap();
        assert_eq!(memory.list_all().unwrap().len(), 1);

        let dir = tempfile::tempdir().unwrap();
        let sqlite = open_store(&StoreBackend::Sqlite {
            path: dir.path().join("registry.db"),
        })
        .unwrap();
        assert!(sqlite.get("T1").unwrap().is_none());
    }
}
