//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Nothing in the request path reads environment variables.

use crate::constants::PATIENTS_DIR_NAME;
use crate::{RecordError, RecordResult};
use std::path::PathBuf;
use std::str::FromStr;

/// Which [`crate::store::PatientStore`] implementation to open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
}

impl FromStr for StoreBackend {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "file" => Ok(StoreBackend::File),
            other => Err(RecordError::Validation(format!(
                "unknown store backend '{}' (expected 'file' or 'memory')",
                other
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_data_dir: PathBuf,
    store_backend: StoreBackend,
    critical_empty_is_not_found: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Validation`] if `patient_data_dir` is empty while the file
    /// backend is selected.
    pub fn new(
        patient_data_dir: PathBuf,
        store_backend: StoreBackend,
        critical_empty_is_not_found: bool,
    ) -> RecordResult<Self> {
        if store_backend == StoreBackend::File && patient_data_dir.as_os_str().is_empty() {
            return Err(RecordError::Validation(
                "patient data directory cannot be empty".into(),
            ));
        }

        Ok(Self {
            patient_data_dir,
            store_backend,
            critical_empty_is_not_found,
        })
    }

    /// An in-memory configuration, as used by tests and demos.
    pub fn in_memory() -> Self {
        Self {
            patient_data_dir: PathBuf::new(),
            store_backend: StoreBackend::Memory,
            critical_empty_is_not_found: true,
        }
    }

    pub fn patients_dir(&self) -> PathBuf {
        self.patient_data_dir.join(PATIENTS_DIR_NAME)
    }

    pub fn store_backend(&self) -> StoreBackend {
        self.store_backend
    }

    /// Whether an empty critical-patient list is reported as not found.
    pub fn critical_empty_is_not_found(&self) -> bool {
        self.critical_empty_is_not_found
    }

    pub fn with_critical_empty_is_not_found(mut self, value: bool) -> Self {
        self.critical_empty_is_not_found = value;
        self
    }
}

/// Parse the store backend from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`StoreBackend::File`].
pub fn store_backend_from_env_value(value: Option<String>) -> RecordResult<StoreBackend> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<StoreBackend>())
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Parse a boolean flag from an optional string value, falling back to `default`.
pub fn flag_from_env_value(name: &str, value: Option<String>, default: bool) -> RecordResult<bool> {
    let Some(value) = value.map(|v| v.trim().to_ascii_lowercase()) else {
        return Ok(default);
    };
    match value.as_str() {
        "" => Ok(default),
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(RecordError::Validation(format!(
            "{} must be true or false, got '{}'",
            name, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_defaults_to_file() {
        assert_eq!(store_backend_from_env_value(None).unwrap(), StoreBackend::File);
        assert_eq!(
            store_backend_from_env_value(Some("  ".into())).unwrap(),
            StoreBackend::File
        );
        assert_eq!(
            store_backend_from_env_value(Some("Memory".into())).unwrap(),
            StoreBackend::Memory
        );
        assert!(store_backend_from_env_value(Some("mongo".into())).is_err());
    }

    #[test]
    fn test_flag_from_env_value() {
        assert!(flag_from_env_value("X", None, true).unwrap());
        assert!(!flag_from_env_value("X", Some("false".into()), true).unwrap());
        assert!(flag_from_env_value("X", Some("ON".into()), false).unwrap());
        assert!(flag_from_env_value("X", Some("maybe".into()), false).is_err());
    }

    #[test]
    fn test_file_backend_requires_directory() {
        assert!(CoreConfig::new(PathBuf::new(), StoreBackend::File, true).is_err());
        let cfg = CoreConfig::new(PathBuf::from("/data"), StoreBackend::File, false).unwrap();
        assert_eq!(cfg.patients_dir(), PathBuf::from("/data/patients"));
        assert!(!cfg.critical_empty_is_not_found());
    }
}
