//! TOML configuration for the demo and benchmark harness.
//!
//! ```toml
//! capacity = 64
//! policies = ["lru", "naive", "lazy_batch"]
//!
//! [workload]
//! operations = 10000
//! key_space = 512
//! read_ratio = 0.7
//! remove_ratio = 0.05
//! seed = 42
//! ```
//!
//! Every field is optional and falls back to the values above.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{CacheError, ConfigError};
use crate::policy::PolicyKind;
use crate::workload::WorkloadConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    pub capacity: usize,
    pub policies: Vec<PolicyKind>,
    pub workload: WorkloadConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            capacity: 64,
            policies: PolicyKind::ALL.to_vec(),
            workload: WorkloadConfig::default(),
        }
    }
}

impl HarnessConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: HarnessConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidCapacity { capacity: 0 }.into());
        }
        if self.policies.is_empty() {
            return Err(ConfigError::EmptyPolicies);
        }
        self.workload.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = HarnessConfig::from_toml_str("").unwrap();
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = HarnessConfig::from_toml_str(
            r#"
            capacity = 8
            policies = ["lru"]

            [workload]
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.capacity, 8);
        assert_eq!(config.policies, vec![PolicyKind::Lru]);
        assert_eq!(config.workload.seed, 7);
        assert_eq!(config.workload.key_space, 512);
    }

    #[test]
    fn test_zero_capacity() {
        let err = HarnessConfig::from_toml_str("capacity = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Cache(CacheError::InvalidCapacity { capacity: 0 })
        ));
    }

    #[test]
    fn test_unknown_policy_is_parse_error() {
        let err = HarnessConfig::from_toml_str(r#"policies = ["lfu"]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_empty_policies() {
        let err = HarnessConfig::from_toml_str("policies = []").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPolicies));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "capacity = 16").unwrap();

        let config = HarnessConfig::from_file(file.path()).unwrap();
        assert_eq!(config.capacity, 16);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = HarnessConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
