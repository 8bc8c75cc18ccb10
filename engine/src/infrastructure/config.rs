//! Configuration loading from YAML files
//!
//! A config file holds one `ScanConfig`; missing fields fall back to their
//! defaults (SaaS engine URL, default scan image, TLS verification on).

use crate::domain::value_objects::ScanConfig;
use crate::domain::{DomainError, Result};
use std::path::Path;

/// Load a scan configuration from a YAML file.
pub fn load_scan_config(path: &Path) -> Result<ScanConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        DomainError::InvalidConfiguration(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    serde_yaml::from_str(&contents).map_err(|e| {
        DomainError::InvalidConfiguration(format!(
            "Failed to parse config file '{}': {}",
            path.display(),
            e
        ))
    })
}
