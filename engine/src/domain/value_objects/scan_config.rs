//! ScanConfig value object
//! Read-only input describing how one scan should run

use crate::domain::constants::{DEFAULT_ENGINE_URL, DEFAULT_SCAN_IMAGE};
use serde::{Deserialize, Serialize};

/// Configuration for a scan, typically produced by the CLI from flags or a
/// YAML file. Immutable for the duration of the scan.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScanConfig {
    /// Echo scan tool output and buffers at debug level (`--verbose`).
    #[serde(default)]
    pub debug: bool,

    /// Verify the scan engine's TLS certificate.
    #[serde(default = "default_true")]
    pub verify_engine_tls: bool,

    /// Scan engine backend URL. Anything other than the SaaS default makes
    /// the scan run in on-prem mode.
    #[serde(default = "default_engine_url")]
    pub engine_url: String,

    /// API token passed to the scan container as SYSDIG_API_TOKEN.
    pub api_token: String,

    /// User the scan container runs as (runtime-specific format).
    #[serde(default)]
    pub run_as_user: Option<String>,

    /// Scan container image; can be overridden via environment variable.
    #[serde(default = "default_scan_image")]
    pub scan_image: String,

    /// Extra whitespace-separated parameters appended to the scan command.
    #[serde(default)]
    pub extra_params: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_engine_url() -> String {
    DEFAULT_ENGINE_URL.to_string()
}

fn default_scan_image() -> String {
    DEFAULT_SCAN_IMAGE.to_string()
}

impl ScanConfig {
    /// Minimal config pointing at the SaaS backend.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            debug: false,
            verify_engine_tls: true,
            engine_url: default_engine_url(),
            api_token: api_token.into(),
            run_as_user: None,
            scan_image: default_scan_image(),
            extra_params: None,
        }
    }

    /// Whether the configured engine differs from the SaaS default.
    pub fn is_on_prem(&self) -> bool {
        self.engine_url != DEFAULT_ENGINE_URL
    }
}
