//! Command-line options

use clap::Parser;
use iscan_engine::infrastructure::load_scan_config;
use iscan_engine::{DomainError, Result, ScanConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "iscan",
    about = "Runs an inline security scan of a container image",
    version
)]
pub struct Options {
    /// Image reference to scan (e.g. alpine:3.10)
    pub image: String,

    /// Dockerfile to attach to the scan result
    #[arg(long)]
    pub dockerfile: Option<PathBuf>,

    /// YAML configuration file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Scan engine API token
    #[arg(long, env = "SYSDIG_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Scan engine backend URL (anything but the SaaS default is on-prem)
    #[arg(long)]
    pub engine_url: Option<String>,

    /// Do not verify the scan engine's TLS certificate
    #[arg(long)]
    pub skip_tls_verify: bool,

    /// Verbose scan output, echo captured buffers at debug level
    #[arg(long)]
    pub debug: bool,

    /// User the scan container runs as
    #[arg(long)]
    pub run_as_user: Option<String>,

    /// Scan container image to use
    #[arg(long)]
    pub scan_image: Option<String>,

    /// Extra whitespace-separated parameters for the scan command
    #[arg(long)]
    pub extra_params: Option<String>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,
}

impl Options {
    /// Build the effective scan configuration: config file first, then
    /// flag overrides. An API token must come from one of the two.
    pub fn scan_config(&self) -> Result<ScanConfig> {
        let mut config = match &self.config {
            Some(path) => load_scan_config(path)?,
            None => {
                let token = self.api_token.clone().ok_or_else(|| {
                    DomainError::InvalidConfiguration(
                        "An API token is required (--api-token or SYSDIG_API_TOKEN)".to_string(),
                    )
                })?;
                ScanConfig::new(token)
            }
        };

        if let Some(token) = &self.api_token {
            config.api_token = token.clone();
        }
        if let Some(url) = &self.engine_url {
            config.engine_url = url.clone();
        }
        if self.skip_tls_verify {
            config.verify_engine_tls = false;
        }
        if self.debug {
            config.debug = true;
        }
        if let Some(user) = &self.run_as_user {
            config.run_as_user = Some(user.clone());
        }
        if let Some(image) = &self.scan_image {
            config.scan_image = image.clone();
        }
        if let Some(extra) = &self.extra_params {
            config.extra_params = Some(extra.clone());
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_build_config_without_file() {
        let options = Options::parse_from([
            "iscan",
            "alpine:3.10",
            "--api-token",
            "abc123",
            "--engine-url",
            "https://sysdig.internal:8443",
            "--skip-tls-verify",
        ]);

        let config = options.scan_config().unwrap();
        assert_eq!(config.api_token, "abc123");
        assert_eq!(config.engine_url, "https://sysdig.internal:8443");
        assert!(!config.verify_engine_tls);
        assert!(config.is_on_prem());
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let options = Options::try_parse_from(["iscan", "alpine:3.10"]).unwrap();
        assert!(options.scan_config().is_err());
    }
}
