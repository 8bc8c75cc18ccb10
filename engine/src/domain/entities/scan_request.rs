//! ScanRequest entity
//! Everything the session driver needs to run one scan

use crate::domain::value_objects::{ScanConfig, ScanId};
use crate::domain::{DomainError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A single scan of one image. Immutable once built; owned by the session
/// driver for the duration of the scan.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    id: ScanId,
    image: String,
    dockerfile: Option<PathBuf>,
    config: ScanConfig,
    /// Caller environment, consulted for proxy settings and the scan image
    /// override. Passed explicitly so nothing reads process-global state.
    env: HashMap<String, String>,
}

impl ScanRequest {
    pub fn builder(image: impl Into<String>, config: ScanConfig) -> ScanRequestBuilder {
        ScanRequestBuilder {
            image: image.into(),
            dockerfile: None,
            config,
            env: HashMap::new(),
        }
    }

    pub fn id(&self) -> ScanId {
        self.id
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn dockerfile(&self) -> Option<&Path> {
        self.dockerfile.as_deref()
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }
}

pub struct ScanRequestBuilder {
    image: String,
    dockerfile: Option<PathBuf>,
    config: ScanConfig,
    env: HashMap<String, String>,
}

impl ScanRequestBuilder {
    pub fn dockerfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.dockerfile = Some(path.into());
        self
    }

    pub fn env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn build(self) -> Result<ScanRequest> {
        if self.image.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "Image reference must not be empty".to_string(),
            ));
        }
        Ok(ScanRequest {
            id: ScanId::generate(),
            image: self.image,
            dockerfile: self.dockerfile,
            config: self.config,
            env: self.env,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_minimal() {
        let request = ScanRequest::builder("alpine:3.10", ScanConfig::new("token"))
            .build()
            .unwrap();
        assert_eq!(request.image(), "alpine:3.10");
        assert!(request.dockerfile().is_none());
        assert!(request.env().is_empty());
    }

    #[test]
    fn test_builder_with_dockerfile_and_env() {
        let mut env = HashMap::new();
        env.insert("http_proxy".to_string(), "http://proxy:3128".to_string());

        let request = ScanRequest::builder("alpine:3.10", ScanConfig::new("token"))
            .dockerfile("/workspace/Dockerfile")
            .env(env)
            .build()
            .unwrap();

        assert_eq!(
            request.dockerfile(),
            Some(Path::new("/workspace/Dockerfile"))
        );
        assert_eq!(
            request.env().get("http_proxy").map(String::as_str),
            Some("http://proxy:3128")
        );
    }

    #[test]
    fn test_empty_image_rejected() {
        let result = ScanRequest::builder("  ", ScanConfig::new("token")).build();
        assert!(result.is_err());
    }
}
