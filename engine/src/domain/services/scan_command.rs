//! Scan command assembly
//! Builds the argv, container environment and image reference for one scan

use crate::domain::constants::{
    ADDED_BY_ENV, API_TOKEN_VAR, ON_PREM_ARG, SCAN_ARGS, SCAN_COMMAND, SCAN_IMAGE_OVERRIDE_VAR,
    SKIP_TLS_ARG, VERBOSE_ARG,
};
use crate::domain::entities::ScanRequest;
use crate::domain::services::proxy_env::proxy_environment;

/// Base argument list for the scan command: script, fixed flags, optional
/// verbosity/TLS flags, the image, and on-prem engine arguments when the
/// engine URL is not the SaaS default. The Dockerfile argument and extra
/// params are appended later by the session driver.
pub fn build_scan_args(request: &ScanRequest) -> Vec<String> {
    let config = request.config();
    let mut args: Vec<String> = Vec::new();

    args.push(SCAN_COMMAND.to_string());
    args.extend(SCAN_ARGS.iter().map(|a| a.to_string()));
    if config.debug {
        args.push(VERBOSE_ARG.to_string());
    }
    if !config.verify_engine_tls {
        args.push(SKIP_TLS_ARG.to_string());
    }
    args.push(request.image().to_string());
    if config.is_on_prem() {
        args.push(format!("--sysdig-url={}", config.engine_url));
        args.push(ON_PREM_ARG.to_string());
    }

    args
}

/// Environment entries for the scan container: API token, the automation
/// marker, and any proxy settings resolved from the caller's environment.
pub fn build_container_env(request: &ScanRequest) -> Vec<String> {
    let mut env = vec![
        format!("{}={}", API_TOKEN_VAR, request.config().api_token),
        ADDED_BY_ENV.to_string(),
    ];
    env.extend(proxy_environment(request.env()));
    env
}

/// The scan container image to run: an environment override beats the
/// configured image.
pub fn resolve_scan_image(request: &ScanRequest) -> String {
    request
        .env()
        .get(SCAN_IMAGE_OVERRIDE_VAR)
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| request.config().scan_image.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ScanConfig;
    use std::collections::HashMap;

    fn request(config: ScanConfig) -> ScanRequest {
        ScanRequest::builder("alpine:3.10", config).build().unwrap()
    }

    #[test]
    fn test_base_args_for_saas_scan() {
        let args = build_scan_args(&request(ScanConfig::new("token")));
        assert_eq!(
            args,
            vec![
                "/sysdig-inline-scan.sh",
                "--storage-type=docker-daemon",
                "--format=JSON",
                "alpine:3.10",
            ]
        );
    }

    #[test]
    fn test_debug_adds_verbose() {
        let mut config = ScanConfig::new("token");
        config.debug = true;
        let args = build_scan_args(&request(config));
        assert!(args.contains(&"--verbose".to_string()));
    }

    #[test]
    fn test_disabled_tls_verification_adds_skip_flag() {
        let mut config = ScanConfig::new("token");
        config.verify_engine_tls = false;
        let args = build_scan_args(&request(config));
        assert!(args.contains(&"--sysdig-skip-tls".to_string()));
    }

    #[test]
    fn test_on_prem_engine_adds_url_and_marker() {
        let mut config = ScanConfig::new("token");
        config.engine_url = "https://sysdig.internal:8443".to_string();
        let args = build_scan_args(&request(config));
        assert!(args.contains(&"--sysdig-url=https://sysdig.internal:8443".to_string()));
        assert!(args.contains(&"--on-prem".to_string()));
    }

    #[test]
    fn test_default_engine_adds_no_url_args() {
        let args = build_scan_args(&request(ScanConfig::new("token")));
        assert!(!args.iter().any(|a| a.starts_with("--sysdig-url")));
        assert!(!args.contains(&"--on-prem".to_string()));
    }

    #[test]
    fn test_container_env_has_token_and_marker() {
        let env = build_container_env(&request(ScanConfig::new("my-token")));
        assert!(env.contains(&"SYSDIG_API_TOKEN=my-token".to_string()));
        assert!(env.contains(&"SYSDIG_ADDED_BY=cicd-inline-scan".to_string()));
    }

    #[test]
    fn test_container_env_includes_proxy_entries() {
        let mut env_map = HashMap::new();
        env_map.insert("http_proxy".to_string(), "http://proxy:3128".to_string());
        let request = ScanRequest::builder("alpine:3.10", ScanConfig::new("token"))
            .env(env_map)
            .build()
            .unwrap();

        let env = build_container_env(&request);
        assert!(env.contains(&"http_proxy=http://proxy:3128".to_string()));
        assert!(env.contains(&"https_proxy=http://proxy:3128".to_string()));
    }

    #[test]
    fn test_scan_image_override() {
        let mut env_map = HashMap::new();
        env_map.insert(
            "SYSDIG_OVERRIDE_INLINE_SCAN_IMAGE".to_string(),
            "registry.local/inline-scan:dev".to_string(),
        );
        let request = ScanRequest::builder("alpine:3.10", ScanConfig::new("token"))
            .env(env_map)
            .build()
            .unwrap();

        assert_eq!(resolve_scan_image(&request), "registry.local/inline-scan:dev");
    }

    #[test]
    fn test_scan_image_defaults_to_config() {
        let request = request(ScanConfig::new("token"));
        assert_eq!(
            resolve_scan_image(&request),
            request.config().scan_image
        );
    }
}
