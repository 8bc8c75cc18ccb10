//! Proxy environment resolution
//! Derives the scan container's outbound proxy settings from the caller's
//! environment

use std::collections::HashMap;
use tracing::debug;

/// Build `KEY=value` proxy entries for the scan container environment.
///
/// For each proxy kind the lowercase variable wins; the uppercase variant is
/// only consulted when the lowercase one is unset or empty. `https_proxy`
/// additionally falls back to whatever was resolved for `http_proxy` when
/// both of its own spellings are empty. Absent settings contribute nothing.
pub fn proxy_environment(env: &HashMap<String, String>) -> Vec<String> {
    let mut entries = Vec::new();

    let http_proxy = resolve(env, "http_proxy", "HTTP_PROXY");
    if let Some(value) = &http_proxy {
        entries.push(format!("http_proxy={}", value));
    }

    let https_proxy = match resolve(env, "https_proxy", "HTTPS_PROXY") {
        Some(value) => Some(value),
        None => {
            if let Some(value) = &http_proxy {
                debug!(
                    https_proxy = %value,
                    "HTTPS proxy setting from http_proxy (https_proxy and HTTPS_PROXY empty)"
                );
            }
            http_proxy.clone()
        }
    };
    if let Some(value) = https_proxy {
        entries.push(format!("https_proxy={}", value));
    }

    if let Some(value) = resolve(env, "no_proxy", "NO_PROXY") {
        entries.push(format!("no_proxy={}", value));
    }

    entries
}

/// Resolve one proxy kind, preferring the lowercase variable name.
fn resolve(env: &HashMap<String, String>, lower: &str, upper: &str) -> Option<String> {
    match env.get(lower).filter(|v| !v.is_empty()) {
        Some(value) => {
            debug!(var = lower, value = %value, "Proxy setting from lowercase env var");
            Some(value.clone())
        }
        None => match env.get(upper).filter(|v| !v.is_empty()) {
            Some(value) => {
                debug!(
                    var = upper,
                    value = %value,
                    "Proxy setting from uppercase env var (lowercase empty)"
                );
                Some(value.clone())
            }
            None => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_no_variables_yields_nothing() {
        assert!(proxy_environment(&env(&[])).is_empty());
    }

    #[test]
    fn test_lowercase_wins_over_uppercase() {
        let entries = proxy_environment(&env(&[
            ("http_proxy", "http://lower:3128"),
            ("HTTP_PROXY", "http://upper:3128"),
        ]));
        assert!(entries.contains(&"http_proxy=http://lower:3128".to_string()));
        assert!(!entries.iter().any(|e| e.contains("upper")));
    }

    #[test]
    fn test_uppercase_fallback_when_lowercase_empty() {
        let entries = proxy_environment(&env(&[
            ("http_proxy", ""),
            ("HTTP_PROXY", "http://upper:3128"),
        ]));
        assert_eq!(entries, vec!["http_proxy=http://upper:3128".to_string()]);
    }

    #[test]
    fn test_https_falls_back_to_http_only_when_both_spellings_empty() {
        let entries = proxy_environment(&env(&[("http_proxy", "http://proxy:3128")]));
        assert!(entries.contains(&"http_proxy=http://proxy:3128".to_string()));
        assert!(entries.contains(&"https_proxy=http://proxy:3128".to_string()));

        let entries = proxy_environment(&env(&[
            ("http_proxy", "http://proxy:3128"),
            ("HTTPS_PROXY", "https://secure-proxy:3128"),
        ]));
        assert!(entries.contains(&"https_proxy=https://secure-proxy:3128".to_string()));
    }

    #[test]
    fn test_no_proxy_emitted() {
        let entries = proxy_environment(&env(&[("NO_PROXY", "localhost,127.0.0.1")]));
        assert_eq!(entries, vec!["no_proxy=localhost,127.0.0.1".to_string()]);
    }

    #[test]
    fn test_empty_values_are_not_emitted() {
        let entries = proxy_environment(&env(&[
            ("http_proxy", ""),
            ("HTTP_PROXY", ""),
            ("no_proxy", ""),
        ]));
        assert!(entries.is_empty());
    }
}
