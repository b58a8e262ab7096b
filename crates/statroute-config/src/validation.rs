// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde attributes cannot express: positive
//! timeouts, the single-hop fallback limit, and non-empty endpoints.

use crate::diagnostic::ConfigError;
use crate::model::StatrouteConfig;

/// Fallback hops the router supports per request.
pub const MAX_FALLBACK_HOPS: u32 = 1;

/// Validate a deserialized configuration.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &StatrouteConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let routing = &config.routing;
    if routing.max_retries > MAX_FALLBACK_HOPS {
        errors.push(ConfigError::validation(format!(
            "routing.max_retries must be at most {MAX_FALLBACK_HOPS} (one fallback hop), got {}",
            routing.max_retries
        )));
    }

    if routing.timeout_ms == 0 {
        errors.push(ConfigError::validation(
            "routing.timeout_ms must be greater than zero",
        ));
    }

    if routing.max_tool_rounds == 0 {
        errors.push(ConfigError::validation(
            "routing.max_tool_rounds must be at least 1",
        ));
    }

    if config.history.max_messages == 0 {
        errors.push(ConfigError::validation(
            "history.max_messages must be at least 1",
        ));
    }

    if config.data.timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "data.timeout_secs must be greater than zero",
        ));
    }

    let endpoints = [
        ("data.world_bank_url", &config.data.world_bank_url),
        ("data.imf_url", &config.data.imf_url),
        ("data.comtrade_url", &config.data.comtrade_url),
        ("data.faostat_url", &config.data.faostat_url),
        ("data.owid_url", &config.data.owid_url),
        ("groq.base_url", &config.groq.base_url),
    ];
    for (key, url) in endpoints {
        let url = url.trim();
        if url.is_empty() {
            errors.push(ConfigError::validation(format!("{key} must not be empty")));
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::validation(format!(
                "{key} `{url}` must start with http:// or https://"
            )));
        }
    }

    if !matches!(
        config.agent.log_level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        errors.push(ConfigError::validation(format!(
            "agent.log_level `{}` is not one of trace, debug, info, warn, error",
            config.agent.log_level
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&StatrouteConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = StatrouteConfig::default();
        config.routing.max_retries = 3;
        config.routing.timeout_ms = 0;
        config.history.max_messages = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let mut config = StatrouteConfig::default();
        config.data.imf_url = "ftp://imf.org".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("data.imf_url"));
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = StatrouteConfig::default();
        config.agent.log_level = "verbose".into();
        assert!(validate_config(&config).is_err());
    }
}
