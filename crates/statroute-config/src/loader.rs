// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./statroute.toml` > `~/.config/statroute/statroute.toml` >
//! `/etc/statroute/statroute.toml`, with `STATROUTE_` environment overrides on top.

// figment::Error is external and cannot be boxed without a wrapper.
#![allow(clippy::result_large_err)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::StatrouteConfig;

/// Config file name searched for in each location.
pub const CONFIG_FILE: &str = "statroute.toml";

/// System-wide config path.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/statroute/statroute.toml";

/// Sections recognized by the env provider, in mapping order.
const ENV_SECTIONS: &[&str] = &[
    "agent", "anthropic", "gemini", "groq", "routing", "history", "data",
];

/// Path of the per-user config file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("statroute").join(CONFIG_FILE))
}

/// Build the full layered Figment (exposed for diagnostic use).
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/statroute/statroute.toml`
/// 3. `~/.config/statroute/statroute.toml`
/// 4. `./statroute.toml`
/// 5. `STATROUTE_*` environment variables
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(StatrouteConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(CONFIG_FILE))
        .merge(env_provider())
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<StatrouteConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<StatrouteConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StatrouteConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StatrouteConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StatrouteConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Environment provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `STATROUTE_ROUTING_TIMEOUT_MS` must become
/// `routing.timeout_ms`, not `routing.timeout.ms`.
fn env_provider() -> Env {
    Env::prefixed("STATROUTE_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env key onto its dotted config path.
fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections_keeping_underscores() {
        assert_eq!(map_env_key("routing_timeout_ms"), "routing.timeout_ms");
        assert_eq!(map_env_key("anthropic_api_key"), "anthropic.api_key");
        assert_eq!(map_env_key("data_world_bank_url"), "data.world_bank_url");
        assert_eq!(map_env_key("history_max_messages"), "history.max_messages");
    }

    #[test]
    fn unknown_env_sections_pass_through() {
        assert_eq!(map_env_key("bogus_key"), "bogus_key");
    }

    #[test]
    fn env_override_reaches_nested_field() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("STATROUTE_ROUTING_TIMEOUT_MS", "15000");
            jail.set_env("STATROUTE_ROUTING_DEFAULT_TIER", "premium");
            let config: StatrouteConfig = Figment::new()
                .merge(Serialized::defaults(StatrouteConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.routing.timeout_ms, 15_000);
            assert_eq!(config.routing.default_tier, statroute_core::Tier::Premium);
            Ok(())
        });
    }
}
