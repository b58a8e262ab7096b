// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for statroute.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use statroute_core::Tier;

/// Top-level statroute configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StatrouteConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Anthropic (Premium tier) settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Google Gemini (Standard tier) settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Groq OpenAI-compatible (legacy fast tier) settings.
    #[serde(default)]
    pub groq: GroqConfig,

    /// Tier routing and fallback.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Session history retention.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Statistical data source endpoints.
    #[serde(default)]
    pub data: DataConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in log lines.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "statroute".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// API key. `None` falls back to `ANTHROPIC_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Anthropic API version header.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_premium_max_tokens")]
    pub max_tokens: u32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_version: default_api_version(),
            max_tokens: default_premium_max_tokens(),
        }
    }
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_premium_max_tokens() -> u32 {
    4096
}

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. `None` falls back to `GEMINI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_standard_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            max_tokens: default_standard_max_tokens(),
        }
    }
}

/// Groq configuration (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GroqConfig {
    /// API key. `None` falls back to `GROQ_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_groq_base_url")]
    pub base_url: String,

    #[serde(default = "default_standard_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_groq_base_url(),
            max_tokens: default_standard_max_tokens(),
        }
    }
}

fn default_groq_base_url() -> String {
    "https://api.groq.com/openai".to_string()
}

fn default_standard_max_tokens() -> u32 {
    2048
}

/// Which adapter serves the Standard tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StandardProvider {
    #[default]
    Gemini,
    Groq,
}

/// Tier routing and fallback configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Escalate once to the Premium tier when the selected tier fails.
    #[serde(default = "default_enable_fallback")]
    pub enable_fallback: bool,

    /// Tier used when no classification rule matches.
    #[serde(default = "default_tier")]
    pub default_tier: Tier,

    /// Fallback hops permitted per request (0 or 1).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Timeout ceiling for each model call, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Adapter serving the Standard tier.
    #[serde(default)]
    pub standard_provider: StandardProvider,

    /// Maximum tool-call/continuation rounds per answered query.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            enable_fallback: default_enable_fallback(),
            default_tier: default_tier(),
            max_retries: default_max_retries(),
            timeout_ms: default_timeout_ms(),
            standard_provider: StandardProvider::default(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

fn default_enable_fallback() -> bool {
    true
}

fn default_tier() -> Tier {
    Tier::Standard
}

fn default_max_retries() -> u32 {
    1
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_tool_rounds() -> u32 {
    3
}

/// Session history configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// Messages kept per session; older ones are dropped.
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
        }
    }
}

fn default_max_messages() -> usize {
    20
}

/// Statistical data source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// Timeout for each data source request, in seconds.
    #[serde(default = "default_data_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_world_bank_url")]
    pub world_bank_url: String,

    #[serde(default = "default_imf_url")]
    pub imf_url: String,

    #[serde(default = "default_comtrade_url")]
    pub comtrade_url: String,

    #[serde(default = "default_faostat_url")]
    pub faostat_url: String,

    #[serde(default = "default_owid_url")]
    pub owid_url: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_data_timeout_secs(),
            world_bank_url: default_world_bank_url(),
            imf_url: default_imf_url(),
            comtrade_url: default_comtrade_url(),
            faostat_url: default_faostat_url(),
            owid_url: default_owid_url(),
        }
    }
}

fn default_data_timeout_secs() -> u64 {
    20
}

fn default_world_bank_url() -> String {
    "https://api.worldbank.org/v2".to_string()
}

fn default_imf_url() -> String {
    "https://www.imf.org/external/datamapper/api/v1".to_string()
}

fn default_comtrade_url() -> String {
    "https://comtradeapi.un.org/public/v1".to_string()
}

fn default_faostat_url() -> String {
    "https://faostatservices.fao.org/api/v1/en".to_string()
}

fn default_owid_url() -> String {
    "https://ourworldindata.org/grapher".to_string()
}
