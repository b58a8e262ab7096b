// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the router, providers, and tool bridge.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::tool::ToolCall;

/// Unique identifier for a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Routing destination with a fixed cost/capability profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Deep analytical reasoning; the most capable tier.
    Premium,
    /// Fast multi-entity synthesis. The legacy `fast` tier maps here.
    #[serde(alias = "fast")]
    Standard,
}

impl Tier {
    /// Both supported tiers, most capable first.
    pub const ALL: [Tier; 2] = [Tier::Premium, Tier::Standard];

    /// The most capable tier, target of every fallback.
    pub fn top() -> Tier {
        Tier::Premium
    }

    pub fn is_top(self) -> bool {
        self == Tier::top()
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Premium => write!(f, "premium"),
            Tier::Standard => write!(f, "standard"),
        }
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "premium" => Ok(Tier::Premium),
            "standard" | "fast" => Ok(Tier::Standard),
            other => Err(format!(
                "unknown tier `{other}` (expected premium or standard)"
            )),
        }
    }
}

/// Speaker of a history message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single role-tagged entry in a session's conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

impl HistoryMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Raw token counts reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Token counts plus the priced cost of one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Cost in USD. Never negative.
    pub estimated_cost: f64,
}

/// The outcome of one provider call, as returned across the core boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Tier that actually served the call.
    pub tier_used: Tier,
    /// Provider name (e.g. "anthropic").
    pub provider: String,
    /// Model identifier the provider reported or was asked for.
    pub model: String,
    /// Concatenated text content of the reply.
    pub content: String,
    /// Tool invocations the model requested, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    pub usage: Usage,
    /// Wall-clock latency of the provider call in milliseconds.
    pub latency_ms: u64,
    /// Whether this response came from a fallback attempt.
    pub fallback_used: bool,
    /// Tier that failed before the fallback. Set only when `fallback_used`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_tier: Option<Tier>,
}

impl LlmResponse {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
