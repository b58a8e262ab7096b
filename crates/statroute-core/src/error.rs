// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for statroute.

use thiserror::Error;

use crate::types::Tier;

/// One failed dispatch attempt, kept for the aggregated routing error.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptFailure {
    /// Tier that was attempted.
    pub tier: Tier,
    /// Rendered error message from the attempt.
    pub message: String,
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.tier, self.message)
    }
}

/// The primary error type used across the statroute crates.
#[derive(Debug, Error)]
pub enum StatrouteError {
    /// Configuration errors (invalid TOML, missing keys, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Failure talking to a model endpoint (connect, TLS, non-success status).
    #[error("{provider} transport error: {message}")]
    ProviderTransport {
        provider: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The model endpoint answered but the reply could not be understood.
    #[error("{provider} response error: {message}")]
    ProviderResponse { provider: String, message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// No adapter is registered for the requested tier.
    #[error("no provider adapter configured for tier {tier}")]
    NoAdapter { tier: Tier },

    /// Every permitted attempt for a request failed.
    #[error("routing failed (original tier {original_tier}): {}", join_attempts(attempts))]
    FatalRouting {
        original_tier: Tier,
        attempts: Vec<AttemptFailure>,
    },

    /// A tool name with no registered implementation reached the executor.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// A tool with the same name is already in the catalog.
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StatrouteError {
    /// Whether a failed dispatch with this error may escalate to the next tier.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(
            self,
            StatrouteError::ProviderTransport { .. }
                | StatrouteError::ProviderResponse { .. }
                | StatrouteError::Timeout { .. }
                | StatrouteError::NoAdapter { .. }
        )
    }

    /// Shorthand for a transport error without an underlying source.
    pub fn transport(provider: &str, message: impl Into<String>) -> Self {
        StatrouteError::ProviderTransport {
            provider: provider.to_string(),
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a response error.
    pub fn response(provider: &str, message: impl Into<String>) -> Self {
        StatrouteError::ProviderResponse {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

fn join_attempts(attempts: &[AttemptFailure]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
