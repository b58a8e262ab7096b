// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for statroute.
//!
//! This crate provides the error type, the shared data model (tiers,
//! responses, history, tool schemas), and the trait seams that the router,
//! provider adapters, session stores, and tool bridge meet at.

pub mod error;
pub mod tool;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{AttemptFailure, StatrouteError};
pub use tool::{
    ParamType, ParameterSchema, PropertySchema, ToolCall, ToolDefinition, ToolFailure,
    ToolFailureKind, ToolOutcome, ToolResult, ToolRound,
};
pub use traits::{ProviderAdapter, SessionStore, ToolExecutor};
pub use types::{HistoryMessage, LlmResponse, Role, SessionId, Tier, TokenUsage, Usage};
