// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool executor trait consumed by the router's tool loop.

use async_trait::async_trait;

use crate::error::StatrouteError;
use crate::tool::{ToolDefinition, ToolOutcome};

/// Executes named tool calls against external data sources.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// The immutable catalog offered to providers.
    fn definitions(&self) -> &[ToolDefinition];

    /// Execute one call.
    ///
    /// Expected upstream failures come back as [`ToolOutcome::Failure`].
    /// Only a name with no implementation is an `Err`.
    async fn execute(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolOutcome, StatrouteError>;
}
