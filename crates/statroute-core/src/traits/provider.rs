// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for LLM backends (Anthropic, Gemini, Groq).

use async_trait::async_trait;

use crate::error::StatrouteError;
use crate::tool::{ToolCall, ToolDefinition, ToolResult, ToolRound};
use crate::types::{HistoryMessage, LlmResponse, Tier};

/// Uniform contract over one upstream model.
///
/// Adapters own a fixed model identifier and system preamble. They never
/// retry: any transport or response failure is returned untouched so the
/// router can decide whether to fall back.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + 'static {
    /// Provider name, e.g. "anthropic".
    fn name(&self) -> &str;

    /// Hardcoded model identifier sent upstream.
    fn model(&self) -> &str;

    /// Tier this adapter serves.
    fn tier(&self) -> Tier;

    /// Send a query with optional tools and prior history.
    async fn generate(
        &self,
        query: &str,
        tools: Option<&[ToolDefinition]>,
        history: &[HistoryMessage],
    ) -> Result<LlmResponse, StatrouteError>;

    /// Re-invoke the model with the tool calls it made and their results.
    async fn continue_with_tool_results(
        &self,
        original_query: &str,
        tool_calls: &[ToolCall],
        tool_results: &[ToolResult],
        tools: Option<&[ToolDefinition]>,
        history: &[HistoryMessage],
    ) -> Result<LlmResponse, StatrouteError>;

    /// Re-invoke the model after one or more tool rounds, in order.
    ///
    /// The default sends every call and result as a single round.
    async fn continue_after_rounds(
        &self,
        original_query: &str,
        rounds: &[ToolRound],
        tools: Option<&[ToolDefinition]>,
        history: &[HistoryMessage],
    ) -> Result<LlmResponse, StatrouteError> {
        let calls: Vec<ToolCall> = rounds.iter().flat_map(|r| r.calls.iter().cloned()).collect();
        let results: Vec<ToolResult> =
            rounds.iter().flat_map(|r| r.results.iter().cloned()).collect();
        self.continue_with_tool_results(original_query, &calls, &results, tools, history)
            .await
    }
}
