// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock provider adapter for deterministic routing tests.
//!
//! `MockProvider` implements `ProviderAdapter` with a FIFO script of
//! replies and errors, and records every call it receives so tests can
//! assert on what the router sent.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use statroute_core::{
    HistoryMessage, LlmResponse, ProviderAdapter, StatrouteError, Tier, ToolCall, ToolDefinition,
    ToolResult, ToolRound, Usage,
};

/// One call the mock received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub query: String,
    /// Names of the tools offered, or `None` when tools were withheld.
    pub tools: Option<Vec<String>>,
    pub history: Vec<HistoryMessage>,
    /// Tool calls echoed back on a continuation, across all rounds. Empty
    /// for `generate`.
    pub tool_calls: Vec<ToolCall>,
    pub tool_results: Vec<ToolResult>,
    /// The same calls and results grouped by round.
    pub rounds: Vec<ToolRound>,
}

struct Reply {
    text: String,
    tool_calls: Vec<ToolCall>,
}

/// A provider that replays pre-configured replies.
///
/// Entries are popped from the front of the script. When the script is
/// exhausted, a plain "mock response" text is returned.
pub struct MockProvider {
    name: String,
    model: String,
    tier: Tier,
    cost: f64,
    delay: Option<Duration>,
    script: Mutex<VecDeque<Result<Reply, StatrouteError>>>,
    calls: AtomicUsize,
    recorded: Mutex<Vec<RecordedCall>>,
}

impl MockProvider {
    pub fn new(tier: Tier) -> Self {
        Self {
            name: format!("mock-{tier}"),
            model: format!("mock-{tier}-model"),
            tier,
            cost: 0.0,
            delay: None,
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            recorded: Mutex::new(Vec::new()),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Cost reported on every successful reply.
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Sleep before answering; useful for exercising timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a plain text reply.
    pub fn reply(mut self, text: impl Into<String>) -> Self {
        self.script.get_mut().push_back(Ok(Reply {
            text: text.into(),
            tool_calls: Vec::new(),
        }));
        self
    }

    /// Queue a reply that requests tool calls.
    pub fn reply_with_tools(mut self, text: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        self.script.get_mut().push_back(Ok(Reply {
            text: text.into(),
            tool_calls: calls,
        }));
        self
    }

    /// Queue an error.
    pub fn fail(mut self, error: StatrouteError) -> Self {
        self.script.get_mut().push_back(Err(error));
        self
    }

    /// Number of calls received, successful or not.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every call received, in order.
    pub async fn recorded(&self) -> Vec<RecordedCall> {
        self.recorded.lock().await.clone()
    }

    async fn respond(&self, call: RecordedCall) -> Result<LlmResponse, StatrouteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.recorded.lock().await.push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().await.pop_front();
        let reply = match next {
            Some(entry) => entry?,
            None => Reply {
                text: "mock response".to_string(),
                tool_calls: Vec::new(),
            },
        };
        Ok(LlmResponse {
            tier_used: self.tier,
            provider: self.name.clone(),
            model: self.model.clone(),
            content: reply.text,
            tool_calls: reply.tool_calls,
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
                estimated_cost: self.cost,
            },
            latency_ms: 1,
            fallback_used: false,
            original_tier: None,
        })
    }
}

fn tool_names(tools: Option<&[ToolDefinition]>) -> Option<Vec<String>> {
    tools.map(|defs| defs.iter().map(|d| d.name.clone()).collect())
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn tier(&self) -> Tier {
        self.tier
    }

    async fn generate(
        &self,
        query: &str,
        tools: Option<&[ToolDefinition]>,
        history: &[HistoryMessage],
    ) -> Result<LlmResponse, StatrouteError> {
        self.respond(RecordedCall {
            query: query.to_string(),
            tools: tool_names(tools),
            history: history.to_vec(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
            rounds: Vec::new(),
        })
        .await
    }

    async fn continue_with_tool_results(
        &self,
        original_query: &str,
        tool_calls: &[ToolCall],
        tool_results: &[ToolResult],
        tools: Option<&[ToolDefinition]>,
        history: &[HistoryMessage],
    ) -> Result<LlmResponse, StatrouteError> {
        let round = ToolRound {
            text: None,
            calls: tool_calls.to_vec(),
            results: tool_results.to_vec(),
        };
        self.continue_after_rounds(original_query, &[round], tools, history)
            .await
    }

    async fn continue_after_rounds(
        &self,
        original_query: &str,
        rounds: &[ToolRound],
        tools: Option<&[ToolDefinition]>,
        history: &[HistoryMessage],
    ) -> Result<LlmResponse, StatrouteError> {
        self.respond(RecordedCall {
            query: original_query.to_string(),
            tools: tool_names(tools),
            history: history.to_vec(),
            tool_calls: rounds.iter().flat_map(|r| r.calls.iter().cloned()).collect(),
            tool_results: rounds.iter().flat_map(|r| r.results.iter().cloned()).collect(),
            rounds: rounds.to_vec(),
        })
        .await
    }
}
