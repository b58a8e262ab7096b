// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared model driver.
//!
//! [`ModelDriver`] owns everything the providers have in common: the HTTP
//! client, the call timer, status handling, and cost calculation. A
//! [`WireFormat`] implementation supplies the provider-specific pieces: the
//! endpoint, typed request and response bodies, and their translation to and
//! from the provider-agnostic [`Turn`] and [`Completion`] shapes.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use statroute_core::{
    HistoryMessage, LlmResponse, ProviderAdapter, Role, StatrouteError, Tier, TokenUsage,
    ToolCall, ToolDefinition, ToolResult, ToolRound, Usage,
};
use statroute_cost::{ModelPricing, calculate_cost};
use tracing::{debug, warn};

/// Static description of the model behind an adapter.
#[derive(Debug, Clone)]
pub struct ModelProfile {
    /// Provider name used in responses and errors.
    pub provider: &'static str,
    pub model: String,
    pub tier: Tier,
    pub pricing: ModelPricing,
    /// System preamble sent on every call.
    pub preamble: &'static str,
    pub max_tokens: u32,
}

/// One entry of the provider-agnostic conversation handed to a wire format.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    User(String),
    Assistant(String),
    /// An assistant turn that requested tool invocations.
    ToolCalls {
        text: Option<String>,
        calls: Vec<ToolCall>,
    },
    /// Results for the preceding tool calls, in call order.
    ToolResults(Vec<ToolReply>),
}

/// A tool result paired with the name of the call it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolReply {
    pub call_id: String,
    pub name: String,
    pub result: ToolResult,
}

/// Provider-agnostic view of one model reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    /// Model name reported by the provider, when it reports one.
    pub model: Option<String>,
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: TokenUsage,
    pub stop_reason: Option<String>,
}

/// Provider-specific request/response translation.
pub trait WireFormat: Send + Sync + 'static {
    type Request: Serialize + Send + Sync;
    type Response: DeserializeOwned + Send;

    /// Full URL for a completion request.
    fn endpoint(&self, base_url: &str, model: &str) -> String;

    /// Authentication and version headers attached to every request.
    fn headers(&self) -> Result<HeaderMap, StatrouteError>;

    fn build_request(
        &self,
        profile: &ModelProfile,
        turns: &[Turn],
        tools: Option<&[ToolDefinition]>,
    ) -> Self::Request;

    fn parse_response(&self, response: Self::Response) -> Result<Completion, StatrouteError>;

    /// Pull a readable message out of an error body, if the provider sent one.
    fn describe_error(&self, _body: &str) -> Option<String> {
        None
    }
}

/// A [`ProviderAdapter`] built from a [`WireFormat`] and a [`ModelProfile`].
pub struct ModelDriver<W: WireFormat> {
    client: reqwest::Client,
    wire: W,
    profile: ModelProfile,
    base_url: String,
    timeout: Duration,
}

impl<W: WireFormat> std::fmt::Debug for ModelDriver<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDriver")
            .field("provider", &self.profile.provider)
            .field("model", &self.profile.model)
            .field("tier", &self.profile.tier)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl<W: WireFormat> ModelDriver<W> {
    /// Build a driver whose HTTP client gives up after `timeout`.
    pub fn new(
        wire: W,
        profile: ModelProfile,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StatrouteError> {
        let client = reqwest::Client::builder()
            .default_headers(wire.headers()?)
            .timeout(timeout)
            .build()
            .map_err(|e| StatrouteError::ProviderTransport {
                provider: profile.provider.to_string(),
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            wire,
            profile,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    async fn send(
        &self,
        turns: &[Turn],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<LlmResponse, StatrouteError> {
        let provider = self.profile.provider;
        let url = self.wire.endpoint(&self.base_url, &self.profile.model);
        let request = self.wire.build_request(&self.profile, turns, tools);

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        debug!(provider, status = %status, "completion response received");

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        if !status.is_success() {
            let message = match self.wire.describe_error(&body) {
                Some(detail) => format!("API returned {status}: {detail}"),
                None => format!("API returned {status}: {body}"),
            };
            warn!(provider, status = %status, "provider call failed");
            return Err(StatrouteError::transport(provider, message));
        }

        let parsed: W::Response = serde_json::from_str(&body).map_err(|e| {
            StatrouteError::response(provider, format!("failed to parse API response: {e}"))
        })?;
        let completion = self.wire.parse_response(parsed)?;

        let estimated_cost = calculate_cost(&completion.usage, &self.profile.pricing);
        debug!(
            provider,
            model = %self.profile.model,
            input_tokens = completion.usage.input_tokens,
            output_tokens = completion.usage.output_tokens,
            tool_calls = completion.tool_calls.len(),
            latency_ms,
            "completion parsed"
        );

        Ok(LlmResponse {
            tier_used: self.profile.tier,
            provider: provider.to_string(),
            model: completion
                .model
                .unwrap_or_else(|| self.profile.model.clone()),
            content: completion.text,
            tool_calls: completion.tool_calls,
            usage: Usage {
                input_tokens: completion.usage.input_tokens,
                output_tokens: completion.usage.output_tokens,
                estimated_cost,
            },
            latency_ms,
            fallback_used: false,
            original_tier: None,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> StatrouteError {
        if e.is_timeout() {
            return StatrouteError::Timeout {
                duration: self.timeout,
            };
        }
        StatrouteError::ProviderTransport {
            provider: self.profile.provider.to_string(),
            message: format!("HTTP request failed: {e}"),
            source: Some(Box::new(e)),
        }
    }
}

#[async_trait]
impl<W: WireFormat> ProviderAdapter for ModelDriver<W> {
    fn name(&self) -> &str {
        self.profile.provider
    }

    fn model(&self) -> &str {
        &self.profile.model
    }

    fn tier(&self) -> Tier {
        self.profile.tier
    }

    async fn generate(
        &self,
        query: &str,
        tools: Option<&[ToolDefinition]>,
        history: &[HistoryMessage],
    ) -> Result<LlmResponse, StatrouteError> {
        let mut turns = history_turns(history);
        turns.push(Turn::User(query.to_string()));
        self.send(&turns, tools).await
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
        let turns = continuation_turns(original_query, rounds, history)?;
        self.send(&turns, tools).await
    }
}

/// Convert session history into turns.
pub fn history_turns(history: &[HistoryMessage]) -> Vec<Turn> {
    history
        .iter()
        .map(|msg| match msg.role {
            Role::User => Turn::User(msg.content.clone()),
            Role::Assistant => Turn::Assistant(msg.content.clone()),
        })
        .collect()
}

/// Build the conversation for a continuation call: history, the original
/// query, then one tool-call turn and one results turn per round.
///
/// Every result must answer one of the calls in its own round.
pub fn continuation_turns(
    original_query: &str,
    rounds: &[ToolRound],
    history: &[HistoryMessage],
) -> Result<Vec<Turn>, StatrouteError> {
    let mut turns = history_turns(history);
    turns.push(Turn::User(original_query.to_string()));
    for round in rounds {
        turns.push(Turn::ToolCalls {
            text: round.text.clone().filter(|t| !t.trim().is_empty()),
            calls: round.calls.clone(),
        });
        turns.push(Turn::ToolResults(pair_results(round)?));
    }
    Ok(turns)
}

fn pair_results(round: &ToolRound) -> Result<Vec<ToolReply>, StatrouteError> {
    round
        .results
        .iter()
        .map(|result| {
            let call = round
                .calls
                .iter()
                .find(|c| c.id == result.tool_call_id)
                .ok_or_else(|| {
                    StatrouteError::Internal(format!(
                        "tool result `{}` does not match any tool call",
                        result.tool_call_id
                    ))
                })?;
            Ok(ToolReply {
                call_id: call.id.clone(),
                name: call.name.clone(),
                result: result.clone(),
            })
        })
        .collect()
}

/// Resolves an API key from config, falling back to an environment variable.
pub fn resolve_api_key(
    config_key: Option<&str>,
    env_var: &str,
    config_path: &str,
) -> Result<String, StatrouteError> {
    pick_api_key(config_key, std::env::var(env_var).ok()).ok_or_else(|| {
        StatrouteError::Config(format!(
            "API key not found. Set {config_path} in config or the {env_var} environment variable."
        ))
    })
}

fn pick_api_key(config_key: Option<&str>, env_value: Option<String>) -> Option<String> {
    match config_key {
        Some(key) if !key.is_empty() => Some(key.to_string()),
        _ => env_value.filter(|v| !v.is_empty()),
    }
}
