// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tier routing with one-hop fallback, usage accounting, and the tool loop.
//!
//! Per request: classify (unless a tier is forced), dispatch to that tier's
//! adapter under the configured timeout, and on a fallback-eligible failure
//! retry once on the top tier. Every failed attempt is kept so a fatal
//! error can report all of them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use statroute_config::model::RoutingConfig;
use statroute_core::{
    AttemptFailure, HistoryMessage, LlmResponse, ProviderAdapter, SessionId, SessionStore,
    StatrouteError, Tier, ToolCall, ToolDefinition, ToolExecutor, ToolFailure, ToolResult,
    ToolRound, Usage,
};
use statroute_cost::{UsageSnapshot, UsageTracker};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::classifier::{ClassificationResult, QueryClassifier};

/// Adapters keyed by the tier they serve.
pub type AdapterMap = HashMap<Tier, Arc<dyn ProviderAdapter>>;

/// One question to route.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub query: String,
    /// Skip classification and dispatch to this tier.
    pub forced_tier: Option<Tier>,
    /// Offer the tool catalog to the model.
    pub include_tools: bool,
    /// Explicit history. Takes precedence over the session store.
    pub history: Option<Vec<HistoryMessage>>,
    pub session_id: Option<SessionId>,
}

impl RouteRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            forced_tier: None,
            include_tools: true,
            history: None,
            session_id: None,
        }
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.forced_tier = Some(tier);
        self
    }

    pub fn without_tools(mut self) -> Self {
        self.include_tools = false;
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryMessage>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_session(mut self, session: SessionId) -> Self {
        self.session_id = Some(session);
        self
    }
}

/// Final reply of the tool loop.
#[derive(Debug, Clone)]
pub struct Answer {
    /// Last model response. `fallback_used` is set if any step fell back.
    pub response: LlmResponse,
    /// Tool rounds executed.
    pub rounds: u32,
    /// Every tool result fed back to the model, in order.
    pub tool_results: Vec<ToolResult>,
    /// Tokens and cost summed over every model call in the loop.
    pub total_usage: Usage,
}

/// What to ask an adapter.
#[derive(Clone, Copy)]
enum Call<'a> {
    Generate {
        query: &'a str,
        tools: Option<&'a [ToolDefinition]>,
        history: &'a [HistoryMessage],
    },
    Continue {
        query: &'a str,
        rounds: &'a [ToolRound],
        tools: Option<&'a [ToolDefinition]>,
        history: &'a [HistoryMessage],
    },
}

/// Routes queries across provider tiers.
pub struct Router {
    classifier: QueryClassifier,
    adapters: AdapterMap,
    tools: Arc<dyn ToolExecutor>,
    sessions: Arc<dyn SessionStore>,
    config: RoutingConfig,
    usage: Mutex<UsageTracker>,
}

impl Router {
    pub fn new(
        config: RoutingConfig,
        adapters: AdapterMap,
        tools: Arc<dyn ToolExecutor>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        for tier in Tier::ALL {
            match adapters.get(&tier) {
                Some(adapter) => info!(
                    tier = %tier,
                    provider = adapter.name(),
                    model = adapter.model(),
                    "tier adapter ready"
                ),
                None => warn!(tier = %tier, "no adapter for tier"),
            }
        }
        Self {
            classifier: QueryClassifier::new(config.default_tier),
            adapters,
            tools,
            sessions,
            config,
            usage: Mutex::new(UsageTracker::new()),
        }
    }

    pub fn classify(&self, query: &str) -> ClassificationResult {
        self.classifier.classify(query)
    }

    /// The tool catalog offered to models.
    pub fn tool_definitions(&self) -> &[ToolDefinition] {
        self.tools.definitions()
    }

    /// Per-tier calls, failures, and total cost so far.
    pub async fn usage(&self) -> UsageSnapshot {
        self.usage.lock().await.snapshot()
    }

    /// Route one request and return the first model response.
    ///
    /// Tool calls in the response are not executed; see [`Router::answer`].
    pub async fn route(&self, request: &RouteRequest) -> Result<LlmResponse, StatrouteError> {
        let history = self.history_for(request).await;
        let response = self.first_response(request, &history).await?;
        self.remember(request, history, &response).await;
        Ok(response)
    }

    /// Feed tool results back to the tier that produced `previous`.
    pub async fn continue_with_tool_results(
        &self,
        previous: &LlmResponse,
        original_query: &str,
        tool_results: &[ToolResult],
        history: &[HistoryMessage],
    ) -> Result<LlmResponse, StatrouteError> {
        let round = ToolRound {
            text: reply_text(previous),
            calls: previous.tool_calls.clone(),
            results: tool_results.to_vec(),
        };
        self.dispatch(
            previous.tier_used,
            Call::Continue {
                query: original_query,
                rounds: std::slice::from_ref(&round),
                tools: Some(self.tools.definitions()),
                history,
            },
        )
        .await
    }

    /// Route a request and run the tool loop until the model stops asking
    /// for tools or `max_tool_rounds` is reached.
    pub async fn answer(&self, request: &RouteRequest) -> Result<Answer, StatrouteError> {
        let history = self.history_for(request).await;
        let offered = request.include_tools.then(|| self.tools.definitions());

        let mut response = self.first_response(request, &history).await?;
        let mut total_usage = response.usage;
        let mut fallback = response.original_tier.filter(|_| response.fallback_used);
        let mut seen: Vec<ToolCall> = Vec::new();
        let mut tool_rounds: Vec<ToolRound> = Vec::new();
        let mut rounds = 0;

        while response.has_tool_calls() && rounds < self.config.max_tool_rounds {
            rounds += 1;
            let tier = response.tier_used;
            let mut round = ToolRound {
                text: reply_text(&response),
                ..ToolRound::default()
            };
            for call in std::mem::take(&mut response.tool_calls) {
                let call = disambiguate(&seen, call, rounds);
                round.results.push(self.run_tool(&call, offered).await);
                seen.push(call.clone());
                round.calls.push(call);
            }
            tool_rounds.push(round);

            response = self
                .dispatch(
                    tier,
                    Call::Continue {
                        query: &request.query,
                        rounds: &tool_rounds,
                        tools: offered,
                        history: &history,
                    },
                )
                .await?;
            add_usage(&mut total_usage, &response.usage);
            if fallback.is_none() && response.fallback_used {
                fallback = response.original_tier;
            }
        }

        if response.has_tool_calls() {
            warn!(
                rounds,
                pending = response.tool_calls.len(),
                "tool round limit reached with calls outstanding"
            );
        }
        if let Some(original) = fallback {
            response.fallback_used = true;
            response.original_tier = Some(original);
        }

        self.remember(request, history, &response).await;
        Ok(Answer {
            response,
            rounds,
            tool_results: tool_rounds.into_iter().flat_map(|r| r.results).collect(),
            total_usage,
        })
    }

    /// Answer each request in order. A failed request never stops the rest.
    pub async fn route_batch(
        &self,
        requests: Vec<RouteRequest>,
    ) -> Vec<Result<Answer, StatrouteError>> {
        let mut out = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            let result = self.answer(request).await;
            if let Err(err) = &result {
                warn!(index, error = %err, "batch query failed");
            }
            out.push(result);
        }
        out
    }

    async fn first_response(
        &self,
        request: &RouteRequest,
        history: &[HistoryMessage],
    ) -> Result<LlmResponse, StatrouteError> {
        let tier = match request.forced_tier {
            Some(tier) => {
                debug!(tier = %tier, "tier forced by caller");
                tier
            }
            None => {
                let classification = self.classifier.classify(&request.query);
                info!(
                    tier = %classification.tier,
                    reason = classification.reason,
                    "query classified"
                );
                classification.tier
            }
        };
        let tools = request.include_tools.then(|| self.tools.definitions());
        self.dispatch(
            tier,
            Call::Generate {
                query: &request.query,
                tools,
                history,
            },
        )
        .await
    }

    /// Dispatch to `tier`, falling back once to the top tier when allowed.
    async fn dispatch(&self, tier: Tier, call: Call<'_>) -> Result<LlmResponse, StatrouteError> {
        let err = match self.attempt(tier, call).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };
        let mut attempts = vec![AttemptFailure {
            tier,
            message: err.to_string(),
        }];

        if self.may_fall_back(tier, &err) {
            let top = Tier::top();
            warn!(from = %tier, to = %top, error = %err, "tier failed, falling back");
            match self.attempt(top, call).await {
                Ok(mut response) => {
                    response.fallback_used = true;
                    response.original_tier = Some(tier);
                    info!(from = %tier, to = %top, "fallback succeeded");
                    return Ok(response);
                }
                Err(fallback_err) => attempts.push(AttemptFailure {
                    tier: top,
                    message: fallback_err.to_string(),
                }),
            }
        }

        error!(
            original_tier = %tier,
            attempts = attempts.len(),
            "routing failed"
        );
        Err(StatrouteError::FatalRouting {
            original_tier: tier,
            attempts,
        })
    }

    fn may_fall_back(&self, tier: Tier, err: &StatrouteError) -> bool {
        self.config.enable_fallback
            && self.config.max_retries >= 1
            && !tier.is_top()
            && err.is_fallback_eligible()
    }

    /// One adapter call under the timeout. Counters move only when an
    /// adapter is actually invoked.
    async fn attempt(&self, tier: Tier, call: Call<'_>) -> Result<LlmResponse, StatrouteError> {
        let adapter = self
            .adapters
            .get(&tier)
            .ok_or(StatrouteError::NoAdapter { tier })?;
        let duration = Duration::from_millis(self.config.timeout_ms);

        let pending = async {
            match call {
                Call::Generate {
                    query,
                    tools,
                    history,
                } => adapter.generate(query, tools, history).await,
                Call::Continue {
                    query,
                    rounds,
                    tools,
                    history,
                } => adapter.continue_after_rounds(query, rounds, tools, history).await,
            }
        };
        let outcome = match tokio::time::timeout(duration, pending).await {
            Ok(result) => result,
            Err(_) => Err(StatrouteError::Timeout { duration }),
        };

        let mut usage = self.usage.lock().await;
        match outcome {
            Ok(mut response) => {
                response.tier_used = tier;
                usage.record_success(tier, response.usage.estimated_cost);
                info!(
                    tier = %tier,
                    provider = adapter.name(),
                    model = %response.model,
                    latency_ms = response.latency_ms,
                    cost_usd = response.usage.estimated_cost,
                    "model call succeeded"
                );
                Ok(response)
            }
            Err(err) => {
                usage.record_failure(tier);
                warn!(tier = %tier, provider = adapter.name(), error = %err, "model call failed");
                Err(err)
            }
        }
    }

    async fn run_tool(&self, call: &ToolCall, offered: Option<&[ToolDefinition]>) -> ToolResult {
        let known = offered.is_some_and(|defs| defs.iter().any(|d| d.name == call.name));
        if !known {
            warn!(tool = %call.name, "model called a tool that was not offered");
            let failure = ToolFailure::lookup(format!("unknown tool: {}", call.name))
                .with_suggestion(available_tools(offered));
            return ToolResult::from_outcome(call, failure.into());
        }

        match self.tools.execute(&call.name, call.arguments.clone()).await {
            Ok(outcome) => ToolResult::from_outcome(call, outcome),
            Err(err) => {
                warn!(tool = %call.name, error = %err, "tool execution error");
                ToolResult::from_outcome(call, ToolFailure::lookup(err.to_string()).into())
            }
        }
    }

    async fn history_for(&self, request: &RouteRequest) -> Vec<HistoryMessage> {
        match (&request.history, &request.session_id) {
            (Some(history), _) => history.clone(),
            (None, Some(session)) => self.sessions.get(session).await,
            (None, None) => Vec::new(),
        }
    }

    /// Append the exchange to the session. A reply with no text, or one
    /// still waiting on tool calls, leaves the session untouched.
    async fn remember(
        &self,
        request: &RouteRequest,
        mut history: Vec<HistoryMessage>,
        reply: &LlmResponse,
    ) {
        let Some(session) = &request.session_id else {
            return;
        };
        if reply.content.trim().is_empty() || reply.has_tool_calls() {
            debug!(session = %session.0, "reply not kept in session history");
            return;
        }
        history.push(HistoryMessage::user(request.query.clone()));
        history.push(HistoryMessage::assistant(reply.content.clone()));
        self.sessions.put(session, history).await;
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tiers: Vec<String> = self.adapters.keys().map(ToString::to_string).collect();
        tiers.sort();
        f.debug_struct("Router")
            .field("tiers", &tiers)
            .field("tools", &self.tools.definitions().len())
            .field("config", &self.config)
            .finish()
    }
}

/// Rename a call whose id repeats one from an earlier round. Some providers
/// number calls per response, so ids collide across rounds.
fn disambiguate(previous: &[ToolCall], mut call: ToolCall, round: u32) -> ToolCall {
    if previous.iter().any(|c| c.id == call.id) {
        call.id = format!("{}_r{round}", call.id);
    }
    call
}

/// Text the model wrote next to its tool calls, if any.
fn reply_text(response: &LlmResponse) -> Option<String> {
    (!response.content.trim().is_empty()).then(|| response.content.clone())
}

fn available_tools(offered: Option<&[ToolDefinition]>) -> String {
    match offered {
        Some(defs) if !defs.is_empty() => format!(
            "available tools: {}",
            defs.iter().map(|d| d.name.as_str()).collect::<Vec<_>>().join(", ")
        ),
        _ => "no tools are available for this request".to_string(),
    }
}

fn add_usage(total: &mut Usage, usage: &Usage) {
    total.input_tokens = total.input_tokens.saturating_add(usage.input_tokens);
    total.output_tokens = total.output_tokens.saturating_add(usage.output_tokens);
    total.estimated_cost += usage.estimated_cost;
}
