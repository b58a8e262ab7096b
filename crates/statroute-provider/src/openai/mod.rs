// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible chat completions wire format, used for Groq.
//!
//! Selected for the Standard tier with `routing.standard_provider = "groq"`.

pub mod types;

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use statroute_config::model::StatrouteConfig;
use statroute_core::{StatrouteError, Tier, TokenUsage, ToolCall, ToolDefinition};
use statroute_cost::ModelPricing;

use crate::convert::{JsonSchemaObject, ToolFormat};
use crate::driver::{Completion, ModelDriver, ModelProfile, Turn, WireFormat, resolve_api_key};
use crate::preamble::STANDARD_PREAMBLE;
use types::{
    ApiErrorResponse, ApiToolCall, ChatMessage, ChatRequest, ChatResponse, ChatTool,
    FunctionCallBody, FunctionDefinition,
};

pub const PROVIDER: &str = "groq";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Debug, Clone)]
pub struct OpenAiWire {
    api_key: String,
}

impl OpenAiWire {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

/// The Groq Standard-tier adapter built from config.
pub fn driver(config: &StatrouteConfig) -> Result<ModelDriver<OpenAiWire>, StatrouteError> {
    let api_key = resolve_api_key(
        config.groq.api_key.as_deref(),
        "GROQ_API_KEY",
        "groq.api_key",
    )?;
    ModelDriver::new(
        OpenAiWire::new(api_key),
        profile(config.groq.max_tokens),
        config.groq.base_url.clone(),
        Duration::from_millis(config.routing.timeout_ms),
    )
}

pub fn profile(max_tokens: u32) -> ModelProfile {
    ModelProfile {
        provider: PROVIDER,
        model: DEFAULT_MODEL.to_string(),
        tier: Tier::Standard,
        pricing: ModelPricing::GROQ_LLAMA_70B,
        preamble: STANDARD_PREAMBLE,
        max_tokens,
    }
}

impl WireFormat for OpenAiWire {
    type Request = ChatRequest;
    type Response = ChatResponse;

    fn endpoint(&self, base_url: &str, _model: &str) -> String {
        format!("{base_url}/v1/chat/completions")
    }

    fn headers(&self) -> Result<HeaderMap, StatrouteError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(|e| {
                StatrouteError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        Ok(headers)
    }

    fn build_request(
        &self,
        profile: &ModelProfile,
        turns: &[Turn],
        tools: Option<&[ToolDefinition]>,
    ) -> ChatRequest {
        let mut messages = vec![ChatMessage::System {
            content: profile.preamble.to_string(),
        }];
        for turn in turns {
            push_messages(&mut messages, turn);
        }
        ChatRequest {
            model: profile.model.clone(),
            messages,
            max_tokens: profile.max_tokens,
            tools: tools.filter(|t| !t.is_empty()).map(OpenAiWire::encode_tools),
        }
    }

    fn parse_response(&self, response: ChatResponse) -> Result<Completion, StatrouteError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| StatrouteError::response(PROVIDER, "response contained no choices"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                Ok(ToolCall {
                    arguments: parse_arguments(&call.function)?,
                    id: call.id,
                    name: call.function.name,
                })
            })
            .collect::<Result<Vec<_>, StatrouteError>>()?;

        let usage = response.usage.unwrap_or_default();
        Ok(Completion {
            model: response.model,
            text: choice.message.content.unwrap_or_default(),
            tool_calls,
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
            stop_reason: choice.finish_reason,
        })
    }

    fn describe_error(&self, body: &str) -> Option<String> {
        serde_json::from_str::<ApiErrorResponse>(body).ok().map(|e| match e.error.type_ {
            Some(kind) => format!("Groq API error ({kind}): {}", e.error.message),
            None => format!("Groq API error: {}", e.error.message),
        })
    }
}

impl ToolFormat for OpenAiWire {
    type Declarations = Vec<ChatTool>;

    fn encode_tools(tools: &[ToolDefinition]) -> Vec<ChatTool> {
        tools
            .iter()
            .map(|t| ChatTool {
                kind: "function".to_string(),
                function: FunctionDefinition {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: JsonSchemaObject::from_parameters(&t.parameters),
                },
            })
            .collect()
    }

    fn decode_tools(declarations: &Vec<ChatTool>) -> Result<Vec<ToolDefinition>, StatrouteError> {
        declarations
            .iter()
            .map(|d| {
                Ok(ToolDefinition {
                    name: d.function.name.clone(),
                    description: d.function.description.clone(),
                    parameters: d.function.parameters.to_parameters(PROVIDER)?,
                })
            })
            .collect()
    }
}

/// Decode the JSON-string arguments of a call. An empty string means no
/// arguments.
fn parse_arguments(function: &FunctionCallBody) -> Result<serde_json::Value, StatrouteError> {
    if function.arguments.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    serde_json::from_str(&function.arguments).map_err(|e| {
        StatrouteError::response(
            PROVIDER,
            format!("invalid arguments for tool `{}`: {e}", function.name),
        )
    })
}

fn push_messages(messages: &mut Vec<ChatMessage>, turn: &Turn) {
    match turn {
        Turn::User(text) => messages.push(ChatMessage::User {
            content: text.clone(),
        }),
        Turn::Assistant(text) => messages.push(ChatMessage::Assistant {
            content: Some(text.clone()),
            tool_calls: Vec::new(),
        }),
        Turn::ToolCalls { text, calls } => messages.push(ChatMessage::Assistant {
            content: text.clone(),
            tool_calls: calls
                .iter()
                .map(|c| ApiToolCall {
                    id: c.id.clone(),
                    kind: "function".to_string(),
                    function: FunctionCallBody {
                        name: c.name.clone(),
                        arguments: c.arguments.to_string(),
                    },
                })
                .collect(),
        }),
        Turn::ToolResults(replies) => {
            messages.extend(replies.iter().map(|r| ChatMessage::Tool {
                tool_call_id: r.call_id.clone(),
                content: r.result.content_text(),
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use statroute_core::{ProviderAdapter, ToolResult};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_driver(base_url: &str) -> ModelDriver<OpenAiWire> {
        ModelDriver::new(
            OpenAiWire::new("gsk-test"),
            profile(256),
            base_url,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn generate_uses_bearer_auth_and_system_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer gsk-test"))
            .and(body_partial_json(json!({
                "model": "llama-3.3-70b-versatile",
                "messages": [
                    {"role": "system"},
                    {"role": "user", "content": "Compare Brazil and Mexico"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "model": "llama-3.3-70b-versatile",
                "choices": [{"message": {"role": "assistant", "content": "Brazil is larger."},
                             "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 1_000_000, "completion_tokens": 0}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = test_driver(&server.uri())
            .generate("Compare Brazil and Mexico", None, &[])
            .await
            .unwrap();
        assert_eq!(resp.provider, "groq");
        assert_eq!(resp.content, "Brazil is larger.");
        assert!((resp.usage.estimated_cost - 0.59).abs() < 1e-9);
    }

    #[tokio::test]
    async fn string_arguments_are_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": null, "tool_calls": [{
                    "id": "call_abc",
                    "type": "function",
                    "function": {"name": "get_trade_flows",
                                 "arguments": "{\"reporter\":\"Nigeria\",\"year\":2022}"}
                }]}, "finish_reason": "tool_calls"}]
            })))
            .mount(&server)
            .await;

        let resp = test_driver(&server.uri()).generate("q", None, &[]).await.unwrap();
        assert_eq!(resp.content, "");
        assert_eq!(resp.tool_calls[0].id, "call_abc");
        assert_eq!(resp.tool_calls[0].arguments["year"], 2022);
    }

    #[tokio::test]
    async fn malformed_arguments_are_response_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"tool_calls": [{
                    "id": "call_1",
                    "function": {"name": "get_trade_flows", "arguments": "{not json"}
                }]}}]
            })))
            .mount(&server)
            .await;

        let err = test_driver(&server.uri()).generate("q", None, &[]).await.unwrap_err();
        assert!(matches!(err, StatrouteError::ProviderResponse { .. }));
        assert!(err.to_string().contains("get_trade_flows"));
    }

    #[tokio::test]
    async fn continuation_sends_tool_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "system"},
                    {"role": "user", "content": "q"},
                    {"role": "assistant", "tool_calls": [{"id": "call_1", "type": "function",
                        "function": {"name": "get_fao_statistics"}}]},
                    {"role": "tool", "tool_call_id": "call_1"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "Maize output rose."}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let calls = vec![ToolCall {
            id: "call_1".into(),
            name: "get_fao_statistics".into(),
            arguments: json!({"country": "Nigeria", "item": "Maize"}),
        }];
        let results = vec![ToolResult {
            tool_call_id: "call_1".into(),
            content: json!({"rows": []}),
            is_error: false,
        }];
        let resp = test_driver(&server.uri())
            .continue_with_tool_results("q", &calls, &results, None, &[])
            .await
            .unwrap();
        assert_eq!(resp.content, "Maize output rose.");
        assert_eq!(resp.model, DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_failure() {
        // Port 9 (discard) on localhost is closed in test environments.
        let err = test_driver("http://127.0.0.1:9")
            .generate("q", None, &[])
            .await
            .unwrap_err();
        assert!(err.is_fallback_eligible());
    }
}
