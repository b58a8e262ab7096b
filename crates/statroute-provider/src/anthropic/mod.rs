// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API wire format (Premium tier).

pub mod types;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use statroute_config::model::StatrouteConfig;
use statroute_core::{StatrouteError, Tier, ToolCall, ToolDefinition, TokenUsage};
use statroute_cost::ModelPricing;

use crate::convert::{JsonSchemaObject, ToolFormat};
use crate::driver::{Completion, ModelDriver, ModelProfile, Turn, WireFormat, resolve_api_key};
use crate::preamble::PREMIUM_PREAMBLE;
use types::{
    ApiContent, ApiContentBlock, ApiErrorResponse, ApiMessage, MessageRequest, MessageResponse,
    ResponseContentBlock, ToolDeclaration,
};

pub const PROVIDER: &str = "anthropic";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const API_BASE_URL: &str = "https://api.anthropic.com";

/// Messages API translation plus the credentials its headers carry.
#[derive(Debug, Clone)]
pub struct AnthropicWire {
    api_key: String,
    api_version: String,
}

impl AnthropicWire {
    pub fn new(api_key: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_version: api_version.into(),
        }
    }
}

/// The Premium-tier adapter built from config.
pub fn driver(config: &StatrouteConfig) -> Result<ModelDriver<AnthropicWire>, StatrouteError> {
    let api_key = resolve_api_key(
        config.anthropic.api_key.as_deref(),
        "ANTHROPIC_API_KEY",
        "anthropic.api_key",
    )?;
    ModelDriver::new(
        AnthropicWire::new(api_key, config.anthropic.api_version.clone()),
        profile(config.anthropic.max_tokens),
        API_BASE_URL,
        Duration::from_millis(config.routing.timeout_ms),
    )
}

pub fn profile(max_tokens: u32) -> ModelProfile {
    ModelProfile {
        provider: PROVIDER,
        model: DEFAULT_MODEL.to_string(),
        tier: Tier::Premium,
        pricing: ModelPricing::ANTHROPIC_SONNET,
        preamble: PREMIUM_PREAMBLE,
        max_tokens,
    }
}

impl WireFormat for AnthropicWire {
    type Request = MessageRequest;
    type Response = MessageResponse;

    fn endpoint(&self, base_url: &str, _model: &str) -> String {
        format!("{base_url}/v1/messages")
    }

    fn headers(&self) -> Result<HeaderMap, StatrouteError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key).map_err(|e| {
                StatrouteError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_str(&self.api_version).map_err(|e| {
                StatrouteError::Config(format!("invalid API version header value: {e}"))
            })?,
        );
        Ok(headers)
    }

    fn build_request(
        &self,
        profile: &ModelProfile,
        turns: &[Turn],
        tools: Option<&[ToolDefinition]>,
    ) -> MessageRequest {
        MessageRequest {
            model: profile.model.clone(),
            messages: turns.iter().map(to_api_message).collect(),
            system: Some(profile.preamble.to_string()),
            max_tokens: profile.max_tokens,
            tools: tools
                .filter(|t| !t.is_empty())
                .map(AnthropicWire::encode_tools),
        }
    }

    fn parse_response(&self, response: MessageResponse) -> Result<Completion, StatrouteError> {
        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for block in response.content {
            match block {
                ResponseContentBlock::Text { text: t } => text.push_str(&t),
                ResponseContentBlock::ToolUse { id, name, input } => tool_calls.push(ToolCall {
                    id,
                    name,
                    arguments: input,
                }),
                ResponseContentBlock::Other => {}
            }
        }
        Ok(Completion {
            model: Some(response.model),
            text,
            tool_calls,
            usage: TokenUsage {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
            },
            stop_reason: response.stop_reason,
        })
    }

    fn describe_error(&self, body: &str) -> Option<String> {
        serde_json::from_str::<ApiErrorResponse>(body)
            .ok()
            .map(|e| format!("Anthropic API error ({}): {}", e.error.type_, e.error.message))
    }
}

impl ToolFormat for AnthropicWire {
    type Declarations = Vec<ToolDeclaration>;

    fn encode_tools(tools: &[ToolDefinition]) -> Vec<ToolDeclaration> {
        tools
            .iter()
            .map(|t| ToolDeclaration {
                name: t.name.clone(),
                description: t.description.clone(),
                input_schema: JsonSchemaObject::from_parameters(&t.parameters),
            })
            .collect()
    }

    fn decode_tools(
        declarations: &Vec<ToolDeclaration>,
    ) -> Result<Vec<ToolDefinition>, StatrouteError> {
        declarations
            .iter()
            .map(|d| {
                Ok(ToolDefinition {
                    name: d.name.clone(),
                    description: d.description.clone(),
                    parameters: d.input_schema.to_parameters(PROVIDER)?,
                })
            })
            .collect()
    }
}

fn to_api_message(turn: &Turn) -> ApiMessage {
    match turn {
        Turn::User(text) => ApiMessage {
            role: "user".into(),
            content: ApiContent::Text(text.clone()),
        },
        Turn::Assistant(text) => ApiMessage {
            role: "assistant".into(),
            content: ApiContent::Text(text.clone()),
        },
        Turn::ToolCalls { text, calls } => {
            let mut blocks: Vec<ApiContentBlock> = text
                .iter()
                .filter(|t| !t.is_empty())
                .map(|t| ApiContentBlock::Text { text: t.clone() })
                .collect();
            blocks.extend(calls.iter().map(|c| ApiContentBlock::ToolUse {
                id: c.id.clone(),
                name: c.name.clone(),
                input: c.arguments.clone(),
            }));
            ApiMessage {
                role: "assistant".into(),
                content: ApiContent::Blocks(blocks),
            }
        }
        Turn::ToolResults(replies) => ApiMessage {
            role: "user".into(),
            content: ApiContent::Blocks(
                replies
                    .iter()
                    .map(|r| ApiContentBlock::ToolResult {
                        tool_use_id: r.call_id.clone(),
                        content: r.result.content_text(),
                        is_error: r.result.is_error.then_some(true),
                    })
                    .collect(),
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use statroute_core::{HistoryMessage, ProviderAdapter, ToolResult};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_driver(base_url: &str) -> ModelDriver<AnthropicWire> {
        ModelDriver::new(
            AnthropicWire::new("test-api-key", "2023-06-01"),
            profile(1024),
            base_url,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn text_reply() -> serde_json::Value {
        json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "Nigeria grew 2.9% in 2023."}],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 1000, "output_tokens": 500}
        })
    }

    #[tokio::test]
    async fn generate_sends_headers_and_prices_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-api-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply()))
            .expect(1)
            .mount(&server)
            .await;

        let driver = test_driver(&server.uri());
        let resp = driver.generate("Why did Nigeria grow?", None, &[]).await.unwrap();

        assert_eq!(resp.tier_used, Tier::Premium);
        assert_eq!(resp.provider, "anthropic");
        assert_eq!(resp.content, "Nigeria grew 2.9% in 2023.");
        assert_eq!(resp.usage.input_tokens, 1000);
        // 1000 * 3 / 1e6 + 500 * 15 / 1e6
        assert!((resp.usage.estimated_cost - 0.0105).abs() < 1e-9);
        assert!(!resp.fallback_used);
    }

    #[tokio::test]
    async fn generate_includes_history_system_and_tools() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "user", "content": "earlier"},
                    {"role": "assistant", "content": "reply"},
                    {"role": "user", "content": "now"}
                ],
                "tools": [{"name": "get_imf_indicator"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply()))
            .expect(1)
            .mount(&server)
            .await;

        let tools = vec![ToolDefinition::new("get_imf_indicator", "IMF outlook")];
        let history = vec![
            HistoryMessage::user("earlier"),
            HistoryMessage::assistant("reply"),
        ];
        test_driver(&server.uri())
            .generate("now", Some(&tools), &history)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn tool_use_blocks_become_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_tools",
                "content": [
                    {"type": "text", "text": "Fetching."},
                    {"type": "tool_use", "id": "toolu_1", "name": "get_imf_indicator",
                     "input": {"indicator": "NGDP_RPCH", "countries": ["Nigeria"]}}
                ],
                "model": "claude-sonnet-4-20250514",
                "stop_reason": "tool_use",
                "usage": {"input_tokens": 10, "output_tokens": 5}
            })))
            .mount(&server)
            .await;

        let resp = test_driver(&server.uri()).generate("q", None, &[]).await.unwrap();
        assert_eq!(resp.content, "Fetching.");
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.tool_calls[0].id, "toolu_1");
        assert_eq!(resp.tool_calls[0].arguments["indicator"], "NGDP_RPCH");
    }

    #[tokio::test]
    async fn continuation_sends_tool_use_then_tool_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "user", "content": "q"},
                    {"role": "assistant", "content": [
                        {"type": "tool_use", "id": "toolu_1", "name": "get_imf_indicator"}
                    ]},
                    {"role": "user", "content": [
                        {"type": "tool_result", "tool_use_id": "toolu_1", "is_error": true}
                    ]}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply()))
            .expect(1)
            .mount(&server)
            .await;

        let calls = vec![ToolCall {
            id: "toolu_1".into(),
            name: "get_imf_indicator".into(),
            arguments: json!({}),
        }];
        let results = vec![ToolResult {
            tool_call_id: "toolu_1".into(),
            content: json!({"error": "timed out"}),
            is_error: true,
        }];
        test_driver(&server.uri())
            .continue_with_tool_results("q", &calls, &results, None, &[])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn api_error_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_json(json!({
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            })))
            .mount(&server)
            .await;

        let err = test_driver(&server.uri()).generate("q", None, &[]).await.unwrap_err();
        assert!(matches!(err, StatrouteError::ProviderTransport { .. }));
        assert!(err.is_fallback_eligible());
        assert!(err.to_string().contains("overloaded_error"));
    }

    #[tokio::test]
    async fn malformed_body_is_response_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = test_driver(&server.uri()).generate("q", None, &[]).await.unwrap_err();
        assert!(matches!(err, StatrouteError::ProviderResponse { .. }));
    }

    #[test]
    fn unknown_response_blocks_are_ignored() {
        let resp: MessageResponse = serde_json::from_value(json!({
            "id": "m",
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "done"}
            ],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 1, "output_tokens": 1}
        }))
        .unwrap();
        let completion = AnthropicWire::new("k", "v").parse_response(resp).unwrap();
        assert_eq!(completion.text, "done");
    }
}
