// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini `generateContent` wire format (Standard tier).
//!
//! Gemini function calls carry no identifiers, so each call in a reply is
//! given a synthetic id. Continuations pair results back by function name.

pub mod types;

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use statroute_config::model::StatrouteConfig;
use statroute_core::{
    ParamType, ParameterSchema, PropertySchema, StatrouteError, Tier, TokenUsage, ToolCall,
    ToolDefinition,
};
use statroute_cost::ModelPricing;

use crate::convert::ToolFormat;
use crate::driver::{Completion, ModelDriver, ModelProfile, Turn, WireFormat, resolve_api_key};
use crate::preamble::STANDARD_PREAMBLE;
use types::{
    ApiErrorResponse, Content, FunctionCall, FunctionDeclaration, FunctionResponse, GeminiSchema,
    GeminiTool, GeminiType, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part,
};

pub const PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct GeminiWire {
    api_key: String,
}

impl GeminiWire {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

/// The Gemini Standard-tier adapter built from config.
pub fn driver(config: &StatrouteConfig) -> Result<ModelDriver<GeminiWire>, StatrouteError> {
    let api_key = resolve_api_key(
        config.gemini.api_key.as_deref(),
        "GEMINI_API_KEY",
        "gemini.api_key",
    )?;
    ModelDriver::new(
        GeminiWire::new(api_key),
        profile(config.gemini.max_tokens),
        API_BASE_URL,
        Duration::from_millis(config.routing.timeout_ms),
    )
}

pub fn profile(max_tokens: u32) -> ModelProfile {
    ModelProfile {
        provider: PROVIDER,
        model: DEFAULT_MODEL.to_string(),
        tier: Tier::Standard,
        pricing: ModelPricing::FREE,
        preamble: STANDARD_PREAMBLE,
        max_tokens,
    }
}

fn synthetic_call_id(index: usize) -> String {
    format!("gemini_call_{index}")
}

impl WireFormat for GeminiWire {
    type Request = GenerateContentRequest;
    type Response = GenerateContentResponse;

    fn endpoint(&self, base_url: &str, model: &str) -> String {
        format!("{base_url}/v1beta/models/{model}:generateContent")
    }

    fn headers(&self) -> Result<HeaderMap, StatrouteError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key).map_err(|e| {
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
    ) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: turns.iter().map(to_content).collect(),
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::Text(profile.preamble.to_string())],
            }),
            tools: tools.filter(|t| !t.is_empty()).map(GeminiWire::encode_tools),
            generation_config: GenerationConfig {
                max_output_tokens: profile.max_tokens,
            },
        }
    }

    fn parse_response(
        &self,
        response: GenerateContentResponse,
    ) -> Result<Completion, StatrouteError> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| StatrouteError::response(PROVIDER, "response contained no candidates"))?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(t) = part.text {
                text.push_str(&t);
            }
            if let Some(call) = part.function_call {
                tool_calls.push(ToolCall {
                    id: synthetic_call_id(tool_calls.len()),
                    name: call.name,
                    arguments: call.args,
                });
            }
        }

        let usage = response.usage_metadata.unwrap_or_default();
        Ok(Completion {
            model: response.model_version,
            text,
            tool_calls,
            usage: TokenUsage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            },
            stop_reason: candidate.finish_reason,
        })
    }

    fn describe_error(&self, body: &str) -> Option<String> {
        serde_json::from_str::<ApiErrorResponse>(body).ok().map(|e| {
            format!(
                "Gemini API error ({} {}): {}",
                e.error.code, e.error.status, e.error.message
            )
        })
    }
}

impl ToolFormat for GeminiWire {
    type Declarations = Vec<GeminiTool>;

    fn encode_tools(tools: &[ToolDefinition]) -> Vec<GeminiTool> {
        vec![GeminiTool {
            function_declarations: tools
                .iter()
                .map(|t| FunctionDeclaration {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: encode_parameters(&t.parameters),
                })
                .collect(),
        }]
    }

    fn decode_tools(declarations: &Vec<GeminiTool>) -> Result<Vec<ToolDefinition>, StatrouteError> {
        declarations
            .iter()
            .flat_map(|tool| tool.function_declarations.iter())
            .map(|d| {
                Ok(ToolDefinition {
                    name: d.name.clone(),
                    description: d.description.clone(),
                    parameters: decode_parameters(&d.parameters)?,
                })
            })
            .collect()
    }
}

fn gemini_type(kind: ParamType) -> GeminiType {
    match kind {
        ParamType::String => GeminiType::String,
        ParamType::Number => GeminiType::Number,
        ParamType::Integer => GeminiType::Integer,
        ParamType::Boolean => GeminiType::Boolean,
        ParamType::Array => GeminiType::Array,
        ParamType::Object => GeminiType::Object,
    }
}

fn param_type(kind: GeminiType) -> ParamType {
    match kind {
        GeminiType::String => ParamType::String,
        GeminiType::Number => ParamType::Number,
        GeminiType::Integer => ParamType::Integer,
        GeminiType::Boolean => ParamType::Boolean,
        GeminiType::Array => ParamType::Array,
        GeminiType::Object => ParamType::Object,
    }
}

fn bare_schema(kind: GeminiType) -> GeminiSchema {
    GeminiSchema {
        kind,
        description: None,
        properties: None,
        required: None,
        enum_values: None,
        items: None,
    }
}

fn encode_parameters(params: &ParameterSchema) -> GeminiSchema {
    let properties = params
        .properties
        .iter()
        .map(|(name, prop)| {
            let schema = GeminiSchema {
                description: Some(prop.description.clone()),
                enum_values: prop.enum_values.clone(),
                items: prop
                    .items
                    .map(|kind| Box::new(bare_schema(gemini_type(kind)))),
                ..bare_schema(gemini_type(prop.kind))
            };
            (name.clone(), schema)
        })
        .collect::<BTreeMap<_, _>>();

    GeminiSchema {
        properties: Some(properties),
        required: (!params.required.is_empty()).then(|| params.required.clone()),
        ..bare_schema(GeminiType::Object)
    }
}

fn decode_parameters(schema: &GeminiSchema) -> Result<ParameterSchema, StatrouteError> {
    if schema.kind != GeminiType::Object {
        return Err(StatrouteError::response(
            PROVIDER,
            format!("tool parameters must be OBJECT, got {:?}", schema.kind),
        ));
    }
    let properties = schema
        .properties
        .iter()
        .flatten()
        .map(|(name, prop)| {
            let decoded = PropertySchema {
                kind: param_type(prop.kind),
                description: prop.description.clone().unwrap_or_default(),
                enum_values: prop.enum_values.clone(),
                items: prop.items.as_ref().map(|i| param_type(i.kind)),
            };
            (name.clone(), decoded)
        })
        .collect();
    Ok(ParameterSchema {
        properties,
        required: schema.required.clone().unwrap_or_default(),
    })
}

fn to_content(turn: &Turn) -> Content {
    match turn {
        Turn::User(text) => Content {
            role: Some("user".into()),
            parts: vec![Part::Text(text.clone())],
        },
        Turn::Assistant(text) => Content {
            role: Some("model".into()),
            parts: vec![Part::Text(text.clone())],
        },
        Turn::ToolCalls { text, calls } => {
            let mut parts: Vec<Part> = text
                .iter()
                .filter(|t| !t.is_empty())
                .map(|t| Part::Text(t.clone()))
                .collect();
            parts.extend(calls.iter().map(|c| {
                Part::FunctionCall(FunctionCall {
                    name: c.name.clone(),
                    args: c.arguments.clone(),
                })
            }));
            Content {
                role: Some("model".into()),
                parts,
            }
        }
        Turn::ToolResults(replies) => Content {
            role: Some("user".into()),
            parts: replies
                .iter()
                .map(|r| {
                    let response = match &r.result.content {
                        serde_json::Value::Object(_) => r.result.content.clone(),
                        other => serde_json::json!({ "result": other }),
                    };
                    Part::FunctionResponse(FunctionResponse {
                        name: r.name.clone(),
                        response,
                    })
                })
                .collect(),
        },
    }
}
