// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool declaration conversion.
//!
//! Each provider declares tools in its own shape. [`ToolFormat`] turns the
//! canonical [`ToolDefinition`] list into that shape and back again without
//! losing names, descriptions, types, enums, or the required list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statroute_core::{ParamType, ParameterSchema, PropertySchema, StatrouteError, ToolDefinition};

/// Lossless translation between canonical tool definitions and a provider's
/// declaration format.
pub trait ToolFormat {
    type Declarations: Serialize;

    fn encode_tools(tools: &[ToolDefinition]) -> Self::Declarations;

    fn decode_tools(
        declarations: &Self::Declarations,
    ) -> Result<Vec<ToolDefinition>, StatrouteError>;
}

/// JSON Schema `object` as used by Anthropic `input_schema` and OpenAI
/// `parameters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaObject {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: BTreeMap<String, JsonSchemaProperty>,
    #[serde(default)]
    pub required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaProperty {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<JsonSchemaItems>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaItems {
    #[serde(rename = "type")]
    pub kind: String,
}

impl JsonSchemaObject {
    pub fn from_parameters(params: &ParameterSchema) -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: params
                .properties
                .iter()
                .map(|(name, prop)| {
                    let schema = JsonSchemaProperty {
                        kind: json_type_name(prop.kind).to_string(),
                        description: prop.description.clone(),
                        enum_values: prop.enum_values.clone(),
                        items: prop.items.map(|kind| JsonSchemaItems {
                            kind: json_type_name(kind).to_string(),
                        }),
                    };
                    (name.clone(), schema)
                })
                .collect(),
            required: params.required.clone(),
        }
    }

    pub fn to_parameters(&self, provider: &str) -> Result<ParameterSchema, StatrouteError> {
        if self.schema_type != "object" {
            return Err(StatrouteError::response(
                provider,
                format!("tool parameters must be an object, got `{}`", self.schema_type),
            ));
        }
        let mut properties = BTreeMap::new();
        for (name, prop) in &self.properties {
            let items = prop
                .items
                .as_ref()
                .map(|i| parse_json_type(&i.kind, provider))
                .transpose()?;
            properties.insert(
                name.clone(),
                PropertySchema {
                    kind: parse_json_type(&prop.kind, provider)?,
                    description: prop.description.clone(),
                    enum_values: prop.enum_values.clone(),
                    items,
                },
            );
        }
        Ok(ParameterSchema {
            properties,
            required: self.required.clone(),
        })
    }
}

/// Lowercase JSON Schema type name.
pub fn json_type_name(kind: ParamType) -> &'static str {
    match kind {
        ParamType::String => "string",
        ParamType::Number => "number",
        ParamType::Integer => "integer",
        ParamType::Boolean => "boolean",
        ParamType::Array => "array",
        ParamType::Object => "object",
    }
}

fn parse_json_type(name: &str, provider: &str) -> Result<ParamType, StatrouteError> {
    match name {
        "string" => Ok(ParamType::String),
        "number" => Ok(ParamType::Number),
        "integer" => Ok(ParamType::Integer),
        "boolean" => Ok(ParamType::Boolean),
        "array" => Ok(ParamType::Array),
        "object" => Ok(ParamType::Object),
        other => Err(StatrouteError::response(
            provider,
            format!("unsupported parameter type `{other}`"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anthropic::AnthropicWire;
    use crate::gemini::GeminiWire;
    use crate::openai::OpenAiWire;

    fn sample_tools() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::new("get_world_bank_indicator", "World Bank indicator series")
                .required(
                    "countries",
                    PropertySchema::array_of(ParamType::String, "Country names"),
                )
                .required("indicator", PropertySchema::string("Indicator code"))
                .optional("start_year", PropertySchema::integer("First year")),
            ToolDefinition::new("get_imf_indicator", "IMF outlook").required(
                "indicator",
                PropertySchema::string("Indicator").one_of(["NGDP_RPCH", "PCPIPCH"]),
            ),
            ToolDefinition::new("flag", "Boolean and number params")
                .optional("strict", PropertySchema::new(ParamType::Boolean, "Strict"))
                .optional("ratio", PropertySchema::new(ParamType::Number, "Ratio"))
                .optional("filters", PropertySchema::new(ParamType::Object, "Filters")),
        ]
    }

    #[test]
    fn anthropic_round_trip_is_lossless() {
        let tools = sample_tools();
        let encoded = AnthropicWire::encode_tools(&tools);
        assert_eq!(AnthropicWire::decode_tools(&encoded).unwrap(), tools);
    }

    #[test]
    fn gemini_round_trip_is_lossless() {
        let tools = sample_tools();
        let encoded = GeminiWire::encode_tools(&tools);
        assert_eq!(GeminiWire::decode_tools(&encoded).unwrap(), tools);
    }

    #[test]
    fn openai_round_trip_is_lossless() {
        let tools = sample_tools();
        let encoded = OpenAiWire::encode_tools(&tools);
        assert_eq!(OpenAiWire::decode_tools(&encoded).unwrap(), tools);
    }

    #[test]
    fn anthropic_uses_input_schema() {
        let json = serde_json::to_value(AnthropicWire::encode_tools(&sample_tools())).unwrap();
        let first = &json[0];
        assert_eq!(first["name"], "get_world_bank_indicator");
        assert_eq!(first["input_schema"]["type"], "object");
        assert_eq!(
            first["input_schema"]["properties"]["countries"]["items"]["type"],
            "string"
        );
        assert_eq!(
            first["input_schema"]["required"],
            serde_json::json!(["countries", "indicator"])
        );
    }

    #[test]
    fn gemini_uses_function_declarations_with_uppercase_types() {
        let json = serde_json::to_value(GeminiWire::encode_tools(&sample_tools())).unwrap();
        let decl = &json[0]["functionDeclarations"][1];
        assert_eq!(decl["name"], "get_imf_indicator");
        assert_eq!(decl["parameters"]["type"], "OBJECT");
        assert_eq!(decl["parameters"]["properties"]["indicator"]["type"], "STRING");
        assert_eq!(
            decl["parameters"]["properties"]["indicator"]["enum"],
            serde_json::json!(["NGDP_RPCH", "PCPIPCH"])
        );
    }

    #[test]
    fn openai_wraps_function_declarations() {
        let json = serde_json::to_value(OpenAiWire::encode_tools(&sample_tools())).unwrap();
        assert_eq!(json[0]["type"], "function");
        assert_eq!(json[0]["function"]["name"], "get_world_bank_indicator");
        assert_eq!(json[0]["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn decode_rejects_unknown_types() {
        let schema = JsonSchemaObject {
            schema_type: "object".into(),
            properties: BTreeMap::from([(
                "x".to_string(),
                JsonSchemaProperty {
                    kind: "date".into(),
                    description: String::new(),
                    enum_values: None,
                    items: None,
                },
            )]),
            required: vec![],
        };
        assert!(schema.to_parameters("groq").is_err());
    }
}
