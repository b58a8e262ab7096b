// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider-agnostic tool definitions, calls, results, and outcomes.
//!
//! A [`ToolDefinition`] is the single source of truth for a tool's name and
//! parameter schema. Provider crates translate it into their own declaration
//! shapes; nothing here knows about any particular upstream.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Primitive parameter types understood by every supported provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

/// Schema for a single named parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySchema {
    pub kind: ParamType,
    pub description: String,
    /// Allowed values, for string parameters with a closed vocabulary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Element type for array parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ParamType>,
}

impl PropertySchema {
    pub fn new(kind: ParamType, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            enum_values: None,
            items: None,
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::new(ParamType::String, description)
    }

    pub fn integer(description: impl Into<String>) -> Self {
        Self::new(ParamType::Integer, description)
    }

    pub fn array_of(items: ParamType, description: impl Into<String>) -> Self {
        Self {
            items: Some(items),
            ..Self::new(ParamType::Array, description)
        }
    }

    /// Restrict the parameter to a closed set of values.
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// Parameter schema of a tool: typed properties plus the required list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub properties: BTreeMap<String, PropertySchema>,
    pub required: Vec<String>,
}

/// A named, schema-described capability the model may invoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: ParameterSchema::default(),
        }
    }

    /// Add a required parameter.
    pub fn required(mut self, name: &str, schema: PropertySchema) -> Self {
        self.parameters.properties.insert(name.to_string(), schema);
        self.parameters.required.push(name.to_string());
        self
    }

    /// Add an optional parameter.
    pub fn optional(mut self, name: &str, schema: PropertySchema) -> Self {
        self.parameters.properties.insert(name.to_string(), schema);
        self
    }
}

/// A tool invocation requested by a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Arguments as a JSON object.
    pub arguments: serde_json::Value,
}

/// One finished tool round: any text the model wrote alongside its calls,
/// the calls, and their results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolRound {
    pub text: Option<String>,
    pub calls: Vec<ToolCall>,
    pub results: Vec<ToolResult>,
}

/// The result of executing one tool call, fed back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub content: serde_json::Value,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    /// Build a result from a call and the outcome of executing it.
    pub fn from_outcome(call: &ToolCall, outcome: ToolOutcome) -> Self {
        let is_error = outcome.is_failure();
        Self {
            tool_call_id: call.id.clone(),
            content: outcome.into_json(),
            is_error,
        }
    }

    /// Render the content as a string for providers that want text.
    pub fn content_text(&self) -> String {
        match &self.content {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Class of an expected tool failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolFailureKind {
    /// A caller-supplied name had no entry in the reference table.
    Lookup,
    /// The upstream data API timed out, was not found, or errored.
    Transport,
    /// The caller omitted or malformed a parameter.
    InvalidArguments,
}

/// A structured, model-readable tool failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub kind: ToolFailureKind,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ToolFailure {
    pub fn lookup(error: impl Into<String>) -> Self {
        Self {
            kind: ToolFailureKind::Lookup,
            error: error.into(),
            suggestion: None,
        }
    }

    pub fn transport(error: impl Into<String>) -> Self {
        Self {
            kind: ToolFailureKind::Transport,
            error: error.into(),
            suggestion: None,
        }
    }

    pub fn invalid_arguments(error: impl Into<String>) -> Self {
        Self {
            kind: ToolFailureKind::InvalidArguments,
            error: error.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// What a tool execution produced: normalized data or a structured failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Data(serde_json::Value),
    Failure(ToolFailure),
}

impl ToolOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ToolOutcome::Failure(_))
    }

    /// JSON body handed to the model.
    pub fn into_json(self) -> serde_json::Value {
        match self {
            ToolOutcome::Data(value) => value,
            ToolOutcome::Failure(failure) => serde_json::to_value(&failure)
                .unwrap_or_else(|_| serde_json::json!({ "error": failure.error })),
        }
    }
}

impl From<ToolFailure> for ToolOutcome {
    fn from(failure: ToolFailure) -> Self {
        ToolOutcome::Failure(failure)
    }
}
