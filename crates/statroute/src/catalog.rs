// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `statroute tools` and `statroute classify`: offline inspection commands.

use clap::ValueEnum;
use statroute_config::StatrouteConfig;
use statroute_core::ToolDefinition;
use statroute_provider::{AnthropicWire, GeminiWire, OpenAiWire, ToolFormat};
use statroute_router::QueryClassifier;
use statroute_tools::DataBridge;

/// Declaration shape to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Provider-neutral definitions.
    Catalog,
    Anthropic,
    Gemini,
    /// OpenAI-compatible, as sent to Groq.
    Openai,
}

pub fn run_tools(config: &StatrouteConfig, format: Format) -> i32 {
    let bridge = match DataBridge::from_config(&config.data) {
        Ok(bridge) => bridge,
        Err(err) => return crate::startup_error(config, &err),
    };
    match render_tools(bridge.catalog().definitions(), format) {
        Ok(body) => {
            println!("{body}");
            0
        }
        Err(err) => {
            eprintln!("statroute: cannot encode tools: {err}");
            1
        }
    }
}

fn render_tools(tools: &[ToolDefinition], format: Format) -> serde_json::Result<String> {
    match format {
        Format::Catalog => serde_json::to_string_pretty(tools),
        Format::Anthropic => serde_json::to_string_pretty(&AnthropicWire::encode_tools(tools)),
        Format::Gemini => serde_json::to_string_pretty(&GeminiWire::encode_tools(tools)),
        Format::Openai => serde_json::to_string_pretty(&OpenAiWire::encode_tools(tools)),
    }
}

pub fn run_classify(config: &StatrouteConfig, query: &str) {
    let result = QueryClassifier::new(config.routing.default_tier).classify(query);
    println!("{result}");
}
