// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock tool executor with canned outcomes.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use statroute_core::{StatrouteError, ToolDefinition, ToolExecutor, ToolOutcome};

/// A `ToolExecutor` whose tools return fixed outcomes.
///
/// Tools without a canned outcome echo their arguments back as data.
#[derive(Default)]
pub struct MockToolExecutor {
    definitions: Vec<ToolDefinition>,
    outcomes: HashMap<String, ToolOutcome>,
    executed: Mutex<Vec<(String, serde_json::Value)>>,
}

impl MockToolExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool that echoes its arguments.
    pub fn with_tool(mut self, definition: ToolDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Register a tool with a fixed outcome.
    pub fn with_outcome(mut self, definition: ToolDefinition, outcome: ToolOutcome) -> Self {
        self.outcomes.insert(definition.name.clone(), outcome);
        self.definitions.push(definition);
        self
    }

    /// Executed calls as `(name, arguments)`, in order.
    pub async fn executed(&self) -> Vec<(String, serde_json::Value)> {
        self.executed.lock().await.clone()
    }
}

#[async_trait]
impl ToolExecutor for MockToolExecutor {
    fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    async fn execute(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolOutcome, StatrouteError> {
        if !self.definitions.iter().any(|d| d.name == name) {
            return Err(StatrouteError::UnknownTool(name.to_string()));
        }
        self.executed
            .lock()
            .await
            .push((name.to_string(), arguments.clone()));
        Ok(self
            .outcomes
            .get(name)
            .cloned()
            .unwrap_or(ToolOutcome::Data(arguments)))
    }
}
