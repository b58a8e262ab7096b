// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool execution bridge: the [`ToolExecutor`] the router calls.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use statroute_config::model::DataConfig;
use statroute_core::{StatrouteError, ToolDefinition, ToolExecutor, ToolOutcome};
use tracing::{info, warn};

use crate::catalog::ToolCatalog;
use crate::reference::StaticReferenceData;

/// Dispatches tool calls by name to the catalog's data sources.
#[derive(Debug, Clone)]
pub struct DataBridge {
    catalog: Arc<ToolCatalog>,
}

impl DataBridge {
    pub fn new(catalog: Arc<ToolCatalog>) -> Self {
        Self { catalog }
    }

    /// The built-in catalog with the built-in reference tables.
    pub fn from_config(config: &DataConfig) -> Result<Self, StatrouteError> {
        let catalog = ToolCatalog::builtin(config, Arc::new(StaticReferenceData))?;
        Ok(Self::new(Arc::new(catalog)))
    }

    pub fn catalog(&self) -> &Arc<ToolCatalog> {
        &self.catalog
    }
}

#[async_trait]
impl ToolExecutor for DataBridge {
    fn definitions(&self) -> &[ToolDefinition] {
        self.catalog.definitions()
    }

    async fn execute(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolOutcome, StatrouteError> {
        let tool = self
            .catalog
            .get(name)
            .ok_or_else(|| StatrouteError::UnknownTool(name.to_string()))?;

        let started = Instant::now();
        let outcome = tool.invoke(arguments).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &outcome {
            ToolOutcome::Data(body) => info!(
                tool = name,
                rows = body.get("count").and_then(|c| c.as_u64()).unwrap_or(0),
                elapsed_ms,
                "tool call succeeded"
            ),
            ToolOutcome::Failure(failure) => warn!(
                tool = name,
                kind = ?failure.kind,
                error = %failure.error,
                elapsed_ms,
                "tool call failed"
            ),
        }
        Ok(outcome)
    }
}
