// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait and catalog.
//!
//! The [`Tool`] trait is the interface every data source implements. The
//! [`ToolCatalog`] indexes tools by name, rejects duplicates, and keeps the
//! definitions in registration order so every provider sees the same list.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use statroute_config::model::DataConfig;
use statroute_core::{StatrouteError, ToolDefinition, ToolOutcome};

use crate::reference::ReferenceData;
use crate::sources::SourceClient;
use crate::sources::comtrade::ComtradeTool;
use crate::sources::faostat::FaostatTool;
use crate::sources::imf::ImfTool;
use crate::sources::owid::OwidTool;
use crate::sources::world_bank::WorldBankTool;

/// A data tool the model can call.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description, and parameter schema.
    fn definition(&self) -> ToolDefinition;

    /// Run the tool. Upstream and lookup problems are reported as
    /// [`ToolOutcome::Failure`].
    async fn invoke(&self, input: serde_json::Value) -> ToolOutcome;
}

/// Registry of available tools, indexed by name.
#[derive(Default)]
pub struct ToolCatalog {
    tools: HashMap<String, Arc<dyn Tool>>,
    definitions: Vec<ToolDefinition>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five built-in statistical tools, configured from `config`.
    pub fn builtin(
        config: &DataConfig,
        reference: Arc<dyn ReferenceData>,
    ) -> Result<Self, StatrouteError> {
        let client = SourceClient::new(Duration::from_secs(config.timeout_secs))?;
        let mut catalog = Self::new();
        catalog.register(Arc::new(WorldBankTool::new(
            client.clone(),
            config.world_bank_url.clone(),
            Arc::clone(&reference),
        )))?;
        catalog.register(Arc::new(ImfTool::new(
            client.clone(),
            config.imf_url.clone(),
            Arc::clone(&reference),
        )))?;
        catalog.register(Arc::new(ComtradeTool::new(
            client.clone(),
            config.comtrade_url.clone(),
            Arc::clone(&reference),
        )))?;
        catalog.register(Arc::new(FaostatTool::new(
            client.clone(),
            config.faostat_url.clone(),
            Arc::clone(&reference),
        )))?;
        catalog.register(Arc::new(OwidTool::new(
            client,
            config.owid_url.clone(),
            reference,
        )))?;
        Ok(catalog)
    }

    /// Registers a tool under its definition's name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), StatrouteError> {
        let definition = tool.definition();
        if self.tools.contains_key(&definition.name) {
            return Err(StatrouteError::DuplicateTool(definition.name));
        }
        self.tools.insert(definition.name.clone(), tool);
        self.definitions.push(definition);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCatalog")
            .field(
                "tools",
                &self.definitions.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
