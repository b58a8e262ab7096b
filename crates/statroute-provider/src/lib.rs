// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM provider adapters for statroute.
//!
//! Every provider runs through one [`ModelDriver`] parametrized by a
//! [`WireFormat`]: Anthropic for the Premium tier, and Gemini or Groq for the
//! Standard tier. [`convert`] holds the tool declaration translation for
//! each format.

pub mod anthropic;
pub mod convert;
pub mod driver;
pub mod gemini;
pub mod openai;
pub mod preamble;

use std::collections::HashMap;
use std::sync::Arc;

use statroute_config::model::{StandardProvider, StatrouteConfig};
use statroute_core::{ProviderAdapter, StatrouteError, Tier};
use tracing::{info, warn};

pub use anthropic::AnthropicWire;
pub use convert::ToolFormat;
pub use driver::{Completion, ModelDriver, ModelProfile, Turn, WireFormat};
pub use gemini::GeminiWire;
pub use openai::OpenAiWire;

/// Adapters keyed by the tier they serve.
pub type AdapterSet = HashMap<Tier, Arc<dyn ProviderAdapter>>;

/// Build one adapter per tier from config.
///
/// A tier whose API key cannot be resolved is left out with a warning, so
/// routing to it fails with a fallback-eligible "no adapter" error instead
/// of aborting startup.
pub fn build_adapters(config: &StatrouteConfig) -> Result<AdapterSet, StatrouteError> {
    let mut adapters = AdapterSet::new();

    insert_or_warn(
        &mut adapters,
        Tier::Premium,
        anthropic::driver(config).map(into_adapter),
    )?;

    let standard = match config.routing.standard_provider {
        StandardProvider::Gemini => gemini::driver(config).map(into_adapter),
        StandardProvider::Groq => openai::driver(config).map(into_adapter),
    };
    insert_or_warn(&mut adapters, Tier::Standard, standard)?;

    Ok(adapters)
}

fn into_adapter<W: WireFormat>(driver: ModelDriver<W>) -> Arc<dyn ProviderAdapter> {
    Arc::new(driver)
}

fn insert_or_warn(
    adapters: &mut AdapterSet,
    tier: Tier,
    built: Result<Arc<dyn ProviderAdapter>, StatrouteError>,
) -> Result<(), StatrouteError> {
    match built {
        Ok(adapter) => {
            info!(
                tier = %tier,
                provider = adapter.name(),
                model = adapter.model(),
                "provider adapter ready"
            );
            adapters.insert(tier, adapter);
            Ok(())
        }
        Err(StatrouteError::Config(message)) => {
            warn!(tier = %tier, %message, "provider adapter unavailable");
            Ok(())
        }
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_keys_build_both_tiers() {
        let mut config = StatrouteConfig::default();
        config.anthropic.api_key = Some("sk-ant-test".into());
        config.gemini.api_key = Some("gm-test".into());

        let adapters = build_adapters(&config).unwrap();
        assert_eq!(adapters[&Tier::Premium].name(), "anthropic");
        assert_eq!(adapters[&Tier::Standard].name(), "gemini");
        assert_eq!(adapters[&Tier::Standard].model(), "gemini-2.0-flash");
    }

    #[test]
    fn groq_can_serve_standard_tier() {
        let mut config = StatrouteConfig::default();
        config.anthropic.api_key = Some("sk-ant-test".into());
        config.groq.api_key = Some("gsk-test".into());
        config.routing.standard_provider = StandardProvider::Groq;

        let adapters = build_adapters(&config).unwrap();
        assert_eq!(adapters[&Tier::Standard].name(), "groq");
        assert_eq!(adapters[&Tier::Standard].tier(), Tier::Standard);
    }
}
