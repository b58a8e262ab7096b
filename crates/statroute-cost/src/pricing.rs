// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model pricing tables and cost calculation.
//!
//! Claude Sonnet 4 (Anthropic):        input=$3.00/MTok, output=$15.00/MTok
//! Gemini 2.0 Flash (Google, free):    input=$0.00/MTok, output=$0.00/MTok
//! Llama 3.3 70B Versatile (Groq):     input=$0.59/MTok, output=$0.79/MTok

use statroute_core::TokenUsage;

/// Per-model pricing in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

impl ModelPricing {
    pub const ANTHROPIC_SONNET: ModelPricing = ModelPricing {
        input_per_mtok: 3.0,
        output_per_mtok: 15.0,
    };

    /// Free tier: every call costs nothing.
    pub const FREE: ModelPricing = ModelPricing {
        input_per_mtok: 0.0,
        output_per_mtok: 0.0,
    };

    pub const GROQ_LLAMA_70B: ModelPricing = ModelPricing {
        input_per_mtok: 0.59,
        output_per_mtok: 0.79,
    };
}

/// Calculate cost in USD for a token usage.
///
/// `(input × price_in + output × price_out) / 1_000_000`, floored at zero so
/// a malformed price table can never produce a negative cost.
pub fn calculate_cost(usage: &TokenUsage, pricing: &ModelPricing) -> f64 {
    let cost = (f64::from(usage.input_tokens) * pricing.input_per_mtok
        + f64::from(usage.output_tokens) * pricing.output_per_mtok)
        / 1_000_000.0;
    if cost.is_finite() { cost.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sonnet_cost_matches_formula() {
        let usage = TokenUsage {
            input_tokens: 1000,
            output_tokens: 500,
        };
        let cost = calculate_cost(&usage, &ModelPricing::ANTHROPIC_SONNET);
        // input: 1000 * 3.0 = 3000, output: 500 * 15.0 = 7500 -> 10500 / 1M
        let expected = 0.0105;
        assert!((cost - expected).abs() < 1e-12, "expected {expected}, got {cost}");
    }

    #[test]
    fn free_tier_always_costs_zero() {
        let usage = TokenUsage {
            input_tokens: 5_000_000,
            output_tokens: 2_000_000,
        };
        assert_eq!(calculate_cost(&usage, &ModelPricing::FREE), 0.0);
    }

    #[test]
    fn negative_prices_never_yield_negative_cost() {
        let broken = ModelPricing {
            input_per_mtok: -1.0,
            output_per_mtok: -1.0,
        };
        let usage = TokenUsage {
            input_tokens: 10,
            output_tokens: 10,
        };
        assert_eq!(calculate_cost(&usage, &broken), 0.0);
    }

    #[test]
    fn zero_tokens_zero_cost() {
        let cost = calculate_cost(&TokenUsage::default(), &ModelPricing::GROQ_LLAMA_70B);
        assert_eq!(cost, 0.0);
    }
}
