// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricing and usage accounting for statroute.
//!
//! This crate provides:
//! - **Pricing**: fixed per-provider price tables and the cost formula
//! - **Usage tracker**: in-memory per-tier call/failure counters and running cost

pub mod pricing;
pub mod usage;

pub use pricing::{calculate_cost, ModelPricing};
pub use usage::{TierUsage, UsageSnapshot, UsageTracker};
