// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-tier usage accounting.
//!
//! The tracker keeps in-memory counters only. It is updated after an awaited
//! provider call resolves, so a call that is still in flight never shows up.

use std::collections::HashMap;

use serde::Serialize;
use statroute_core::Tier;
use tracing::debug;

/// Counters for one tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TierUsage {
    /// Successful calls.
    pub calls: u64,
    /// Calls that were attempted and failed.
    pub failures: u64,
    /// Sum of the estimated cost of successful calls, in USD.
    pub cost_usd: f64,
}

impl TierUsage {
    /// Every invocation, successful or not.
    pub fn attempts(&self) -> u64 {
        self.calls + self.failures
    }
}

/// Point-in-time copy of the tracker's state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageSnapshot {
    pub premium: TierUsage,
    pub standard: TierUsage,
    pub total_cost_usd: f64,
}

impl UsageSnapshot {
    pub fn tier(&self, tier: Tier) -> &TierUsage {
        match tier {
            Tier::Premium => &self.premium,
            Tier::Standard => &self.standard,
        }
    }
}

/// In-memory usage tracker with per-tier counters and a running cost total.
#[derive(Debug, Default)]
pub struct UsageTracker {
    tiers: HashMap<Tier, TierUsage>,
    total_cost_usd: f64,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful call and its cost. Negative costs are ignored.
    pub fn record_success(&mut self, tier: Tier, cost_usd: f64) {
        let cost = cost_usd.max(0.0);
        let entry = self.tiers.entry(tier).or_default();
        entry.calls += 1;
        entry.cost_usd += cost;
        self.total_cost_usd += cost;
        debug!(
            tier = %tier,
            cost_usd = cost,
            total_cost_usd = self.total_cost_usd,
            "usage recorded"
        );
    }

    /// Record a failed attempt. Failures carry no cost.
    pub fn record_failure(&mut self, tier: Tier) {
        self.tiers.entry(tier).or_default().failures += 1;
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        let get = |tier| self.tiers.get(&tier).copied().unwrap_or_default();
        UsageSnapshot {
            premium: get(Tier::Premium),
            standard: get(Tier::Standard),
            total_cost_usd: self.total_cost_usd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successes_accumulate_calls_and_cost() {
        let mut tracker = UsageTracker::new();
        tracker.record_success(Tier::Premium, 0.01);
        tracker.record_success(Tier::Premium, 0.02);
        tracker.record_success(Tier::Standard, 0.0);

        let snap = tracker.snapshot();
        assert_eq!(snap.premium.calls, 2);
        assert_eq!(snap.standard.calls, 1);
        assert!((snap.total_cost_usd - 0.03).abs() < 1e-12);
        assert!((snap.premium.cost_usd - 0.03).abs() < 1e-12);
    }

    #[test]
    fn failures_count_as_attempts_without_cost() {
        let mut tracker = UsageTracker::new();
        tracker.record_failure(Tier::Standard);
        tracker.record_failure(Tier::Premium);

        let snap = tracker.snapshot();
        assert_eq!(snap.standard.calls, 0);
        assert_eq!(snap.standard.attempts(), 1);
        assert_eq!(snap.premium.attempts(), 1);
        assert_eq!(snap.total_cost_usd, 0.0);
    }

    #[test]
    fn negative_cost_is_clamped() {
        let mut tracker = UsageTracker::new();
        tracker.record_success(Tier::Standard, -5.0);
        assert_eq!(tracker.snapshot().total_cost_usd, 0.0);
    }

    #[test]
    fn snapshot_serializes_per_tier() {
        let mut tracker = UsageTracker::new();
        tracker.record_success(Tier::Standard, 0.0);
        let json = serde_json::to_value(tracker.snapshot()).unwrap();
        assert_eq!(json["standard"]["calls"], 1);
        assert_eq!(json["premium"]["calls"], 0);
    }
}
