// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic query classification.
//!
//! Maps a question to a [`Tier`] with ordered static rules. No model
//! pre-call, no network, no history. The first matching rule wins:
//!
//! 1. a Premium keyword anywhere in the query
//! 2. a Standard keyword or wildcard pattern
//! 3. two or more regional/bloc indicators, or two or more entity separators
//! 4. more than [`LONG_QUERY_WORDS`] words
//! 5. the configured default tier

use regex::Regex;
use statroute_core::Tier;

/// Result of classifying a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    /// Tier the query should be dispatched to.
    pub tier: Tier,
    /// Human-readable reason for the classification.
    pub reason: &'static str,
}

/// Analytical vocabulary (contains, case-insensitive).
const PREMIUM_KEYWORDS: &[&str] = &[
    "analyze", "analyse", "analysis", "diagnose", "diagnostic", "why did",
    "root cause", "sustainab", "recommend", "methodology", "assess",
    "evaluate", "implications", "explain why",
];

/// Comparison and trend vocabulary. `*` matches any run of characters.
const STANDARD_KEYWORDS: &[&str] = &[
    "compare", "comparison", "versus", " vs ", "trend", "over time",
    "between * and",
];

/// Regional and bloc names that signal a multi-entity synthesis.
const INDICATORS: &[&str] = &[
    "africa", "asia", "europe", "latin america", "middle east", "caribbean",
    "g7", "g20", "brics", "ecowas", "asean", "oecd", "opec",
];

/// Queries longer than this many words are treated as Premium.
pub const LONG_QUERY_WORDS: usize = 30;

/// A compiled Standard keyword.
#[derive(Debug)]
enum Pattern {
    Literal(&'static str),
    Wildcard(Regex),
}

impl Pattern {
    fn compile(keyword: &'static str) -> Self {
        if !keyword.contains('*') {
            return Pattern::Literal(keyword);
        }
        let body = keyword
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        match Regex::new(&body) {
            Ok(re) => Pattern::Wildcard(re),
            // An escaped literal joined by `.*` always compiles; keep the
            // keyword usable as a literal if it somehow does not.
            Err(_) => Pattern::Literal(keyword),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        match self {
            Pattern::Literal(keyword) => lowered.contains(keyword),
            Pattern::Wildcard(re) => re.is_match(lowered),
        }
    }
}

/// Static, stateless query classifier.
#[derive(Debug)]
pub struct QueryClassifier {
    default_tier: Tier,
    standard: Vec<Pattern>,
}

impl QueryClassifier {
    /// Create a classifier that falls back to `default_tier` when no rule matches.
    pub fn new(default_tier: Tier) -> Self {
        Self {
            default_tier,
            standard: STANDARD_KEYWORDS.iter().copied().map(Pattern::compile).collect(),
        }
    }

    /// Classify a query.
    pub fn classify(&self, query: &str) -> ClassificationResult {
        let lowered = query.to_lowercase();

        if PREMIUM_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            return self.result(Tier::Premium, "premium keyword");
        }

        if self.standard.iter().any(|p| p.matches(&lowered)) {
            return self.result(Tier::Standard, "standard keyword");
        }

        if Self::indicator_count(&lowered) >= 2 {
            return self.result(Tier::Standard, "multiple regions or blocs");
        }
        if Self::separator_count(&lowered) >= 2 {
            return self.result(Tier::Standard, "multiple entities");
        }

        if query.split_whitespace().count() > LONG_QUERY_WORDS {
            return self.result(Tier::Premium, "long query");
        }

        self.result(self.default_tier, "default")
    }

    fn result(&self, tier: Tier, reason: &'static str) -> ClassificationResult {
        ClassificationResult { tier, reason }
    }

    /// Number of distinct indicator terms present.
    fn indicator_count(lowered: &str) -> usize {
        INDICATORS.iter().filter(|t| lowered.contains(*t)).count()
    }

    /// Commas plus occurrences of " and ".
    fn separator_count(lowered: &str) -> usize {
        lowered.matches(',').count() + lowered.matches(" and ").count()
    }
}

impl Default for QueryClassifier {
    fn default() -> Self {
        Self::new(Tier::Standard)
    }
}

impl std::fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.tier, self.reason)
    }
}
