// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query classification and tier routing for statroute.
//!
//! This crate provides:
//! - [`QueryClassifier`]: ordered keyword/heuristic rules mapping a query to a tier
//! - [`Router`]: dispatch with one-hop fallback, usage accounting, sessions, and the tool loop
//! - [`InMemorySessionStore`]: the default process-local history store

pub mod classifier;
pub mod router;
pub mod session;

pub use classifier::{ClassificationResult, QueryClassifier};
pub use router::{AdapterMap, Answer, RouteRequest, Router};
pub use session::InMemorySessionStore;
