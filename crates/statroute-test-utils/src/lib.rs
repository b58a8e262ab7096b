// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for statroute integration tests.
//!
//! Provides scripted provider and tool doubles for fast, deterministic,
//! CI-runnable tests without external APIs.
//!
//! # Components
//!
//! - [`MockProvider`] - Provider adapter that replays a queue of scripted replies
//! - [`MockToolExecutor`] - Tool executor with canned outcomes per tool name

pub mod mock_provider;
pub mod mock_tools;

pub use mock_provider::{MockProvider, RecordedCall};
pub use mock_tools::MockToolExecutor;
