// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the router and its collaborators.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod executor;
pub mod provider;
pub mod session;

pub use executor::ToolExecutor;
pub use provider::ProviderAdapter;
pub use session::SessionStore;
