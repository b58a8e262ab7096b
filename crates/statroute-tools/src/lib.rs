// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statistical data tools for statroute.
//!
//! Five sources (World Bank, IMF DataMapper, UN Comtrade, FAOSTAT, Our World
//! in Data) sit behind the [`Tool`] trait, are collected in a
//! [`ToolCatalog`], and are executed through the [`DataBridge`].

pub mod bridge;
pub mod catalog;
pub mod reference;
pub mod sources;

pub use bridge::DataBridge;
pub use catalog::{Tool, ToolCatalog};
pub use reference::{CodeTable, ReferenceData, StaticReferenceData};
