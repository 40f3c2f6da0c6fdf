//! Portfolio document module.
//!
//! This module provides:
//! - `model`: Component, Page and Layout records plus their drafts and patches
//! - `tree`: parent/child index used for validation and projections
//! - `manager`: PortfolioManager with tree mutations and O(1) targeted updates
//! - `pages` / `layouts`: the page and layout registries
//! - `palette`: palette defaults, themes and container templates
//! - `wasm`: WASM bindings for browser usage (JsPortfolioManager)

pub mod layouts;
pub mod manager;
pub mod model;
pub mod pages;
pub mod palette;
pub mod tree;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use manager::PortfolioManager;
pub use model::*;
pub use palette::{palette_draft, ContainerTemplate, LayoutTemplate, Theme, THEMES};
pub use tree::TreeIndex;

#[cfg(feature = "wasm")]
pub use wasm::JsPortfolioManager;
