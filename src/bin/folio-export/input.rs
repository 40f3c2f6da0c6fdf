//! Input structs for parsing a browser builder snapshot.
//!
//! These mirror the builder store as the browser serializes it.
//! Key differences from the Rust model:
//! - camelCase field names (`pageId`, `parentId`, `currentPageId`)
//! - component `type` is a free string, checked during the transform
//! - `createdAt` is an ISO string in current snapshots, millis in older ones

use std::collections::HashMap;

use serde::Deserialize;

// =============================================================================
// ROOT SNAPSHOT
// =============================================================================

/// Root store snapshot. Every top-level key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputSnapshot {
    pub components: Vec<InputComponent>,
    pub pages: Vec<InputPage>,
    pub layouts: Vec<InputLayout>,
    pub current_page_id: Option<String>,
    pub current_layout_id: Option<String>,
}

// =============================================================================
// COMPONENTS
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputComponent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: String,
    /// Style values may be numbers in hand-edited snapshots.
    #[serde(default)]
    pub styles: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub position: InputPosition,
    pub page_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InputPosition {
    pub x: f64,
    pub y: f64,
}

// =============================================================================
// PAGES AND LAYOUTS
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputPage {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<InputTimestamp>,
    #[serde(default)]
    pub layout_id: Option<String>,
}

/// `createdAt` in either of its historical encodings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InputTimestamp {
    Millis(i64),
    Iso(String),
}

#[derive(Debug, Deserialize)]
pub struct InputLayout {
    pub id: String,
    pub name: String,
    pub template: String,
    #[serde(default)]
    pub settings: InputLayoutSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputLayoutSettings {
    pub max_width: Option<String>,
    pub padding: Option<String>,
    pub background_color: Option<String>,
    pub surface_color: Option<String>,
    pub text_color: Option<String>,
    pub accent_color: Option<String>,
    pub gap: Option<String>,
}

fn default_true() -> bool {
    true
}
