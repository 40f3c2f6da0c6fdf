//! Builder configuration.
//!
//! Everything here has a default matching the stock page builder, so
//! `BuilderConfig::default()` is what `PortfolioManager::new()` uses.

use serde::{Deserialize, Serialize};

/// Knobs for the document store and its exporters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BuilderConfig {
    /// Id of the page every fresh document starts with.
    pub default_page_id: String,
    /// Display name of that page.
    pub default_page_name: String,
    /// Id of the layout every fresh document starts with.
    pub default_layout_id: String,
    /// Seed sample components onto new or empty pages.
    pub seed_new_pages: bool,
    /// Exporter settings.
    pub export: ExportOptions,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            default_page_id: "default".to_string(),
            default_page_name: "Home".to_string(),
            default_layout_id: "default".to_string(),
            seed_new_pages: true,
            export: ExportOptions::default(),
        }
    }
}

impl BuilderConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: Set the default page id.
    pub fn with_default_page_id(mut self, id: impl Into<String>) -> Self {
        self.default_page_id = id.into();
        self
    }

    /// Builder: Set the default page name.
    pub fn with_default_page_name(mut self, name: impl Into<String>) -> Self {
        self.default_page_name = name.into();
        self
    }

    /// Builder: Set the default layout id.
    pub fn with_default_layout_id(mut self, id: impl Into<String>) -> Self {
        self.default_layout_id = id.into();
        self
    }

    /// Builder: Enable or disable sample seeding.
    pub fn with_seed_new_pages(mut self, seed: bool) -> Self {
        self.seed_new_pages = seed;
        self
    }

    /// Builder: Set exporter options.
    pub fn with_export(mut self, export: ExportOptions) -> Self {
        self.export = export;
        self
    }

    /// Parses a configuration from JSON; missing keys fall back to defaults.
    pub fn from_json(json: &str) -> crate::FolioResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Settings for the static HTML / print / Word exporters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportOptions {
    /// `<title>` of exported documents.
    pub title: String,
    /// Body font stack.
    pub font_family: String,
    /// Body padding.
    pub body_padding: String,
    /// Bottom margin between exported components.
    pub component_spacing: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            font_family: "Arial, Helvetica, sans-serif".to_string(),
            body_padding: "20px".to_string(),
            component_spacing: "16px".to_string(),
        }
    }
}

impl ExportOptions {
    /// Builder: Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder: Set the font stack.
    pub fn with_font_family(mut self, font_family: impl Into<String>) -> Self {
        self.font_family = font_family.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BuilderConfig::default();
        assert_eq!(config.default_page_id, "default");
        assert_eq!(config.default_layout_id, "default");
        assert!(config.seed_new_pages);
        assert_eq!(config.export.title, "Portfolio");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            BuilderConfig::from_json(r#"{"seed_new_pages": false, "export": {"title": "Me"}}"#)
                .unwrap();
        assert!(!config.seed_new_pages);
        assert_eq!(config.default_page_name, "Home");
        assert_eq!(config.export.title, "Me");
        assert_eq!(config.export.body_padding, "20px");
    }
}
