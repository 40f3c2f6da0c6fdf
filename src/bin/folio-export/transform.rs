//! Transformation logic from snapshot structs to the document model.
//!
//! Key transformations:
//! - free-form `type` strings → ComponentKind (unknown types are errors)
//! - ISO `createdAt` → epoch millis
//! - non-string style values → their JSON text
//! - missing pages/layouts → the stock home page and layout

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::input::*;
use foliocraft::portfolio::model::*;
use foliocraft::BuilderConfig;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn style_value(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn timestamp_millis(ts: Option<InputTimestamp>) -> Result<i64> {
    match ts {
        None => Ok(Utc::now().timestamp_millis()),
        Some(InputTimestamp::Millis(ms)) => Ok(ms),
        Some(InputTimestamp::Iso(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.timestamp_millis())
            .with_context(|| format!("Invalid createdAt timestamp '{}'", s)),
    }
}

// =============================================================================
// COMPONENTS
// =============================================================================

impl TryFrom<InputComponent> for Component {
    type Error = anyhow::Error;

    fn try_from(input: InputComponent) -> Result<Self> {
        let kind: ComponentKind = input
            .kind
            .parse()
            .with_context(|| format!("Component '{}' has an invalid type", input.id))?;
        let styles: Styles = input
            .styles
            .into_iter()
            .filter_map(|(k, v)| style_value(v).map(|v| (k, v)))
            .collect();

        Ok(Component {
            id: input.id,
            kind,
            content: input.content,
            styles,
            position: Position::new(input.position.x, input.position.y),
            page_id: input.page_id,
            parent_id: input.parent_id,
            template: input.template,
            icon: input.icon,
        })
    }
}

// =============================================================================
// PAGES AND LAYOUTS
// =============================================================================

impl TryFrom<InputPage> for Page {
    type Error = anyhow::Error;

    fn try_from(input: InputPage) -> Result<Self> {
        let created_at = timestamp_millis(input.created_at)
            .with_context(|| format!("Page '{}'", input.id))?;
        Ok(Page {
            slug: input.slug.unwrap_or_else(|| slugify(&input.name)),
            id: input.id,
            name: input.name,
            is_active: input.is_active,
            created_at,
            layout_id: input.layout_id,
        })
    }
}

impl From<InputLayoutSettings> for LayoutSettings {
    fn from(input: InputLayoutSettings) -> Self {
        LayoutSettings {
            max_width: input.max_width,
            padding: input.padding,
            background_color: input.background_color,
            surface_color: input.surface_color,
            text_color: input.text_color,
            accent_color: input.accent_color,
            gap: input.gap,
        }
    }
}

impl From<InputLayout> for Layout {
    fn from(input: InputLayout) -> Self {
        Layout {
            id: input.id,
            name: input.name,
            template: input.template,
            settings: input.settings.into(),
        }
    }
}

// =============================================================================
// ROOT SNAPSHOT
// =============================================================================

/// Builds the document root, filling gaps from the stock document.
pub fn into_root(input: InputSnapshot, config: &BuilderConfig) -> Result<DocumentRoot> {
    let stock = DocumentRoot::seeded(config);

    let components = input
        .components
        .into_iter()
        .map(Component::try_from)
        .collect::<Result<Vec<_>>>()?;
    let mut pages = input
        .pages
        .into_iter()
        .map(Page::try_from)
        .collect::<Result<Vec<_>>>()?;
    let mut layouts: Vec<Layout> = input.layouts.into_iter().map(Layout::from).collect();

    if pages.is_empty() {
        tracing::warn!("snapshot has no pages; using the stock home page");
        pages = stock.pages;
    }
    if layouts.is_empty() {
        tracing::warn!("snapshot has no layouts; using the stock layout");
        layouts = stock.layouts;
    }

    let current_page_id = input
        .current_page_id
        .filter(|id| pages.iter().any(|p| &p.id == id))
        .or_else(|| pages.first().map(|p| p.id.clone()));
    let current_layout_id = input
        .current_layout_id
        .filter(|id| layouts.iter().any(|l| &l.id == id))
        .or_else(|| layouts.first().map(|l| l.id.clone()));

    let root = DocumentRoot {
        components,
        pages,
        layouts,
        current_page_id,
        current_layout_id,
    };
    root.validate()
        .map_err(|err| anyhow::anyhow!("Invalid snapshot: {}", err))?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<DocumentRoot> {
        let input: InputSnapshot = serde_json::from_str(json)?;
        into_root(input, &BuilderConfig::default())
    }

    #[test]
    fn test_browser_snapshot() {
        let root = parse(
            r##"{
                "components": [
                    {"id": "1", "type": "header", "content": "Hi", "pageId": "default",
                     "styles": {"fontSize": "24px", "zIndex": 2, "outline": null},
                     "position": {"x": 0, "y": 0}},
                    {"id": "2", "type": "text", "content": "x", "pageId": "default", "parentId": "1"}
                ],
                "pages": [{"id": "default", "name": "Home", "slug": "home", "isActive": true,
                           "createdAt": "2024-01-02T03:04:05.000Z", "layoutId": "default"}],
                "layouts": [{"id": "default", "name": "Single Column", "template": "single-column",
                             "settings": {"maxWidth": "1200px", "accentColor": "#f00"}}],
                "currentPageId": "default",
                "currentLayoutId": "default"
            }"##,
        )
        .unwrap();
        assert_eq!(root.components.len(), 2);
        assert_eq!(root.components[0].styles["zIndex"], "2");
        assert!(!root.components[0].styles.contains_key("outline"));
        assert_eq!(root.components[1].parent_id.as_deref(), Some("1"));
        assert_eq!(root.pages[0].created_at, 1_704_164_645_000);
        assert_eq!(root.layouts[0].settings.accent_color.as_deref(), Some("#f00"));
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let err = parse(r#"{"components": [{"id": "1", "type": "video", "pageId": "default"}]}"#)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("unknown component type 'video'"));
    }

    #[test]
    fn test_empty_snapshot_gets_stock_registry() {
        let root = parse("{}").unwrap();
        assert_eq!(root.pages[0].id, "default");
        assert_eq!(root.current_page_id.as_deref(), Some("default"));
        assert_eq!(root.current_layout_id.as_deref(), Some("default"));
    }

    #[test]
    fn test_duplicate_ids_and_cycles_are_rejected() {
        let err = parse(
            r#"{"components": [
                {"id": "x", "type": "text", "pageId": "default"},
                {"id": "x", "type": "text", "pageId": "default"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate component id 'x'"));

        let err = parse(
            r#"{"components": [
                {"id": "p", "type": "section", "pageId": "default", "parentId": "q"},
                {"id": "q", "type": "section", "pageId": "default", "parentId": "p"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("parent is a descendant"));
    }
}
