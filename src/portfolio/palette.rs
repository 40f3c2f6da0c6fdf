//! Presets offered by the builder's side panels: palette defaults, sample
//! components for fresh pages, layout templates, themes, and the container
//! templates dropped onto the canvas.

use super::model::{
    style_keys, Component, ComponentDraft, ComponentKind, LayoutDraft, LayoutSettings,
};

/// Placeholder image used by the palette.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x200";

/// Default content for a palette click.
pub fn default_content(kind: ComponentKind) -> &'static str {
    match kind {
        ComponentKind::Header => "Your Header",
        ComponentKind::Text => "Your text content here...",
        ComponentKind::Image => PLACEHOLDER_IMAGE,
        ComponentKind::Button => "Click Me",
        ComponentKind::Section => "Section Content",
        ComponentKind::Layout => "",
        ComponentKind::Card => "Card Content",
        ComponentKind::List => "List Item 1\nList Item 2\nList Item 3",
        ComponentKind::Quote => "This is an inspiring quote.",
        ComponentKind::Divider => "---",
    }
}

/// The draft a palette click adds to `page_id`.
pub fn palette_draft(kind: ComponentKind, page_id: &str) -> ComponentDraft {
    let (background, color) = match kind {
        ComponentKind::Button => ("#007bff", "white"),
        _ => ("transparent", "#333"),
    };
    let font_size = match kind {
        ComponentKind::Header => "24px",
        _ => "16px",
    };
    ComponentDraft::new(kind, page_id)
        .with_content(default_content(kind))
        .with_style(style_keys::PADDING, "16px")
        .with_style(style_keys::MARGIN, "8px")
        .with_style(style_keys::BACKGROUND_COLOR, background)
        .with_style(style_keys::COLOR, color)
        .with_style(style_keys::FONT_SIZE, font_size)
        .with_style(style_keys::TEXT_ALIGN, "left")
}

/// Samples placed on a page created through `add_page`.
pub(crate) fn new_page_samples(page_id: &str) -> Vec<ComponentDraft> {
    vec![
        ComponentDraft::new(ComponentKind::Header, page_id)
            .with_content("Welcome to my portfolio")
            .with_style(style_keys::COLOR, "#222")
            .with_style(style_keys::FONT_SIZE, "28px")
            .with_style(style_keys::TEXT_ALIGN, "center")
            .with_style(style_keys::PADDING, "12px"),
        ComponentDraft::new(ComponentKind::Text, page_id)
            .with_content("A short about section. Tell visitors who you are.")
            .with_style(style_keys::COLOR, "#444")
            .with_style(style_keys::FONT_SIZE, "16px")
            .with_style(style_keys::PADDING, "12px")
            .with_style(style_keys::TEXT_ALIGN, "left")
            .with_position(0.0, 80.0),
    ]
}

/// Sample placed on an empty page when it becomes current.
pub(crate) fn empty_page_sample(page_id: &str) -> ComponentDraft {
    ComponentDraft::new(ComponentKind::Header, page_id)
        .with_content("Page title")
        .with_style(style_keys::COLOR, "#111")
        .with_style(style_keys::FONT_SIZE, "24px")
        .with_style(style_keys::TEXT_ALIGN, "center")
        .with_style(style_keys::PADDING, "12px")
}

// =============================================================================
// LAYOUT TEMPLATES
// =============================================================================

/// Page-level layout presets offered by the layout panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutTemplate {
    SingleColumn,
    TwoColumn,
    ThreeColumn,
    Grid,
}

impl LayoutTemplate {
    pub const ALL: [LayoutTemplate; 4] = [
        LayoutTemplate::SingleColumn,
        LayoutTemplate::TwoColumn,
        LayoutTemplate::ThreeColumn,
        LayoutTemplate::Grid,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::SingleColumn => "Single Column",
            Self::TwoColumn => "Two Column",
            Self::ThreeColumn => "Three Column",
            Self::Grid => "Grid Layout",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::SingleColumn => "single-column",
            Self::TwoColumn => "two-column",
            Self::ThreeColumn => "three-column",
            Self::Grid => "grid",
        }
    }

    /// A draft with the stock settings every template starts with.
    pub fn draft(&self) -> LayoutDraft {
        LayoutDraft::new(self.name(), self.key()).with_settings(
            LayoutSettings::new()
                .with_max_width("1200px")
                .with_padding("20px")
                .with_background_color("#ffffff")
                .with_gap("16px"),
        )
    }
}

// =============================================================================
// THEMES
// =============================================================================

/// A color theme applied to the current layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub background: &'static str,
    pub text: &'static str,
    pub accent: &'static str,
}

pub const THEMES: [Theme; 5] = [
    Theme {
        name: "Light",
        background: "#ffffff",
        text: "#333333",
        accent: "#007bff",
    },
    Theme {
        name: "Dark",
        background: "#1a1a1a",
        text: "#ffffff",
        accent: "#00d4aa",
    },
    Theme {
        name: "Blue",
        background: "#f0f8ff",
        text: "#1e3a8a",
        accent: "#3b82f6",
    },
    Theme {
        name: "Green",
        background: "#f0fdf4",
        text: "#166534",
        accent: "#22c55e",
    },
    Theme {
        name: "Purple",
        background: "#faf5ff",
        text: "#581c87",
        accent: "#a855f7",
    },
];

/// Looks a theme up by name, case-insensitively.
pub fn theme(name: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

// =============================================================================
// CONTAINER TEMPLATES
// =============================================================================

/// Container presets dropped onto the canvas or into another container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerTemplate {
    SingleColumn,
    ColumnMore,
    Grid,
    UnevenGrid,
}

impl ContainerTemplate {
    /// Folds legacy and alias keys onto a preset. Unknown keys yield `None`.
    pub fn normalize(key: &str) -> Option<Self> {
        match key {
            "single-column" | "single_column" | "verticle-column" | "verticle_column"
            | "vertical-column" | "vertical_column" => Some(Self::SingleColumn),
            "column-more" | "column_more" | "horizontal_columns" | "horizontal-columns"
            | "horizontal_more" => Some(Self::ColumnMore),
            "grid" => Some(Self::Grid),
            "uneven-grid" => Some(Self::UnevenGrid),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::SingleColumn => "single-column",
            Self::ColumnMore => "column-more",
            Self::Grid => "grid",
            Self::UnevenGrid => "uneven-grid",
        }
    }

    /// Grid columns for this preset; single column stacks normally.
    pub fn grid_columns(&self) -> Option<&'static str> {
        match self {
            Self::SingleColumn => None,
            Self::ColumnMore => Some("repeat(2,1fr)"),
            Self::Grid => Some("repeat(3,1fr)"),
            Self::UnevenGrid => Some("2fr 1fr"),
        }
    }

    /// Builds the layout node for this preset. See [`container_draft`].
    pub fn draft(
        &self,
        page_id: &str,
        parent: Option<&Component>,
        border_color: &str,
    ) -> ComponentDraft {
        container_draft(self.key(), page_id, parent, border_color)
    }
}

/// Builds a layout node for a dropped template key.
///
/// Known keys are normalized and get their grid styles; unknown keys are
/// kept verbatim as a plain stacking container. `parent` is the container
/// it is dropped into, which supplies padding and text color;
/// `border_color` is the current layout's accent.
pub fn container_draft(
    template: &str,
    page_id: &str,
    parent: Option<&Component>,
    border_color: &str,
) -> ComponentDraft {
    let preset = ContainerTemplate::normalize(template);
    let key = preset.map(|p| p.key()).unwrap_or(template);
    let padding = parent
        .and_then(|p| p.style(style_keys::PADDING))
        .unwrap_or("20px");
    let color = parent
        .and_then(|p| p.style(style_keys::COLOR))
        .unwrap_or("#111827");

    let mut draft = ComponentDraft::new(ComponentKind::Layout, page_id)
        .with_template(key)
        .with_icon(key)
        .with_style(style_keys::PADDING, padding)
        .with_style(style_keys::BACKGROUND_COLOR, "transparent")
        .with_style(style_keys::COLOR, color)
        .with_style(style_keys::BORDER, format!("1px dashed {}", border_color));

    if let Some(columns) = preset.and_then(|p| p.grid_columns()) {
        draft = draft
            .with_style(style_keys::DISPLAY, "grid")
            .with_style(style_keys::GRID_TEMPLATE_COLUMNS, columns)
            .with_style(style_keys::GAP, "16px");
    }
    if let Some(p) = parent {
        draft = draft.with_parent(p.id.clone());
    }
    draft
}

/// Friendly outline name for a layout template key.
pub fn template_display_name(key: &str) -> Option<&'static str> {
    match key {
        "verticle-column" | "verticle_column" | "vertical-column" | "vertical_column" => {
            Some("Vertical Column")
        }
        "horizontal_columns" | "horizontal_more" | "horizontal-columns" | "column-more"
        | "column_more" => Some("Horizontal Columns"),
        "single_column" | "single-column" => Some("Single Column"),
        "grid" => Some("Grid"),
        "uneven-grid" => Some("Uneven Grid"),
        _ => None,
    }
}
