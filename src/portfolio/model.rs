//! Data models for the portfolio document store.
//!
//! These structs map to the browser builder's component / page / layout
//! records and use autosurgeon derives for document serialization.
//! Components and pages are keyed by `id` so reordering the backing
//! sequence moves list entries instead of rewriting them.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use automerge::{ScalarValue, Value};
use autosurgeon::reconcile::{MapReconciler, NoKey};
use autosurgeon::{Hydrate, HydrateError, ReadDoc, Reconcile, Reconciler};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::tree::TreeIndex;
use crate::config::BuilderConfig;
use crate::error::{FolioError, FolioResult, InvalidParentReason};

/// Presentational style map. Keys use the builder's camelCase names
/// (see [`style_keys`]); an absent key means "use the projection default".
pub type Styles = HashMap<String, String>;

/// Well-known style keys edited by the property panel.
pub mod style_keys {
    pub const BACKGROUND_COLOR: &str = "backgroundColor";
    pub const COLOR: &str = "color";
    pub const FONT_SIZE: &str = "fontSize";
    pub const PADDING: &str = "padding";
    pub const MARGIN: &str = "margin";
    pub const TEXT_ALIGN: &str = "textAlign";
    pub const GAP: &str = "gap";
    pub const DISPLAY: &str = "display";
    pub const GRID_TEMPLATE_COLUMNS: &str = "gridTemplateColumns";
    pub const BORDER: &str = "border";
}

/// Generates a fresh component/page/layout identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Derives a page slug: lowercase, every whitespace run becomes one `-`.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub(crate) fn now_millis() -> i64 {
    js_sys::Date::now() as i64
}

#[cfg(not(all(target_arch = "wasm32", feature = "wasm")))]
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

// =============================================================================
// DOCUMENT ROOT
// =============================================================================

/// Root document structure for a portfolio.
#[derive(Debug, Clone, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
pub struct DocumentRoot {
    /// Backing sequence of every component on every page. Its order is the
    /// default render order.
    pub components: Vec<Component>,

    /// Pages, in creation order.
    pub pages: Vec<Page>,

    /// Layout presets, in creation order.
    pub layouts: Vec<Layout>,

    /// Page the editor is showing.
    pub current_page_id: Option<String>,

    /// Layout the rendering surfaces use.
    pub current_layout_id: Option<String>,
}

impl DocumentRoot {
    /// Creates the initial document: one home page and one single-column
    /// layout, both current, no components.
    pub fn seeded(config: &BuilderConfig) -> Self {
        let page = Page {
            id: config.default_page_id.clone(),
            name: config.default_page_name.clone(),
            slug: slugify(&config.default_page_name),
            is_active: true,
            created_at: now_millis(),
            layout_id: Some(config.default_layout_id.clone()),
        };
        let layout = Layout {
            id: config.default_layout_id.clone(),
            name: "Single Column".to_string(),
            template: "single-column".to_string(),
            settings: LayoutSettings::new()
                .with_max_width("1200px")
                .with_padding("20px")
                .with_background_color("#ffffff")
                .with_gap("16px"),
        };
        Self {
            components: Vec::new(),
            current_page_id: Some(page.id.clone()),
            current_layout_id: Some(layout.id.clone()),
            pages: vec![page],
            layouts: vec![layout],
        }
    }

    /// Returns the number of components across all pages.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if there are no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Finds a component by id.
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Finds a page by id.
    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Finds a layout by id.
    pub fn layout(&self, id: &str) -> Option<&Layout> {
        self.layouts.iter().find(|l| l.id == id)
    }

    /// Components tagged with `page_id`, in backing-sequence order.
    pub fn components_on_page<'a>(
        &'a self,
        page_id: &'a str,
    ) -> impl Iterator<Item = &'a Component> + 'a {
        self.components.iter().filter(move |c| c.page_id == page_id)
    }

    /// Checks the forest invariants a snapshot has to satisfy before it is
    /// written into a document: unique component and page ids, and no
    /// component reachable from itself through parent pointers.
    ///
    /// Dangling and cross-page parents pass; projections treat those nodes
    /// as page roots.
    pub fn validate(&self) -> FolioResult<()> {
        let mut seen = HashSet::with_capacity(self.components.len());
        for component in &self.components {
            if !seen.insert(component.id.as_str()) {
                return Err(FolioError::import(format!(
                    "duplicate component id '{}'",
                    component.id
                )));
            }
        }
        let mut pages = HashSet::with_capacity(self.pages.len());
        for page in &self.pages {
            if !pages.insert(page.id.as_str()) {
                return Err(FolioError::import(format!("duplicate page id '{}'", page.id)));
            }
        }

        let index = TreeIndex::new(&self.components);
        for component in &self.components {
            let Some(ref parent_id) = component.parent_id else {
                continue;
            };
            if *parent_id == component.id {
                return Err(FolioError::invalid_parent(
                    &component.id,
                    parent_id,
                    InvalidParentReason::SelfParent,
                ));
            }
            if index.ancestors(&component.id).iter().any(|a| a.id == component.id) {
                return Err(FolioError::invalid_parent(
                    &component.id,
                    parent_id,
                    InvalidParentReason::Cycle,
                ));
            }
        }
        Ok(())
    }
}

impl Default for DocumentRoot {
    fn default() -> Self {
        Self::seeded(&BuilderConfig::default())
    }
}

// =============================================================================
// COMPONENT KIND
// =============================================================================

/// The closed set of component types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Header,
    Text,
    Image,
    Button,
    Section,
    Layout,
    Card,
    List,
    Quote,
    Divider,
}

impl ComponentKind {
    /// Every kind, in palette order.
    pub const ALL: [ComponentKind; 10] = [
        ComponentKind::Header,
        ComponentKind::Text,
        ComponentKind::Image,
        ComponentKind::Button,
        ComponentKind::Section,
        ComponentKind::Layout,
        ComponentKind::Card,
        ComponentKind::List,
        ComponentKind::Quote,
        ComponentKind::Divider,
    ];

    /// The lowercase tag stored in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Text => "text",
            Self::Image => "image",
            Self::Button => "button",
            Self::Section => "section",
            Self::Layout => "layout",
            Self::Card => "card",
            Self::List => "list",
            Self::Quote => "quote",
            Self::Divider => "divider",
        }
    }

    /// Display label used by the palette and outline.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Header => "Header",
            Self::Text => "Text",
            Self::Image => "Image",
            Self::Button => "Button",
            Self::Section => "Section",
            Self::Layout => "Layout",
            Self::Card => "Card",
            Self::List => "List",
            Self::Quote => "Quote",
            Self::Divider => "Divider",
        }
    }

    /// Section and layout nodes hold children; everything else is content.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Section | Self::Layout)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a tag is not one of the component kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown component type '{}'", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for ComponentKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Stored as its plain tag string.
impl Reconcile for ComponentKind {
    type Key<'a> = NoKey;

    fn reconcile<R: Reconciler>(&self, mut reconciler: R) -> Result<(), R::Error> {
        reconciler.str(self.as_str())
    }
}

impl Hydrate for ComponentKind {
    fn hydrate_string(s: &'_ str) -> Result<Self, HydrateError> {
        s.parse()
            .map_err(|_| HydrateError::unexpected("a component type tag", s.to_string()))
    }
}

// =============================================================================
// COMPONENT
// =============================================================================

/// Canvas coordinates. Recorded for forward compatibility; no layout pass
/// reads them.
#[derive(Debug, Clone, Copy, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single typed content block or layout container.
#[derive(Debug, Clone, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
pub struct Component {
    /// Unique across the whole document; immutable after creation.
    #[key]
    pub id: String,

    /// Component type.
    #[serde(rename = "type")]
    pub kind: ComponentKind,

    /// Text body, image URL, or empty for containers.
    pub content: String,

    /// Inline style properties.
    #[serde(default)]
    pub styles: Styles,

    #[serde(default)]
    pub position: Position,

    /// Page this component belongs to.
    pub page_id: String,

    /// Containing section/layout; `None` for page roots.
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Layout preset key (layout nodes only).
    #[serde(default)]
    pub template: Option<String>,

    /// Explicit outline icon key.
    #[serde(default)]
    pub icon: Option<String>,
}

impl Component {
    /// Gets a style value.
    pub fn style(&self, key: &str) -> Option<&str> {
        self.styles.get(key).map(String::as_str)
    }

    /// True when this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A component before the store assigns its id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentDraft {
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub styles: Styles,
    #[serde(default)]
    pub position: Position,
    pub page_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl ComponentDraft {
    /// Creates an empty draft of `kind` on `page_id`.
    pub fn new(kind: ComponentKind, page_id: impl Into<String>) -> Self {
        Self {
            kind,
            content: String::new(),
            styles: Styles::new(),
            position: Position::default(),
            page_id: page_id.into(),
            parent_id: None,
            template: None,
            icon: None,
        }
    }

    /// Builder: Set content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Builder: Set a single style property.
    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(key.into(), value.into());
        self
    }

    /// Builder: Replace all styles.
    pub fn with_styles(mut self, styles: Styles) -> Self {
        self.styles = styles;
        self
    }

    /// Builder: Set position.
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    /// Builder: Nest under a container.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Builder: Set layout template key.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Builder: Set icon key.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Materializes the draft under `id`.
    pub fn into_component(self, id: impl Into<String>) -> Component {
        Component {
            id: id.into(),
            kind: self.kind,
            content: self.content,
            styles: self.styles,
            position: self.position,
            page_id: self.page_id,
            parent_id: self.parent_id,
            template: self.template,
            icon: self.icon,
        }
    }
}

/// Keeps an explicit `null` apart from an absent field: absent stays
/// `None` through `#[serde(default)]`, `null` becomes `Some(None)`.
fn clearable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial component update. `styles` merges key by key; the optional
/// metadata fields use `Some(None)` (JSON `null`) to clear.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ComponentPatch {
    #[serde(rename = "type")]
    pub kind: Option<ComponentKind>,
    pub content: Option<String>,
    pub styles: Option<Styles>,
    pub position: Option<Position>,
    pub page_id: Option<String>,
    #[serde(
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<Option<String>>,
    #[serde(
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub template: Option<Option<String>>,
    #[serde(
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub icon: Option<Option<String>>,
}

impl ComponentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: Change the type.
    pub fn kind(mut self, kind: ComponentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Builder: Replace content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Builder: Merge one style property.
    pub fn style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles
            .get_or_insert_with(Styles::new)
            .insert(key.into(), value.into());
        self
    }

    /// Builder: Replace position.
    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Builder: Move to another page.
    pub fn page(mut self, page_id: impl Into<String>) -> Self {
        self.page_id = Some(page_id.into());
        self
    }

    /// Builder: Set or clear the parent.
    pub fn parent(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Builder: Set or clear the template.
    pub fn template(mut self, template: Option<String>) -> Self {
        self.template = Some(template);
        self
    }

    /// Builder: Set or clear the icon.
    pub fn icon(mut self, icon: Option<String>) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Shallow-merges this patch into `component`.
    pub fn apply_to(&self, component: &mut Component) {
        if let Some(kind) = self.kind {
            component.kind = kind;
        }
        if let Some(ref content) = self.content {
            component.content = content.clone();
        }
        if let Some(ref styles) = self.styles {
            for (key, value) in styles {
                component.styles.insert(key.clone(), value.clone());
            }
        }
        if let Some(position) = self.position {
            component.position = position;
        }
        if let Some(ref page_id) = self.page_id {
            component.page_id = page_id.clone();
        }
        if let Some(ref parent_id) = self.parent_id {
            component.parent_id = parent_id.clone();
        }
        if let Some(ref template) = self.template {
            component.template = template.clone();
        }
        if let Some(ref icon) = self.icon {
            component.icon = icon.clone();
        }
    }

    /// True if the patch touches the tree structure.
    pub fn is_structural(&self) -> bool {
        self.page_id.is_some() || self.parent_id.is_some()
    }
}

// =============================================================================
// PAGE
// =============================================================================

/// A named page partitioning the component forest.
#[derive(Debug, Clone, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
pub struct Page {
    #[key]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    /// Milliseconds since epoch.
    pub created_at: i64,
    /// Layout applied when this page becomes current.
    #[serde(default)]
    pub layout_id: Option<String>,
}

/// Partial page update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PagePatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub is_active: Option<bool>,
    #[serde(
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub layout_id: Option<Option<String>>,
}

impl PagePatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: Rename.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: Set slug.
    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Builder: Set active flag.
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Builder: Set or clear the associated layout.
    pub fn layout(mut self, layout_id: Option<String>) -> Self {
        self.layout_id = Some(layout_id);
        self
    }

    /// Shallow-merges this patch into `page`.
    pub fn apply_to(&self, page: &mut Page) {
        if let Some(ref name) = self.name {
            page.name = name.clone();
        }
        if let Some(ref slug) = self.slug {
            page.slug = slug.clone();
        }
        if let Some(is_active) = self.is_active {
            page.is_active = is_active;
        }
        if let Some(ref layout_id) = self.layout_id {
            page.layout_id = layout_id.clone();
        }
    }
}

// =============================================================================
// LAYOUT
// =============================================================================

/// A named presentation preset.
#[derive(Debug, Clone, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
pub struct Layout {
    #[key]
    pub id: String,
    pub name: String,
    /// Preset key, e.g. "single-column" or "grid".
    pub template: String,
    pub settings: LayoutSettings,
}

/// A layout before the store assigns its id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutDraft {
    pub name: String,
    pub template: String,
    #[serde(default)]
    pub settings: LayoutSettings,
}

impl LayoutDraft {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            settings: LayoutSettings::default(),
        }
    }

    /// Builder: Set settings.
    pub fn with_settings(mut self, settings: LayoutSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Materializes the draft under `id`.
    pub fn into_layout(self, id: impl Into<String>) -> Layout {
        Layout {
            id: id.into(),
            name: self.name,
            template: self.template,
            settings: self.settings,
        }
    }
}

/// Partial layout update. `settings`, when present, replaces the whole
/// settings object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutPatch {
    pub name: Option<String>,
    pub template: Option<String>,
    pub settings: Option<LayoutSettings>,
}

impl LayoutPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: Rename.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: Change template.
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Builder: Replace settings.
    pub fn settings(mut self, settings: LayoutSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Shallow-merges this patch into `layout`.
    pub fn apply_to(&self, layout: &mut Layout) {
        if let Some(ref name) = self.name {
            layout.name = name.clone();
        }
        if let Some(ref template) = self.template {
            layout.template = template.clone();
        }
        if let Some(ref settings) = self.settings {
            layout.settings = settings.clone();
        }
    }
}

/// Layout settings: width, spacing and a four-color palette.
/// Note: Reconcile and Hydrate are implemented manually for sparse serialization.
/// - Reconcile: Only writes Some() fields, deletes None fields
/// - Hydrate: Treats missing keys as None (instead of erroring)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LayoutSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
}

impl LayoutSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: Set max width.
    pub fn with_max_width(mut self, v: impl Into<String>) -> Self {
        self.max_width = Some(v.into());
        self
    }

    /// Builder: Set padding.
    pub fn with_padding(mut self, v: impl Into<String>) -> Self {
        self.padding = Some(v.into());
        self
    }

    /// Builder: Set background color.
    pub fn with_background_color(mut self, v: impl Into<String>) -> Self {
        self.background_color = Some(v.into());
        self
    }

    /// Builder: Set surface color.
    pub fn with_surface_color(mut self, v: impl Into<String>) -> Self {
        self.surface_color = Some(v.into());
        self
    }

    /// Builder: Set text color.
    pub fn with_text_color(mut self, v: impl Into<String>) -> Self {
        self.text_color = Some(v.into());
        self
    }

    /// Builder: Set accent color.
    pub fn with_accent_color(mut self, v: impl Into<String>) -> Self {
        self.accent_color = Some(v.into());
        self
    }

    /// Builder: Set gap.
    pub fn with_gap(mut self, v: impl Into<String>) -> Self {
        self.gap = Some(v.into());
        self
    }
}

impl Reconcile for LayoutSettings {
    type Key<'a> = NoKey;

    fn reconcile<R: Reconciler>(&self, mut reconciler: R) -> Result<(), R::Error> {
        let mut m = reconciler.map()?;

        macro_rules! reconcile_opt {
            ($field:expr, $key:literal) => {
                match $field {
                    Some(v) => m.put($key, v)?,
                    None => {
                        let _ = m.delete($key);
                    }
                }
            };
        }

        reconcile_opt!(&self.max_width, "max_width");
        reconcile_opt!(&self.padding, "padding");
        reconcile_opt!(&self.background_color, "background_color");
        reconcile_opt!(&self.surface_color, "surface_color");
        reconcile_opt!(&self.text_color, "text_color");
        reconcile_opt!(&self.accent_color, "accent_color");
        reconcile_opt!(&self.gap, "gap");

        Ok(())
    }
}

impl Hydrate for LayoutSettings {
    fn hydrate_map<D: ReadDoc>(doc: &D, obj: &automerge::ObjId) -> Result<Self, HydrateError> {
        fn opt_string<D: ReadDoc>(
            doc: &D,
            obj: &automerge::ObjId,
            key: &str,
        ) -> Result<Option<String>, HydrateError> {
            match doc.get(obj, key)? {
                Some((Value::Scalar(s), _)) => match s.as_ref() {
                    ScalarValue::Str(st) => Ok(Some(st.to_string())),
                    _ => Ok(None),
                },
                _ => Ok(None),
            }
        }

        Ok(LayoutSettings {
            max_width: opt_string(doc, obj, "max_width")?,
            padding: opt_string(doc, obj, "padding")?,
            background_color: opt_string(doc, obj, "background_color")?,
            surface_color: opt_string(doc, obj, "surface_color")?,
            text_color: opt_string(doc, obj, "text_color")?,
            accent_color: opt_string(doc, obj, "accent_color")?,
            gap: opt_string(doc, obj, "gap")?,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_root() {
        let root = DocumentRoot::default();
        assert!(root.is_empty());
        assert_eq!(root.pages.len(), 1);
        assert_eq!(root.pages[0].slug, "home");
        assert_eq!(root.pages[0].layout_id.as_deref(), Some("default"));
        assert_eq!(root.current_page_id.as_deref(), Some("default"));
        assert_eq!(root.layouts[0].template, "single-column");
        assert_eq!(
            root.layouts[0].settings.max_width.as_deref(),
            Some("1200px")
        );
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("About Me"), "about-me");
        assert_eq!(slugify("  My   Work\tSamples "), "my-work-samples");
        assert_eq!(slugify("Docs"), "docs");
    }

    #[test]
    fn test_kind_tags() {
        for kind in ComponentKind::ALL {
            assert_eq!(kind.as_str().parse::<ComponentKind>().unwrap(), kind);
        }
        assert!("carousel".parse::<ComponentKind>().is_err());
        assert!(ComponentKind::Layout.is_container());
        assert!(ComponentKind::Section.is_container());
        assert!(!ComponentKind::Card.is_container());
    }

    #[test]
    fn test_kind_serde_is_lowercase() {
        let json = serde_json::to_string(&ComponentKind::Divider).unwrap();
        assert_eq!(json, "\"divider\"");
    }

    #[test]
    fn test_patch_merges_styles() {
        let mut component = ComponentDraft::new(ComponentKind::Text, "default")
            .with_style("padding", "8px")
            .with_style("color", "blue")
            .into_component("c1");

        ComponentPatch::new()
            .style("color", "red")
            .apply_to(&mut component);

        assert_eq!(component.style("padding"), Some("8px"));
        assert_eq!(component.style("color"), Some("red"));
        assert_eq!(component.styles.len(), 2);
    }

    #[test]
    fn test_patch_clears_parent() {
        let mut component = ComponentDraft::new(ComponentKind::Text, "default")
            .with_parent("p")
            .into_component("c1");
        ComponentPatch::new().parent(None).apply_to(&mut component);
        assert!(component.is_root());
    }

    #[test]
    fn test_patch_json_null_clears() {
        let patch: ComponentPatch =
            serde_json::from_str(r#"{"parent_id": null, "icon": "star"}"#).unwrap();
        assert_eq!(patch.parent_id, Some(None));
        assert_eq!(patch.icon, Some(Some("star".to_string())));
        assert_eq!(patch.template, None);
        assert!(patch.is_structural());

        let untouched: ComponentPatch = serde_json::from_str(r#"{"content": "x"}"#).unwrap();
        assert_eq!(untouched.parent_id, None);
        assert!(!untouched.is_structural());

        let page: PagePatch = serde_json::from_str(r#"{"layout_id": null}"#).unwrap();
        assert_eq!(page.layout_id, Some(None));
    }

    fn snapshot(nodes: &[(&str, Option<&str>)]) -> DocumentRoot {
        let mut root = DocumentRoot::default();
        for (id, parent) in nodes {
            let mut draft = ComponentDraft::new(ComponentKind::Section, "default");
            if let Some(p) = parent {
                draft = draft.with_parent(*p);
            }
            root.components.push(draft.into_component(*id));
        }
        root
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let root = snapshot(&[("x", None), ("x", None)]);
        let err = root.validate().unwrap_err();
        assert!(matches!(err, FolioError::Import(_)));
        assert!(err.to_string().contains("duplicate component id 'x'"));
    }

    #[test]
    fn test_validate_rejects_cycles() {
        let root = snapshot(&[("a", None), ("p", Some("q")), ("q", Some("p"))]);
        let err = root.validate().unwrap_err();
        assert!(matches!(
            err,
            FolioError::InvalidParent {
                reason: InvalidParentReason::Cycle,
                ..
            }
        ));

        let root = snapshot(&[("s", Some("s"))]);
        assert!(matches!(
            root.validate().unwrap_err(),
            FolioError::InvalidParent {
                reason: InvalidParentReason::SelfParent,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_allows_dangling_parent() {
        let root = snapshot(&[("a", None), ("b", Some("a")), ("orphan", Some("gone"))]);
        assert!(root.validate().is_ok());
    }

    #[test]
    fn test_layout_patch_replaces_settings() {
        let mut layout = LayoutDraft::new("Grid", "grid")
            .with_settings(LayoutSettings::new().with_gap("8px").with_padding("4px"))
            .into_layout("l1");
        LayoutPatch::new()
            .settings(LayoutSettings::new().with_gap("24px"))
            .apply_to(&mut layout);
        assert_eq!(layout.settings.gap.as_deref(), Some("24px"));
        assert_eq!(layout.settings.padding, None);
    }

    #[test]
    fn test_component_json_shape() {
        let component = ComponentDraft::new(ComponentKind::Header, "default")
            .with_content("Hi")
            .into_component("c1");
        let json = serde_json::to_value(&component).unwrap();
        assert_eq!(json["type"], "header");
        assert_eq!(json["page_id"], "default");
        assert!(json["parent_id"].is_null());
    }
}
