//! Render tree: page roots with containers resolved into nested children.

use tracing::trace;

use super::html::{escape, style_attr};
use crate::portfolio::model::{Component, ComponentKind, Layout, Styles};
use crate::portfolio::tree::TreeIndex;

/// Shown by the preview when a page has nothing on it.
pub const EMPTY_PREVIEW: &str =
    "Your portfolio preview will appear here once you add components.";

/// The HTML element a content component renders as, plus the styles the
/// renderer forces on top of the component's own.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub overrides: Styles,
}

impl Element {
    /// Picks the element for `component`. `accent` colors card, quote and
    /// divider borders.
    pub fn for_component(component: &Component, accent: Option<&str>) -> Self {
        let mut overrides = Styles::new();
        let mut set = |key: &str, value: String| {
            overrides.insert(key.to_string(), value);
        };
        let tag = match component.kind {
            ComponentKind::Header => "h1",
            ComponentKind::Text => "p",
            ComponentKind::Image => {
                set("maxWidth", "100%".into());
                set("height", "auto".into());
                "img"
            }
            ComponentKind::Button => {
                set("cursor", "pointer".into());
                set("border", "none".into());
                set("borderRadius", "4px".into());
                "button"
            }
            ComponentKind::Section => "section",
            ComponentKind::Layout => "div",
            ComponentKind::Card => {
                set("border", format!("1px solid {}", accent.unwrap_or("#ddd")));
                set("borderRadius", "8px".into());
                set("padding", "12px".into());
                "div"
            }
            ComponentKind::List => "ul",
            ComponentKind::Quote => {
                set("borderLeft", format!("4px solid {}", accent.unwrap_or("#007bff")));
                set("paddingLeft", "16px".into());
                set("fontStyle", "italic".into());
                set("margin", "20px 0".into());
                "blockquote"
            }
            ComponentKind::Divider => {
                set("border", "none".into());
                set("borderTop", format!("2px solid {}", accent.unwrap_or("#ddd")));
                set("margin", "20px 0".into());
                "hr"
            }
        };
        Self { tag, overrides }
    }

    /// Component styles with the overrides applied.
    pub fn styles_for(&self, component: &Component) -> Styles {
        let mut styles = component.styles.clone();
        styles.extend(self.overrides.clone());
        styles
    }

    /// Elements written without a closing tag.
    pub fn is_void(&self) -> bool {
        matches!(self.tag, "img" | "hr")
    }
}

/// One node of the render tree.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode<'a> {
    /// Section or layout node with its resolved children.
    Container {
        component: &'a Component,
        children: Vec<RenderNode<'a>>,
    },
    /// Any other node.
    Content {
        component: &'a Component,
        element: Element,
    },
}

impl<'a> RenderNode<'a> {
    pub fn component(&self) -> &'a Component {
        match self {
            Self::Container { component, .. } | Self::Content { component, .. } => component,
        }
    }

    /// Number of nodes in this subtree.
    pub fn size(&self) -> usize {
        match self {
            Self::Container { children, .. } => 1 + children.iter().map(Self::size).sum::<usize>(),
            Self::Content { .. } => 1,
        }
    }
}

/// Builds the render tree for `page_id` in backing-sequence order.
pub fn render_tree<'a>(
    components: &'a [Component],
    page_id: &str,
    layout: Option<&Layout>,
) -> Vec<RenderNode<'a>> {
    let index = TreeIndex::new(components);
    let accent = layout.and_then(|l| l.settings.accent_color.as_deref());
    let tree: Vec<_> = index
        .roots(page_id)
        .into_iter()
        .map(|root| build(&index, root, accent))
        .collect();
    trace!(page_id, roots = tree.len(), "render tree built");
    tree
}

fn build<'a>(index: &TreeIndex<'a>, component: &'a Component, accent: Option<&str>) -> RenderNode<'a> {
    if component.kind.is_container() {
        RenderNode::Container {
            component,
            children: index
                .children(&component.id)
                .into_iter()
                .map(|child| build(index, child, accent))
                .collect(),
        }
    } else {
        RenderNode::Content {
            component,
            element: Element::for_component(component, accent),
        }
    }
}

/// Renders the preview markup: the layout wrapper around every node,
/// containers kept as nested elements.
pub fn render_html(tree: &[RenderNode<'_>], layout: Option<&Layout>) -> String {
    let mut wrapper = Styles::new();
    let settings = layout.map(|l| &l.settings);
    wrapper.insert(
        "maxWidth".into(),
        settings
            .and_then(|s| s.max_width.clone())
            .unwrap_or_else(|| "1200px".into()),
    );
    wrapper.insert("margin".into(), "0 auto".into());
    if let Some(s) = settings {
        for (key, value) in [
            ("padding", &s.padding),
            ("backgroundColor", &s.background_color),
            ("color", &s.text_color),
        ] {
            if let Some(v) = value {
                wrapper.insert(key.into(), v.clone());
            }
        }
    }

    let mut out = format!("<div class=\"portfolio\"{}>", style_attr(&wrapper));
    if tree.is_empty() {
        out.push_str("<div class=\"empty\">");
        out.push_str(EMPTY_PREVIEW);
        out.push_str("</div>");
    }
    for node in tree {
        write_node(&mut out, node);
    }
    out.push_str("</div>");
    out
}

fn write_node(out: &mut String, node: &RenderNode<'_>) {
    match node {
        RenderNode::Container {
            component,
            children,
        } => {
            let attrs = style_attr(&component.styles);
            if component.kind == ComponentKind::Section {
                out.push_str(&format!("<section{}>", attrs));
                // imported markup
                out.push_str(&component.content);
            } else {
                let template = component.template.as_deref().unwrap_or("layout");
                out.push_str(&format!(
                    "<div class=\"layout\" data-template=\"{}\"{}>",
                    escape(template),
                    attrs
                ));
            }
            for child in children {
                write_node(out, child);
            }
            out.push_str(if component.kind == ComponentKind::Section {
                "</section>"
            } else {
                "</div>"
            });
        }
        RenderNode::Content { component, element } => {
            write_content(out, component, element);
        }
    }
}

fn write_content(out: &mut String, component: &Component, element: &Element) {
    let attrs = style_attr(&element.styles_for(component));
    match component.kind {
        ComponentKind::Image => out.push_str(&format!(
            "<img src=\"{}\" alt=\"Portfolio\"{}/>",
            escape(&component.content),
            attrs
        )),
        ComponentKind::List => {
            out.push_str(&format!("<ul{}>", attrs));
            for item in component.content.lines() {
                out.push_str(&format!("<li>{}</li>", escape(item)));
            }
            out.push_str("</ul>");
        }
        _ if element.is_void() => out.push_str(&format!("<{}{}/>", element.tag, attrs)),
        _ => out.push_str(&format!(
            "<{tag}{attrs}>{body}</{tag}>",
            tag = element.tag,
            attrs = attrs,
            body = escape(&component.content)
        )),
    }
}
