//! Structure view: a collapsible outline of a page's component forest.

use std::collections::HashSet;

use serde::Serialize;

use crate::portfolio::model::{Component, ComponentKind};
use crate::portfolio::palette::template_display_name;
use crate::portfolio::tree::TreeIndex;

/// Per-node collapse flags, keyed by component id. Nodes start expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineState {
    collapsed: HashSet<String>,
}

impl OutlineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips a node and returns its new collapsed state.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.collapsed.remove(id) {
            self.collapsed.insert(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn set_collapsed(&mut self, id: &str, collapsed: bool) {
        if collapsed {
            self.collapsed.insert(id.to_string());
        } else {
            self.collapsed.remove(id);
        }
    }

    pub fn is_collapsed(&self, id: &str) -> bool {
        self.collapsed.contains(id)
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }
}

/// One row of the structure view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineNode {
    pub id: String,
    pub label: String,
    pub icon_key: String,
    pub depth: usize,
    pub has_children: bool,
    pub collapsed: bool,
    /// Empty while collapsed.
    pub children: Vec<OutlineNode>,
}

/// Icon lookup key: explicit icon, else a layout's template, else the type.
pub fn icon_key(component: &Component) -> String {
    if let Some(ref icon) = component.icon {
        return icon.clone();
    }
    if component.kind == ComponentKind::Layout {
        return component
            .template
            .clone()
            .unwrap_or_else(|| "layout".to_string());
    }
    component.kind.as_str().to_string()
}

/// Row label. Layout nodes use their template's friendly name.
pub fn label(component: &Component) -> String {
    if component.kind == ComponentKind::Layout {
        let key = icon_key(component);
        if let Some(name) = template_display_name(&key) {
            return name.to_string();
        }
    }
    component.kind.label().to_string()
}

/// Builds the outline of `page_id`.
pub fn build_outline(
    components: &[Component],
    page_id: &str,
    state: &OutlineState,
) -> Vec<OutlineNode> {
    let index = TreeIndex::new(components);
    index
        .roots(page_id)
        .into_iter()
        .map(|root| build(&index, root, 0, state))
        .collect()
}

fn build(index: &TreeIndex<'_>, component: &Component, depth: usize, state: &OutlineState) -> OutlineNode {
    let kids = index.children(&component.id);
    let collapsed = state.is_collapsed(&component.id);
    let children = if collapsed {
        Vec::new()
    } else {
        kids.iter()
            .map(|child| build(index, child, depth + 1, state))
            .collect()
    };
    OutlineNode {
        id: component.id.clone(),
        label: label(component),
        icon_key: icon_key(component),
        depth,
        has_children: !kids.is_empty(),
        collapsed,
        children,
    }
}
