//! Drag-and-drop planning.
//!
//! A drop is handled in two phases. While the drop event is being handled,
//! [`plan_drop`] works out what should change without touching the store.
//! The resulting [`Mutation`] is parked in a [`MutationQueue`] and applied
//! once the gesture has fully unwound, so the drag source never sees the
//! tree change underneath it.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::portfolio::model::{Component, ComponentDraft, ComponentKind, ComponentPatch, Styles};
use crate::portfolio::palette::container_draft;
use crate::portfolio::PortfolioManager;
use crate::FolioResult;

/// Border color for dropped containers when the layout has no accent.
pub const DEFAULT_DROP_BORDER: &str = "#e5e7eb";

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragItem {
    /// A component already on the canvas, with its backing-sequence index.
    Existing { id: String, index: usize },
    /// A palette entry.
    NewComponent {
        #[serde(rename = "type")]
        kind: ComponentKind,
        #[serde(default)]
        content: String,
        #[serde(default)]
        styles: Styles,
    },
    /// A container template from the layout panel.
    NewLayout { template: String },
}

/// Where it is being dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum DropTarget {
    /// The page canvas itself.
    Canvas { page_id: String },
    /// A section or layout node.
    Container(Component),
    /// A list row at `index` in the backing sequence.
    Item { index: usize },
}

/// Whether `target` takes `item` at all.
pub fn accepts(target: &DropTarget, item: &DragItem) -> bool {
    match target {
        DropTarget::Canvas { .. } => matches!(item, DragItem::NewLayout { .. }),
        DropTarget::Container(_) => true,
        DropTarget::Item { .. } => matches!(item, DragItem::Existing { .. }),
    }
}

/// Works out the mutation a drop should cause, without applying it.
///
/// `already_handled` is set when a nested target took the drop first; the
/// outer target then does nothing. `accent` is the current layout's accent
/// color, used for the dashed border of dropped containers.
pub fn plan_drop(
    target: &DropTarget,
    item: &DragItem,
    already_handled: bool,
    accent: Option<&str>,
) -> Option<Mutation> {
    if already_handled || !accepts(target, item) {
        trace!(?target, already_handled, "drop ignored");
        return None;
    }
    let border = accent.unwrap_or(DEFAULT_DROP_BORDER);

    let planned = match (target, item) {
        (DropTarget::Canvas { page_id }, DragItem::NewLayout { template }) => {
            Some(Mutation::Add(container_draft(template, page_id, None, border)))
        }
        (DropTarget::Container(container), DragItem::Existing { id, .. }) => {
            if *id == container.id {
                None
            } else {
                Some(Mutation::Reparent {
                    id: id.clone(),
                    parent_id: Some(container.id.clone()),
                })
            }
        }
        (
            DropTarget::Container(container),
            DragItem::NewComponent {
                kind,
                content,
                styles,
            },
        ) => Some(Mutation::Add(
            ComponentDraft::new(*kind, container.page_id.clone())
                .with_content(content.clone())
                .with_styles(styles.clone())
                .with_parent(container.id.clone()),
        )),
        (DropTarget::Container(container), DragItem::NewLayout { template }) => Some(
            Mutation::Add(container_draft(
                template,
                &container.page_id,
                Some(container),
                border,
            )),
        ),
        (DropTarget::Item { index }, DragItem::Existing { index: from, .. }) => {
            (from != index).then(|| Mutation::Reorder {
                from: *from,
                to: *index,
            })
        }
        _ => None,
    };
    trace!(?planned, "drop planned");
    planned
}

/// A store mutation computed during a drop and applied later.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Add(ComponentDraft),
    Reparent {
        id: String,
        parent_id: Option<String>,
    },
    Reorder {
        from: usize,
        to: usize,
    },
    Delete {
        id: String,
    },
    Update {
        id: String,
        patch: ComponentPatch,
    },
}

impl Mutation {
    /// Applies this mutation to the store.
    pub fn apply(&self, manager: &mut PortfolioManager) -> FolioResult<()> {
        match self {
            Self::Add(draft) => {
                manager.add_component(draft.clone())?;
            }
            Self::Reparent { id, parent_id } => {
                manager.reparent_component(id, parent_id.as_deref())?;
            }
            Self::Reorder { from, to } => manager.reorder_components(*from, *to)?,
            Self::Delete { id } => {
                manager.delete_component(id)?;
            }
            Self::Update { id, patch } => manager.update_component(id, patch.clone())?,
        }
        Ok(())
    }
}

/// FIFO of mutations waiting for the current gesture to finish.
#[derive(Debug, Clone, Default)]
pub struct MutationQueue {
    pending: VecDeque<Mutation>,
}

impl MutationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks a mutation until the next [`flush`](Self::flush).
    pub fn defer(&mut self, mutation: Mutation) {
        self.pending.push_back(mutation);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Mutations still waiting, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &Mutation> {
        self.pending.iter()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Applies queued mutations in order and returns how many succeeded.
    ///
    /// Stops at the first failure. The failed mutation and everything
    /// behind it stay queued.
    pub fn flush(&mut self, manager: &mut PortfolioManager) -> FolioResult<usize> {
        let mut applied = 0;
        while let Some(mutation) = self.pending.front() {
            if let Err(err) = mutation.apply(manager) {
                warn!(%err, remaining = self.pending.len(), "deferred mutation failed");
                return Err(err);
            }
            self.pending.pop_front();
            applied += 1;
        }
        if applied > 0 {
            debug!(applied, "deferred mutations flushed");
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuilderConfig;
    use crate::FolioError;

    fn manager() -> PortfolioManager {
        PortfolioManager::with_config(BuilderConfig::new().with_seed_new_pages(false))
    }

    fn container(manager: &mut PortfolioManager, page_id: &str) -> Component {
        let id = manager
            .add_component(
                ComponentDraft::new(ComponentKind::Section, page_id)
                    .with_style("padding", "8px")
                    .with_style("color", "#fff"),
            )
            .unwrap();
        manager.get_component(&id).unwrap().unwrap()
    }

    #[test]
    fn test_accepts() {
        let canvas = DropTarget::Canvas {
            page_id: "default".into(),
        };
        let existing = DragItem::Existing {
            id: "a".into(),
            index: 0,
        };
        let layout = DragItem::NewLayout {
            template: "grid".into(),
        };
        assert!(accepts(&canvas, &layout));
        assert!(!accepts(&canvas, &existing));
        assert!(accepts(&DropTarget::Item { index: 1 }, &existing));
        assert!(!accepts(&DropTarget::Item { index: 1 }, &layout));
    }

    #[test]
    fn test_canvas_drop_adds_root_layout() {
        let target = DropTarget::Canvas {
            page_id: "docs".into(),
        };
        let item = DragItem::NewLayout {
            template: "column-more".into(),
        };
        let Some(Mutation::Add(draft)) = plan_drop(&target, &item, false, None) else {
            panic!("expected an add");
        };
        assert_eq!(draft.kind, ComponentKind::Layout);
        assert_eq!(draft.page_id, "docs");
        assert!(draft.parent_id.is_none());
        assert_eq!(draft.styles["border"], "1px dashed #e5e7eb");
        assert_eq!(draft.styles["gridTemplateColumns"], "repeat(2,1fr)");
    }

    #[test]
    fn test_handled_drop_is_ignored() {
        let target = DropTarget::Canvas {
            page_id: "docs".into(),
        };
        let item = DragItem::NewLayout {
            template: "grid".into(),
        };
        assert_eq!(plan_drop(&target, &item, true, None), None);
    }

    #[test]
    fn test_container_drops() {
        let mut m = manager();
        let section = container(&mut m, "default");

        let target = DropTarget::Container(section.clone());
        let palette = DragItem::NewComponent {
            kind: ComponentKind::Text,
            content: "Hi".into(),
            styles: Styles::new(),
        };
        let Some(Mutation::Add(draft)) = plan_drop(&target, &palette, false, Some("#f00")) else {
            panic!("expected an add");
        };
        assert_eq!(draft.parent_id.as_deref(), Some(section.id.as_str()));
        assert_eq!(draft.page_id, "default");

        let nested = DragItem::NewLayout {
            template: "grid".into(),
        };
        let Some(Mutation::Add(draft)) = plan_drop(&target, &nested, false, Some("#f00")) else {
            panic!("expected an add");
        };
        assert_eq!(draft.styles["padding"], "8px");
        assert_eq!(draft.styles["border"], "1px dashed #f00");

        let onto_itself = DragItem::Existing {
            id: section.id.clone(),
            index: 0,
        };
        assert_eq!(plan_drop(&target, &onto_itself, false, None), None);
    }

    #[test]
    fn test_reorder_only_when_index_changes() {
        let item = DragItem::Existing {
            id: "a".into(),
            index: 2,
        };
        assert_eq!(
            plan_drop(&DropTarget::Item { index: 0 }, &item, false, None),
            Some(Mutation::Reorder { from: 2, to: 0 })
        );
        assert_eq!(
            plan_drop(&DropTarget::Item { index: 2 }, &item, false, None),
            None
        );
    }

    #[test]
    fn test_flush_applies_in_order() {
        let mut m = manager();
        let section = container(&mut m, "default");
        let text = m
            .add_component(ComponentDraft::new(ComponentKind::Text, "default"))
            .unwrap();

        let mut queue = MutationQueue::new();
        let item = DragItem::Existing {
            id: text.clone(),
            index: 1,
        };
        let planned = plan_drop(&DropTarget::Container(section.clone()), &item, false, None);
        queue.defer(planned.unwrap());
        queue.defer(Mutation::Reorder { from: 1, to: 0 });
        assert_eq!(queue.len(), 2);

        // Nothing changes until the queue is flushed.
        assert!(m.get_component(&text).unwrap().unwrap().parent_id.is_none());

        assert_eq!(queue.flush(&mut m).unwrap(), 2);
        assert!(queue.is_empty());
        let components = m.components().unwrap();
        assert_eq!(components[0].id, text);
        assert_eq!(components[0].parent_id.as_deref(), Some(section.id.as_str()));
    }

    #[test]
    fn test_flush_stops_at_first_error() {
        let mut m = manager();
        let text = m
            .add_component(ComponentDraft::new(ComponentKind::Text, "default"))
            .unwrap();

        let mut queue = MutationQueue::new();
        queue.defer(Mutation::Update {
            id: text.clone(),
            patch: ComponentPatch::new().content("first"),
        });
        queue.defer(Mutation::Reparent {
            id: text.clone(),
            parent_id: Some("missing".into()),
        });
        queue.defer(Mutation::Delete { id: text.clone() });

        let err = queue.flush(&mut m).unwrap_err();
        assert!(matches!(err, FolioError::InvalidParent { .. }));
        assert_eq!(queue.len(), 2);
        assert!(matches!(
            queue.pending().next(),
            Some(Mutation::Reparent { .. })
        ));
        assert_eq!(m.get_component(&text).unwrap().unwrap().content, "first");
    }
}
