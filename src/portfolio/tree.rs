//! Parent/child index over the component backing sequence.
//!
//! The document stores only parent pointers. `TreeIndex` is rebuilt in a
//! single pass whenever a structural question has to be answered and keeps
//! children in backing-sequence order, so every projection sees the same
//! sibling order the canvas does.

use std::collections::{HashMap, HashSet, VecDeque};

use super::model::Component;

/// Read-only index of a component slice.
#[derive(Debug)]
pub struct TreeIndex<'a> {
    components: &'a [Component],
    positions: HashMap<&'a str, usize>,
    children: HashMap<&'a str, Vec<usize>>,
}

impl<'a> TreeIndex<'a> {
    /// Builds the index in O(n).
    pub fn new(components: &'a [Component]) -> Self {
        let mut positions = HashMap::with_capacity(components.len());
        let mut children: HashMap<&'a str, Vec<usize>> = HashMap::new();
        for (i, component) in components.iter().enumerate() {
            positions.insert(component.id.as_str(), i);
            if let Some(ref parent) = component.parent_id {
                children.entry(parent.as_str()).or_default().push(i);
            }
        }
        Self {
            components,
            positions,
            children,
        }
    }

    /// Looks up a component by id.
    pub fn get(&self, id: &str) -> Option<&'a Component> {
        self.positions.get(id).map(|&i| &self.components[i])
    }

    /// Backing-sequence position of `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Direct children of `id` on the parent's page, in backing order.
    pub fn children(&self, id: &str) -> Vec<&'a Component> {
        let Some(parent) = self.get(id) else {
            return Vec::new();
        };
        self.children
            .get(id)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| &self.components[i])
                    .filter(|c| c.page_id == parent.page_id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Top-level nodes of a page. A node whose parent is missing or lives on
    /// another page is also treated as a root so it stays reachable.
    pub fn roots(&self, page_id: &str) -> Vec<&'a Component> {
        self.components
            .iter()
            .filter(|c| c.page_id == page_id)
            .filter(|c| match c.parent_id {
                None => true,
                Some(ref parent) => self
                    .get(parent)
                    .map(|p| p.page_id != c.page_id)
                    .unwrap_or(true),
            })
            .collect()
    }

    /// `id` and every transitive descendant (by parent pointer, any page).
    pub fn descendants_inclusive(&self, id: &str) -> HashSet<String> {
        let mut closure = HashSet::new();
        if !self.contains(id) {
            return closure;
        }
        let mut queue = VecDeque::from([id.to_string()]);
        while let Some(current) = queue.pop_front() {
            if !closure.insert(current.clone()) {
                continue;
            }
            if let Some(indices) = self.children.get(current.as_str()) {
                for &i in indices {
                    queue.push_back(self.components[i].id.clone());
                }
            }
        }
        closure
    }

    /// Ancestors of `id`, nearest first. Stops at a missing parent or on
    /// revisiting a node.
    pub fn ancestors(&self, id: &str) -> Vec<&'a Component> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut current = self.get(id).and_then(|c| c.parent_id.as_deref());
        while let Some(parent_id) = current {
            if !seen.insert(parent_id) {
                break;
            }
            match self.get(parent_id) {
                Some(parent) => {
                    out.push(parent);
                    current = parent.parent_id.as_deref();
                }
                None => break,
            }
        }
        out
    }

    /// True if making `new_parent` the parent of `id` would close a loop.
    pub fn would_cycle(&self, id: &str, new_parent: &str) -> bool {
        if id == new_parent {
            return true;
        }
        if self.get(new_parent).is_none() {
            return false;
        }
        self.ancestors(new_parent).iter().any(|a| a.id == id)
    }

    /// Depth of `id` below its page root (roots are 0).
    pub fn depth(&self, id: &str) -> usize {
        self.ancestors(id).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::model::{ComponentDraft, ComponentKind};

    fn node(id: &str, page: &str, parent: Option<&str>) -> Component {
        let mut draft = ComponentDraft::new(ComponentKind::Section, page);
        if let Some(p) = parent {
            draft = draft.with_parent(p);
        }
        draft.into_component(id)
    }

    fn sample() -> Vec<Component> {
        vec![
            node("a", "home", None),
            node("b", "home", Some("a")),
            node("c", "home", Some("b")),
            node("d", "home", None),
            node("e", "home", Some("a")),
            node("x", "docs", None),
        ]
    }

    #[test]
    fn test_children_keep_backing_order() {
        let components = sample();
        let index = TreeIndex::new(&components);
        let ids: Vec<_> = index.children("a").iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "e"]);
        assert!(index.children("missing").is_empty());
    }

    #[test]
    fn test_roots_per_page() {
        let components = sample();
        let index = TreeIndex::new(&components);
        let ids: Vec<_> = index.roots("home").iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert_eq!(index.roots("docs").len(), 1);
    }

    #[test]
    fn test_dangling_parent_is_root() {
        let components = vec![node("orphan", "home", Some("gone"))];
        let index = TreeIndex::new(&components);
        assert_eq!(index.roots("home").len(), 1);
    }

    #[test]
    fn test_descendants_closure() {
        let components = sample();
        let index = TreeIndex::new(&components);
        let closure = index.descendants_inclusive("a");
        let mut ids: Vec<_> = closure.iter().map(String::as_str).collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c", "e"]);
        assert!(index.descendants_inclusive("nope").is_empty());
    }

    #[test]
    fn test_would_cycle() {
        let components = sample();
        let index = TreeIndex::new(&components);
        assert!(index.would_cycle("a", "c"));
        assert!(index.would_cycle("a", "a"));
        assert!(!index.would_cycle("c", "d"));
        assert!(!index.would_cycle("d", "a"));
        assert_eq!(index.depth("c"), 2);
    }

    #[test]
    fn test_ancestors_survive_existing_cycle() {
        let components = vec![node("p", "home", Some("q")), node("q", "home", Some("p"))];
        let index = TreeIndex::new(&components);
        assert_eq!(index.ancestors("p").len(), 2);
    }
}
