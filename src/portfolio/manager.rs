//! Core PortfolioManager implementation with hybrid operations pattern.
//!
//! This module provides the main `PortfolioManager` struct that wraps an
//! Automerge document and provides:
//! - Tree mutations via autosurgeon (hydrate/reconcile) with parent validation
//! - Targeted O(1) updates for property-panel edits (content, styles, position)
//! - Whole-page actions: duplicate, clear, import, export
//!
//! Page and layout registry operations live in `pages.rs` and `layouts.rs`.

use automerge::{
    transaction::Transactable, AutoCommit, ChangeHash, ObjId, ReadDoc, ScalarValue, Value, ROOT,
};
use autosurgeon::{hydrate, reconcile};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::model::{
    new_id, now_millis, slugify, Component, ComponentDraft, ComponentPatch, DocumentRoot, Page,
    Position,
};
use super::tree::TreeIndex;
use crate::config::BuilderConfig;
use crate::error::{FolioError, FolioResult, InvalidParentReason};
use crate::projection::html::{self, Export, ExportFormat, ExportMode};
use crate::projection::import::import_draft;

/// The document store for a portfolio: components, pages, layouts and the
/// local selection.
///
/// Uses a hybrid approach:
/// - `update_state()` / `try_update_state()` for structural edits
/// - `set_component_*()` / `move_component()` for targeted puts (O(1) per field)
///
/// Selection is per-manager and never written into the shared document, so
/// two merged replicas can each have their own selection.
pub struct PortfolioManager {
    doc: AutoCommit,
    /// Cached hydrated state - invalidated after direct document mutations.
    cached_state: Option<DocumentRoot>,
    selected: Option<String>,
    config: BuilderConfig,
}

impl PortfolioManager {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Creates a manager seeded with one home page and one layout.
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    /// Creates a seeded manager using `config`.
    pub fn with_config(config: BuilderConfig) -> Self {
        let mut doc = AutoCommit::new();
        let root = DocumentRoot::seeded(&config);
        reconcile(&mut doc, &root).expect("Failed to initialize document");
        Self {
            doc,
            cached_state: Some(root),
            selected: None,
            config,
        }
    }

    /// Creates a manager whose document holds `root`.
    pub fn from_state(root: DocumentRoot, config: BuilderConfig) -> FolioResult<Self> {
        root.validate()?;
        let mut doc = AutoCommit::new();
        reconcile(&mut doc, &root)?;
        Ok(Self {
            doc,
            cached_state: Some(root),
            selected: None,
            config,
        })
    }

    /// Creates a manager from saved binary data.
    pub fn from_bytes(bytes: &[u8]) -> FolioResult<Self> {
        let doc = AutoCommit::load(bytes)?;
        Ok(Self {
            doc,
            cached_state: None,
            selected: None,
            config: BuilderConfig::default(),
        })
    }

    /// Builder configuration in effect.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Replaces the builder configuration. The document is untouched.
    pub fn set_config(&mut self, config: BuilderConfig) {
        self.config = config;
    }

    /// Saves the document to binary format.
    pub fn save(&mut self) -> Vec<u8> {
        self.doc.save()
    }

    /// Returns the current heads (for sync protocol).
    pub fn get_heads(&mut self) -> Vec<ChangeHash> {
        self.doc.get_heads()
    }

    /// Gets the actor ID for this document instance.
    pub fn actor_id(&self) -> String {
        self.doc.get_actor().to_hex_string()
    }

    // =========================================================================
    // HIGH-LEVEL OPERATIONS (via Hydrate/Reconcile)
    // =========================================================================

    /// Hydrates the entire document state to Rust structs.
    pub fn get_state(&mut self) -> FolioResult<DocumentRoot> {
        if let Some(ref cached) = self.cached_state {
            return Ok(cached.clone());
        }
        let state: DocumentRoot = hydrate(&self.doc)?;
        self.cached_state = Some(state.clone());
        Ok(state)
    }

    /// Applies a function to mutate the state, then reconciles back to the document.
    pub fn update_state<F>(&mut self, f: F) -> FolioResult<()>
    where
        F: FnOnce(&mut DocumentRoot),
    {
        self.try_update_state(|state| {
            f(state);
            Ok(())
        })
    }

    /// Like `update_state`, but the closure may reject the edit. Nothing is
    /// written when it returns `Err`.
    pub fn try_update_state<F, T>(&mut self, f: F) -> FolioResult<T>
    where
        F: FnOnce(&mut DocumentRoot) -> FolioResult<T>,
    {
        let mut state = self.get_state()?;
        let out = f(&mut state)?;
        reconcile(&mut self.doc, &state)?;
        self.cached_state = Some(state);
        Ok(out)
    }

    /// Serializes the document state as pretty JSON.
    pub fn export_json(&mut self) -> FolioResult<String> {
        let state = self.get_state()?;
        Ok(serde_json::to_string_pretty(&state)?)
    }

    /// Replaces the document state with a JSON snapshot produced by
    /// `export_json`.
    pub fn import_json(&mut self, json: &str) -> FolioResult<()> {
        let root: DocumentRoot = serde_json::from_str(json)?;
        if root.pages.is_empty() {
            return Err(FolioError::import("snapshot has no pages"));
        }
        if root.layouts.is_empty() {
            return Err(FolioError::import("snapshot has no layouts"));
        }
        if let Err(err) = root.validate() {
            warn!(error = %err, "snapshot rejected");
            return Err(err);
        }
        debug!(
            components = root.components.len(),
            pages = root.pages.len(),
            "importing snapshot"
        );
        self.update_state(|state| *state = root)?;
        self.prune_selection()
    }

    // =========================================================================
    // COMPONENT OPERATIONS
    // =========================================================================

    /// Appends a new component and returns its fresh id.
    ///
    /// A `parent_id` must name an existing component on the same page.
    pub fn add_component(&mut self, draft: ComponentDraft) -> FolioResult<String> {
        let id = new_id();
        self.try_update_state(|state| {
            if let Some(ref parent_id) = draft.parent_id {
                let index = TreeIndex::new(&state.components);
                check_parent(&index, &id, &draft.page_id, parent_id)?;
            }
            state.components.push(draft.into_component(id.clone()));
            Ok(())
        })?;
        debug!(%id, "component added");
        Ok(id)
    }

    /// Shallow-merges `patch` into the component. Unknown ids are ignored.
    ///
    /// When the patch touches `page_id` or `parent_id` the resulting pair is
    /// validated; moving a component with children to another page is
    /// refused.
    pub fn update_component(&mut self, id: &str, patch: ComponentPatch) -> FolioResult<()> {
        let changed = self.try_update_state(|state| {
            let Some(pos) = state.components.iter().position(|c| c.id == id) else {
                return Ok(false);
            };
            let mut updated = state.components[pos].clone();
            patch.apply_to(&mut updated);

            if patch.is_structural() {
                let index = TreeIndex::new(&state.components);
                if updated.page_id != state.components[pos].page_id
                    && !index.children(id).is_empty()
                {
                    return Err(FolioError::schema_violation(format!(
                        "component '{}' has children and cannot change page",
                        id
                    )));
                }
                if let Some(ref parent_id) = updated.parent_id {
                    check_parent(&index, id, &updated.page_id, parent_id)?;
                }
            }

            state.components[pos] = updated;
            Ok(true)
        })?;
        if changed {
            debug!(%id, structural = patch.is_structural(), "component updated");
        }
        Ok(())
    }

    /// Sets or clears a component's parent.
    pub fn reparent_component(&mut self, id: &str, parent_id: Option<&str>) -> FolioResult<()> {
        self.update_component(
            id,
            ComponentPatch::new().parent(parent_id.map(str::to_string)),
        )
    }

    /// Deletes a component and its whole subtree, clearing the selection if
    /// it pointed inside. Returns the number of components removed.
    pub fn delete_component(&mut self, id: &str) -> FolioResult<usize> {
        let removed = self.try_update_state(|state| {
            let closure = TreeIndex::new(&state.components).descendants_inclusive(id);
            if !closure.is_empty() {
                state.components.retain(|c| !closure.contains(&c.id));
            }
            Ok(closure)
        })?;
        self.forget_selection(&removed);
        if !removed.is_empty() {
            debug!(%id, removed = removed.len(), "component subtree deleted");
        }
        Ok(removed.len())
    }

    /// Sets the selection. No validation; the id may be stale.
    pub fn select_component(&mut self, id: Option<&str>) {
        self.selected = id.map(str::to_string);
    }

    /// Currently selected component id.
    pub fn selected_component(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Moves the element at `from` to `to` in the backing sequence.
    ///
    /// `to` is clamped after removal; an out-of-range `from` is ignored.
    pub fn reorder_components(&mut self, from: usize, to: usize) -> FolioResult<()> {
        self.update_state(|state| {
            if from >= state.components.len() {
                return;
            }
            let item = state.components.remove(from);
            let to = to.min(state.components.len());
            state.components.insert(to, item);
        })?;
        debug!(from, to, "components reordered");
        Ok(())
    }

    /// Components on `page_id`, in backing-sequence order.
    pub fn get_components_by_page(&mut self, page_id: &str) -> FolioResult<Vec<Component>> {
        let state = self.get_state()?;
        Ok(state.components_on_page(page_id).cloned().collect())
    }

    /// Gets a component by id.
    pub fn get_component(&mut self, id: &str) -> FolioResult<Option<Component>> {
        let state = self.get_state()?;
        Ok(state.component(id).cloned())
    }

    /// Every component on every page.
    pub fn components(&mut self) -> FolioResult<Vec<Component>> {
        Ok(self.get_state()?.components)
    }

    // =========================================================================
    // TARGETED COMPONENT UPDATES (Direct put, O(1) per field)
    // =========================================================================

    /// Overwrites a component's position. Unknown ids are ignored.
    pub fn move_component(&mut self, id: &str, position: Position) -> FolioResult<()> {
        let Some(obj) = self.find_component_obj(id)? else {
            return Ok(());
        };
        self.cached_state = None;
        let position_obj = self.get_obj_at_key(&obj, "position")?;
        self.doc.put(&position_obj, "x", ScalarValue::F64(position.x))?;
        self.doc.put(&position_obj, "y", ScalarValue::F64(position.y))?;
        Ok(())
    }

    /// Replaces a component's content. Unknown ids are ignored.
    pub fn set_component_content(&mut self, id: &str, content: &str) -> FolioResult<()> {
        let Some(obj) = self.find_component_obj(id)? else {
            return Ok(());
        };
        self.cached_state = None;
        self.doc
            .put(&obj, "content", ScalarValue::Str(content.into()))?;
        Ok(())
    }

    /// Sets one style property, or removes it with `None`. Other keys are
    /// left as they are.
    pub fn set_component_style(
        &mut self,
        id: &str,
        key: &str,
        value: Option<&str>,
    ) -> FolioResult<()> {
        let Some(obj) = self.find_component_obj(id)? else {
            return Ok(());
        };
        let styles_obj = self.get_obj_at_key(&obj, "styles")?;
        self.put_opt_str(&styles_obj, key, value)
    }

    // =========================================================================
    // PAGE-WIDE ACTIONS
    // =========================================================================

    /// Copies a page and its component forest under fresh ids. Parent links
    /// inside the page are remapped; links leaving the page are dropped.
    /// Returns the new page id, or `None` for an unknown page.
    pub fn duplicate_page(&mut self, page_id: &str) -> FolioResult<Option<String>> {
        let copy_id = self.try_update_state(|state| {
            let Some(source) = state.page(page_id).cloned() else {
                return Ok(None);
            };
            let copy_id = new_id();
            let name = format!("{} (copy)", source.name);

            let ids: HashMap<String, String> = state
                .components_on_page(page_id)
                .map(|c| (c.id.clone(), new_id()))
                .collect();
            let copies: Vec<Component> = state
                .components_on_page(page_id)
                .map(|c| Component {
                    id: ids[&c.id].clone(),
                    page_id: copy_id.clone(),
                    parent_id: c.parent_id.as_ref().and_then(|p| ids.get(p).cloned()),
                    ..c.clone()
                })
                .collect();

            state.pages.push(Page {
                id: copy_id.clone(),
                slug: slugify(&name),
                name,
                is_active: source.is_active,
                created_at: now_millis(),
                layout_id: source.layout_id,
            });
            state.components.extend(copies);
            Ok(Some(copy_id))
        })?;
        if let Some(ref id) = copy_id {
            debug!(source = %page_id, copy = %id, "page duplicated");
        }
        Ok(copy_id)
    }

    /// Removes every component on a page, plus any descendants parented
    /// into it from elsewhere. Returns the number removed.
    pub fn clear_page(&mut self, page_id: &str) -> FolioResult<usize> {
        let removed = self.try_update_state(|state| {
            let index = TreeIndex::new(&state.components);
            let closure: HashSet<String> = state
                .components_on_page(page_id)
                .flat_map(|c| index.descendants_inclusive(&c.id))
                .collect();
            state.components.retain(|c| !closure.contains(&c.id));
            Ok(closure)
        })?;
        self.forget_selection(&removed);
        debug!(%page_id, removed = removed.len(), "page cleared");
        Ok(removed.len())
    }

    /// Imports a file as one top-level component on the current page.
    pub fn import_file(&mut self, file_name: &str, text: &str) -> FolioResult<String> {
        let page_id = self
            .get_state()?
            .current_page_id
            .unwrap_or_else(|| self.config.default_page_id.clone());
        self.add_component(import_draft(file_name, text, &page_id))
    }

    /// Exports a page with flat (container-less) HTML.
    pub fn export_page(&mut self, page_id: &str, format: ExportFormat) -> FolioResult<Export> {
        self.export_page_with(page_id, format, ExportMode::Flat)
    }

    /// Exports a page, choosing how containers are handled.
    pub fn export_page_with(
        &mut self,
        page_id: &str,
        format: ExportFormat,
        mode: ExportMode,
    ) -> FolioResult<Export> {
        let state = self.get_state()?;
        let layout = state
            .page(page_id)
            .and_then(|p| p.layout_id.as_deref())
            .and_then(|id| state.layout(id))
            .or_else(|| {
                state
                    .current_layout_id
                    .as_deref()
                    .and_then(|id| state.layout(id))
            });
        let components: Vec<Component> = state.components_on_page(page_id).cloned().collect();
        Ok(html::export(
            &components,
            page_id,
            layout,
            format,
            mode,
            &self.config.export,
        ))
    }

    // =========================================================================
    // SYNC OPERATIONS
    // =========================================================================

    /// Merges another document into this one.
    pub fn merge(&mut self, other: &mut Self) -> FolioResult<()> {
        self.cached_state = None;
        self.doc.merge(&mut other.doc)?;
        self.prune_selection()
    }

    /// Generates sync message for incremental sync.
    /// Returns None if there are no changes since their_heads.
    pub fn generate_sync_message(&mut self, their_heads: &[ChangeHash]) -> Option<Vec<u8>> {
        let changes = self.doc.get_changes(their_heads);
        if changes.is_empty() {
            return None;
        }
        let mut bytes = Vec::new();
        for change in changes {
            bytes.extend_from_slice(change.raw_bytes());
        }
        Some(bytes)
    }

    /// Parses hex change hashes received from a peer. Any malformed entry
    /// fails the whole list.
    pub fn parse_heads<S: AsRef<str>>(heads: &[S]) -> FolioResult<Vec<ChangeHash>> {
        heads
            .iter()
            .map(|h| {
                h.as_ref()
                    .parse::<ChangeHash>()
                    .map_err(|_| FolioError::InvalidHash(h.as_ref().to_string()))
            })
            .collect()
    }

    /// Applies sync message from peer.
    pub fn apply_sync_message(&mut self, msg: &[u8]) -> FolioResult<()> {
        self.cached_state = None;
        self.doc.load_incremental(msg)?;
        self.prune_selection()
    }

    // =========================================================================
    // INTERNAL HELPERS
    // =========================================================================

    /// Drops the selection if it is in `removed`.
    pub(crate) fn forget_selection(&mut self, removed: &HashSet<String>) {
        if self
            .selected
            .as_ref()
            .is_some_and(|selected| removed.contains(selected))
        {
            self.selected = None;
        }
    }

    /// Drops the selection if the component no longer exists.
    fn prune_selection(&mut self) -> FolioResult<()> {
        if let Some(selected) = self.selected.clone() {
            if self.get_state()?.component(&selected).is_none() {
                self.selected = None;
            }
        }
        Ok(())
    }

    /// Materializes drafts under fresh ids.
    pub(crate) fn seed_components(state: &mut DocumentRoot, drafts: Vec<ComponentDraft>) {
        state
            .components
            .extend(drafts.into_iter().map(|d| d.into_component(new_id())));
    }

    /// Scans the components list for the entry whose `id` matches.
    fn find_component_obj(&self, id: &str) -> FolioResult<Option<ObjId>> {
        self.find_entry_obj("components", id)
    }

    /// Scans a root-level list of keyed records for the entry whose `id`
    /// matches.
    pub(crate) fn find_entry_obj(&self, list_key: &str, id: &str) -> FolioResult<Option<ObjId>> {
        let list = self.get_obj_at_key(&ROOT, list_key)?;
        for i in 0..self.doc.length(&list) {
            let Some((Value::Object(_), obj)) = self.doc.get(&list, i)? else {
                continue;
            };
            if let Some((Value::Scalar(s), _)) = self.doc.get(&obj, "id")? {
                if let ScalarValue::Str(candidate) = s.as_ref() {
                    if candidate.as_str() == id {
                        return Ok(Some(obj));
                    }
                }
            }
        }
        Ok(None)
    }

    /// Writes a string at `key`, or removes the key for `None`.
    pub(crate) fn put_opt_str(
        &mut self,
        obj: &ObjId,
        key: &str,
        value: Option<&str>,
    ) -> FolioResult<()> {
        self.cached_state = None;
        match value {
            Some(v) => self.doc.put(obj, key, ScalarValue::Str(v.into()))?,
            None => {
                if self.doc.get(obj, key)?.is_some() {
                    self.doc.delete(obj, key)?;
                }
            }
        }
        Ok(())
    }

    /// Gets an object ID at a map key.
    pub(crate) fn get_obj_at_key(&self, parent: &ObjId, key: &str) -> FolioResult<ObjId> {
        match self.doc.get(parent, key) {
            Ok(Some((Value::Object(_), obj_id))) => Ok(obj_id),
            Ok(Some(_)) => Err(FolioError::schema_violation(format!(
                "'{}' is not an object",
                key
            ))),
            Ok(None) => Err(FolioError::field_not_found(key)),
            Err(e) => Err(FolioError::Automerge(e)),
        }
    }
}

impl Default for PortfolioManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Rejects a parent that is missing, on another page, the node itself, or
/// one of its descendants.
fn check_parent(
    index: &TreeIndex<'_>,
    id: &str,
    page_id: &str,
    parent_id: &str,
) -> FolioResult<()> {
    let reason = if parent_id == id {
        Some(InvalidParentReason::SelfParent)
    } else {
        match index.get(parent_id) {
            None => Some(InvalidParentReason::Missing),
            Some(parent) if parent.page_id != page_id => Some(InvalidParentReason::CrossPage {
                parent_page: parent.page_id.clone(),
                child_page: page_id.to_string(),
            }),
            Some(_) if index.would_cycle(id, parent_id) => Some(InvalidParentReason::Cycle),
            Some(_) => None,
        }
    };
    match reason {
        Some(reason) => {
            warn!(%id, %parent_id, %reason, "parent rejected");
            Err(FolioError::invalid_parent(id, parent_id, reason))
        }
        None => Ok(()),
    }
}

// =============================================================================
// TESTS
// =============================================================================
