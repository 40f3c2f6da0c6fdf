//! WASM bindings for the portfolio module.
//!
//! This module provides JavaScript-friendly wrappers around the
//! PortfolioManager for use in the browser builder.

use js_sys::{Array, Uint8Array};
use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

use crate::portfolio::manager::PortfolioManager;
use crate::portfolio::model::*;
use crate::portfolio::palette::{self, palette_draft};
use crate::projection::{build_outline, ExportFormat, ExportMode, OutlineState};
use crate::FolioError;

/// Serialize a value to JsValue with HashMaps as plain JS objects (not Map).
fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&Serializer::new().serialize_maps_as_objects(true))
}

// =============================================================================
// ERROR CONVERSION
// =============================================================================

/// Helper macro for Result conversion
macro_rules! js_result {
    ($expr:expr) => {
        $expr.map_err(|e: FolioError| JsValue::from_str(&e.to_string()))
    };
}

// =============================================================================
// MAIN WRAPPER TYPE
// =============================================================================

/// JavaScript-friendly wrapper around PortfolioManager.
///
/// Keeps the structure view's collapse flags next to the store so the
/// outline can be requested in one call.
#[wasm_bindgen]
pub struct JsPortfolioManager {
    inner: PortfolioManager,
    outline: OutlineState,
}

#[wasm_bindgen]
impl JsPortfolioManager {
    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Creates a manager with one home page and one layout.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const manager = new JsPortfolioManager();
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsPortfolioManager {
        JsPortfolioManager {
            inner: PortfolioManager::new(),
            outline: OutlineState::new(),
        }
    }

    /// Loads from binary bytes (Uint8Array).
    #[wasm_bindgen(js_name = fromBytes)]
    pub fn from_bytes(bytes: &[u8]) -> Result<JsPortfolioManager, JsValue> {
        let inner = js_result!(PortfolioManager::from_bytes(bytes))?;
        Ok(JsPortfolioManager {
            inner,
            outline: OutlineState::new(),
        })
    }

    /// Saves to binary bytes (returns Uint8Array).
    #[wasm_bindgen(js_name = toBytes)]
    pub fn to_bytes(&mut self) -> Uint8Array {
        let bytes = self.inner.save();
        Uint8Array::from(&bytes[..])
    }

    /// Gets the actor ID for this document instance.
    #[wasm_bindgen(js_name = actorId)]
    pub fn actor_id(&self) -> String {
        self.inner.actor_id()
    }

    /// Gets the current heads (for sync protocol).
    #[wasm_bindgen(js_name = getHeads)]
    pub fn get_heads(&mut self) -> Array {
        self.inner
            .get_heads()
            .into_iter()
            .map(|h| JsValue::from_str(&h.to_string()))
            .collect()
    }

    // =========================================================================
    // STATE ACCESS
    // =========================================================================

    /// Gets the full document state as a JavaScript object.
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&mut self) -> Result<JsValue, JsValue> {
        let state = js_result!(self.inner.get_state())?;
        Ok(to_js_value(&state)?)
    }

    /// Serializes the document state as JSON text.
    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&mut self) -> Result<String, JsValue> {
        js_result!(self.inner.export_json())
    }

    /// Replaces the document state from JSON text.
    #[wasm_bindgen(js_name = importJson)]
    pub fn import_json(&mut self, json: &str) -> Result<(), JsValue> {
        js_result!(self.inner.import_json(json))
    }

    // =========================================================================
    // COMPONENT OPERATIONS
    // =========================================================================

    /// Adds a component and returns its id.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const id = manager.addComponent({
    ///   type: 'header',
    ///   content: 'Hi',
    ///   page_id: 'default',
    ///   styles: { color: '#222' }
    /// });
    /// ```
    #[wasm_bindgen(js_name = addComponent)]
    pub fn add_component(&mut self, draft: JsValue) -> Result<String, JsValue> {
        let draft: ComponentDraft = from_value(draft)?;
        js_result!(self.inner.add_component(draft))
    }

    /// Adds the palette default for `kind` to a page.
    #[wasm_bindgen(js_name = addFromPalette)]
    pub fn add_from_palette(&mut self, kind: &str, page_id: &str) -> Result<String, JsValue> {
        let kind: ComponentKind = kind
            .parse()
            .map_err(|e: UnknownKind| JsValue::from_str(&e.to_string()))?;
        js_result!(self.inner.add_component(palette_draft(kind, page_id)))
    }

    /// Shallow-merges a partial component.
    #[wasm_bindgen(js_name = updateComponent)]
    pub fn update_component(&mut self, id: &str, patch: JsValue) -> Result<(), JsValue> {
        let patch: ComponentPatch = from_value(patch)?;
        js_result!(self.inner.update_component(id, patch))
    }

    /// Deletes a component subtree; returns how many were removed.
    #[wasm_bindgen(js_name = deleteComponent)]
    pub fn delete_component(&mut self, id: &str) -> Result<usize, JsValue> {
        js_result!(self.inner.delete_component(id))
    }

    /// Sets or clears the selection.
    #[wasm_bindgen(js_name = selectComponent)]
    pub fn select_component(&mut self, id: Option<String>) {
        self.inner.select_component(id.as_deref());
    }

    /// Currently selected id, or undefined.
    #[wasm_bindgen(js_name = selectedComponent)]
    pub fn selected_component(&self) -> Option<String> {
        self.inner.selected_component().map(str::to_string)
    }

    /// Overwrites a component's position.
    #[wasm_bindgen(js_name = moveComponent)]
    pub fn move_component(&mut self, id: &str, x: f64, y: f64) -> Result<(), JsValue> {
        js_result!(self.inner.move_component(id, Position::new(x, y)))
    }

    /// Moves an entry of the backing sequence.
    #[wasm_bindgen(js_name = reorderComponents)]
    pub fn reorder_components(&mut self, from: usize, to: usize) -> Result<(), JsValue> {
        js_result!(self.inner.reorder_components(from, to))
    }

    /// Sets or clears a component's parent.
    #[wasm_bindgen(js_name = reparentComponent)]
    pub fn reparent_component(&mut self, id: &str, parent_id: Option<String>) -> Result<(), JsValue> {
        js_result!(self.inner.reparent_component(id, parent_id.as_deref()))
    }

    /// Sets a component's content (O(1)).
    #[wasm_bindgen(js_name = setComponentContent)]
    pub fn set_component_content(&mut self, id: &str, content: &str) -> Result<(), JsValue> {
        js_result!(self.inner.set_component_content(id, content))
    }

    /// Sets or removes one style property (O(1)).
    #[wasm_bindgen(js_name = setComponentStyle)]
    pub fn set_component_style(
        &mut self,
        id: &str,
        key: &str,
        value: Option<String>,
    ) -> Result<(), JsValue> {
        js_result!(self.inner.set_component_style(id, key, value.as_deref()))
    }

    /// Components on a page, in order.
    #[wasm_bindgen(js_name = getComponentsByPage)]
    pub fn get_components_by_page(&mut self, page_id: &str) -> Result<JsValue, JsValue> {
        let components = js_result!(self.inner.get_components_by_page(page_id))?;
        Ok(to_js_value(&components)?)
    }

    // =========================================================================
    // PAGE OPERATIONS
    // =========================================================================

    /// Adds a page, makes it current, returns its id.
    #[wasm_bindgen(js_name = addPage)]
    pub fn add_page(&mut self, name: &str, layout_id: Option<String>) -> Result<String, JsValue> {
        js_result!(self.inner.add_page(name, layout_id.as_deref()))
    }

    /// Deletes a page; false when refused.
    #[wasm_bindgen(js_name = deletePage)]
    pub fn delete_page(&mut self, id: &str) -> Result<bool, JsValue> {
        js_result!(self.inner.delete_page(id))
    }

    #[wasm_bindgen(js_name = setCurrentPage)]
    pub fn set_current_page(&mut self, id: &str) -> Result<(), JsValue> {
        js_result!(self.inner.set_current_page(id))
    }

    #[wasm_bindgen(js_name = updatePage)]
    pub fn update_page(&mut self, id: &str, patch: JsValue) -> Result<(), JsValue> {
        let patch: PagePatch = from_value(patch)?;
        js_result!(self.inner.update_page(id, patch))
    }

    #[wasm_bindgen(js_name = getCurrentPage)]
    pub fn get_current_page(&mut self) -> Result<JsValue, JsValue> {
        let page = js_result!(self.inner.get_current_page())?;
        Ok(to_js_value(&page)?)
    }

    /// Copies a page with all its components; returns the new id.
    #[wasm_bindgen(js_name = duplicatePage)]
    pub fn duplicate_page(&mut self, id: &str) -> Result<Option<String>, JsValue> {
        js_result!(self.inner.duplicate_page(id))
    }

    /// Removes every component on a page. Confirmation is the caller's job.
    #[wasm_bindgen(js_name = clearPage)]
    pub fn clear_page(&mut self, id: &str) -> Result<usize, JsValue> {
        js_result!(self.inner.clear_page(id))
    }

    // =========================================================================
    // LAYOUT OPERATIONS
    // =========================================================================

    /// Adds a layout and makes it current.
    #[wasm_bindgen(js_name = addLayout)]
    pub fn add_layout(&mut self, draft: JsValue) -> Result<String, JsValue> {
        let draft: LayoutDraft = from_value(draft)?;
        js_result!(self.inner.add_layout(draft))
    }

    #[wasm_bindgen(js_name = updateLayout)]
    pub fn update_layout(&mut self, id: &str, patch: JsValue) -> Result<(), JsValue> {
        let patch: LayoutPatch = from_value(patch)?;
        js_result!(self.inner.update_layout(id, patch))
    }

    #[wasm_bindgen(js_name = deleteLayout)]
    pub fn delete_layout(&mut self, id: &str) -> Result<bool, JsValue> {
        js_result!(self.inner.delete_layout(id))
    }

    #[wasm_bindgen(js_name = setCurrentLayout)]
    pub fn set_current_layout(&mut self, id: &str) -> Result<(), JsValue> {
        js_result!(self.inner.set_current_layout(id))
    }

    #[wasm_bindgen(js_name = getCurrentLayout)]
    pub fn get_current_layout(&mut self) -> Result<JsValue, JsValue> {
        let layout = js_result!(self.inner.get_current_layout())?;
        Ok(to_js_value(&layout)?)
    }

    /// Applies a named theme (Light, Dark, Blue, Green, Purple).
    #[wasm_bindgen(js_name = applyTheme)]
    pub fn apply_theme(&mut self, name: &str) -> Result<(), JsValue> {
        let theme = palette::theme(name)
            .ok_or_else(|| JsValue::from_str(&format!("unknown theme '{}'", name)))?;
        js_result!(self.inner.apply_theme(theme))
    }

    // =========================================================================
    // PROJECTIONS
    // =========================================================================

    /// Exports a page as `{ file_name, mime_type, body }`.
    ///
    /// `format` is "html", "print" or "word"; `nested` keeps containers.
    #[wasm_bindgen(js_name = exportPage)]
    pub fn export_page(&mut self, page_id: &str, format: &str, nested: bool) -> Result<JsValue, JsValue> {
        let format: ExportFormat = format.parse().map_err(|e: String| JsValue::from_str(&e))?;
        let mode = if nested {
            ExportMode::Nested
        } else {
            ExportMode::Flat
        };
        let export = js_result!(self.inner.export_page_with(page_id, format, mode))?;
        Ok(to_js_value(&export)?)
    }

    /// Imports an uploaded file onto the current page; returns the new id.
    #[wasm_bindgen(js_name = importFile)]
    pub fn import_file(&mut self, file_name: &str, text: &str) -> Result<String, JsValue> {
        js_result!(self.inner.import_file(file_name, text))
    }

    /// Structure view rows for a page.
    #[wasm_bindgen(js_name = getOutline)]
    pub fn get_outline(&mut self, page_id: &str) -> Result<JsValue, JsValue> {
        let components = js_result!(self.inner.components())?;
        let outline = build_outline(&components, page_id, &self.outline);
        Ok(to_js_value(&outline)?)
    }

    /// Flips a structure view row; returns the new collapsed state.
    #[wasm_bindgen(js_name = toggleOutline)]
    pub fn toggle_outline(&mut self, id: &str) -> bool {
        self.outline.toggle(id)
    }

    // =========================================================================
    // SYNC OPERATIONS
    // =========================================================================

    /// Merges another manager's changes into this one.
    #[wasm_bindgen]
    pub fn merge(&mut self, other: &mut JsPortfolioManager) -> Result<(), JsValue> {
        js_result!(self.inner.merge(&mut other.inner))
    }

    /// Gets changes since the given heads (hex strings) as a Uint8Array,
    /// or null when there is nothing new.
    #[wasm_bindgen(js_name = getChangesSince)]
    pub fn get_changes_since(&mut self, their_heads: Array) -> Result<JsValue, JsValue> {
        let raw: Vec<String> = their_heads
            .iter()
            .map(|v| v.as_string().unwrap_or_default())
            .collect();
        let heads = js_result!(PortfolioManager::parse_heads(&raw))?;
        match self.inner.generate_sync_message(&heads) {
            Some(bytes) => Ok(Uint8Array::from(&bytes[..]).into()),
            None => Ok(JsValue::NULL),
        }
    }

    /// Applies incremental changes from a peer.
    #[wasm_bindgen(js_name = applyChanges)]
    pub fn apply_changes(&mut self, changes: &[u8]) -> Result<(), JsValue> {
        js_result!(self.inner.apply_sync_message(changes))
    }
}

impl Default for JsPortfolioManager {
    fn default() -> Self {
        Self::new()
    }
}
