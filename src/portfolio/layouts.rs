//! Layout registry operations on `PortfolioManager`.

use paste::paste;
use tracing::{debug, warn};

use super::manager::PortfolioManager;
use super::model::{new_id, Layout, LayoutDraft, LayoutPatch};
use super::palette::Theme;
use crate::error::FolioResult;

// =============================================================================
// SETTINGS SETTER MACRO
// =============================================================================

/// Generates a targeted O(1) setter for one `LayoutSettings` field.
/// Path: locate layout → get settings ObjId → put/delete.
macro_rules! layout_setting {
    ($($field:ident),+ $(,)?) => {
        paste! {
            $(
                #[doc = "Sets the layout's `" $field "` setting, or clears it with `None`. Unknown ids are ignored."]
                pub fn [<set_layout_ $field>](&mut self, id: &str, value: Option<&str>) -> FolioResult<()> {
                    let Some(obj) = self.find_entry_obj("layouts", id)? else {
                        return Ok(());
                    };
                    let settings = self.get_obj_at_key(&obj, "settings")?;
                    self.put_opt_str(&settings, stringify!($field), value)
                }
            )+
        }
    };
}

impl PortfolioManager {
    /// Adds a layout and makes it current.
    pub fn add_layout(&mut self, draft: LayoutDraft) -> FolioResult<String> {
        let id = new_id();
        self.update_state(|state| {
            state.layouts.push(draft.into_layout(id.clone()));
            state.current_layout_id = Some(id.clone());
        })?;
        debug!(%id, "layout added");
        Ok(id)
    }

    /// Shallow-merges `patch` into a layout. A `settings` patch replaces the
    /// whole settings object. Unknown ids are ignored.
    pub fn update_layout(&mut self, id: &str, patch: LayoutPatch) -> FolioResult<()> {
        self.update_state(|state| {
            if let Some(layout) = state.layouts.iter_mut().find(|l| l.id == id) {
                patch.apply_to(layout);
            }
        })
    }

    /// Deletes a layout, keeping at least one. Falls back to the first
    /// layout when the current one goes. Returns whether it was removed.
    pub fn delete_layout(&mut self, id: &str) -> FolioResult<bool> {
        let removed = self.try_update_state(|state| {
            if state.layout(id).is_none() {
                return Ok(false);
            }
            if state.layouts.len() <= 1 {
                warn!(%id, "refusing to delete the last layout");
                return Ok(false);
            }
            state.layouts.retain(|l| l.id != id);
            if state.current_layout_id.as_deref() == Some(id) {
                state.current_layout_id = state.layouts.first().map(|l| l.id.clone());
            }
            Ok(true)
        })?;
        if removed {
            debug!(%id, "layout deleted");
        }
        Ok(removed)
    }

    /// Points the current layout at `id`. Unknown ids are ignored.
    pub fn set_current_layout(&mut self, id: &str) -> FolioResult<()> {
        self.update_state(|state| {
            if state.layout(id).is_some() {
                state.current_layout_id = Some(id.to_string());
            }
        })
    }

    /// The current layout, if the pointer is set and resolves.
    pub fn get_current_layout(&mut self) -> FolioResult<Option<Layout>> {
        let state = self.get_state()?;
        Ok(state
            .current_layout_id
            .as_deref()
            .and_then(|id| state.layout(id))
            .cloned())
    }

    /// Every layout, in creation order.
    pub fn layouts(&mut self) -> FolioResult<Vec<Layout>> {
        Ok(self.get_state()?.layouts)
    }

    /// Writes a theme's colors into the current layout, keeping its other
    /// settings.
    pub fn apply_theme(&mut self, theme: &Theme) -> FolioResult<()> {
        let Some(id) = self.get_state()?.current_layout_id else {
            return Ok(());
        };
        self.set_layout_background_color(&id, Some(theme.background))?;
        self.set_layout_text_color(&id, Some(theme.text))?;
        self.set_layout_accent_color(&id, Some(theme.accent))?;
        debug!(layout = %id, theme = theme.name, "theme applied");
        Ok(())
    }

    /// Accent color of the current layout.
    pub fn current_accent(&mut self) -> FolioResult<Option<String>> {
        Ok(self
            .get_current_layout()?
            .and_then(|layout| layout.settings.accent_color))
    }

    layout_setting!(
        max_width,
        padding,
        background_color,
        surface_color,
        text_color,
        accent_color,
        gap,
    );
}
