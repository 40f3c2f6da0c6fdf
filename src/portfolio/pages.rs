//! Page registry operations on `PortfolioManager`.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::manager::PortfolioManager;
use super::model::{new_id, now_millis, slugify, Page, PagePatch};
use super::palette::{empty_page_sample, new_page_samples};
use crate::error::FolioResult;

impl PortfolioManager {
    /// Creates a page, makes it current and seeds a header and a text block
    /// onto it. `layout_id` defaults to the current layout.
    pub fn add_page(&mut self, name: &str, layout_id: Option<&str>) -> FolioResult<String> {
        let id = new_id();
        let seed = self.config().seed_new_pages;
        self.update_state(|state| {
            let layout_id = layout_id
                .map(str::to_string)
                .or_else(|| state.current_layout_id.clone());
            state.pages.push(Page {
                id: id.clone(),
                name: name.to_string(),
                slug: slugify(name),
                is_active: true,
                created_at: now_millis(),
                layout_id,
            });
            state.current_page_id = Some(id.clone());
            if seed && state.components_on_page(&id).next().is_none() {
                Self::seed_components(state, new_page_samples(&id));
            }
        })?;
        debug!(%id, %name, "page added");
        Ok(id)
    }

    /// Deletes a page and the components on it. Refuses to delete the last
    /// page; returns whether anything was removed.
    pub fn delete_page(&mut self, id: &str) -> FolioResult<bool> {
        let removed = self.try_update_state(|state| {
            if state.page(id).is_none() {
                return Ok(None);
            }
            if state.pages.len() <= 1 {
                warn!(%id, "refusing to delete the last page");
                return Ok(None);
            }
            state.pages.retain(|p| p.id != id);
            if state.current_page_id.as_deref() == Some(id) {
                state.current_page_id = state.pages.first().map(|p| p.id.clone());
            }
            let on_page: HashSet<String> = state
                .components_on_page(id)
                .map(|c| c.id.clone())
                .collect();
            state.components.retain(|c| !on_page.contains(&c.id));
            Ok(Some(on_page))
        })?;
        match removed {
            Some(components) => {
                self.forget_selection(&components);
                debug!(%id, components = components.len(), "page deleted");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Makes a page current, applying its layout. An empty page gets a
    /// sample header. Unknown ids are ignored.
    pub fn set_current_page(&mut self, id: &str) -> FolioResult<()> {
        let seed = self.config().seed_new_pages;
        self.update_state(|state| {
            let Some(page) = state.page(id) else {
                return;
            };
            let layout_id = page.layout_id.clone();
            state.current_page_id = Some(id.to_string());
            if let Some(layout_id) = layout_id {
                if state.layout(&layout_id).is_some() {
                    state.current_layout_id = Some(layout_id);
                }
            }
            if seed && state.components_on_page(id).next().is_none() {
                Self::seed_components(state, vec![empty_page_sample(id)]);
            }
        })
    }

    /// Shallow-merges `patch` into a page. Unknown ids are ignored.
    pub fn update_page(&mut self, id: &str, patch: PagePatch) -> FolioResult<()> {
        self.update_state(|state| {
            if let Some(page) = state.pages.iter_mut().find(|p| p.id == id) {
                patch.apply_to(page);
            }
        })
    }

    /// The current page, if the pointer is set and resolves.
    pub fn get_current_page(&mut self) -> FolioResult<Option<Page>> {
        let state = self.get_state()?;
        Ok(state
            .current_page_id
            .as_deref()
            .and_then(|id| state.page(id))
            .cloned())
    }

    /// Every page, in creation order.
    pub fn pages(&mut self) -> FolioResult<Vec<Page>> {
        Ok(self.get_state()?.pages)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BuilderConfig;
    use crate::portfolio::model::{ComponentDraft, ComponentKind, LayoutDraft, PagePatch};
    use crate::portfolio::PortfolioManager;

    #[test]
    fn test_add_page_seeds_samples() {
        let mut manager = PortfolioManager::new();
        let id = manager.add_page("About Me", None).unwrap();

        let page = manager.get_current_page().unwrap().unwrap();
        assert_eq!(page.id, id);
        assert_eq!(page.slug, "about-me");
        assert_eq!(page.layout_id.as_deref(), Some("default"));

        let components = manager.get_components_by_page(&id).unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].content, "Welcome to my portfolio");
        assert_eq!(components[0].style("fontSize"), Some("28px"));
        assert_eq!(components[1].position.y, 80.0);
    }

    #[test]
    fn test_add_page_without_seeding() {
        let mut manager =
            PortfolioManager::with_config(BuilderConfig::new().with_seed_new_pages(false));
        let id = manager.add_page("Blank", None).unwrap();
        assert!(manager.get_components_by_page(&id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_last_page_is_refused() {
        let mut manager = PortfolioManager::new();
        let before = manager.pages().unwrap();
        assert!(!manager.delete_page("default").unwrap());
        assert_eq!(manager.pages().unwrap(), before);
    }

    #[test]
    fn test_delete_current_page_falls_back() {
        let mut manager = PortfolioManager::new();
        let docs = manager.add_page("Docs", None).unwrap();
        let header = manager.get_components_by_page(&docs).unwrap()[0].id.clone();
        manager.select_component(Some(&header));

        assert!(manager.delete_page(&docs).unwrap());
        assert_eq!(manager.get_current_page().unwrap().unwrap().id, "default");
        assert!(manager.get_components_by_page(&docs).unwrap().is_empty());
        assert_eq!(manager.selected_component(), None);
        assert!(!manager.delete_page("missing").unwrap());
    }

    #[test]
    fn test_set_current_page_applies_layout_and_seeds() {
        let mut manager =
            PortfolioManager::with_config(BuilderConfig::new().with_seed_new_pages(false));
        let grid = manager.add_layout(LayoutDraft::new("Grid", "grid")).unwrap();
        let page = manager.add_page("Gallery", Some(&grid)).unwrap();
        manager.set_current_layout("default").unwrap();

        manager.set_config(BuilderConfig::default());
        manager.set_current_page(&page).unwrap();
        assert_eq!(manager.get_current_layout().unwrap().unwrap().id, grid);

        let components = manager.get_components_by_page(&page).unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].content, "Page title");

        // a page with content is not seeded again
        manager.set_current_page("default").unwrap();
        manager
            .add_component(ComponentDraft::new(ComponentKind::Text, "default"))
            .unwrap();
        manager.set_current_page(&page).unwrap();
        assert_eq!(manager.get_components_by_page(&page).unwrap().len(), 1);
    }

    #[test]
    fn test_set_current_page_unknown_is_noop() {
        let mut manager = PortfolioManager::new();
        manager.set_current_page("nope").unwrap();
        assert_eq!(manager.get_current_page().unwrap().unwrap().id, "default");
    }

    #[test]
    fn test_update_page() {
        let mut manager = PortfolioManager::new();
        manager
            .update_page("default", PagePatch::new().name("Start").active(false))
            .unwrap();
        let page = manager.get_current_page().unwrap().unwrap();
        assert_eq!(page.name, "Start");
        assert_eq!(page.slug, "home");
        assert!(!page.is_active);
    }
}
