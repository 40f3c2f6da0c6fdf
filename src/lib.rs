//! Foliocraft - document engine for a drag-and-drop portfolio page builder.
//!
//! The document is a page-scoped forest of components plus a registry of
//! pages and layouts, stored in an Automerge document through Autosurgeon:
//!
//! - **Validated tree**: every `parent_id` must exist, share the child's page
//!   and not create a cycle; deleting a node deletes its subtree
//! - **Pure projections**: the preview, structure view and exporters are
//!   functions of the component list and the current layout
//! - **Two-phase drops**: drag-and-drop mutations are planned during the drop
//!   and applied once the gesture has unwound
//!
//! # Example
//!
//! ```rust
//! use foliocraft::{ComponentDraft, ComponentKind, ExportFormat, PortfolioManager};
//!
//! let mut manager = PortfolioManager::new();
//!
//! let section = manager
//!     .add_component(ComponentDraft::new(ComponentKind::Section, "default"))
//!     .unwrap();
//! manager
//!     .add_component(
//!         ComponentDraft::new(ComponentKind::Header, "default")
//!             .with_content("Hi, I'm Ana")
//!             .with_parent(section.clone()),
//!     )
//!     .unwrap();
//!
//! let export = manager.export_page("default", ExportFormat::Html).unwrap();
//! assert_eq!(export.file_name, "portfolio.html");
//! assert!(export.body.contains("Hi, I&#39;m Ana"));
//!
//! // Binary snapshot for sync or storage
//! let bytes = manager.save();
//! assert!(!bytes.is_empty());
//! ```

pub mod chat;
pub mod config;
pub mod dnd;
pub mod error;
pub mod portfolio;
pub mod projection;

// Re-exports for convenience
pub use config::{BuilderConfig, ExportOptions};
pub use error::{FolioError, FolioResult, InvalidParentReason};
pub use portfolio::{
    Component, ComponentDraft, ComponentKind, ComponentPatch, DocumentRoot, Layout, LayoutDraft,
    LayoutPatch, LayoutSettings, Page, PagePatch, PortfolioManager, Position,
};
pub use projection::{Export, ExportFormat, ExportMode};

#[cfg(feature = "wasm")]
pub use portfolio::JsPortfolioManager;
