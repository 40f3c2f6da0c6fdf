//! Read-only projections of the component tree.
//!
//! Every surface (canvas preview, structure view, exporters) is a pure
//! function of the component list plus the current layout:
//! - `render`: nested render tree and its preview HTML
//! - `html`: flat and nested HTML / print / Word exports
//! - `outline`: collapsible structure view
//! - `import`: the inverse direction, one file to one component draft

pub mod html;
pub mod import;
pub mod outline;
pub mod render;

pub use html::{flatten, style_string, Export, ExportFormat, ExportMode};
pub use import::import_draft;
pub use outline::{build_outline, OutlineNode, OutlineState};
pub use render::{render_html, render_tree, Element, RenderNode};
