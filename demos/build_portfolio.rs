//! Builds a two-page portfolio the way the editor would, then prints the
//! structure view and writes the exports next to the working directory.
//!
//! Run with: cargo run --example build_portfolio

use foliocraft::dnd::{plan_drop, DragItem, DropTarget, MutationQueue};
use foliocraft::portfolio::palette::{self, ContainerTemplate};
use foliocraft::portfolio::palette_draft;
use foliocraft::projection::{build_outline, OutlineNode, OutlineState};
use foliocraft::{ComponentKind, ComponentPatch, ExportFormat, ExportMode, PortfolioManager};

fn print_outline(nodes: &[OutlineNode]) {
    for node in nodes {
        let marker = match (node.has_children, node.collapsed) {
            (false, _) => " ",
            (true, false) => "v",
            (true, true) => ">",
        };
        println!(
            "{}{} {} [{}]",
            "  ".repeat(node.depth),
            marker,
            node.label,
            node.icon_key
        );
        print_outline(&node.children);
    }
}

fn main() -> foliocraft::FolioResult<()> {
    let mut manager = PortfolioManager::new();
    let accent = manager.current_accent()?;

    // Drop a two-column container on the canvas
    let mut queue = MutationQueue::new();
    let canvas = DropTarget::Canvas {
        page_id: "default".to_string(),
    };
    let layout = DragItem::NewLayout {
        template: ContainerTemplate::ColumnMore.key().to_string(),
    };
    if let Some(mutation) = plan_drop(&canvas, &layout, false, accent.as_deref()) {
        queue.defer(mutation);
    }
    queue.flush(&mut manager)?;

    // Drop palette items into it
    let columns = manager
        .get_components_by_page("default")?
        .into_iter()
        .find(|c| c.kind == ComponentKind::Layout)
        .ok_or_else(|| foliocraft::FolioError::node_not_found("layout"))?;
    for kind in [ComponentKind::Header, ComponentKind::Image, ComponentKind::Quote] {
        let draft = palette_draft(kind, "default");
        let item = DragItem::NewComponent {
            kind,
            content: draft.content,
            styles: draft.styles,
        };
        let target = DropTarget::Container(columns.clone());
        if let Some(mutation) = plan_drop(&target, &item, false, accent.as_deref()) {
            queue.defer(mutation);
        }
    }
    println!("Applying {} deferred drops", queue.len());
    queue.flush(&mut manager)?;

    // Edit the header
    let header = manager
        .get_components_by_page("default")?
        .into_iter()
        .find(|c| c.kind == ComponentKind::Header)
        .ok_or_else(|| foliocraft::FolioError::node_not_found("header"))?;
    manager.update_component(
        &header.id,
        ComponentPatch::new()
            .content("Ana Silva, product designer")
            .style("fontSize", "32px"),
    )?;

    // A second page and a theme
    let about = manager.add_page("About", None)?;
    manager.add_component(palette_draft(ComponentKind::List, &about))?;
    if let Some(theme) = palette::theme("Blue") {
        manager.apply_theme(theme)?;
    }
    manager.set_current_page("default")?;

    // Structure view
    let components = manager.components()?;
    let mut outline = OutlineState::new();
    println!("\nHome:");
    print_outline(&build_outline(&components, "default", &outline));
    outline.toggle(&columns.id);
    println!("\nHome (container collapsed):");
    print_outline(&build_outline(&components, "default", &outline));

    // Exports
    let flat = manager.export_page("default", ExportFormat::Html)?;
    let nested = manager.export_page_with("default", ExportFormat::Html, ExportMode::Nested)?;
    let word = manager.export_page(&about, ExportFormat::Word)?;
    println!();
    for export in [&flat, &nested, &word] {
        println!(
            "{:<16} {:<20} {:>6} bytes",
            export.file_name,
            export.mime_type,
            export.body.len()
        );
    }

    let bytes = manager.save();
    println!("\nDocument: {} bytes, {} components", bytes.len(), components.len());
    Ok(())
}
