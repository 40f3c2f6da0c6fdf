//! Static exports: flat HTML fragments and the three download formats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::render::{render_html, render_tree};
use crate::config::ExportOptions;
use crate::portfolio::model::{Component, ComponentKind, Layout, Styles};

/// Escapes text for HTML bodies and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `backgroundColor` → `background-color`.
pub fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Inline CSS for a style map: kebab-case keys, sorted, `k:v` joined by `;`.
pub fn style_string(styles: &Styles) -> String {
    let mut pairs: Vec<(String, &str)> = styles
        .iter()
        .map(|(k, v)| (kebab_case(k), v.as_str()))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}:{}", k, v))
        .collect::<Vec<_>>()
        .join(";")
}

/// ` style="…"`, or nothing for an empty map.
pub(crate) fn style_attr(styles: &Styles) -> String {
    if styles.is_empty() {
        String::new()
    } else {
        format!(" style=\"{}\"", escape(&style_string(styles)))
    }
}

fn inner(component: &Component) -> String {
    match component.kind {
        ComponentKind::Image => format!(
            "<img src=\"{}\" style=\"max-width:100%\"/>",
            escape(&component.content)
        ),
        _ => escape(&component.content),
    }
}

/// One flat export fragment.
pub fn fragment(component: &Component) -> String {
    format!(
        "<div class=\"component\"{}>{}</div>",
        style_attr(&component.styles),
        inner(component)
    )
}

/// Flat export body: every non-container component in backing order.
/// Containers are skipped but their descendants are not.
pub fn flatten<'a>(components: impl IntoIterator<Item = &'a Component>) -> String {
    components
        .into_iter()
        .filter(|c| !c.kind.is_container())
        .map(fragment)
        .collect()
}

fn flatten_plain<'a>(components: impl IntoIterator<Item = &'a Component>) -> String {
    components
        .into_iter()
        .filter(|c| !c.kind.is_container())
        .map(|c| format!("<div>{}</div>", inner(c)))
        .collect()
}

// =============================================================================
// EXPORT FORMATS
// =============================================================================

/// Download formats offered by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Standalone HTML page.
    Html,
    /// HTML that opens the print dialog (save as PDF from there).
    Print,
    /// HTML served as a Word document.
    Word,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Html | Self::Print => "portfolio.html",
            Self::Word => "portfolio.doc",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Html | Self::Print => "text/html",
            Self::Word => "application/msword",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Html => "html",
            Self::Print => "print",
            Self::Word => "word",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "print" | "pdf" => Ok(Self::Print),
            "word" | "doc" => Ok(Self::Word),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

/// How containers appear in an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Containers dropped, content in backing order.
    #[default]
    Flat,
    /// Containers kept as nested elements.
    Nested,
}

/// A generated download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Export {
    pub file_name: String,
    pub mime_type: String,
    pub body: String,
}

/// Builds a download for the components of `page_id`.
pub fn export(
    components: &[Component],
    page_id: &str,
    layout: Option<&Layout>,
    format: ExportFormat,
    mode: ExportMode,
    options: &ExportOptions,
) -> Export {
    let on_page = || components.iter().filter(|c| c.page_id == page_id);
    let content = match (mode, format) {
        (ExportMode::Nested, _) => render_html(&render_tree(components, page_id, layout), layout),
        (ExportMode::Flat, ExportFormat::Word) => flatten_plain(on_page()),
        (ExportMode::Flat, _) => flatten(on_page()),
    };

    let title = escape(&options.title);
    let base_css = format!(
        "body{{font-family:{};padding:{}}} .component{{margin-bottom:{}}}",
        options.font_family, options.body_padding, options.component_spacing
    );
    let body = match format {
        ExportFormat::Html => format!(
            "<!doctype html><html><head><meta charset=\"utf-8\">\
             <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\
             <title>{}</title><style>{}</style></head>\
             <body><div class=\"container\">{}</div></body></html>",
            title, base_css, content
        ),
        ExportFormat::Print => format!(
            "<html><head><meta charset=\"utf-8\"><title>{}</title><style>{}\
             @media print{{body{{padding:0}} .component{{page-break-inside:avoid}}}}</style></head>\
             <body onload=\"window.print()\">{}</body></html>",
            title, base_css, content
        ),
        ExportFormat::Word => format!("<html><body>{}</body></html>", content),
    };

    trace!(%format, ?mode, bytes = body.len(), "export rendered");
    Export {
        file_name: format.file_name().to_string(),
        mime_type: format.mime_type().to_string(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::model::ComponentDraft;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Component> {
        vec![
            ComponentDraft::new(ComponentKind::Layout, "home")
                .with_template("grid")
                .into_component("grid"),
            ComponentDraft::new(ComponentKind::Header, "home")
                .with_content("Hello")
                .with_style("fontSize", "24px")
                .with_style("backgroundColor", "#fff")
                .with_parent("grid")
                .into_component("h"),
            ComponentDraft::new(ComponentKind::Image, "home")
                .with_content("https://example.com/a.png")
                .into_component("img"),
            ComponentDraft::new(ComponentKind::Text, "other")
                .with_content("elsewhere")
                .into_component("o"),
        ]
    }

    #[test]
    fn test_style_string_is_kebab_and_sorted() {
        let mut styles = Styles::new();
        styles.insert("textAlign".into(), "left".into());
        styles.insert("backgroundColor".into(), "red".into());
        assert_eq!(
            style_string(&styles),
            "background-color:red;text-align:left"
        );
        assert_eq!(style_string(&Styles::new()), "");
    }

    #[test]
    fn test_flatten_skips_containers_keeps_descendants() {
        let components = sample();
        let html = flatten(components.iter().filter(|c| c.page_id == "home"));
        assert_eq!(
            html,
            "<div class=\"component\" style=\"background-color:#fff;font-size:24px\">Hello</div>\
             <div class=\"component\"><img src=\"https://example.com/a.png\" style=\"max-width:100%\"/></div>"
        );
    }

    #[test]
    fn test_html_export_document() {
        let export = export(
            &sample(),
            "home",
            None,
            ExportFormat::Html,
            ExportMode::Flat,
            &ExportOptions::default(),
        );
        assert_eq!(export.file_name, "portfolio.html");
        assert_eq!(export.mime_type, "text/html");
        assert!(export.body.starts_with("<!doctype html>"));
        assert!(export.body.contains("<title>Portfolio</title>"));
        assert!(export.body.contains("Hello"));
        assert!(!export.body.contains("elsewhere"));
    }

    #[test]
    fn test_print_and_word_exports() {
        let options = ExportOptions::default().with_title("Me & Co");
        let print = export(&sample(), "home", None, ExportFormat::Print, ExportMode::Flat, &options);
        assert!(print.body.contains("window.print()"));
        assert!(print.body.contains("<title>Me &amp; Co</title>"));

        let word = export(&sample(), "home", None, ExportFormat::Word, ExportMode::Flat, &options);
        assert_eq!(word.file_name, "portfolio.doc");
        assert_eq!(word.mime_type, "application/msword");
        assert!(word.body.starts_with("<html><body><div>Hello</div>"));
    }

    #[test]
    fn test_nested_export_keeps_containers() {
        let export = export(
            &sample(),
            "home",
            None,
            ExportFormat::Html,
            ExportMode::Nested,
            &ExportOptions::default(),
        );
        assert!(export
            .body
            .contains("<div class=\"layout\" data-template=\"grid\"><h1 style="));
    }

    #[test]
    fn test_text_is_escaped() {
        let component = ComponentDraft::new(ComponentKind::Text, "home")
            .with_content("<script>x</script>")
            .into_component("t");
        assert_eq!(
            fragment(&component),
            "<div class=\"component\">&lt;script&gt;x&lt;/script&gt;</div>"
        );
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Print);
        assert_eq!("doc".parse::<ExportFormat>().unwrap(), ExportFormat::Word);
        assert!("rtf".parse::<ExportFormat>().is_err());
    }
}
