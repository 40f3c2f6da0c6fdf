//! File import: one HTML or text file becomes one component draft.

use std::sync::OnceLock;

use regex::Regex;

use crate::portfolio::model::{style_keys, ComponentDraft, ComponentKind};

fn body_pattern() -> &'static Regex {
    static BODY: OnceLock<Regex> = OnceLock::new();
    BODY.get_or_init(|| Regex::new(r"(?is)<body[^>]*>(.*?)</body>").expect("valid body regex"))
}

/// Inner HTML of the first `<body>` element, if any.
pub fn extract_body(html: &str) -> Option<&str> {
    body_pattern()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Turns an uploaded file into a draft for `page_id`.
///
/// `.html` / `.htm` files become a section holding the body markup (or the
/// whole text when there is no body); anything else becomes a text block.
pub fn import_draft(file_name: &str, text: &str, page_id: &str) -> ComponentDraft {
    let extension = file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let draft = match extension.as_str() {
        "html" | "htm" => ComponentDraft::new(ComponentKind::Section, page_id)
            .with_content(extract_body(text).unwrap_or(text)),
        _ => ComponentDraft::new(ComponentKind::Text, page_id).with_content(text),
    };
    draft
        .with_style(style_keys::PADDING, "16px")
        .with_style(style_keys::MARGIN, "8px")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_body_is_extracted() {
        let draft = import_draft(
            "Resume.HTM",
            "<html><head></head><body style=\"x\">\n<h1>Me</h1>\n</body></html>",
            "home",
        );
        assert_eq!(draft.kind, ComponentKind::Section);
        assert_eq!(draft.content, "\n<h1>Me</h1>\n");
        assert_eq!(draft.styles["padding"], "16px");
        assert_eq!(draft.styles["margin"], "8px");
        assert_eq!(draft.page_id, "home");
    }

    #[test]
    fn test_html_without_body_uses_raw_text() {
        let draft = import_draft("frag.html", "<p>just a fragment</p>", "home");
        assert_eq!(draft.content, "<p>just a fragment</p>");
    }

    #[test]
    fn test_other_files_become_text() {
        let draft = import_draft("notes.txt", "<body>not parsed</body>", "home");
        assert_eq!(draft.kind, ComponentKind::Text);
        assert_eq!(draft.content, "<body>not parsed</body>");
        assert!(draft.parent_id.is_none());
    }
}
