use crate::layout::{LayoutDocument, LayoutTree};
use crate::models::page::Page;
use crate::render::catalog::{escape_html, BuiltinCatalog};
use crate::render::{render_nodes, RenderMode};

/// Renders a layout with the builtin catalog only. `None` renders as an empty body;
/// unregistered node types are skipped together with their subtrees.
pub fn render_read_only(layout: Option<&LayoutDocument>) -> String {
    let tree = LayoutTree::from_document(layout);
    render_nodes(&tree.roots, None, &BuiltinCatalog, RenderMode::ReadOnly)
}

/// Full HTML document for a public or preview page.
pub fn render_page_html(page: &Page) -> String {
    let description = page
        .description
        .as_deref()
        .map(|d| format!("<meta name=\"description\" content=\"{}\">", escape_html(d)))
        .unwrap_or_default();
    html_document(
        &escape_html(&page.title),
        &description,
        &render_read_only(page.layout.as_ref()),
    )
}

/// Generic page shown for missing or unpublished pages. Carries no detail.
pub fn render_not_found_html() -> String {
    html_document(
        "Page not found",
        "",
        "<main class=\"flow-not-found\"><h1>Page not found</h1></main>",
    )
}

/// Generic page for a load failure. Carries no detail.
pub fn render_unavailable_html() -> String {
    html_document(
        "Page unavailable",
        "",
        "<main class=\"flow-unavailable\"><h1>This page could not be loaded</h1></main>",
    )
}

pub(crate) fn html_document(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title}</title>{head_extra}</head><body>{body}</body></html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{normalize_layout, RawLayout};
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn doc(value: serde_json::Value) -> LayoutDocument {
        LayoutDocument::from_value(value).unwrap()
    }

    #[test]
    fn test_null_layout_renders_empty() {
        assert_eq!(render_read_only(None), "");
        assert_eq!(render_read_only(Some(&LayoutDocument::empty())), "");
    }

    #[test]
    fn test_container_with_text_block() {
        let raw = RawLayout::EncodedString(
            r#"{"root":{"type":"Container","children":[{"type":"TextBlock","props":{"text":"Hi"}}]}}"#
                .to_string(),
        );
        let layout = normalize_layout(raw);
        assert_eq!(
            render_read_only(layout.as_ref()),
            "<div class=\"flow-container flow-column\"><p class=\"flow-text\">Hi</p></div>"
        );
    }

    #[test]
    fn test_unknown_node_is_skipped_among_siblings() {
        let layout = doc(json!({
            "root": {
                "type": "Container",
                "children": [
                    {"type": "TextBlock", "props": {"text": "one"}},
                    {"type": "Carousel", "children": [{"type": "TextBlock", "props": {"text": "hidden"}}]},
                    {"type": "Divider"},
                    {"type": "TextBlock", "props": {"text": "two"}}
                ]
            }
        }));
        let html = render_read_only(Some(&layout));
        assert_eq!(
            html,
            "<div class=\"flow-container flow-column\">\
             <p class=\"flow-text\">one</p>\
             <hr class=\"flow-divider\">\
             <p class=\"flow-text\">two</p></div>"
        );
    }

    #[test]
    fn test_keyed_roots_render_in_stored_order() {
        let layout = doc(json!({
            "zeta": {"type": "TextBlock", "props": {"text": "first"}},
            "alpha": {"type": "TextBlock", "props": {"text": "second"}},
            "settings": 3
        }));
        let html = render_read_only(Some(&layout));
        let first = html.find("first").unwrap();
        let second = html.find("second").unwrap();
        assert!(first < second, "stored order must be preserved: {html}");
    }

    #[test]
    fn test_single_root_document() {
        let layout = doc(json!({"type": "Divider"}));
        assert_eq!(render_read_only(Some(&layout)), "<hr class=\"flow-divider\">");
    }

    #[test]
    fn test_page_html_escapes_metadata() {
        let page = Page {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            slug: "offer-1".to_string(),
            title: "Deals <today>".to_string(),
            description: Some("Save \"big\"".to_string()),
            layout: None,
            published: true,
            view_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let html = render_page_html(&page);
        assert!(html.contains("<title>Deals &lt;today&gt;</title>"));
        assert!(html.contains("content=\"Save &quot;big&quot;\""));
        assert!(html.contains("<body></body>"));
    }

    #[test]
    fn test_generic_pages() {
        assert!(render_not_found_html().contains("<h1>Page not found</h1>"));
        assert!(render_unavailable_html().contains("could not be loaded"));
    }
}
