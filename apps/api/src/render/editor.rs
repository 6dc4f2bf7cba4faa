use crate::layout::{
    ComponentType, EditError, LayoutDocument, LayoutTree, Node, NodePath, Props,
};
use crate::render::catalog::{escape_html, ComponentCatalog};
use crate::render::{render_nodes, RenderMode};

/// An editing session over one page layout.
///
/// The catalog is passed in explicitly; the session never reaches for a global registry.
/// Edits only touch the in-memory tree; `to_document` yields the layout to save.
pub struct EditorSession<'c, C: ComponentCatalog + ?Sized> {
    tree: LayoutTree,
    catalog: &'c C,
    dirty: bool,
}

impl<'c, C: ComponentCatalog + ?Sized> EditorSession<'c, C> {
    pub fn open(layout: Option<&LayoutDocument>, catalog: &'c C) -> Self {
        Self {
            tree: LayoutTree::from_document(layout),
            catalog,
            dirty: false,
        }
    }

    /// Renders the tree with `data-node-path` markers. Unknown types show a placeholder
    /// (children still rendered inside it) so the owner can see and remove them.
    pub fn render(&self) -> String {
        render_nodes(&self.tree.roots, None, self.catalog, RenderMode::Editor)
    }

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn insert_node(
        &mut self,
        parent: Option<&NodePath>,
        index: usize,
        node: Node,
    ) -> Result<NodePath, EditError> {
        let path = self.tree.insert(parent, index, node)?;
        self.dirty = true;
        Ok(path)
    }

    pub fn remove_node(&mut self, path: &NodePath) -> Result<Node, EditError> {
        let node = self.tree.remove(path)?;
        self.dirty = true;
        Ok(node)
    }

    pub fn move_node(
        &mut self,
        from: &NodePath,
        to_parent: Option<&NodePath>,
        index: usize,
    ) -> Result<NodePath, EditError> {
        let path = self.tree.move_node(from, to_parent, index)?;
        self.dirty = true;
        Ok(path)
    }

    pub fn update_props(&mut self, path: &NodePath, props: Props) -> Result<(), EditError> {
        self.tree.update_props(path, props)?;
        self.dirty = true;
        Ok(())
    }

    pub fn to_document(&self) -> LayoutDocument {
        self.tree.to_document()
    }
}

/// Insertable component types, one button per registered type in catalog order.
pub fn render_palette() -> String {
    let buttons: String = ComponentType::known()
        .iter()
        .map(|kind| {
            let tag = escape_html(kind.tag());
            format!(
                "<button type=\"button\" class=\"flow-palette-item\" \
                 data-component-type=\"{tag}\">{tag}</button>"
            )
        })
        .collect();
    format!("<aside class=\"flow-palette\">{buttons}</aside>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::catalog::BuiltinCatalog;
    use serde_json::json;

    /// Catalog that only knows text blocks, rendered as bare text.
    struct TextOnlyCatalog;

    impl ComponentCatalog for TextOnlyCatalog {
        fn render(&self, kind: &ComponentType, props: &Props, children: &str) -> Option<String> {
            match kind {
                ComponentType::TextBlock => Some(format!("[{}]{children}", props.text_or("text", ""))),
                _ => None,
            }
        }
    }

    fn layout() -> LayoutDocument {
        LayoutDocument::from_value(json!({
            "root": {
                "type": "Container",
                "children": [
                    {"type": "TextBlock", "props": {"text": "a"}},
                    {"type": "Carousel", "props": {"speed": 2}}
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_null_layout_opens_empty() {
        let session = EditorSession::open(None, &BuiltinCatalog);
        assert_eq!(session.render(), "");
        assert!(session.tree().is_empty());
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_render_marks_nodes_and_unknowns() {
        let doc = layout();
        let session = EditorSession::open(Some(&doc), &BuiltinCatalog);
        let html = session.render();
        assert!(html.contains("data-node-path=\"0\" data-node-type=\"Container\""));
        assert!(html.contains("data-node-path=\"0.0\" data-node-type=\"TextBlock\""));
        assert!(html.contains(
            "<div class=\"flow-node flow-unknown\" data-node-path=\"0.1\" data-node-type=\"Carousel\">"
        ));
    }

    #[test]
    fn test_injected_catalog_drives_rendering() {
        let doc = layout();
        let session = EditorSession::open(Some(&doc), &TextOnlyCatalog);
        let html = session.render();
        assert!(html.contains("[a]"));
        // Container is unknown to this catalog, so it becomes a placeholder.
        assert!(html.starts_with(
            "<div class=\"flow-node flow-unknown\" data-node-path=\"0\" data-node-type=\"Container\">"
        ));
    }

    #[test]
    fn test_edits_produce_saveable_document() {
        let doc = layout();
        let mut session = EditorSession::open(Some(&doc), &BuiltinCatalog);
        let root = NodePath::new(vec![0]);

        session
            .insert_node(
                Some(&root),
                0,
                Node::new(ComponentType::HeroSection)
                    .with_props(Props::new().with("title", "Launch")),
            )
            .unwrap();
        session
            .update_props(&root.child(1), Props::new().with("text", "b"))
            .unwrap();
        assert!(session.is_dirty());

        let saved = session.to_document().into_value();
        assert_eq!(
            saved,
            json!({
                "root": {
                    "type": "Container",
                    "children": [
                        {"type": "HeroSection", "props": {"title": "Launch"}},
                        {"type": "TextBlock", "props": {"text": "b"}},
                        {"type": "Carousel", "props": {"speed": 2}}
                    ]
                }
            })
        );
    }

    #[test]
    fn test_remove_and_move() {
        let doc = layout();
        let mut session = EditorSession::open(Some(&doc), &BuiltinCatalog);
        let removed = session.remove_node(&"0.1".parse().unwrap()).unwrap();
        assert_eq!(removed.kind, ComponentType::Unknown("Carousel".to_string()));

        let moved = session
            .move_node(&"0.0".parse().unwrap(), None, 0)
            .unwrap();
        assert_eq!(moved.to_string(), "0");
        assert_eq!(session.tree().roots.len(), 2);
        assert_eq!(session.tree().roots[0].kind, ComponentType::TextBlock);
    }

    #[test]
    fn test_failed_edit_keeps_session_clean() {
        let doc = layout();
        let mut session = EditorSession::open(Some(&doc), &BuiltinCatalog);
        assert!(session.remove_node(&"3".parse().unwrap()).is_err());
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_palette_lists_registered_types_only() {
        let html = render_palette();
        assert_eq!(html.matches("flow-palette-item").count(), 14);
        assert!(html.contains("data-component-type=\"CTAButton\""));
        assert!(html.contains("data-component-type=\"FAQItem\""));
        assert!(!html.contains("Unknown"));
    }
}
