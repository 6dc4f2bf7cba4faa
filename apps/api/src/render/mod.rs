//! Dual renderer: a read-only path for public and preview pages and an editor path that
//! marks every node for structural editing. Both walk the tree depth-first and keep
//! children in stored order.

pub mod catalog;
pub mod editor;
pub mod read_only;

pub use catalog::BuiltinCatalog;
pub use editor::{render_palette, EditorSession};
pub use read_only::{render_not_found_html, render_page_html, render_unavailable_html};

use crate::layout::node::Node;
use crate::layout::tree::NodePath;
use catalog::{escape_html, ComponentCatalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenderMode {
    ReadOnly,
    Editor,
}

pub(crate) fn render_nodes<C: ComponentCatalog + ?Sized>(
    nodes: &[Node],
    parent: Option<&NodePath>,
    catalog: &C,
    mode: RenderMode,
) -> String {
    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let path = match parent {
                Some(p) => p.child(i),
                None => NodePath::new(vec![i]),
            };
            render_node(node, &path, catalog, mode)
        })
        .collect()
}

fn render_node<C: ComponentCatalog + ?Sized>(
    node: &Node,
    path: &NodePath,
    catalog: &C,
    mode: RenderMode,
) -> String {
    let children = render_nodes(&node.children, Some(path), catalog, mode);
    let rendered = catalog.render(&node.kind, &node.props, &children);

    match (mode, rendered) {
        (RenderMode::ReadOnly, Some(html)) => html,
        (RenderMode::ReadOnly, None) => {
            tracing::debug!("Skipping unregistered component '{}' at {path}", node.kind);
            String::new()
        }
        (RenderMode::Editor, Some(html)) => format!(
            "<div class=\"flow-node\" data-node-path=\"{path}\" data-node-type=\"{}\">{html}</div>",
            escape_html(node.kind.tag())
        ),
        (RenderMode::Editor, None) => {
            let tag = escape_html(node.kind.tag());
            format!(
                "<div class=\"flow-node flow-unknown\" data-node-path=\"{path}\" data-node-type=\"{tag}\"><span class=\"flow-unknown-label\">Unknown component \"{tag}\"</span>{children}</div>"
            )
        }
    }
}
