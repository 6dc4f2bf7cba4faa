// Layout documents: the persisted JSON tree behind every page, how stored values are
// normalized, and the editable in-memory tree built from them.

pub mod document;
pub mod node;
pub mod normalize;
pub mod tree;

pub use document::{LayoutDocument, RawLayout};
pub use node::{ComponentType, Node, Props};
pub use normalize::normalize_layout;
pub use tree::{EditError, LayoutTree, NodePath};
