use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::layout::document::LayoutDocument;
use crate::layout::node::{Node, Props};

/// Address of a node: child indices walked from the top-level node list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// True if `self` equals `other` or lies underneath it.
    pub fn starts_with(&self, other: &NodePath) -> bool {
        self.0.starts_with(&other.0)
    }

    fn split_last(&self) -> Option<(&[usize], usize)> {
        self.0.split_last().map(|(last, parent)| (parent, *last))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        f.write_str(&parts.join("."))
    }
}

impl FromStr for NodePath {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(EditError::InvalidPath(s.to_string()));
        }
        s.split('.')
            .map(|part| part.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(NodePath)
            .map_err(|_| EditError::InvalidPath(s.to_string()))
    }
}

/// Paths travel over the wire in their dotted form.
impl<'de> Deserialize<'de> for NodePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("no node at path '{0}'")]
    InvalidPath(String),

    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot move node '{0}' into its own subtree")]
    MoveIntoSubtree(String),
}

/// In-memory form of a layout document that supports structural edits.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutTree {
    pub roots: Vec<Node>,
    /// The source document was itself a node rather than a keyed map.
    single_root: bool,
    /// Top-level entries of a keyed document that are not nodes (settings, versions).
    meta: Vec<MetaEntry>,
}

/// A non-node top-level entry, pinned to the number of root nodes that preceded it.
#[derive(Debug, Clone, PartialEq)]
struct MetaEntry {
    before_root: usize,
    key: String,
    value: Value,
}

impl LayoutTree {
    pub fn from_document(doc: Option<&LayoutDocument>) -> Self {
        let Some(doc) = doc else {
            return Self::default();
        };

        if doc.is_single_root() {
            let roots = Node::from_value(&Value::Object(doc.as_map().clone()))
                .into_iter()
                .collect();
            return Self {
                roots,
                single_root: true,
                meta: Vec::new(),
            };
        }

        let mut roots = Vec::new();
        let mut meta = Vec::new();
        for (key, value) in doc.as_map() {
            match Node::from_value(value) {
                Some(mut node) => {
                    node.key = Some(key.clone());
                    roots.push(node);
                }
                None => meta.push(MetaEntry {
                    before_root: roots.len(),
                    key: key.clone(),
                    value: value.clone(),
                }),
            }
        }
        Self {
            roots,
            single_root: false,
            meta,
        }
    }

    /// Serializes back to a document. Keyed documents keep their keys and their entry
    /// order; nodes added at the top level get the first free `node_<n>` key.
    pub fn to_document(&self) -> LayoutDocument {
        if self.single_root && self.roots.len() == 1 {
            if let Value::Object(map) = self.roots[0].to_value() {
                return LayoutDocument::from(map);
            }
        }

        let mut map = Map::new();
        let mut meta = self.meta.iter().peekable();
        let mut generated = 0usize;
        for (i, node) in self.roots.iter().enumerate() {
            while let Some(entry) = meta.next_if(|m| m.before_root <= i) {
                map.insert(entry.key.clone(), entry.value.clone());
            }
            let key = match &node.key {
                Some(key) if !map.contains_key(key) && !self.has_meta_key(key) => key.clone(),
                _ => loop {
                    let candidate = format!("node_{generated}");
                    generated += 1;
                    if !map.contains_key(&candidate)
                        && !self.has_meta_key(&candidate)
                        && !self.has_root_key(&candidate)
                    {
                        break candidate;
                    }
                },
            };
            map.insert(key, node.to_value());
        }
        for entry in meta {
            map.insert(entry.key.clone(), entry.value.clone());
        }
        LayoutDocument::from(map)
    }

    fn has_root_key(&self, key: &str) -> bool {
        self.roots.iter().any(|n| n.key.as_deref() == Some(key))
    }

    fn has_meta_key(&self, key: &str) -> bool {
        self.meta.iter().any(|m| m.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, path: &NodePath) -> Option<&Node> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.roots.get(*first)?;
        for i in rest {
            node = node.children.get(*i)?;
        }
        Some(node)
    }

    fn get_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.roots.get_mut(*first)?;
        for i in rest {
            node = node.children.get_mut(*i)?;
        }
        Some(node)
    }

    /// Child list under `parent`, or the top-level list when `parent` is `None`.
    fn siblings_mut(&mut self, parent: Option<&NodePath>) -> Result<&mut Vec<Node>, EditError> {
        match parent {
            None => Ok(&mut self.roots),
            Some(path) => self
                .get_mut(path)
                .map(|node| &mut node.children)
                .ok_or_else(|| EditError::InvalidPath(path.to_string())),
        }
    }

    pub fn insert(
        &mut self,
        parent: Option<&NodePath>,
        index: usize,
        node: Node,
    ) -> Result<NodePath, EditError> {
        let siblings = self.siblings_mut(parent)?;
        if index > siblings.len() {
            return Err(EditError::IndexOutOfRange {
                index,
                len: siblings.len(),
            });
        }
        siblings.insert(index, node);
        Ok(match parent {
            Some(p) => p.child(index),
            None => NodePath::new(vec![index]),
        })
    }

    pub fn remove(&mut self, path: &NodePath) -> Result<Node, EditError> {
        let (parent, last) = path
            .split_last()
            .ok_or_else(|| EditError::InvalidPath(path.to_string()))?;
        let parent = (!parent.is_empty()).then(|| NodePath::new(parent.to_vec()));
        let siblings = self
            .siblings_mut(parent.as_ref())
            .map_err(|_| EditError::InvalidPath(path.to_string()))?;
        if last >= siblings.len() {
            return Err(EditError::InvalidPath(path.to_string()));
        }
        Ok(siblings.remove(last))
    }

    /// Moves the node at `from` under `to_parent` at `index`. Both `to_parent` and `index`
    /// address the tree as it was before the move. On error the tree is unchanged.
    pub fn move_node(
        &mut self,
        from: &NodePath,
        to_parent: Option<&NodePath>,
        index: usize,
    ) -> Result<NodePath, EditError> {
        if let Some(target) = to_parent {
            if target.starts_with(from) {
                return Err(EditError::MoveIntoSubtree(from.to_string()));
            }
        }

        let (from_parent, from_index) = from
            .split_last()
            .ok_or_else(|| EditError::InvalidPath(from.to_string()))?;
        let depth = from_parent.len();

        // Removing `from` shifts later siblings (and paths through them) left by one.
        let adjust = |path: &[usize]| -> Vec<usize> {
            let mut out = path.to_vec();
            if out.len() > depth && out[..depth] == *from_parent && out[depth] > from_index {
                out[depth] -= 1;
            }
            out
        };
        let target_parent = to_parent.map(|p| NodePath::new(adjust(p.indices())));
        let same_list = match &target_parent {
            Some(p) => p.indices() == from_parent,
            None => from_parent.is_empty(),
        };
        let target_index = if same_list && index > from_index {
            index - 1
        } else {
            index
        };

        let mut working = self.clone();
        let node = working.remove(from)?;
        let new_path = working.insert(target_parent.as_ref(), target_index, node)?;
        *self = working;
        Ok(new_path)
    }

    pub fn update_props(&mut self, path: &NodePath, props: Props) -> Result<(), EditError> {
        let node = self
            .get_mut(path)
            .ok_or_else(|| EditError::InvalidPath(path.to_string()))?;
        node.props = props;
        Ok(())
    }
}
