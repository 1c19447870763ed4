//! In-memory configuration tree
//!
//! A [`ConfigTree`] is an arena of [`Node`]s addressed by [`NodeId`]. Mappings and
//! sequences refer to their children by id, so a tree handed over by an external
//! parser can be inspected for malformed shapes (cycles, dangling ids, duplicate
//! keys) before anything trusts it. See [`crate::flatten`] for the checks.
//!
//! Trees are immutable once built. Use [`TreeBuilder`] to assemble one:
//!
//! ```
//! use envdiff_content::tree::{ScalarValue, TreeBuilder};
//!
//! let mut builder = TreeBuilder::new();
//! let host = builder.scalar(ScalarValue::String("localhost".into()));
//! let database = builder.mapping(vec![("host".into(), host)]);
//! let root = builder.mapping(vec![("database".into(), database)]);
//! let tree = builder.finish(root);
//!
//! assert_eq!(tree.len(), 3);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a node inside one [`ConfigTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Create an id from a raw arena index
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Raw arena index
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Source type tag recorded for every scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Null,
    Bool,
    Integer,
    Float,
    String,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool => write!(f, "bool"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
        }
    }
}

/// A leaf value exactly as the parser produced it
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Integer(i128),
    Float(f64),
    String(String),
}

impl ScalarValue {
    /// The source type tag of this scalar
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Self::Null => ScalarType::Null,
            Self::Bool(_) => ScalarType::Bool,
            Self::Integer(_) => ScalarType::Integer,
            Self::Float(_) => ScalarType::Float,
            Self::String(_) => ScalarType::String,
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// One node of a configuration tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Leaf value
    Scalar(ScalarValue),
    /// Ordered list of children
    Sequence(Vec<NodeId>),
    /// Keyed children in insertion order
    Mapping(Vec<(String, NodeId)>),
}

/// A parsed configuration document for one environment
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl ConfigTree {
    /// Assemble a tree from raw arena parts without validation.
    ///
    /// This is the entry point for external parsers. Shape problems are
    /// reported when the tree is flattened, not here.
    pub fn from_parts(nodes: Vec<Node>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    /// A tree that consists of an empty mapping
    pub fn empty() -> Self {
        Self {
            nodes: vec![Node::Mapping(Vec::new())],
            root: NodeId(0),
        }
    }

    /// Id of the document root
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl From<&serde_json::Value> for ConfigTree {
    fn from(value: &serde_json::Value) -> Self {
        let mut builder = TreeBuilder::new();
        let root = builder.json(value);
        builder.finish(root)
    }
}

/// Incremental builder for [`ConfigTree`]
///
/// Children are added before their parents. Ids handed to [`Self::mapping`]
/// and [`Self::sequence`] are not checked, so a forward id can still create a
/// cycle, and a reused id a shared node. Flattening rejects both.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Add a scalar leaf
    pub fn scalar(&mut self, value: impl Into<ScalarValue>) -> NodeId {
        self.push(Node::Scalar(value.into()))
    }

    /// Add a null leaf
    pub fn null(&mut self) -> NodeId {
        self.push(Node::Scalar(ScalarValue::Null))
    }

    /// Add a sequence of previously added nodes
    pub fn sequence(&mut self, items: Vec<NodeId>) -> NodeId {
        self.push(Node::Sequence(items))
    }

    /// Add a mapping of previously added nodes
    pub fn mapping(&mut self, entries: Vec<(String, NodeId)>) -> NodeId {
        self.push(Node::Mapping(entries))
    }

    /// Add a JSON value and all of its descendants
    pub fn json(&mut self, value: &serde_json::Value) -> NodeId {
        use serde_json::Value;

        match value {
            Value::Null => self.null(),
            Value::Bool(b) => self.scalar(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    self.scalar(ScalarValue::Integer(i.into()))
                } else if let Some(u) = n.as_u64() {
                    self.scalar(ScalarValue::Integer(u.into()))
                } else {
                    self.scalar(ScalarValue::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            Value::String(s) => self.scalar(s.as_str()),
            Value::Array(items) => {
                let ids = items.iter().map(|item| self.json(item)).collect();
                self.sequence(ids)
            }
            Value::Object(map) => {
                let entries = map
                    .iter()
                    .map(|(key, item)| (key.clone(), self.json(item)))
                    .collect();
                self.mapping(entries)
            }
        }
    }

    /// Finish the tree with the given root
    pub fn finish(self, root: NodeId) -> ConfigTree {
        ConfigTree {
            nodes: self.nodes,
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_assigns_sequential_ids() {
        let mut builder = TreeBuilder::new();
        let a = builder.scalar(1);
        let b = builder.scalar("x");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
    }

    #[test]
    fn test_from_json_preserves_key_order() {
        let tree = ConfigTree::from(&json!({"zeta": 1, "alpha": 2}));
        let Some(Node::Mapping(entries)) = tree.node(tree.root()) else {
            panic!("Expected mapping root");
        };
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_scalar_type_tags() {
        assert_eq!(ScalarValue::Null.scalar_type(), ScalarType::Null);
        assert_eq!(ScalarValue::from(true).scalar_type(), ScalarType::Bool);
        assert_eq!(ScalarValue::from(3).scalar_type(), ScalarType::Integer);
        assert_eq!(ScalarValue::from(0.5).scalar_type(), ScalarType::Float);
        assert_eq!(ScalarValue::from("a").scalar_type(), ScalarType::String);
    }

    #[test]
    fn test_empty_tree_has_mapping_root() {
        let tree = ConfigTree::empty();
        assert_eq!(tree.node(tree.root()), Some(&Node::Mapping(Vec::new())));
    }
}
