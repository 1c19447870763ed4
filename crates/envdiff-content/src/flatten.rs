//! Tree flattening
//!
//! Walks a [`ConfigTree`] depth-first and emits one [`FlatField`] per scalar
//! leaf, keyed by its canonical path. Mappings are visited in key insertion
//! order, sequences in index order. Empty mappings and sequences contribute no
//! fields; only leaf values take part in a comparison.
//!
//! The walk also validates the tree. Node ids on the current traversal stack
//! are tracked so a node that is its own ancestor fails with
//! [`StructuralError::Cycle`] instead of recursing forever. Every node has
//! exactly one parent; a node reached a second time through another parent
//! fails with [`StructuralError::SharedNode`], which keeps the walk linear in
//! the number of nodes.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::StructuralError;
use crate::normalize::{NormalizedValue, normalize};
use crate::path::{PathSegment, render_path};
use crate::tree::{ConfigTree, Node, NodeId, ScalarType};

/// Maximum nesting depth accepted by the flattener
pub const MAX_DEPTH: usize = 128;

/// One leaf of a flattened tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatField {
    /// Canonical path of the leaf
    pub path: String,
    /// Normalized value
    pub value: NormalizedValue,
    /// Type tag of the scalar as the parser produced it
    pub source_type: ScalarType,
}

/// Flatten a tree, failing on the first structural problem.
pub fn flatten(tree: &ConfigTree) -> Result<Vec<FlatField>, StructuralError> {
    match flatten_partial(tree) {
        (fields, None) => Ok(fields),
        (_, Some(err)) => Err(err),
    }
}

/// Flatten a tree, keeping every field emitted before a structural problem.
///
/// Used when one malformed environment must not block a comparison: the
/// fields collected up to the failure still take part.
pub fn flatten_partial(tree: &ConfigTree) -> (Vec<FlatField>, Option<StructuralError>) {
    let mut walker = Walker {
        tree,
        stack: Vec::new(),
        visited: HashSet::new(),
        segments: Vec::new(),
        fields: Vec::new(),
    };
    let outcome = walker.visit(tree.root());
    (walker.fields, outcome.err())
}

struct Walker<'a> {
    tree: &'a ConfigTree,
    /// Ancestors of the node being visited
    stack: Vec<NodeId>,
    /// Every node entered so far
    visited: HashSet<NodeId>,
    segments: Vec<PathSegment>,
    fields: Vec<FlatField>,
}

impl Walker<'_> {
    fn current_path(&self) -> String {
        render_path(&self.segments)
    }

    fn visit(&mut self, id: NodeId) -> Result<(), StructuralError> {
        if self.stack.contains(&id) {
            return Err(StructuralError::Cycle {
                path: self.current_path(),
                node: id.index(),
            });
        }
        if !self.visited.insert(id) {
            return Err(StructuralError::SharedNode {
                path: self.current_path(),
                node: id.index(),
            });
        }
        if self.stack.len() >= MAX_DEPTH {
            return Err(StructuralError::DepthExceeded {
                path: self.current_path(),
                max: MAX_DEPTH,
            });
        }

        let tree = self.tree;
        let node = tree.node(id).ok_or_else(|| StructuralError::DanglingNode {
            path: self.current_path(),
            node: id.index(),
        })?;

        match node {
            Node::Scalar(scalar) => {
                self.fields.push(FlatField {
                    path: self.current_path(),
                    value: normalize(scalar),
                    source_type: scalar.scalar_type(),
                });
                Ok(())
            }
            Node::Sequence(items) => {
                self.stack.push(id);
                for (index, child) in items.iter().enumerate() {
                    self.segments.push(PathSegment::Index(index));
                    let result = self.visit(*child);
                    self.segments.pop();
                    result?;
                }
                self.stack.pop();
                Ok(())
            }
            Node::Mapping(entries) => {
                let mut seen = HashSet::new();
                for (key, _) in entries {
                    if !seen.insert(key.as_str()) {
                        return Err(StructuralError::DuplicateKey {
                            path: self.current_path(),
                            key: key.clone(),
                        });
                    }
                }

                self.stack.push(id);
                for (key, child) in entries {
                    self.segments.push(PathSegment::Key(key.clone()));
                    let result = self.visit(*child);
                    self.segments.pop();
                    result?;
                }
                self.stack.pop();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ScalarValue, TreeBuilder};
    use serde_json::json;

    fn paths(fields: &[FlatField]) -> Vec<&str> {
        fields.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn test_flatten_nested_mapping_in_insertion_order() {
        let tree = ConfigTree::from(&json!({
            "database": {"host": "localhost", "port": 5432},
            "api": {"timeout": 30}
        }));
        let fields = flatten(&tree).unwrap();
        assert_eq!(
            paths(&fields),
            vec!["database.host", "database.port", "api.timeout"]
        );
    }

    #[test]
    fn test_flatten_sequence_indices() {
        let tree = ConfigTree::from(&json!({"servers": [{"host": "a"}, {"host": "b"}]}));
        let fields = flatten(&tree).unwrap();
        assert_eq!(paths(&fields), vec!["servers[0].host", "servers[1].host"]);
    }

    #[test]
    fn test_empty_containers_produce_no_fields() {
        let tree = ConfigTree::from(&json!({"a": {}, "b": [], "c": 1}));
        let fields = flatten(&tree).unwrap();
        assert_eq!(paths(&fields), vec!["c"]);
    }

    #[test]
    fn test_records_source_type() {
        let tree = ConfigTree::from(&json!({"limit": "1000", "other": 1000}));
        let fields = flatten(&tree).unwrap();
        assert_eq!(fields[0].source_type, ScalarType::String);
        assert_eq!(fields[1].source_type, ScalarType::Integer);
        assert_eq!(fields[0].value, fields[1].value);
    }

    #[test]
    fn test_cycle_is_rejected() {
        // root mapping -> "child" mapping -> "back" points at root
        let nodes = vec![
            Node::Mapping(vec![
                ("name".to_string(), NodeId::new(2)),
                ("child".to_string(), NodeId::new(1)),
            ]),
            Node::Mapping(vec![("back".to_string(), NodeId::new(0))]),
            Node::Scalar(ScalarValue::from("svc")),
        ];
        let tree = ConfigTree::from_parts(nodes, NodeId::new(0));

        let (fields, err) = flatten_partial(&tree);
        assert_eq!(paths(&fields), vec!["name"]);
        assert_eq!(
            err,
            Some(StructuralError::Cycle {
                path: "child.back".to_string(),
                node: 0
            })
        );
        assert!(flatten(&tree).is_err());
    }

    #[test]
    fn test_shared_leaf_is_rejected() {
        let mut builder = TreeBuilder::new();
        let leaf = builder.scalar(1);
        let root = builder.mapping(vec![("a".into(), leaf), ("b".into(), leaf)]);
        let tree = builder.finish(root);

        let (fields, err) = flatten_partial(&tree);
        assert_eq!(paths(&fields), vec!["a"]);
        assert_eq!(
            err,
            Some(StructuralError::SharedNode {
                path: "b".to_string(),
                node: leaf.index()
            })
        );
    }

    #[test]
    fn test_shared_subtree_chain_stops_early() {
        // Each level points both keys at the same child, which would expand
        // to 2^20 leaves if shared nodes were walked again
        let mut builder = TreeBuilder::new();
        let mut current = builder.scalar("leaf");
        for _ in 0..20 {
            current = builder.mapping(vec![("l".into(), current), ("r".into(), current)]);
        }
        let tree = builder.finish(current);

        let (fields, err) = flatten_partial(&tree);
        assert_eq!(fields.len(), 1);
        assert!(matches!(err, Some(StructuralError::SharedNode { .. })));
    }

    #[test]
    fn test_dangling_node_is_rejected() {
        let nodes = vec![Node::Sequence(vec![NodeId::new(7)])];
        let tree = ConfigTree::from_parts(nodes, NodeId::new(0));
        assert_eq!(
            flatten(&tree),
            Err(StructuralError::DanglingNode {
                path: "[0]".to_string(),
                node: 7
            })
        );
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let mut builder = TreeBuilder::new();
        let a = builder.scalar(1);
        let b = builder.scalar(2);
        let inner = builder.mapping(vec![("k".into(), a), ("k".into(), b)]);
        let root = builder.mapping(vec![("outer".into(), inner)]);
        let tree = builder.finish(root);
        assert!(matches!(
            flatten(&tree),
            Err(StructuralError::DuplicateKey { path, key }) if path == "outer" && key == "k"
        ));
    }

    #[test]
    fn test_depth_limit() {
        let mut builder = TreeBuilder::new();
        let mut current = builder.scalar("leaf");
        for _ in 0..(MAX_DEPTH + 5) {
            current = builder.mapping(vec![("nested".into(), current)]);
        }
        let tree = builder.finish(current);
        assert!(matches!(
            flatten(&tree),
            Err(StructuralError::DepthExceeded { .. })
        ));
    }

    #[test]
    fn test_root_scalar_has_empty_path() {
        let tree = ConfigTree::from(&json!("just a string"));
        let fields = flatten(&tree).unwrap();
        assert_eq!(paths(&fields), vec![""]);
    }
}
