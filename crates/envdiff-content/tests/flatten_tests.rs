//! Tests for tree flattening

use std::collections::HashSet;

use envdiff_content::{
    ConfigParser, ConfigTree, NormalizedValue, StructuralError, YamlParser, flatten,
    flatten_partial, parse_path, render_path,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{Value, json};

#[test]
fn test_flatten_environment_document() {
    let tree = YamlParser::new()
        .parse(
            "database:\n  host: localhost\n  port: 5432\n\nlogging:\n  level: debug\n\nfeatures:\n  beta_features: true\n",
        )
        .unwrap();

    let fields = flatten(&tree).unwrap();
    let view: Vec<(String, String)> = fields
        .iter()
        .map(|f| (f.path.clone(), f.value.to_string()))
        .collect();

    assert_eq!(
        view,
        vec![
            ("database.host".to_string(), "localhost".to_string()),
            ("database.port".to_string(), "5432".to_string()),
            ("logging.level".to_string(), "debug".to_string()),
            ("features.beta_features".to_string(), "true".to_string()),
        ]
    );
}

#[test]
fn test_flatten_empty_document() {
    let tree = YamlParser::new().parse("").unwrap();
    assert!(flatten(&tree).unwrap().is_empty());
}

#[test]
fn test_flatten_sequence_of_scalars() {
    let tree = ConfigTree::from(&json!({"origins": ["a.example", "b.example"]}));
    let fields = flatten(&tree).unwrap();
    assert_eq!(fields[0].path, "origins[0]");
    assert_eq!(fields[1].path, "origins[1]");
    assert_eq!(
        fields[1].value,
        NormalizedValue::String("b.example".to_string())
    );
}

#[test]
fn test_yaml_aliases_are_expanded_per_parent() {
    let tree = YamlParser::new()
        .parse("defaults: &defaults\n  timeout: 30\nworker: *defaults\n")
        .unwrap();
    let (fields, err) = flatten_partial(&tree);
    assert_eq!(err, None::<StructuralError>);
    assert!(fields.iter().any(|f| f.path == "worker.timeout"));
}

#[test]
fn test_partial_flatten_of_valid_tree_has_no_error() {
    let tree = ConfigTree::from(&json!({"a": 1}));
    let (fields, err) = flatten_partial(&tree);
    assert_eq!(fields.len(), 1);
    assert_eq!(err, None::<StructuralError>);
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|i| json!(i)),
        "[a-z0-9 .]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z.\\[\\]\"]{0,4}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn count_leaves(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.iter().map(count_leaves).sum(),
        Value::Object(map) => map.values().map(count_leaves).sum(),
        _ => 1,
    }
}

proptest! {
    #[test]
    fn test_paths_are_injective(value in arb_json()) {
        let tree = ConfigTree::from(&value);
        let fields = flatten(&tree).unwrap();

        // One field per leaf, and no two leaves share a path
        prop_assert_eq!(fields.len(), count_leaves(&value));
        let unique: HashSet<_> = fields.iter().map(|f| f.path.as_str()).collect();
        prop_assert_eq!(unique.len(), fields.len());
    }

    #[test]
    fn test_paths_round_trip_through_parser(value in arb_json()) {
        let tree = ConfigTree::from(&value);
        for field in flatten(&tree).unwrap() {
            let segments = parse_path(&field.path);
            prop_assert_eq!(render_path(&segments), field.path);
        }
    }
}
