//! TOML parser using the toml crate

use crate::error::{Error, Result};
use crate::format::ConfigParser;
use crate::tree::{ConfigTree, NodeId, ScalarValue, TreeBuilder};

/// Parser for TOML documents
#[derive(Debug, Default)]
pub struct TomlParser;

impl TomlParser {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigParser for TomlParser {
    fn name(&self) -> &'static str {
        "TOML"
    }

    fn parse(&self, source: &str) -> Result<ConfigTree> {
        let table: toml::Table =
            toml::from_str(source).map_err(|e| Error::parse("TOML", e.to_string()))?;

        let mut builder = TreeBuilder::new();
        let root = build(&mut builder, &toml::Value::Table(table));
        Ok(builder.finish(root))
    }
}

fn build(builder: &mut TreeBuilder, value: &toml::Value) -> NodeId {
    match value {
        toml::Value::String(s) => builder.scalar(s.as_str()),
        toml::Value::Integer(i) => builder.scalar(ScalarValue::Integer((*i).into())),
        toml::Value::Float(f) => builder.scalar(*f),
        toml::Value::Boolean(b) => builder.scalar(*b),
        // Datetimes compare by their RFC 3339 text
        toml::Value::Datetime(dt) => builder.scalar(dt.to_string()),
        toml::Value::Array(items) => {
            let ids = items.iter().map(|item| build(builder, item)).collect();
            builder.sequence(ids)
        }
        toml::Value::Table(table) => {
            let entries = table
                .iter()
                .map(|(key, item)| (key.clone(), build(builder, item)))
                .collect();
            builder.mapping(entries)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use crate::normalize::NormalizedValue;

    #[test]
    fn test_toml_parse_tables_and_arrays() {
        let tree = TomlParser::new()
            .parse("[api]\nrate_limit = 1000\n\n[[servers]]\nhost = \"a\"\n")
            .unwrap();
        let fields = flatten(&tree).unwrap();
        assert_eq!(fields[0].path, "api.rate_limit");
        assert_eq!(fields[0].value, NormalizedValue::Integer(1000));
        assert_eq!(fields[1].path, "servers[0].host");
    }

    #[test]
    fn test_toml_parse_error() {
        assert!(TomlParser::new().parse("key = ").is_err());
    }
}
