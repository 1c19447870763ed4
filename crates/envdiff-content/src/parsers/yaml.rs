//! YAML parser using serde_yaml

use serde_yaml::Value as YamlValue;

use crate::error::{Error, Result};
use crate::format::ConfigParser;
use crate::tree::{ConfigTree, NodeId, ScalarValue, TreeBuilder};

/// Parser for YAML documents using serde_yaml
#[derive(Debug, Default)]
pub struct YamlParser;

impl YamlParser {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigParser for YamlParser {
    fn name(&self) -> &'static str {
        "YAML"
    }

    fn parse(&self, source: &str) -> Result<ConfigTree> {
        let value: YamlValue =
            serde_yaml::from_str(source).map_err(|e| Error::parse("YAML", e.to_string()))?;

        // An empty document has no settings rather than one null setting
        if value.is_null() {
            return Ok(ConfigTree::empty());
        }

        let mut builder = TreeBuilder::new();
        let root = build(&mut builder, &value)?;
        Ok(builder.finish(root))
    }
}

fn build(builder: &mut TreeBuilder, value: &YamlValue) -> Result<NodeId> {
    let id = match value {
        YamlValue::Null => builder.null(),
        YamlValue::Bool(b) => builder.scalar(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                builder.scalar(ScalarValue::Integer(i.into()))
            } else if let Some(u) = n.as_u64() {
                builder.scalar(ScalarValue::Integer(u.into()))
            } else {
                builder.scalar(ScalarValue::Float(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        YamlValue::String(s) => builder.scalar(s.as_str()),
        YamlValue::Sequence(items) => {
            let ids = items
                .iter()
                .map(|item| build(builder, item))
                .collect::<Result<Vec<_>>>()?;
            builder.sequence(ids)
        }
        YamlValue::Mapping(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, item) in map {
                let key = mapping_key(key)?;
                entries.push((key, build(builder, item)?));
            }
            builder.mapping(entries)
        }
        YamlValue::Tagged(tagged) => build(builder, &tagged.value)?,
    };
    Ok(id)
}

/// Scalar keys are rendered as text; `8080: open` yields the key `8080`.
fn mapping_key(key: &YamlValue) -> Result<String> {
    match key {
        YamlValue::String(s) => Ok(s.clone()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Tagged(tagged) => mapping_key(&tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => Err(Error::parse(
            "YAML",
            "complex mapping keys are not supported",
        )),
    }
}
