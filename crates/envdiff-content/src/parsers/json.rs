//! JSON parser using serde_json

use crate::error::{Error, Result};
use crate::format::ConfigParser;
use crate::tree::{ConfigTree, TreeBuilder};

/// Parser for JSON documents
#[derive(Debug, Default)]
pub struct JsonParser;

impl JsonParser {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigParser for JsonParser {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn parse(&self, source: &str) -> Result<ConfigTree> {
        let value: serde_json::Value =
            serde_json::from_str(source).map_err(|e| Error::parse("JSON", e.to_string()))?;

        let mut builder = TreeBuilder::new();
        let root = builder.json(&value);
        Ok(builder.finish(root))
    }
}
