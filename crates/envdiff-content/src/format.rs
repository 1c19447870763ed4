//! Format detection and the parser seam

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parsers::{JsonParser, TomlParser, YamlParser};
use crate::tree::ConfigTree;

/// Supported configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Yaml,
    Json,
    Toml,
}

impl Format {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Detect format from content heuristics
    ///
    /// Falls back to YAML, which also accepts most JSON.
    pub fn from_content(content: &str) -> Self {
        let trimmed = content.trim_start();

        if trimmed.starts_with('{') || (trimmed.starts_with('[') && !looks_like_toml(trimmed)) {
            return Self::Json;
        }

        if looks_like_toml(trimmed) {
            return Self::Toml;
        }

        Self::Yaml
    }

    /// Get default file extensions for this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Yaml => &["yaml", "yml"],
            Self::Json => &["json"],
            Self::Toml => &["toml"],
        }
    }

    /// The parser for this format
    pub fn parser(&self) -> Box<dyn ConfigParser> {
        match self {
            Self::Yaml => Box::new(YamlParser::new()),
            Self::Json => Box::new(JsonParser::new()),
            Self::Toml => Box::new(TomlParser::new()),
        }
    }
}

/// TOML has `[section]` headers or `key = value` lines
fn looks_like_toml(trimmed: &str) -> bool {
    let has_assignment = trimmed
        .lines()
        .map(str::trim_start)
        .any(|l| !l.starts_with('#') && l.contains(" = "));
    let has_section = trimmed
        .lines()
        .map(str::trim)
        .any(|l| l.starts_with('[') && l.ends_with(']') && !l.contains(','));
    has_assignment || (has_section && !trimmed.contains(": "))
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
            Self::Toml => write!(f, "toml"),
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| Error::UnsupportedFormat(s.to_string()))
    }
}

/// Turns raw configuration text into a [`ConfigTree`].
///
/// The comparison engine never reads text itself; it only sees trees produced
/// by an implementation of this trait.
pub trait ConfigParser: Send + Sync {
    /// Short name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Parse source text into a tree
    fn parse(&self, source: &str) -> Result<ConfigTree>;
}

/// Parser that picks the format per document via [`Format::from_content`]
#[derive(Debug, Default)]
pub struct AutoParser;

impl AutoParser {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigParser for AutoParser {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn parse(&self, source: &str) -> Result<ConfigTree> {
        let format = Format::from_content(source);
        tracing::debug!(%format, "Detected configuration format");
        format.parser().parse(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Format::from_extension("YML"), Some(Format::Yaml));
        assert_eq!(Format::from_extension("json"), Some(Format::Json));
        assert_eq!(Format::from_extension("toml"), Some(Format::Toml));
        assert_eq!(Format::from_extension("md"), None);
    }

    #[test]
    fn test_from_content() {
        assert_eq!(Format::from_content("{\"a\": 1}"), Format::Json);
        assert_eq!(Format::from_content("[server]\nport = 80\n"), Format::Toml);
        assert_eq!(Format::from_content("a = 1\n"), Format::Toml);
        assert_eq!(Format::from_content("database:\n  host: x\n"), Format::Yaml);
        assert_eq!(Format::from_content("- a\n- b\n"), Format::Yaml);
        assert_eq!(Format::from_content("[1, 2]"), Format::Json);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!(matches!(
            "ini".parse::<Format>(),
            Err(Error::UnsupportedFormat(f)) if f == "ini"
        ));
    }
}
