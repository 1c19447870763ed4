//! Flatten command implementation
//!
//! Shows the canonical paths and normalized values a file contributes to a
//! comparison.

use std::fs;
use std::path::Path;

use colored::Colorize;

use envdiff_content::{AutoParser, ConfigParser, Format, flatten_partial};

use crate::error::{CliError, Result};

/// Run the flatten command
pub fn run_flatten(path: &Path, format: Option<Format>, json: bool) -> Result<()> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::user(format!("Cannot read {}: {e}", path.display())))?;

    let format = format.or_else(|| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    });
    let parser: Box<dyn ConfigParser> = match format {
        Some(format) => format.parser(),
        None => Box::new(AutoParser::new()),
    };
    tracing::debug!(path = %path.display(), parser = parser.name(), "Flattening file");

    let tree = parser.parse(&text)?;
    let (fields, failure) = flatten_partial(&tree);

    if json {
        println!("{}", serde_json::to_string_pretty(&fields)?);
    } else {
        let width = fields.iter().map(|f| f.path.len()).max().unwrap_or(0);
        for field in &fields {
            let path = if field.path.is_empty() { "<root>" } else { field.path.as_str() };
            println!(
                "{:<width$}  {}  {}",
                path.cyan(),
                field.value,
                format!("({})", field.source_type).dimmed()
            );
        }
    }

    match failure {
        Some(err) => Err(envdiff_content::Error::from(err).into()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_flatten_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(&path, "[server]\nport = 8080\n").unwrap();

        assert!(run_flatten(&path, None, false).is_ok());
        assert!(run_flatten(&path, None, true).is_ok());
    }

    #[test]
    fn test_flatten_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.json");
        fs::write(&path, "{ nope").unwrap();

        let result = run_flatten(&path, None, false);
        assert!(matches!(result, Err(CliError::Content(_))));
    }
}
