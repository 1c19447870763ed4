//! Canonical path rendering and parsing
//!
//! Leaf locations are identified by dot-separated paths with array indexing:
//!
//! - Dot-separated keys: `config.database.host`
//! - Array indexing: `items[0].name`
//! - Keys that would be ambiguous are quoted: `labels."app.kubernetes.io/name"`
//!
//! Rendering is injective: two different segment lists never render to the
//! same string, and [`parse_path`] inverts [`render_path`].
//!
//! # Examples
//!
//! ```
//! use envdiff_content::path::{parse_path, render_path, PathSegment};
//!
//! let segments = vec![
//!     PathSegment::Key("servers".to_string()),
//!     PathSegment::Index(0),
//!     PathSegment::Key("host".to_string()),
//! ];
//! let path = render_path(&segments);
//! assert_eq!(path, "servers[0].host");
//! assert_eq!(parse_path(&path), segments);
//! ```

/// A segment of a path - either a key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A key in a mapping (e.g., "database" in "config.database")
    Key(String),
    /// An index in a sequence (e.g., 0 in `items[0]`)
    Index(usize),
}

fn needs_quoting(key: &str) -> bool {
    key.is_empty()
        || key
            .chars()
            .any(|c| matches!(c, '.' | '[' | ']' | '"' | '\\'))
}

fn push_key(out: &mut String, key: &str) {
    if needs_quoting(key) {
        out.push('"');
        for ch in key.chars() {
            if ch == '"' || ch == '\\' {
                out.push('\\');
            }
            out.push(ch);
        }
        out.push('"');
    } else {
        out.push_str(key);
    }
}

/// Render segments into a canonical path string.
///
/// The empty segment list (the document root) renders as the empty string.
pub fn render_path(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        match segment {
            PathSegment::Key(key) => {
                if i > 0 {
                    out.push('.');
                }
                push_key(&mut out, key);
            }
            PathSegment::Index(idx) => {
                out.push('[');
                out.push_str(&idx.to_string());
                out.push(']');
            }
        }
    }
    out
}

/// Parse a path string into segments.
///
/// # Examples
///
/// ```
/// use envdiff_content::path::{parse_path, PathSegment};
///
/// let path = parse_path("config.database.host");
/// assert_eq!(path, vec![
///     PathSegment::Key("config".to_string()),
///     PathSegment::Key("database".to_string()),
///     PathSegment::Key("host".to_string()),
/// ]);
///
/// let path = parse_path("items[0].name");
/// assert_eq!(path, vec![
///     PathSegment::Key("items".to_string()),
///     PathSegment::Index(0),
///     PathSegment::Key("name".to_string()),
/// ]);
/// ```
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut current_key = String::new();
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                }
            }
            '"' => {
                // Quoted key runs to the next unescaped quote
                let mut quoted = String::new();
                while let Some(ch) = chars.next() {
                    match ch {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                quoted.push(escaped);
                            }
                        }
                        '"' => break,
                        _ => quoted.push(ch),
                    }
                }
                segments.push(PathSegment::Key(quoted));
            }
            '[' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                }
                let mut index_str = String::new();
                for ch in chars.by_ref() {
                    if ch == ']' {
                        break;
                    }
                    index_str.push(ch);
                }
                if let Ok(index) = index_str.parse::<usize>() {
                    segments.push(PathSegment::Index(index));
                }
            }
            _ => {
                current_key.push(ch);
            }
        }
    }

    if !current_key.is_empty() {
        segments.push(PathSegment::Key(current_key));
    }

    segments
}

/// The last key segment of a path, skipping trailing indices.
///
/// `servers[0].host` yields `host`, `allowed_origins[2]` yields
/// `allowed_origins`.
pub fn trailing_key(path: &str) -> Option<String> {
    parse_path(path).into_iter().rev().find_map(|segment| match segment {
        PathSegment::Key(key) => Some(key),
        PathSegment::Index(_) => None,
    })
}
