//! Error types for envdiff-content

/// Result type for envdiff-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or flattening configuration content
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse {format} content: {message}")]
    ParseError { format: String, message: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Structural(#[from] StructuralError),
}

impl Error {
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            format: format.into(),
            message: message.into(),
        }
    }
}

/// A configuration tree that violates the tree invariants.
///
/// Well-formed parser output never produces these, but trees handed over by
/// external parsers are not trusted. `path` is the canonical path of the
/// location where traversal stopped (empty for the document root).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    #[error("Cycle detected at '{path}': node {node} is its own ancestor")]
    Cycle { path: String, node: usize },

    #[error("Node {node} at '{path}' is already owned by another parent")]
    SharedNode { path: String, node: usize },

    #[error("Dangling reference at '{path}': node {node} does not exist")]
    DanglingNode { path: String, node: usize },

    #[error("Duplicate key '{key}' in mapping at '{path}'")]
    DuplicateKey { path: String, key: String },

    #[error("Nesting deeper than {max} levels at '{path}'")]
    DepthExceeded { path: String, max: usize },
}

impl StructuralError {
    /// Path at which the violation was detected
    pub fn path(&self) -> &str {
        match self {
            Self::Cycle { path, .. }
            | Self::SharedNode { path, .. }
            | Self::DanglingNode { path, .. }
            | Self::DuplicateKey { path, .. }
            | Self::DepthExceeded { path, .. } => path,
        }
    }
}
