//! Error types for envdiff-cli

use envdiff_core::Severity;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from envdiff-core
    #[error(transparent)]
    Core(#[from] envdiff_core::Error),

    /// Error from envdiff-content
    #[error(transparent)]
    Content(#[from] envdiff_content::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Advisories at or above the `--fail-on` threshold were raised
    #[error("{count} advisories at or above '{threshold}' severity")]
    Threshold { count: usize, threshold: Severity },

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Threshold { .. } => 2,
            _ => 1,
        }
    }
}
