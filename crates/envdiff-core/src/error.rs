//! Error types for envdiff-core

use std::path::PathBuf;

/// Result type for envdiff-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that end a comparison run.
///
/// Per-environment parse and structural failures are not errors at this
/// level: they are recorded on the environment and mark the report degraded.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No environments supplied; nothing to compare")]
    EmptyInput,

    #[error("Invalid environment name {name:?}: names must be non-empty")]
    InvalidEnvironmentName { name: String },

    #[error("Environment '{name}' supplied more than once")]
    DuplicateEnvironment { name: String },

    #[error("Every environment failed to load: {failures}")]
    NoUsableEnvironment { failures: String },

    #[error("Role mapping references unknown environment '{environment}' (role '{role}')")]
    InvalidRoleMapping { environment: String, role: String },

    #[error("Invalid configuration at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Config file too large: {path} is {size} bytes (max {max})")]
    ConfigTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
