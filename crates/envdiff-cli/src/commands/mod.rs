//! Command implementations for envdiff-cli

pub mod compare;
pub mod flatten;
pub mod rules;

use std::path::Path;

use envdiff_core::CompareConfig;

pub use compare::{CompareArgs, run_compare};
pub use flatten::run_flatten;
pub use rules::run_rules;

use crate::error::Result;

/// Load the comparison config, or the built-in defaults when none is given
pub(crate) fn load_config(path: Option<&Path>) -> Result<CompareConfig> {
    match path {
        Some(path) => Ok(CompareConfig::load(path)?),
        None => Ok(CompareConfig::default()),
    }
}
