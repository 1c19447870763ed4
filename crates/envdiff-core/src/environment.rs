//! Environment inputs, roles, and per-run environment status

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use envdiff_content::ConfigTree;
use serde::{Deserialize, Serialize};

/// One named configuration taking part in a comparison
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// Unique, case-sensitive, non-empty name
    pub name: String,
    /// Parsed configuration
    pub tree: ConfigTree,
    /// Display ordinal; lower ranks are "earlier" environments (dev before prod)
    pub rank: Option<u32>,
}

impl EnvironmentConfig {
    pub fn new(name: impl Into<String>, tree: ConfigTree) -> Self {
        Self {
            name: name.into(),
            tree,
            rank: None,
        }
    }

    /// Set the display rank
    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }
}

/// Caller-supplied role tags by environment name
///
/// ```
/// use envdiff_core::EnvironmentRoles;
///
/// let roles: EnvironmentRoles = [("production", "production-like")].into_iter().collect();
/// assert_eq!(roles.role("production"), Some("production-like"));
/// assert_eq!(roles.role("dev"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentRoles(BTreeMap<String, String>);

impl EnvironmentRoles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a role, replacing any previous one
    pub fn insert(&mut self, environment: impl Into<String>, role: impl Into<String>) {
        self.0.insert(environment.into(), role.into());
    }

    /// Role of an environment, if one was assigned
    pub fn role(&self, environment: &str) -> Option<&str> {
        self.0.get(environment).map(String::as_str)
    }

    /// All assignments in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvironmentRoles {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Outcome of loading one environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum EnvironmentState {
    /// Parsed and flattened without problems
    Ok,
    /// Parsing or flattening failed; any fields flattened before the failure
    /// still take part in the comparison
    Failed { error: String },
}

/// An environment as it appears in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSummary {
    pub name: String,
    pub rank: Option<u32>,
    /// Number of leaf fields contributed
    pub field_count: usize,
    #[serde(flatten)]
    pub state: EnvironmentState,
}

impl EnvironmentSummary {
    pub fn is_ok(&self) -> bool {
        self.state == EnvironmentState::Ok
    }
}

impl fmt::Display for EnvironmentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            EnvironmentState::Ok => write!(f, "{}", self.name),
            EnvironmentState::Failed { error } => write!(f, "{} (failed: {})", self.name, error),
        }
    }
}

/// Canonical environment order: ranked environments first by rank, then
/// unranked ones, ties broken by name. Never depends on input order.
pub fn canonical_order(a_name: &str, a_rank: Option<u32>, b_name: &str, b_rank: Option<u32>) -> Ordering {
    let key = |rank: Option<u32>| (rank.is_none(), rank);
    key(a_rank)
        .cmp(&key(b_rank))
        .then_with(|| a_name.cmp(b_name))
}
