//! Multi-environment diff engine
//!
//! Every environment is flattened and normalized independently, the union of
//! all paths is sorted, and one [`DiffRecord`] is built per path with a slot for
//! every environment in the run. Output order depends only on path strings and
//! environment ranks and names, never on the order environments were supplied.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use envdiff_content::{FlatField, NormalizedValue, ScalarType, flatten_partial};
use serde::{Deserialize, Serialize};

use crate::environment::{EnvironmentConfig, EnvironmentState, EnvironmentSummary, canonical_order};
use crate::error::{Error, Result};
use crate::report::DiffSummary;

/// Diff outcome for one path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Every healthy environment has the path and all values agree
    Consistent,
    /// Every healthy environment has the path but values differ
    Modified,
    /// Some, but not all, healthy environments have the path
    Missing,
    /// Exactly one of several healthy environments has the path
    Unique,
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Classification::Consistent,
        Classification::Modified,
        Classification::Missing,
        Classification::Unique,
    ];
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Consistent => write!(f, "consistent"),
            Self::Modified => write!(f, "modified"),
            Self::Missing => write!(f, "missing"),
            Self::Unique => write!(f, "unique"),
        }
    }
}

/// The value of one path in one environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentValue {
    pub environment: String,
    pub present: bool,
    pub value: Option<NormalizedValue>,
    pub source_type: Option<ScalarType>,
}

/// All environments' values for one canonical path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    pub path: String,
    pub classification: Classification,
    /// One slot per environment, in canonical environment order
    pub values: Vec<EnvironmentValue>,
}

impl DiffRecord {
    /// Value of this path in the given environment
    pub fn value_in(&self, environment: &str) -> Option<&NormalizedValue> {
        self.values
            .iter()
            .find(|v| v.environment == environment)
            .and_then(|v| v.value.as_ref())
    }

    /// Environments that have this path
    pub fn present_in(&self) -> impl Iterator<Item = &EnvironmentValue> {
        self.values.iter().filter(|v| v.present)
    }

    /// Environments that lack this path
    pub fn absent_in(&self) -> impl Iterator<Item = &EnvironmentValue> {
        self.values.iter().filter(|v| !v.present)
    }
}

/// Classify a path from the slots of the healthy environments.
///
/// Precedence: `unique`, then `missing`, then `modified`, then `consistent`.
/// With a single environment everything is `consistent`.
pub fn classify<'a>(values: impl IntoIterator<Item = &'a EnvironmentValue>) -> Classification {
    let mut slots = 0;
    let mut present: Vec<&NormalizedValue> = Vec::new();
    for slot in values {
        slots += 1;
        present.extend(slot.value.as_ref());
    }

    if present.len() < slots {
        if slots >= 2 && present.len() == 1 {
            return Classification::Unique;
        }
        return Classification::Missing;
    }

    let first = present.first();
    if present.iter().all(|v| Some(v) == first) {
        Classification::Consistent
    } else {
        Classification::Modified
    }
}

/// Result of diffing all environments of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    /// Environments in canonical order
    pub environments: Vec<EnvironmentSummary>,
    /// One record per distinct path, sorted by path
    pub records: Vec<DiffRecord>,
    pub summary: DiffSummary,
    /// At least one environment failed to load completely
    pub degraded: bool,
}

impl DiffReport {
    /// Look up the record for a path
    pub fn record(&self, path: &str) -> Option<&DiffRecord> {
        self.records
            .binary_search_by(|r| r.path.as_str().cmp(path))
            .ok()
            .map(|i| &self.records[i])
    }

    /// Look up an environment by name
    pub fn environment(&self, name: &str) -> Option<&EnvironmentSummary> {
        self.environments.iter().find(|e| e.name == name)
    }
}

enum Entry {
    Parsed(EnvironmentConfig),
    Failed {
        name: String,
        rank: Option<u32>,
        error: String,
    },
}

impl Entry {
    fn name(&self) -> &str {
        match self {
            Self::Parsed(env) => &env.name,
            Self::Failed { name, .. } => name,
        }
    }
}

/// Collects environments for one diff run
///
/// ```
/// use envdiff_content::ConfigTree;
/// use envdiff_core::{Classification, DiffEngine, EnvironmentConfig};
/// use serde_json::json;
///
/// let mut engine = DiffEngine::new();
/// engine.push(EnvironmentConfig::new("dev", ConfigTree::from(&json!({"a": 1}))));
/// engine.push(EnvironmentConfig::new("prod", ConfigTree::from(&json!({"a": "1"}))));
/// let report = engine.run().unwrap();
///
/// assert_eq!(report.records[0].classification, Classification::Consistent);
/// ```
#[derive(Default)]
pub struct DiffEngine {
    entries: Vec<Entry>,
}

struct Flattened {
    summary: EnvironmentSummary,
    fields: BTreeMap<String, FlatField>,
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parsed environment
    pub fn push(&mut self, environment: EnvironmentConfig) {
        self.entries.push(Entry::Parsed(environment));
    }

    /// Add an environment that could not be parsed.
    ///
    /// It appears in the report as failed and contributes no fields.
    pub fn push_failure(&mut self, name: impl Into<String>, rank: Option<u32>, error: impl Into<String>) {
        self.entries.push(Entry::Failed {
            name: name.into(),
            rank,
            error: error.into(),
        });
    }

    /// Diff every collected environment
    pub fn run(self) -> Result<DiffReport> {
        if self.entries.is_empty() {
            return Err(Error::EmptyInput);
        }
        validate_names(&self.entries)?;

        let mut flattened: Vec<Flattened> = self.entries.into_iter().map(flatten_entry).collect();

        if flattened.iter().all(|f| !f.summary.is_ok()) {
            let failures = flattened
                .iter()
                .map(|f| f.summary.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::NoUsableEnvironment { failures });
        }

        flattened.sort_by(|a, b| {
            canonical_order(&a.summary.name, a.summary.rank, &b.summary.name, b.summary.rank)
        });

        let paths: BTreeSet<&str> = flattened
            .iter()
            .flat_map(|f| f.fields.keys().map(String::as_str))
            .collect();
        tracing::debug!(
            environments = flattened.len(),
            paths = paths.len(),
            "Computed path union"
        );

        let records: Vec<DiffRecord> = paths
            .into_iter()
            .map(|path| build_record(path, &flattened))
            .collect();

        let degraded = flattened.iter().any(|f| !f.summary.is_ok());
        let environments: Vec<EnvironmentSummary> =
            flattened.into_iter().map(|f| f.summary).collect();

        Ok(DiffReport {
            summary: DiffSummary::tally(&records),
            environments,
            records,
            degraded,
        })
    }
}

/// Diff a set of parsed environments
pub fn diff(environments: impl IntoIterator<Item = EnvironmentConfig>) -> Result<DiffReport> {
    let mut engine = DiffEngine::new();
    for environment in environments {
        engine.push(environment);
    }
    engine.run()
}

fn validate_names(entries: &[Entry]) -> Result<()> {
    let mut seen = HashSet::new();
    for entry in entries {
        let name = entry.name();
        if name.trim().is_empty() {
            return Err(Error::InvalidEnvironmentName {
                name: name.to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(Error::DuplicateEnvironment {
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn flatten_entry(entry: Entry) -> Flattened {
    match entry {
        Entry::Parsed(env) => {
            let (fields, failure) = flatten_partial(&env.tree);
            let state = match failure {
                None => EnvironmentState::Ok,
                Some(err) => {
                    tracing::warn!(
                        environment = %env.name,
                        path = err.path(),
                        "Structural error, keeping {} fields flattened before it: {}",
                        fields.len(),
                        err
                    );
                    EnvironmentState::Failed {
                        error: err.to_string(),
                    }
                }
            };
            let fields: BTreeMap<String, FlatField> =
                fields.into_iter().map(|f| (f.path.clone(), f)).collect();
            Flattened {
                summary: EnvironmentSummary {
                    name: env.name,
                    rank: env.rank,
                    field_count: fields.len(),
                    state,
                },
                fields,
            }
        }
        Entry::Failed { name, rank, error } => {
            tracing::warn!(environment = %name, "Environment failed to load: {}", error);
            Flattened {
                summary: EnvironmentSummary {
                    name,
                    rank,
                    field_count: 0,
                    state: EnvironmentState::Failed { error },
                },
                fields: BTreeMap::new(),
            }
        }
    }
}

fn build_record(path: &str, environments: &[Flattened]) -> DiffRecord {
    let values: Vec<EnvironmentValue> = environments
        .iter()
        .map(|env| {
            let field = env.fields.get(path);
            EnvironmentValue {
                environment: env.summary.name.clone(),
                present: field.is_some(),
                value: field.map(|f| f.value.clone()),
                source_type: field.map(|f| f.source_type),
            }
        })
        .collect();

    // Failed environments keep their slot but have no say in the classification
    let healthy = environments
        .iter()
        .zip(&values)
        .filter(|(env, _)| env.summary.is_ok())
        .map(|(_, slot)| slot);

    DiffRecord {
        path: path.to_string(),
        classification: classify(healthy),
        values,
    }
}
