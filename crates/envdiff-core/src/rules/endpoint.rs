//! environment-specific-value rule

use std::collections::BTreeSet;

use envdiff_content::trailing_key;

use super::rule::{Advisory, AdvisoryKind, AdvisoryRule, RuleContext, Severity, key_matches};
use crate::config::EnvironmentSpecificConfig;
use crate::diff::{Classification, DiffRecord};

/// Notes endpoint-like settings (hosts, URLs) that carry a distinct value in
/// every environment, a sign they belong in the deployment environment rather
/// than in the checked-in config.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSpecificValue {
    config: EnvironmentSpecificConfig,
}

impl EnvironmentSpecificValue {
    pub fn new(config: EnvironmentSpecificConfig) -> Self {
        Self { config }
    }
}

impl AdvisoryRule for EnvironmentSpecificValue {
    fn id(&self) -> &str {
        "environment-specific-value"
    }

    fn evaluate(&self, record: &DiffRecord, _ctx: &RuleContext<'_>) -> Vec<Advisory> {
        if record.classification != Classification::Modified {
            return Vec::new();
        }
        let Some(key) = trailing_key(&record.path) else {
            return Vec::new();
        };
        if !key_matches(&key, &self.config.keywords) {
            return Vec::new();
        }

        let distinct: BTreeSet<_> = record.values.iter().filter_map(|v| v.value.as_ref()).collect();
        if distinct.len() != record.values.len() {
            return Vec::new();
        }

        vec![Advisory {
            rule: self.id().to_string(),
            kind: AdvisoryKind::EnvironmentSpecificValue,
            severity: Severity::Info,
            description: format!(
                "`{}` is configured separately for each environment ({} distinct values)",
                record.path,
                distinct.len()
            ),
            recommendation: format!(
                "Consider supplying `{}` through environment variables instead of per-environment files",
                record.path
            ),
            paths: BTreeSet::from([record.path.clone()]),
            environments: record.values.iter().map(|v| v.environment.clone()).collect(),
        }]
    }
}
