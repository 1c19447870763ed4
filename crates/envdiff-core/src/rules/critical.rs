//! missing-in-critical-environment rule

use std::collections::BTreeSet;

use envdiff_content::trailing_key;

use super::rule::{Advisory, AdvisoryKind, AdvisoryRule, RuleContext, Severity, key_matches};
use crate::config::MissingKeyConfig;
use crate::diff::{Classification, DiffRecord};

/// Flags paths that are set in some environments but absent from a healthy
/// critical one.
#[derive(Debug, Clone, Default)]
pub struct MissingInCriticalEnvironment {
    config: MissingKeyConfig,
}

impl MissingInCriticalEnvironment {
    pub fn new(config: MissingKeyConfig) -> Self {
        Self { config }
    }
}

impl AdvisoryRule for MissingInCriticalEnvironment {
    fn id(&self) -> &str {
        "missing-in-critical-environment"
    }

    fn evaluate(&self, record: &DiffRecord, ctx: &RuleContext<'_>) -> Vec<Advisory> {
        if !matches!(
            record.classification,
            Classification::Missing | Classification::Unique
        ) {
            return Vec::new();
        }

        // Absence from a failed environment says nothing about its real config
        let absent: Vec<&str> = record
            .absent_in()
            .map(|v| v.environment.as_str())
            .filter(|env| ctx.is_healthy(env) && ctx.is_critical(env))
            .collect();
        if absent.is_empty() {
            return Vec::new();
        }

        let present: Vec<&str> = record.present_in().map(|v| v.environment.as_str()).collect();
        let key = trailing_key(&record.path).unwrap_or_else(|| record.path.clone());
        let severity = if key_matches(&key, &self.config.keywords) {
            Severity::High
        } else {
            Severity::Medium
        };

        let described: Vec<String> = absent.iter().map(|env| ctx.describe(env)).collect();
        let verb = if absent.len() == 1 { "is" } else { "are" };
        let description = format!(
            "{} {verb} missing `{}`, which is set in {}",
            described.join(", "),
            record.path,
            present.join(", ")
        );

        let all_bool = record
            .present_in()
            .all(|v| v.value.as_ref().is_some_and(|value| value.is_bool()));
        let targets = absent.join(", ");
        let recommendation = if all_bool {
            format!("Add an explicit `{key}: false` to the {targets} configuration")
        } else {
            format!(
                "Define `{}` explicitly in {targets} instead of relying on application defaults",
                record.path
            )
        };

        vec![Advisory {
            rule: self.id().to_string(),
            kind: AdvisoryKind::MissingInCriticalEnvironment,
            severity,
            description,
            recommendation,
            paths: BTreeSet::from([record.path.clone()]),
            environments: absent.iter().map(|env| env.to_string()).collect(),
        }]
    }
}
