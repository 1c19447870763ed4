//! insecure-default rule

use std::collections::BTreeSet;

use super::rule::{Advisory, AdvisoryKind, AdvisoryRule, RuleContext, Severity, path_has_suffix};
use crate::config::{InsecureDefaultConfig, SensitiveSetting};
use crate::diff::DiffRecord;

/// Flags sensitive settings that resolve to permissive values, such as debug
/// logging in a critical environment.
#[derive(Debug, Clone, Default)]
pub struct InsecureDefault {
    config: InsecureDefaultConfig,
}

impl InsecureDefault {
    pub fn new(config: InsecureDefaultConfig) -> Self {
        Self { config }
    }

    fn matching_setting(&self, path: &str) -> Option<&SensitiveSetting> {
        self.config
            .settings
            .iter()
            .find(|s| path_has_suffix(path, &s.suffix))
    }
}

impl AdvisoryRule for InsecureDefault {
    fn id(&self) -> &str {
        "insecure-default"
    }

    fn evaluate(&self, record: &DiffRecord, ctx: &RuleContext<'_>) -> Vec<Advisory> {
        let Some(setting) = self.matching_setting(&record.path) else {
            return Vec::new();
        };

        // (environment, value text) pairs whose value is on the insecure list
        let offending: Vec<(&str, String)> = record
            .present_in()
            .filter_map(|v| {
                let text = v.value.as_ref()?.to_string();
                setting
                    .insecure_values
                    .iter()
                    .any(|bad| bad.eq_ignore_ascii_case(&text))
                    .then(|| (v.environment.as_str(), text))
            })
            .collect();
        if offending.is_empty() {
            return Vec::new();
        }

        let critical: Vec<&(&str, String)> = offending
            .iter()
            .filter(|(env, _)| ctx.is_healthy(env) && ctx.is_critical(env))
            .collect();

        let advisory = if !critical.is_empty() {
            let found = critical
                .iter()
                .map(|(env, value)| format!("`{value}` in {}", ctx.describe(env)))
                .collect::<Vec<_>>()
                .join(", ");
            Advisory {
                rule: self.id().to_string(),
                kind: AdvisoryKind::InsecureDefault,
                severity: Severity::High,
                description: format!("`{}` resolves to {found}", record.path),
                recommendation: format!(
                    "Set `{}` to a restrictive value in critical environments; {} should never be used there",
                    record.path,
                    quoted_list(&setting.insecure_values)
                ),
                paths: BTreeSet::from([record.path.clone()]),
                environments: critical.iter().map(|(env, _)| env.to_string()).collect(),
            }
        } else if self.config.report_non_critical {
            let found = offending
                .iter()
                .map(|(env, value)| format!("`{value}` in {env}"))
                .collect::<Vec<_>>()
                .join(", ");
            Advisory {
                rule: self.id().to_string(),
                kind: AdvisoryKind::InsecureDefault,
                severity: Severity::Info,
                description: format!("`{}` is permissive outside critical environments: {found}", record.path),
                recommendation: format!(
                    "Ensure `{}` stays restrictive in production for security",
                    record.path
                ),
                paths: BTreeSet::from([record.path.clone()]),
                environments: offending.iter().map(|(env, _)| env.to_string()).collect(),
            }
        } else {
            return Vec::new();
        };

        vec![advisory]
    }
}

fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("`{v}`"))
        .collect::<Vec<_>>()
        .join("/")
}
