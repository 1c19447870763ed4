//! Ordered rule registry and evaluation
//!
//! The registry holds rules in priority order. Evaluation visits records in
//! report order (sorted by path) and, within a record, rules in registration
//! order. That total order is what makes advisory output reproducible.

use serde::{Deserialize, Serialize};

use super::critical::MissingInCriticalEnvironment;
use super::endpoint::EnvironmentSpecificValue;
use super::insecure::InsecureDefault;
use super::rule::{Advisory, AdvisoryRule, RuleContext};
use super::scaling::InconsistentScaling;
use crate::config::{CompareConfig, RuleSpec};
use crate::diff::DiffReport;
use crate::environment::EnvironmentRoles;
use crate::error::Error;

/// Kind of non-fatal problem found while evaluating rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// The role map names an environment that is not part of the run
    InvalidRoleMapping,
}

/// A non-fatal problem carried alongside the advisories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWarning {
    pub kind: WarningKind,
    pub environment: String,
    pub message: String,
}

impl ReportWarning {
    /// The equivalent hard error, for callers that refuse to continue
    pub fn into_error(self, role: impl Into<String>) -> Error {
        match self.kind {
            WarningKind::InvalidRoleMapping => Error::InvalidRoleMapping {
                environment: self.environment,
                role: role.into(),
            },
        }
    }
}

/// Output of [`RuleRegistry::evaluate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvisoryEvaluation {
    pub advisories: Vec<Advisory>,
    pub warnings: Vec<ReportWarning>,
}

/// Rules in priority order, plus the roles treated as critical
pub struct RuleRegistry {
    rules: Vec<Box<dyn AdvisoryRule>>,
    critical_roles: Vec<String>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::from_config(&CompareConfig::default())
    }
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new(critical_roles: Vec<String>) -> Self {
        Self {
            rules: Vec::new(),
            critical_roles,
        }
    }

    /// Build the registry described by a configuration
    pub fn from_config(config: &CompareConfig) -> Self {
        let mut registry = Self::new(config.critical_roles.clone());
        for spec in &config.rules {
            registry.register(build_rule(spec));
        }
        registry
    }

    /// Append a rule; it fires after every rule registered before it
    pub fn register(&mut self, rule: Box<dyn AdvisoryRule>) {
        self.rules.push(rule);
    }

    /// Rule ids in priority order
    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub fn critical_roles(&self) -> &[String] {
        &self.critical_roles
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule against every record of a report.
    ///
    /// Role assignments for environments outside the report are ignored and
    /// reported as warnings.
    pub fn evaluate(&self, report: &DiffReport, roles: &EnvironmentRoles) -> AdvisoryEvaluation {
        let warnings: Vec<ReportWarning> = roles
            .iter()
            .filter(|(name, _)| report.environment(name).is_none())
            .map(|(name, role)| {
                tracing::warn!(environment = name, role, "Role mapping names an unknown environment");
                ReportWarning {
                    kind: WarningKind::InvalidRoleMapping,
                    environment: name.to_string(),
                    message: format!(
                        "role '{role}' assigned to unknown environment '{name}' was ignored"
                    ),
                }
            })
            .collect();

        let ctx = RuleContext::new(&report.environments, roles, &self.critical_roles);
        let mut advisories = Vec::new();
        for record in &report.records {
            for rule in &self.rules {
                advisories.extend(rule.evaluate(record, &ctx));
            }
        }

        tracing::debug!(
            records = report.records.len(),
            rules = self.rules.len(),
            advisories = advisories.len(),
            "Evaluated advisory rules"
        );

        AdvisoryEvaluation {
            advisories,
            warnings,
        }
    }
}

fn build_rule(spec: &RuleSpec) -> Box<dyn AdvisoryRule> {
    match spec {
        RuleSpec::MissingInCriticalEnvironment(config) => {
            Box::new(MissingInCriticalEnvironment::new(config.clone()))
        }
        RuleSpec::InsecureDefault(config) => Box::new(InsecureDefault::new(config.clone())),
        RuleSpec::InconsistentScaling(config) => Box::new(InconsistentScaling::new(config.clone())),
        RuleSpec::EnvironmentSpecificValue(config) => {
            Box::new(EnvironmentSpecificValue::new(config.clone()))
        }
    }
}
