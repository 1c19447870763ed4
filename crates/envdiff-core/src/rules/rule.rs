//! Advisory types and the rule trait
//!
//! An [`AdvisoryRule`] is a pure function of one [`DiffRecord`] and the
//! [`RuleContext`] of the run. Rules never see or mutate the report as a whole,
//! which keeps them independently testable and order-insensitive apart from
//! their registration position.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diff::DiffRecord;
use crate::environment::{EnvironmentRoles, EnvironmentSummary};

/// How urgently an advisory should be acted upon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Severity::High, Severity::Medium, Severity::Low, Severity::Info];
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// What an advisory is about
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvisoryKind {
    MissingInCriticalEnvironment,
    InsecureDefault,
    InconsistentScaling,
    EnvironmentSpecificValue,
    /// Raised by a rule registered outside this crate
    Custom(String),
}

impl fmt::Display for AdvisoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInCriticalEnvironment => write!(f, "missing-in-critical-environment"),
            Self::InsecureDefault => write!(f, "insecure-default"),
            Self::InconsistentScaling => write!(f, "inconsistent-scaling"),
            Self::EnvironmentSpecificValue => write!(f, "environment-specific-value"),
            Self::Custom(kind) => write!(f, "{kind}"),
        }
    }
}

/// A human-actionable finding produced by one rule invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    /// Id of the rule that produced this advisory
    pub rule: String,
    pub kind: AdvisoryKind,
    pub severity: Severity,
    pub description: String,
    pub recommendation: String,
    /// Paths the advisory refers to
    pub paths: BTreeSet<String>,
    /// Environments the advisory refers to, in canonical order
    pub environments: Vec<String>,
}

/// Read-only view of the run shared by all rule invocations
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    environments: &'a [EnvironmentSummary],
    roles: &'a EnvironmentRoles,
    critical_roles: &'a [String],
}

impl<'a> RuleContext<'a> {
    pub fn new(
        environments: &'a [EnvironmentSummary],
        roles: &'a EnvironmentRoles,
        critical_roles: &'a [String],
    ) -> Self {
        Self {
            environments,
            roles,
            critical_roles,
        }
    }

    /// Environments of the run in canonical order
    pub fn environments(&self) -> &'a [EnvironmentSummary] {
        self.environments
    }

    fn summary(&self, environment: &str) -> Option<&'a EnvironmentSummary> {
        self.environments.iter().find(|e| e.name == environment)
    }

    /// Role of an environment that belongs to this run
    pub fn role(&self, environment: &str) -> Option<&'a str> {
        self.summary(environment)?;
        self.roles.role(environment)
    }

    /// Whether the environment's role is one of the critical roles
    pub fn is_critical(&self, environment: &str) -> bool {
        self.role(environment)
            .is_some_and(|role| self.critical_roles.iter().any(|c| c == role))
    }

    /// Whether the environment loaded without errors
    pub fn is_healthy(&self, environment: &str) -> bool {
        self.summary(environment).is_some_and(EnvironmentSummary::is_ok)
    }

    pub fn rank(&self, environment: &str) -> Option<u32> {
        self.summary(environment).and_then(|e| e.rank)
    }

    /// `name (role)` when a role is known, otherwise just the name
    pub fn describe(&self, environment: &str) -> String {
        match self.role(environment) {
            Some(role) => format!("{environment} ({role})"),
            None => environment.to_string(),
        }
    }
}

/// A pure advisory rule
pub trait AdvisoryRule: Send + Sync {
    /// Stable identifier, also used in configuration files
    fn id(&self) -> &str;

    /// Evaluate one record
    fn evaluate(&self, record: &DiffRecord, ctx: &RuleContext<'_>) -> Vec<Advisory>;
}

/// Segment-aligned suffix match: `logging.level` matches `app.logging.level`
/// but not `app.xlogging.level`.
pub(crate) fn path_has_suffix(path: &str, suffix: &str) -> bool {
    let path = path.to_lowercase();
    let suffix = suffix.to_lowercase();
    path == suffix || path.ends_with(&format!(".{suffix}"))
}

/// Split a key into lowercase words at `_`, `-`, other punctuation and
/// camelCase boundaries.
fn words(key: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;
    for c in key.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if c.is_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = c.is_lowercase() || c.is_numeric();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Word-aligned, case-insensitive keyword match.
///
/// A keyword matches a run of whole words in the key, with an optional plural
/// `s` on the last one: `feature` matches `beta_features` and `auth` matches
/// `authToken`, but `rate` does not match `generate` and `auth` does not match
/// `author`.
pub(crate) fn key_matches(key: &str, keywords: &[String]) -> bool {
    let key = format!("_{}_", words(key).join("_"));
    keywords.iter().any(|keyword| {
        let keyword = words(keyword).join("_");
        !keyword.is_empty()
            && (key.contains(&format!("_{keyword}_")) || key.contains(&format!("_{keyword}s_")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::EnvironmentState;

    fn summary(name: &str, state: EnvironmentState) -> EnvironmentSummary {
        EnvironmentSummary {
            name: name.to_string(),
            rank: None,
            field_count: 0,
            state,
        }
    }

    #[test]
    fn test_context_roles_and_health() {
        let environments = vec![
            summary("dev", EnvironmentState::Ok),
            summary(
                "production",
                EnvironmentState::Failed {
                    error: "bad".to_string(),
                },
            ),
        ];
        let roles: EnvironmentRoles = [("production", "production-like"), ("ghost", "production-like")]
            .into_iter()
            .collect();
        let critical = vec!["production-like".to_string()];
        let ctx = RuleContext::new(&environments, &roles, &critical);

        assert!(ctx.is_critical("production"));
        assert!(!ctx.is_critical("dev"));
        assert!(!ctx.is_critical("ghost"));
        assert!(ctx.is_healthy("dev"));
        assert!(!ctx.is_healthy("production"));
        assert_eq!(ctx.describe("production"), "production (production-like)");
        assert_eq!(ctx.describe("dev"), "dev");
    }

    #[test]
    fn test_path_has_suffix() {
        assert!(path_has_suffix("logging.level", "logging.level"));
        assert!(path_has_suffix("app.Logging.Level", "logging.level"));
        assert!(!path_has_suffix("app.xlogging.level", "logging.level"));
        assert!(path_has_suffix("service.debug", "debug"));
        assert!(!path_has_suffix("service.debugger", "debug"));
    }

    #[test]
    fn test_key_matches() {
        let keywords = vec!["feature".to_string()];
        assert!(key_matches("beta_features", &keywords));
        assert!(key_matches("FEATURE", &keywords));
        assert!(!key_matches("host", &keywords));
    }

    #[test]
    fn test_key_matches_whole_words_only() {
        let keywords: Vec<String> = ["rate", "auth", "log_level"].map(String::from).to_vec();
        assert!(key_matches("rate_limit", &keywords));
        assert!(key_matches("authToken", &keywords));
        assert!(key_matches("auth-mode", &keywords));
        assert!(key_matches("logLevel", &keywords));
        assert!(!key_matches("generate", &keywords));
        assert!(!key_matches("migrate_on_start", &keywords));
        assert!(!key_matches("moderate", &keywords));
        assert!(!key_matches("author", &keywords));
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::High < Severity::Info);
        assert_eq!(Severity::Medium.to_string(), "medium");
    }
}
