//! Multi-environment configuration comparison for envdiff
//!
//! Diffs any number of named configuration trees path by path, classifies
//! every path, runs an ordered set of advisory rules over the result and
//! assembles a deterministic report.
//!
//! ```
//! use envdiff_content::ConfigTree;
//! use envdiff_core::{Comparison, EnvironmentConfig, EnvironmentRoles};
//! use serde_json::json;
//!
//! let environments = vec![
//!     EnvironmentConfig::new("dev", ConfigTree::from(&json!({"features": {"beta_features": true}}))).with_rank(0),
//!     EnvironmentConfig::new("production", ConfigTree::from(&json!({"features": {}}))).with_rank(1),
//! ];
//! let roles: EnvironmentRoles = [("production", "production-like")].into_iter().collect();
//!
//! let report = Comparison::default().run_parsed(environments, &roles).unwrap();
//! assert_eq!(report.advisories.summary.high, 1);
//! ```

pub mod compare;
pub mod config;
pub mod diff;
pub mod environment;
pub mod error;
pub mod report;
pub mod rules;

pub use compare::{Comparison, EnvironmentSource};
pub use config::{
    CompareConfig, DEFAULT_CRITICAL_ROLE, EnvironmentSettings, EnvironmentSpecificConfig,
    InsecureDefaultConfig, MAX_CONFIG_SIZE, MissingKeyConfig, RuleSpec, ScalingConfig,
    SensitiveSetting,
};
pub use diff::{Classification, DiffEngine, DiffRecord, DiffReport, EnvironmentValue, classify, diff};
pub use environment::{EnvironmentConfig, EnvironmentRoles, EnvironmentState, EnvironmentSummary};
pub use error::{Error, Result};
pub use report::{AdvisoryReport, AdvisorySummary, ComparisonReport, DiffSummary, assemble};
pub use rules::{
    Advisory, AdvisoryEvaluation, AdvisoryKind, AdvisoryRule, ReportWarning, RuleContext,
    RuleRegistry, Severity, WarningKind,
};
