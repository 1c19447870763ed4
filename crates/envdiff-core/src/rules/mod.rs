//! Advisory rules
//!
//! Built-in rules and the ordered registry that evaluates them over a diff
//! report.

mod critical;
mod endpoint;
mod insecure;
mod registry;
mod rule;
mod scaling;

pub use critical::MissingInCriticalEnvironment;
pub use endpoint::EnvironmentSpecificValue;
pub use insecure::InsecureDefault;
pub use registry::{AdvisoryEvaluation, ReportWarning, RuleRegistry, WarningKind};
pub use rule::{Advisory, AdvisoryKind, AdvisoryRule, RuleContext, Severity};
pub use scaling::InconsistentScaling;
