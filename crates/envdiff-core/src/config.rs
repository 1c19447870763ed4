//! Comparison configuration
//!
//! The configuration surface consumed by the engine: the set of roles treated
//! as critical, the ordered rule registry with per-rule tunables, and optional
//! per-environment role and rank settings. Usually loaded from `envdiff.toml`:
//!
//! ```toml
//! critical_roles = ["production-like"]
//!
//! [environments.production]
//! role = "production-like"
//! rank = 2
//!
//! [[rules]]
//! id = "missing-in-critical-environment"
//! keywords = ["feature", "limit"]
//!
//! [[rules]]
//! id = "inconsistent-scaling"
//! ```
//!
//! Rules fire in the order they are listed. Omitting `rules` registers every
//! built-in rule with its defaults.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::environment::EnvironmentRoles;
use crate::error::{Error, Result};

/// Largest configuration file accepted by [`CompareConfig::load`]
pub const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

/// Role that marks an environment as critical by default
pub const DEFAULT_CRITICAL_ROLE: &str = "production-like";

/// Top-level comparison configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Roles whose environments are held to production standards
    pub critical_roles: Vec<String>,
    /// Advisory rules in priority order
    pub rules: Vec<RuleSpec>,
    /// Per-environment settings by environment name
    pub environments: BTreeMap<String, EnvironmentSettings>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            critical_roles: vec![DEFAULT_CRITICAL_ROLE.to_string()],
            rules: RuleSpec::defaults(),
            environments: BTreeMap::new(),
        }
    }
}

impl CompareConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let size = fs::metadata(path)?.len();
        if size > MAX_CONFIG_SIZE {
            return Err(Error::ConfigTooLarge {
                path: path.to_path_buf(),
                size,
                max: MAX_CONFIG_SIZE,
            });
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::InvalidConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate(path)?;

        tracing::debug!(?path, rules = config.rules.len(), "Loaded comparison config");
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate(Path::new("<inline>"))?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |message: String| Error::InvalidConfig {
            path: PathBuf::from(path),
            message,
        };

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.id()) {
                return Err(invalid(format!("rule '{}' is listed more than once", rule.id())));
            }
        }
        if let Some(name) = self.environments.keys().find(|name| name.trim().is_empty()) {
            return Err(invalid(format!("invalid environment name {name:?}")));
        }
        Ok(())
    }

    /// Roles assigned under `[environments]`
    pub fn roles(&self) -> EnvironmentRoles {
        self.environments
            .iter()
            .filter_map(|(name, settings)| settings.role.as_ref().map(|role| (name.clone(), role.clone())))
            .collect()
    }

    /// Rank assigned under `[environments]`
    pub fn rank(&self, environment: &str) -> Option<u32> {
        self.environments.get(environment).and_then(|s| s.rank)
    }
}

/// Settings for one named environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSettings {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub rank: Option<u32>,
}

/// One entry of the rule registry, tagged by rule id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "id", rename_all = "kebab-case")]
pub enum RuleSpec {
    MissingInCriticalEnvironment(MissingKeyConfig),
    InsecureDefault(InsecureDefaultConfig),
    InconsistentScaling(ScalingConfig),
    EnvironmentSpecificValue(EnvironmentSpecificConfig),
}

impl RuleSpec {
    /// Every built-in rule with default tunables, in default priority order
    pub fn defaults() -> Vec<RuleSpec> {
        vec![
            Self::MissingInCriticalEnvironment(MissingKeyConfig::default()),
            Self::InsecureDefault(InsecureDefaultConfig::default()),
            Self::InconsistentScaling(ScalingConfig::default()),
            Self::EnvironmentSpecificValue(EnvironmentSpecificConfig::default()),
        ]
    }

    /// Stable rule identifier
    pub fn id(&self) -> &'static str {
        match self {
            Self::MissingInCriticalEnvironment(_) => "missing-in-critical-environment",
            Self::InsecureDefault(_) => "insecure-default",
            Self::InconsistentScaling(_) => "inconsistent-scaling",
            Self::EnvironmentSpecificValue(_) => "environment-specific-value",
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Tunables for the missing-in-critical-environment rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissingKeyConfig {
    /// Words of the trailing key that make a missing path high severity
    pub keywords: Vec<String>,
}

impl Default for MissingKeyConfig {
    fn default() -> Self {
        Self {
            keywords: strings(&[
                "feature", "flag", "enabled", "level", "limit", "rate", "timeout", "auth",
                "secret", "password", "token", "ssl", "tls", "debug", "secure",
            ]),
        }
    }
}

/// A path suffix together with the values considered insecure for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitiveSetting {
    /// Dotted suffix matched on segment boundaries, e.g. `logging.level`
    pub suffix: String,
    /// Values (compared case-insensitively) that are too permissive
    pub insecure_values: Vec<String>,
}

impl SensitiveSetting {
    fn new(suffix: &str, values: &[&str]) -> Self {
        Self {
            suffix: suffix.to_string(),
            insecure_values: strings(values),
        }
    }
}

/// Tunables for the insecure-default rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsecureDefaultConfig {
    pub settings: Vec<SensitiveSetting>,
    /// Also report insecure values found only in non-critical environments
    pub report_non_critical: bool,
}

impl Default for InsecureDefaultConfig {
    fn default() -> Self {
        let verbose = ["debug", "trace", "verbose", "all"];
        Self {
            settings: vec![
                SensitiveSetting::new("logging.level", &verbose),
                SensitiveSetting::new("log_level", &verbose),
                SensitiveSetting::new("debug", &["true"]),
                SensitiveSetting::new("ssl.verify", &["false"]),
                SensitiveSetting::new("tls.verify", &["false"]),
            ],
            report_non_critical: true,
        }
    }
}

/// Tunables for the inconsistent-scaling rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingConfig {
    /// Minimum number of ranked environments with numeric values
    pub min_environments: usize,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            min_environments: 3,
        }
    }
}

/// Tunables for the environment-specific-value rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSpecificConfig {
    /// Words of the trailing key that mark endpoint-like settings
    pub keywords: Vec<String>,
}

impl Default for EnvironmentSpecificConfig {
    fn default() -> Self {
        Self {
            keywords: strings(&["host", "url", "uri", "endpoint", "dsn"]),
        }
    }
}
