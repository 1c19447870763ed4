//! End-to-end comparison pipeline
//!
//! Parses raw environment documents, diffs them, evaluates the configured
//! rules and assembles the report. A document that fails to parse becomes a
//! failed environment; the run only aborts when nothing usable is left.

use envdiff_content::{ConfigParser, Format};

use crate::config::CompareConfig;
use crate::diff::DiffEngine;
use crate::environment::{EnvironmentConfig, EnvironmentRoles};
use crate::error::{Error, Result};
use crate::report::{ComparisonReport, assemble};
use crate::rules::RuleRegistry;

/// Raw text of one environment plus its optional tags
#[derive(Debug, Clone)]
pub struct EnvironmentSource {
    pub name: String,
    pub text: String,
    pub role: Option<String>,
    pub rank: Option<u32>,
    /// Format of the text; the run's parser is used when unset
    pub format: Option<Format>,
}

impl EnvironmentSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            role: None,
            rank: None,
            format: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }
}

/// A configured comparison run
pub struct Comparison {
    config: CompareConfig,
    registry: RuleRegistry,
    strict_roles: bool,
}

impl Comparison {
    pub fn new(config: CompareConfig) -> Self {
        let registry = RuleRegistry::from_config(&config);
        Self {
            config,
            registry,
            strict_roles: false,
        }
    }

    /// Fail instead of warning when a role names an unknown environment
    pub fn strict_roles(mut self, strict: bool) -> Self {
        self.strict_roles = strict;
        self
    }

    /// Replace the rule registry built from the configuration
    pub fn with_registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Run the comparison over raw environment documents
    pub fn run(&self, sources: Vec<EnvironmentSource>, parser: &dyn ConfigParser) -> Result<ComparisonReport> {
        if sources.is_empty() {
            return Err(Error::EmptyInput);
        }

        // Roles given with a source override roles from the config file
        let mut roles = self.config.roles();
        let mut engine = DiffEngine::new();

        for source in sources {
            if let Some(role) = &source.role {
                roles.insert(source.name.clone(), role.clone());
            }
            let rank = source.rank.or_else(|| self.config.rank(&source.name));

            let parsed = match source.format {
                Some(format) => format.parser().parse(&source.text),
                None => parser.parse(&source.text),
            };
            match parsed {
                Ok(tree) => {
                    tracing::debug!(environment = %source.name, format = ?source.format, "Parsed environment");
                    let mut environment = EnvironmentConfig::new(source.name, tree);
                    environment.rank = rank;
                    engine.push(environment);
                }
                Err(err) => engine.push_failure(source.name, rank, err.to_string()),
            }
        }

        self.finish(engine, &roles)
    }

    /// Run the comparison over environments that are already parsed
    pub fn run_parsed(
        &self,
        environments: Vec<EnvironmentConfig>,
        roles: &EnvironmentRoles,
    ) -> Result<ComparisonReport> {
        let mut merged = self.config.roles();
        for (name, role) in roles.iter() {
            merged.insert(name, role);
        }

        let mut engine = DiffEngine::new();
        for mut environment in environments {
            if environment.rank.is_none() {
                environment.rank = self.config.rank(&environment.name);
            }
            engine.push(environment);
        }
        self.finish(engine, &merged)
    }

    fn finish(&self, engine: DiffEngine, roles: &EnvironmentRoles) -> Result<ComparisonReport> {
        let diff = engine.run()?;
        let evaluation = self.registry.evaluate(&diff, roles);

        if self.strict_roles
            && let Some(warning) = evaluation.warnings.first()
        {
            let role = roles.role(&warning.environment).unwrap_or_default().to_string();
            return Err(warning.clone().into_error(role));
        }

        tracing::info!(
            environments = diff.environments.len(),
            paths = diff.summary.total_paths,
            advisories = evaluation.advisories.len(),
            degraded = diff.degraded,
            "Comparison complete"
        );
        Ok(assemble(diff, evaluation))
    }
}

impl Default for Comparison {
    fn default() -> Self {
        Self::new(CompareConfig::default())
    }
}
