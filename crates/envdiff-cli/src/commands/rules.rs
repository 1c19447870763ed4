//! Rules command implementation

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use envdiff_core::{CompareConfig, RuleSpec};

use super::load_config;
use crate::error::Result;

#[derive(Serialize)]
struct RulesListing<'a> {
    critical_roles: &'a [String],
    rules: &'a [RuleSpec],
}

/// Run the rules command
pub fn run_rules(config: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config)?;

    if json {
        let listing = RulesListing {
            critical_roles: &config.critical_roles,
            rules: &config.rules,
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    print_rules(&config);
    Ok(())
}

fn print_rules(config: &CompareConfig) {
    println!(
        "{} {}",
        "Critical roles:".bold(),
        config.critical_roles.join(", ").yellow()
    );
    println!();

    if config.rules.is_empty() {
        println!("{}", "No rules registered.".dimmed());
        return;
    }

    println!("{}", "Rules (evaluation order):".bold());
    for (index, rule) in config.rules.iter().enumerate() {
        println!("  {}. {}", index + 1, rule.id().cyan());
    }

    let roles = config.roles();
    if !roles.is_empty() {
        println!();
        println!("{}", "Environment roles:".bold());
        for (name, role) in roles.iter() {
            println!("  {} = {}", name, role.yellow());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_rules_defaults() {
        assert!(run_rules(None, false).is_ok());
        assert!(run_rules(None, true).is_ok());
    }

    #[test]
    fn test_rules_invalid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("envdiff.toml");
        fs::write(&path, "critical_roles = 5").unwrap();
        assert!(run_rules(Some(&path), false).is_err());
    }
}
