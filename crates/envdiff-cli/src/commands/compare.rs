//! Compare command implementation

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use colored::{ColoredString, Colorize};

use envdiff_content::{AutoParser, Format};
use envdiff_core::{
    Classification, Comparison, ComparisonReport, EnvironmentSource, EnvironmentState, Severity,
};

use super::load_config;
use crate::error::{CliError, Result};

/// Parsed arguments of `envdiff compare`
#[derive(Debug, Clone, Default)]
pub struct CompareArgs {
    pub envs: Vec<(String, String)>,
    pub roles: Vec<(String, String)>,
    pub ranks: Vec<(String, u32)>,
    pub config: Option<PathBuf>,
    pub format: Option<Format>,
    pub json: bool,
    pub strict_roles: bool,
    pub fail_on: Option<Severity>,
}

/// Run the compare command
pub fn run_compare(args: CompareArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    let ranks: BTreeMap<&str, u32> = args.ranks.iter().map(|(n, r)| (n.as_str(), *r)).collect();
    if let Some(name) = ranks.keys().find(|n| !args.envs.iter().any(|(env, _)| env == *n)) {
        return Err(CliError::user(format!(
            "--rank names '{name}', which is not passed with --env"
        )));
    }
    let roles: BTreeMap<&str, &str> = args
        .roles
        .iter()
        .map(|(n, r)| (n.as_str(), r.as_str()))
        .collect();

    let mut sources = Vec::with_capacity(args.envs.len());
    for (position, (name, path)) in args.envs.iter().enumerate() {
        let path = Path::new(path);
        let text = fs::read_to_string(path)
            .map_err(|e| CliError::user(format!("Cannot read {}: {e}", path.display())))?;

        let mut source = EnvironmentSource::new(name.clone(), text);
        // Explicit rank, then the config file, then command-line position
        let rank = ranks
            .get(name.as_str())
            .copied()
            .or_else(|| config.rank(name))
            .unwrap_or(position as u32);
        source = source.with_rank(rank);
        if let Some(role) = roles.get(name.as_str()) {
            source = source.with_role(*role);
        }
        if let Some(format) = args.format.or_else(|| format_from_path(path)) {
            source = source.with_format(format);
        }
        sources.push(source);
    }

    // Roles for environments that are not compared still reach the rule
    // engine, which reports them as warnings
    let mut config = config;
    for (name, role) in &roles {
        if !args.envs.iter().any(|(env, _)| env == name) {
            config.environments.entry(name.to_string()).or_default().role = Some(role.to_string());
        }
    }

    let report = Comparison::new(config)
        .strict_roles(args.strict_roles)
        .run(sources, &AutoParser::new())?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report)?;
    }

    if let Some(threshold) = args.fail_on {
        let count = report
            .advisories
            .advisories
            .iter()
            .filter(|a| a.severity <= threshold)
            .count();
        if count > 0 {
            return Err(CliError::Threshold { count, threshold });
        }
    }

    Ok(())
}

fn format_from_path(path: &Path) -> Option<Format> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(Format::from_extension)
}

fn marker(classification: Classification) -> ColoredString {
    match classification {
        Classification::Consistent => "=".normal(),
        Classification::Modified => "~".yellow(),
        Classification::Missing => "!".red(),
        Classification::Unique => "+".green(),
    }
}

fn severity_label(severity: Severity) -> ColoredString {
    let label = format!("{:<6}", severity.to_string().to_uppercase());
    match severity {
        Severity::High => label.red().bold(),
        Severity::Medium => label.yellow().bold(),
        Severity::Low => label.cyan(),
        Severity::Info => label.blue(),
    }
}

/// Print human-readable comparison output
fn print_report(report: &ComparisonReport) -> Result<()> {
    let diff = &report.diff;
    let names: Vec<String> = diff.environments.iter().map(|e| e.name.clone()).collect();
    println!("{} {}", "Compared".blue().bold(), names.join(", ").yellow());

    for environment in &diff.environments {
        if let EnvironmentState::Failed { error } = &environment.state {
            println!("  {} {}: {}", "!".red(), environment.name.red(), error);
        }
    }

    let summary = &diff.summary;
    println!(
        "{} paths: {} consistent, {} modified, {} missing, {} unique",
        summary.total_paths,
        summary.consistent.to_string().green(),
        summary.modified.to_string().yellow(),
        summary.missing.to_string().red(),
        summary.unique.to_string().cyan()
    );

    let width = names.iter().map(String::len).max().unwrap_or(0);
    let differences: Vec<_> = diff
        .records
        .iter()
        .filter(|r| r.classification != Classification::Consistent)
        .collect();

    if differences.is_empty() {
        println!();
        println!("{} All environments agree.", "OK".green().bold());
    } else {
        println!();
        println!("{}", "Differences:".bold());
        for record in differences {
            println!("  {} {}", marker(record.classification), record.path.bold());
            for slot in &record.values {
                let value = match &slot.value {
                    Some(value) => value.to_string().normal(),
                    None => "N/A".dimmed(),
                };
                println!("      {:<width$}  {}", slot.environment, value);
            }
        }
    }

    let advisories = &report.advisories;
    if !advisories.advisories.is_empty() {
        println!();
        println!("{}", "Advisories:".bold());
        for advisory in &advisories.advisories {
            println!("  {} {}", severity_label(advisory.severity), advisory.description);
            println!("         {} {}", "->".dimmed(), advisory.recommendation);
        }
    }

    if !advisories.warnings.is_empty() {
        println!();
        println!("{}", "Warnings:".yellow().bold());
        for warning in &advisories.warnings {
            println!("  {} {}", "!".yellow(), warning.message);
        }
    }

    println!();
    println!("Fingerprint: {}", report.fingerprint()?.dimmed());
    Ok(())
}
