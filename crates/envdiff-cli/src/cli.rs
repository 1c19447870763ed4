//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use envdiff_content::Format;
use envdiff_core::Severity;

/// envdiff - Compare configuration across deployment environments
#[derive(Parser, Debug)]
#[command(name = "envdiff")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Compare environments and report differences and advisories
    ///
    /// Examples:
    ///   envdiff compare -e dev=dev.yaml -e prod=prod.yaml
    ///   envdiff compare -e dev=dev.yaml -e prod=prod.yaml --role prod=production-like
    ///   envdiff compare -e dev=dev.yaml -e prod=prod.json --json
    Compare {
        /// Environment to compare, as NAME=PATH (repeatable, in rank order)
        #[arg(short = 'e', long = "env", value_name = "NAME=PATH", value_parser = parse_assignment, required = true)]
        envs: Vec<(String, String)>,

        /// Role of an environment, as NAME=ROLE
        #[arg(long = "role", value_name = "NAME=ROLE", value_parser = parse_assignment)]
        roles: Vec<(String, String)>,

        /// Rank of an environment, as NAME=N (defaults to position)
        #[arg(long = "rank", value_name = "NAME=N", value_parser = parse_rank)]
        ranks: Vec<(String, u32)>,

        /// Comparison config file (TOML)
        #[arg(short, long, env = "ENVDIFF_CONFIG")]
        config: Option<PathBuf>,

        /// Input format for every file
        #[arg(short, long, value_enum, default_value_t = FormatArg::Auto)]
        format: FormatArg,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        /// Fail when a role names an environment that is not compared
        #[arg(long)]
        strict_roles: bool,

        /// Exit with status 2 when an advisory at or above this severity is raised
        #[arg(long, value_enum)]
        fail_on: Option<SeverityArg>,
    },

    /// Print the flattened, normalized fields of one file
    Flatten {
        /// File to flatten
        path: PathBuf,

        /// Input format
        #[arg(short, long, value_enum, default_value_t = FormatArg::Auto)]
        format: FormatArg,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List the advisory rules in evaluation order
    Rules {
        /// Comparison config file (TOML)
        #[arg(short, long, env = "ENVDIFF_CONFIG")]
        config: Option<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

/// Input format selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    /// Pick from the file extension, then from the content
    Auto,
    Yaml,
    Json,
    Toml,
}

impl FormatArg {
    /// The fixed format, or `None` for auto detection
    pub fn format(self) -> Option<Format> {
        match self {
            Self::Auto => None,
            Self::Yaml => Some(Format::Yaml),
            Self::Json => Some(Format::Json),
            Self::Toml => Some(Format::Toml),
        }
    }
}

/// Severity threshold for `--fail-on`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityArg {
    High,
    Medium,
    Low,
    Info,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::High => Severity::High,
            SeverityArg::Medium => Severity::Medium,
            SeverityArg::Low => Severity::Low,
            SeverityArg::Info => Severity::Info,
        }
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() && !value.is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}

fn parse_rank(raw: &str) -> Result<(String, u32), String> {
    let (name, rank) = parse_assignment(raw)?;
    let rank = rank
        .parse()
        .map_err(|_| format!("rank for '{name}' must be a non-negative integer, got '{rank}'"))?;
    Ok((name, rank))
}
