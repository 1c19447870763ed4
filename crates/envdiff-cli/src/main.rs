//! envdiff CLI
//!
//! Compares configuration files of several deployment environments and
//! reports differences and advisories.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} Environment configuration diff", "envdiff".green().bold());
            println!();
            println!("Run {} for available commands.", "envdiff --help".cyan());
            Ok(())
        }
    }
}

/// Log to stderr so JSON on stdout stays machine-readable.
///
/// `RUST_LOG` wins over `--verbose` when set.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Compare {
            envs,
            roles,
            ranks,
            config,
            format,
            json,
            strict_roles,
            fail_on,
        } => commands::run_compare(commands::CompareArgs {
            envs,
            roles,
            ranks,
            config,
            format: format.format(),
            json,
            strict_roles,
            fail_on: fail_on.map(Into::into),
        }),
        Commands::Flatten { path, format, json } => {
            commands::run_flatten(&path, format.format(), json)
        }
        Commands::Rules { config, json } => commands::run_rules(config.as_deref(), json),
    }
}
