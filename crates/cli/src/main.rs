//! transcheck CLI - Main Entry Point
//!
//! Drives the functional and UI suites against the translator page and
//! inspects the test-case workbook and configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{cases, config, run};

/// Exit status when configuration, workbook or WebDriver setup fails
const EXIT_SETUP: i32 = 2;

/// transcheck - browser-driven checks for the Singlish translator
#[derive(Parser)]
#[command(name = "transcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (TOML); defaults apply when absent
    #[arg(long, default_value = "transcheck.toml", global = true)]
    config: PathBuf,

    /// Test-case workbook, overriding the configured one
    #[arg(long, global = true)]
    workbook: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a suite against the live page
    Run(run::RunArgs),

    /// List the cases a suite would schedule
    Cases(cases::CasesArgs),

    /// Print or write the effective configuration
    Config(config::ConfigArgs),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            EXIT_SETUP
        }
    };
    std::process::exit(code);
}

async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let mut settings = transcheck_common::HarnessConfig::load(&cli.config)?;
    if let Some(workbook) = cli.workbook {
        settings.workbook = workbook;
    }

    match cli.command {
        Commands::Run(args) => {
            let passed = run::execute(args, settings, cli.format).await?;
            Ok(if passed { 0 } else { 1 })
        }
        Commands::Cases(args) => {
            cases::execute(args, &settings, cli.format)?;
            Ok(0)
        }
        Commands::Config(args) => {
            config::execute(args, &settings, cli.format)?;
            Ok(0)
        }
        Commands::Version => {
            println!("transcheck v{}", transcheck_common::VERSION);
            println!("Target: {}", settings.target_url);
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::parse_from([
            "transcheck",
            "--workbook",
            "cases.xlsx",
            "run",
            "--suite",
            "ui",
            "--case",
            "Pos_UI_0001",
            "--headed",
        ]);
        assert_eq!(cli.workbook, Some(PathBuf::from("cases.xlsx")));
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.suite, run::SuiteArg::Ui);
                assert_eq!(args.case.as_deref(), Some("Pos_UI_0001"));
                assert!(args.headed);
            }
            _ => panic!("expected run"),
        }
    }
}
