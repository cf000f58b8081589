//! Incentive CLI - Command-line interface for the incentive engine
//!
//! Lists incentive types, validates and simulates configs, and runs a batch
//! calculation over a JSON snapshot of configs and sales.

#![forbid(unsafe_code)]

mod commands;
mod input;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use incentive_engine_core_rs::models::YearMonth;
use incentive_engine_core_rs::EngineSettings;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "incentive-cli",
    version,
    about = "Validate, simulate and calculate sales incentives"
)]
struct Cli {
    /// Engine settings JSON file (defaults, then environment overrides)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "human", global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List configurable incentive types and their required parameters
    Types,

    /// Validate a config file or a bare formula
    Validate {
        /// IncentiveConfig JSON file
        #[arg(long, conflicts_with = "formula", required_unless_present = "formula")]
        config: Option<PathBuf>,

        /// Formula text, validated as CUSTOM without limits
        #[arg(long)]
        formula: Option<String>,

        /// Personal sales for the smoke test (defaults to the sample)
        #[arg(long, requires = "total_sales")]
        personal_sales: Option<f64>,

        /// Total sales for the smoke test
        #[arg(long, requires = "personal_sales")]
        total_sales: Option<f64>,
    },

    /// Preview the amount a config would pay for given sales
    Simulate {
        /// IncentiveConfig JSON file
        #[arg(long)]
        config: PathBuf,

        #[arg(long)]
        personal_sales: f64,

        #[arg(long)]
        total_sales: f64,

        #[arg(long)]
        team_sales: Option<f64>,
    },

    /// Calculate every employee in a snapshot file for one period
    Batch {
        /// Snapshot JSON file with configs, sales and profiles
        #[arg(long)]
        input: PathBuf,

        /// Payroll period (YYYY-MM)
        #[arg(long)]
        period: YearMonth,

        /// Only these employees (defaults to every configured employee)
        #[arg(long = "user", value_name = "USER_ID")]
        users: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref())?;

    let result = commands::execute(&cli.command, settings).await;

    match result {
        Ok(output) => match cli.output {
            OutputFormat::Human => println!("{}", output.human),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output.json)?),
        },
        Err(e) => {
            match cli.output {
                OutputFormat::Human => eprintln!("Error: {e:#}"),
                OutputFormat::Json => {
                    let json_output = serde_json::json!({
                        "success": false,
                        "error": format!("{e:#}"),
                    });
                    println!("{}", serde_json::to_string_pretty(&json_output)?);
                }
            }
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Settings file (if any) with environment overrides on top
fn load_settings(path: Option<&Path>) -> Result<EngineSettings> {
    let Some(path) = path else {
        return Ok(EngineSettings::from_env());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    let settings = EngineSettings::from_json(&text)
        .with_context(|| format!("Invalid settings file {}", path.display()))?;
    Ok(settings.with_env_overrides())
}
