//! Command implementations
//!
//! Each command returns both renderings; `main` picks one.

use crate::input::{read_json, Snapshot};
use crate::Commands;
use anyhow::{Context, Result};
use incentive_engine_core_rs::calculation::{
    incentive_types, validate_config_with, BatchReport, InMemoryConfigStore, InMemorySalesStore,
    ValidationReport,
};
use incentive_engine_core_rs::models::{CalculationResult, IncentiveConfig, SalesData};
use incentive_engine_core_rs::{EngineSettings, IncentiveEngine};
use serde_json::Value;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::info;

pub struct CommandOutput {
    pub human: String,
    pub json: Value,
}

pub async fn execute(command: &Commands, settings: EngineSettings) -> Result<CommandOutput> {
    match command {
        Commands::Types => types(),

        Commands::Validate {
            config,
            formula,
            personal_sales,
            total_sales,
        } => {
            let engine = offline_engine(settings);
            let sample = match (personal_sales, total_sales) {
                (Some(personal), Some(total)) => Some(SalesData::new(*personal, *total)),
                _ => None,
            };
            let report = match (config, formula) {
                (Some(path), _) => {
                    let config: IncentiveConfig = read_json(path)?;
                    match sample {
                        Some(sample) => validate_with_sample(&engine, &config, &sample),
                        None => engine.validate(&config),
                    }
                }
                (None, Some(formula)) => engine.validate_formula(formula, sample.as_ref()),
                (None, None) => anyhow::bail!("Either --config or --formula is required"),
            };
            render_validation(&report)
        }

        Commands::Simulate {
            config,
            personal_sales,
            total_sales,
            team_sales,
        } => {
            let engine = offline_engine(settings);
            let config: IncentiveConfig = read_json(config)?;
            let mut sales = SalesData::new(*personal_sales, *total_sales);
            sales.team = *team_sales;

            let result = engine
                .simulate(&config, &sales)
                .context("Simulation failed")?;
            render_result(&result)
        }

        Commands::Batch {
            input,
            period,
            users,
        } => {
            let snapshot: Snapshot = read_json(input)?;
            let (configs, sales) = snapshot.into_stores().await;
            let configs = Arc::new(configs);

            let user_ids = if users.is_empty() {
                configs.user_ids().await
            } else {
                users.clone()
            };
            info!(component = "cli", event = "batch", period = %period, employees = user_ids.len());

            let engine = IncentiveEngine::new(configs, Arc::new(sales), settings);
            let report = engine.calculate_batch(&user_ids, *period).await;
            render_batch(&report)
        }
    }
}

/// Engine for commands that never touch provider data
fn offline_engine(settings: EngineSettings) -> IncentiveEngine {
    IncentiveEngine::new(
        Arc::new(InMemoryConfigStore::new()),
        Arc::new(InMemorySalesStore::new()),
        settings,
    )
}

fn validate_with_sample(
    engine: &IncentiveEngine,
    config: &IncentiveConfig,
    sample: &SalesData,
) -> ValidationReport {
    validate_config_with(
        config,
        sample,
        &engine.settings().sample_profile,
        engine.cache(),
    )
}

// ============================================================================
// Rendering
// ============================================================================

fn types() -> Result<CommandOutput> {
    let types = incentive_types();
    let mut human = String::new();
    for info in &types {
        writeln!(
            human,
            "{:<18} {:<32} params: {}",
            info.value.as_str(),
            info.name,
            info.required_params.join(", ")
        )?;
    }
    Ok(CommandOutput {
        human: human.trim_end().to_string(),
        json: serde_json::to_value(&types)?,
    })
}

fn render_validation(report: &ValidationReport) -> Result<CommandOutput> {
    let mut human = String::new();
    if report.is_valid {
        human.push_str("Valid");
    } else {
        writeln!(human, "Invalid ({} error(s))", report.errors.len())?;
        for error in &report.errors {
            writeln!(human, "  - [{}] {}", error.code(), error)?;
        }
    }
    if let Some(raw) = report.test_result {
        write!(human, "\nSample result: {}", raw)?;
    }
    if let Some(amount) = report.test_amount {
        write!(human, "\nSample amount: {}", amount)?;
    }
    Ok(CommandOutput {
        human: human.trim_end().to_string(),
        json: serde_json::to_value(report)?,
    })
}

fn render_result(result: &CalculationResult) -> Result<CommandOutput> {
    let mut human = format!("Amount: {} ({})", result.amount, result.incentive_type);
    if let Some(raw) = result.details.raw_amount {
        write!(human, "\nRaw amount: {}", raw)?;
    }
    Ok(CommandOutput {
        human,
        json: serde_json::to_value(result)?,
    })
}

fn render_batch(report: &BatchReport) -> Result<CommandOutput> {
    let mut human = String::new();
    writeln!(human, "Run {} for {}", report.run_id, report.period)?;
    for outcome in &report.outcomes {
        match (&outcome.result, &outcome.error) {
            (Some(result), _) if result.is_failed_closed() => writeln!(
                human,
                "  {:<16} 0 (failed closed: {})",
                outcome.user_id,
                result.details.error.as_deref().unwrap_or_default()
            )?,
            (Some(result), _) => writeln!(
                human,
                "  {:<16} {} ({})",
                outcome.user_id, result.amount, result.incentive_type
            )?,
            (None, error) => writeln!(
                human,
                "  {:<16} error: {}",
                outcome.user_id,
                error.as_deref().unwrap_or_default()
            )?,
        }
    }
    write!(
        human,
        "{} calculated, {} need review",
        report.calculated_count(),
        report.review_count()
    )?;
    Ok(CommandOutput {
        human,
        json: serde_json::to_value(report)?,
    })
}
