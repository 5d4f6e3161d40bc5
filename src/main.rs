use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{
    BarcodeCommand, DeleteCommand, EditCommand, FoodCommand, HistoryCommand, LogCommand,
    MealCommand, ResetCommand, SearchCommand, TotalsCommand, UndoCommand,
};
use config::Config;
use cutline_core::{
    DayPhase, GatewayConfig, HttpProvider, JsonFileStore, KvDailyTotals,
    NutritionLedgerController, PlanFood, ProviderConfig, RemoteFoodGateway,
};

#[derive(Parser)]
#[command(name = "cutline")]
#[command(version)]
#[command(about = "A weight-cut nutrition ledger", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Day to operate on (YYYY-MM-DD), defaults to today
    #[arg(long, short, global = true)]
    date: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a food from the catalog
    Log(LogCommand),

    /// Undo the most recent log entry
    Undo(UndoCommand),

    /// Delete a log entry by id
    Delete(DeleteCommand),

    /// View the day's food history
    History(HistoryCommand),

    /// Show the day's running totals
    Totals(TotalsCommand),

    /// Overwrite a macro total directly
    Edit(EditCommand),

    /// Zero the day's macro totals and history
    Reset(ResetCommand),

    /// Search the catalog and remote databases
    Search(SearchCommand),

    /// Look up a scanned barcode
    Barcode(BarcodeCommand),

    /// Manage and log custom foods
    Food(FoodCommand),

    /// Manage and log custom meals
    Meal(MealCommand),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    let day = match &cli.date {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map_err(|_| format!("Invalid date '{}'. Expected YYYY-MM-DD", text))?,
        None => Local::now().date_naive(),
    };

    let mut ctl = build_controller(&config, day);

    match &cli.command {
        Commands::Log(cmd) => cmd.run(&mut ctl),
        Commands::Undo(cmd) => cmd.run(&mut ctl),
        Commands::Delete(cmd) => cmd.run(&mut ctl),
        Commands::History(cmd) => cmd.run(&ctl),
        Commands::Totals(cmd) => cmd.run(&ctl),
        Commands::Edit(cmd) => cmd.run(&mut ctl),
        Commands::Reset(cmd) => cmd.run(&mut ctl),
        Commands::Search(cmd) => cmd.run(&mut ctl),
        Commands::Barcode(cmd) => cmd.run(&mut ctl),
        Commands::Food(cmd) => cmd.run(&mut ctl),
        Commands::Meal(cmd) => cmd.run(&mut ctl),
    }
}

fn build_controller(config: &Config, day: NaiveDate) -> NutritionLedgerController {
    let kv = Arc::new(JsonFileStore::new(config.data_dir.value.clone()));
    let totals = Arc::new(KvDailyTotals::new(kv.clone()));

    let gateway = RemoteFoodGateway::new(
        vec![
            Arc::new(HttpProvider::new(ProviderConfig::primary(
                config.providers.primary_url.clone(),
            ))),
            Arc::new(HttpProvider::new(ProviderConfig::secondary(
                config.providers.secondary_url.clone(),
            ))),
        ],
        GatewayConfig {
            debounce: std::time::Duration::from_millis(config.providers.debounce_ms),
            ..GatewayConfig::default()
        },
    );

    let mut ctl = NutritionLedgerController::new(day, kv, totals, gateway);

    let (plan, phase) = load_plan(config);
    ctl.set_plan(plan, phase);
    ctl
}

/// Reads the protocol engine's plan for the day: the phase flag from
/// config and the phase-filtered plan-food list from the plan file.
fn load_plan(config: &Config) -> (Vec<PlanFood>, DayPhase) {
    let phase = match config.phase.parse::<DayPhase>() {
        Ok(phase) => phase,
        Err(e) => {
            warn!("{}; falling back to baseline", e);
            DayPhase::Baseline
        }
    };

    let Some(path) = &config.plan_path else {
        return (Vec::new(), phase);
    };

    let plan = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|contents| serde_json::from_str(&contents).map_err(|e| e.to_string()));

    match plan {
        Ok(plan) => (plan, phase),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load plan file; catalog will have no plan foods");
            (Vec::new(), phase)
        }
    }
}
