pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::records::{
    InvestmentCommand, InvestmentFields, RecordAction, TransactionCommand, TransactionFields,
};
use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Show the configured lists
    Show,
    /// Replace the settings with a JSON file
    Set { file: PathBuf },
}

#[derive(Subcommand, Debug, Clone)]
pub enum AppCommand {
    /// Manage investments
    #[command(subcommand)]
    Investment(InvestmentCommand),
    /// Manage incomes
    #[command(subcommand)]
    Income(TransactionCommand),
    /// Manage expenses
    #[command(subcommand)]
    Expense(TransactionCommand),
    /// Manage categories, members and other lists
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Write a backup of all data
    Export {
        /// Output file, stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Restore a backup
    Import { file: PathBuf },
    /// Display totals, breakdowns and the expense trend
    Dashboard {
        /// Month to summarize, YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Revalue mutual funds at their latest NAV
    RefreshNav,
    /// Apply a JSON array of revalued investments
    ApplyNav { file: PathBuf },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("hisaab starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = store::FinanceStore::open(config.default_data_path()?)?;

    match command {
        AppCommand::Investment(cmd) => {
            cli::records::run(store.investments(), RecordAction::<InvestmentFields>::from(cmd))
        }
        AppCommand::Income(cmd) => {
            cli::records::run(store.incomes(), RecordAction::<TransactionFields>::from(cmd))
        }
        AppCommand::Expense(cmd) => {
            cli::records::run(store.expenses(), RecordAction::<TransactionFields>::from(cmd))
        }
        AppCommand::Settings(SettingsCommand::Show) => cli::settings::show(&store),
        AppCommand::Settings(SettingsCommand::Set { file }) => cli::settings::set(&store, &file),
        AppCommand::Export { out } => cli::backup::export(&store, out.as_deref()),
        AppCommand::Import { file } => cli::backup::import(&store, &file),
        AppCommand::Dashboard { month } => cli::dashboard::run(
            &store,
            month.as_deref(),
            config.trend_months,
            &config.currency,
        ),
        AppCommand::RefreshNav => {
            let provider =
                providers::MfApiProvider::new(config.mfapi_base_url(), Arc::new(Cache::new()))?;
            cli::nav::refresh(&store, &provider).await
        }
        AppCommand::ApplyNav { file } => cli::nav::apply(&store, &file),
    }
}
