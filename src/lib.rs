pub mod calc;
pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::currency::CurrencyCommand;
use crate::cli::invest::InvestCommand;
use crate::cli::loan::LoanCommand;
use crate::cli::records::{CashBookCommand, DenominationCommand, LoanProfileCommand};
use crate::cli::tools::ToolCommand;
use crate::core::config::AppConfig;
use anyhow::Result;
use clap::Subcommand;
use tracing::debug;

#[derive(Subcommand, Debug, Clone)]
pub enum AppCommand {
    /// EMI, amortization and loan restructuring
    #[command(subcommand)]
    Loan(LoanCommand),
    /// Deposits and investments
    #[command(subcommand)]
    Invest(InvestCommand),
    #[command(flatten)]
    Tool(ToolCommand),
    /// Currency conversion
    #[command(subcommand)]
    Currency(CurrencyCommand),
    /// Count cash by note and coin
    #[command(subcommand)]
    Denomination(DenominationCommand),
    /// Saved loans
    #[command(subcommand)]
    Loans(LoanProfileCommand),
    /// Money in and out, with a running balance
    #[command(subcommand)]
    Cashbook(CashBookCommand),
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;

    match command {
        AppCommand::Loan(cmd) => cli::loan::run(cmd, &config),
        AppCommand::Invest(cmd) => cli::invest::run(cmd, &config),
        AppCommand::Tool(cmd) => cli::tools::run(cmd),
        AppCommand::Currency(cmd) => cli::currency::run(cmd, &config).await,
        AppCommand::Denomination(cmd) => cli::records::run_denominations(cmd, &config).await,
        AppCommand::Loans(cmd) => cli::records::run_loans(cmd, &config).await,
        AppCommand::Cashbook(cmd) => cli::records::run_cash_book(cmd, &config).await,
    }
}
