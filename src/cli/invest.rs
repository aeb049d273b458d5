use super::export::ExportArgs;
use super::{amount, ui};
use crate::calc::deposit::{self, Compounding};
use crate::calc::invest::{self, PPF_LOCK_IN_YEARS, PpfYear};
use crate::core::config::AppConfig;
use anyhow::Result;
use clap::Subcommand;
use tracing::debug;

#[derive(Subcommand, Debug, Clone)]
pub enum InvestCommand {
    /// Fixed deposit maturity
    Fd {
        /// Deposit amount
        #[arg(short, long, value_parser = amount)]
        principal: f64,
        /// Annual interest rate in percent
        #[arg(short, long, value_parser = amount)]
        rate: f64,
        /// Tenure in months
        #[arg(short = 'n', long)]
        months: u32,
        /// monthly, quarterly, half-yearly, yearly or simple (defaults to config)
        #[arg(long)]
        compounding: Option<Compounding>,
        #[command(flatten)]
        output: ExportArgs,
    },
    /// Recurring deposit maturity
    Rd {
        /// Monthly instalment
        #[arg(short, long, value_parser = amount)]
        monthly: f64,
        /// Annual interest rate in percent
        #[arg(short, long, value_parser = amount)]
        rate: f64,
        /// Tenure in months
        #[arg(short = 'n', long)]
        months: u32,
        /// monthly, quarterly, half-yearly, yearly or simple (defaults to config)
        #[arg(long)]
        compounding: Option<Compounding>,
        #[command(flatten)]
        output: ExportArgs,
    },
    /// Systematic investment plan, with an optional yearly step-up
    Sip {
        /// Monthly investment
        #[arg(short, long, value_parser = amount)]
        monthly: f64,
        /// Expected annual return in percent
        #[arg(short, long, value_parser = amount)]
        rate: f64,
        /// Tenure in months
        #[arg(short = 'n', long)]
        months: u32,
        /// Yearly increase in the monthly investment, in percent
        #[arg(long, value_parser = amount, default_value_t = 0.0)]
        step_up: f64,
        #[command(flatten)]
        output: ExportArgs,
    },
    /// One-time investment growth
    Lumpsum {
        /// Investment amount
        #[arg(short, long, value_parser = amount)]
        principal: f64,
        /// Expected annual return in percent
        #[arg(short, long, value_parser = amount)]
        rate: f64,
        /// Tenure in months
        #[arg(short = 'n', long)]
        months: u32,
        #[command(flatten)]
        output: ExportArgs,
    },
    /// Public Provident Fund maturity with a yearly breakdown
    Ppf {
        /// Deposit made at the start of each year
        #[arg(short, long, value_parser = amount)]
        yearly: f64,
        /// Annual interest rate in percent (defaults to config)
        #[arg(short, long, value_parser = amount)]
        rate: Option<f64>,
        /// Tenure in years: 15, extendable in blocks of 5
        #[arg(long, default_value_t = PPF_LOCK_IN_YEARS)]
        years: u32,
        #[command(flatten)]
        output: ExportArgs,
    },
    /// Compound annual growth rate between two values
    Cagr {
        /// Starting value
        #[arg(long, value_parser = amount)]
        initial: f64,
        /// Ending value
        #[arg(long = "final", value_parser = amount)]
        final_value: f64,
        /// Duration in years
        #[arg(long, value_parser = amount)]
        years: f64,
        #[command(flatten)]
        output: ExportArgs,
    },
}

pub fn run(command: InvestCommand, config: &AppConfig) -> Result<()> {
    debug!("Running investment command: {command:?}");
    match command {
        InvestCommand::Fd {
            principal,
            rate,
            months,
            compounding,
            output,
        } => {
            let compounding = compounding.unwrap_or(config.defaults.fd_compounding);
            let result = deposit::fixed_deposit(principal, rate, months, compounding)?;
            ui::print_summary(
                "Fixed deposit",
                &[
                    ("Deposit", ui::format_money(result.principal)),
                    ("Interest rate", format!("{}%", result.annual_rate)),
                    ("Tenure", format!("{} months", result.tenure_months)),
                    ("Compounding", result.compounding.to_string()),
                    ("Interest earned", ui::format_money(result.interest_earned)),
                    ("Maturity amount", ui::format_money(result.maturity_amount)),
                ],
            );
            output.write(&result, std::slice::from_ref(&result))
        }
        InvestCommand::Rd {
            monthly,
            rate,
            months,
            compounding,
            output,
        } => {
            let compounding = compounding.unwrap_or(config.defaults.rd_compounding);
            let result = deposit::recurring_deposit(monthly, rate, months, compounding)?;
            ui::print_summary(
                "Recurring deposit",
                &[
                    ("Monthly deposit", ui::format_money(result.monthly_deposit)),
                    ("Interest rate", format!("{}%", result.annual_rate)),
                    ("Tenure", format!("{} months", result.tenure_months)),
                    ("Compounding", result.compounding.to_string()),
                    ("Total deposited", ui::format_money(result.total_deposit)),
                    ("Interest earned", ui::format_money(result.interest_earned)),
                    ("Maturity amount", ui::format_money(result.maturity_amount)),
                ],
            );
            output.write(&result, std::slice::from_ref(&result))
        }
        InvestCommand::Sip {
            monthly,
            rate,
            months,
            step_up,
            output,
        } => {
            let result = invest::sip(monthly, rate, months, step_up)?;
            ui::print_summary(
                "SIP",
                &[
                    ("Monthly investment", ui::format_money(result.monthly_investment)),
                    ("Expected return", format!("{}%", result.annual_return)),
                    ("Tenure", format!("{} months", result.tenure_months)),
                    ("Yearly step-up", format!("{}%", result.step_up_pct)),
                    ("Invested", ui::format_money(result.invested)),
                    ("Estimated returns", ui::format_money(result.estimated_returns)),
                    ("Total value", ui::format_money(result.total_value)),
                ],
            );
            output.write(&result, std::slice::from_ref(&result))
        }
        InvestCommand::Lumpsum {
            principal,
            rate,
            months,
            output,
        } => {
            let result = invest::lumpsum(principal, rate, months)?;
            ui::print_summary(
                "Lumpsum",
                &[
                    ("Invested", ui::format_money(result.principal)),
                    ("Expected return", format!("{}%", result.annual_return)),
                    ("Tenure", format!("{} months", result.tenure_months)),
                    ("Estimated returns", ui::format_money(result.estimated_returns)),
                    ("Total value", ui::format_money(result.total_value)),
                ],
            );
            output.write(&result, std::slice::from_ref(&result))
        }
        InvestCommand::Ppf {
            yearly,
            rate,
            years,
            output,
        } => {
            let rate = rate.unwrap_or(config.defaults.ppf_rate);
            let result = invest::ppf(yearly, rate, years)?;
            print_ppf_breakdown(&result.breakdown);
            ui::print_summary(
                "PPF",
                &[
                    ("Yearly deposit", ui::format_money(result.yearly_deposit)),
                    ("Interest rate", format!("{}%", result.annual_rate)),
                    ("Tenure", format!("{} years", result.years)),
                    ("Total deposited", ui::format_money(result.total_deposit)),
                    ("Total interest", ui::format_money(result.total_interest)),
                    ("Maturity amount", ui::format_money(result.maturity_amount)),
                ],
            );
            output.write(&result, &result.breakdown)
        }
        InvestCommand::Cagr {
            initial,
            final_value,
            years,
            output,
        } => {
            let result = invest::cagr(initial, final_value, years)?;
            ui::print_summary(
                "CAGR",
                &[
                    ("Initial value", ui::format_money(result.initial_value)),
                    ("Final value", ui::format_money(result.final_value)),
                    ("Duration", format!("{} years", result.years)),
                    ("Absolute return", format!("{:.2}%", result.absolute_return)),
                    ("CAGR", format!("{:.2}%", result.cagr)),
                ],
            );
            output.write(&result, std::slice::from_ref(&result))
        }
    }
}

fn print_ppf_breakdown(breakdown: &[PpfYear]) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Year"),
        ui::header_cell("Opening"),
        ui::header_cell("Deposit"),
        ui::header_cell("Interest"),
        ui::header_cell("Closing"),
    ]);
    for row in breakdown {
        table.add_row(vec![
            ui::number_cell(row.year),
            ui::money_cell(row.opening_balance),
            ui::money_cell(row.deposit),
            ui::money_cell(row.interest),
            ui::money_cell(row.closing_balance),
        ]);
    }
    println!("{table}");
}
