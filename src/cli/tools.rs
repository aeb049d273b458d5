use super::export::ExportArgs;
use super::{amount, ui};
use crate::calc::daily_interest::{self, Transaction};
use crate::calc::scientific::{self, AngleMode};
use crate::calc::tax::{self, GstMode};
use crate::calc::inflation;
use crate::core::validate::parse_amount;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use comfy_table::Cell;
use tracing::debug;

#[derive(Subcommand, Debug, Clone)]
pub enum ToolCommand {
    /// Add GST to a price or extract it from one
    Gst {
        /// Amount to apply GST to
        #[arg(short, long, value_parser = amount)]
        amount: f64,
        /// GST rate in percent, usually 3, 5, 12, 18 or 28
        #[arg(short, long, value_parser = amount)]
        rate: f64,
        /// exclusive (add GST) or inclusive (extract GST)
        #[arg(long, default_value = "exclusive")]
        mode: GstMode,
        #[command(flatten)]
        output: ExportArgs,
    },
    /// Future cost and purchasing power under inflation
    Inflation {
        /// Amount in today's money
        #[arg(short, long, value_parser = amount)]
        amount: f64,
        /// Annual inflation rate in percent
        #[arg(short, long, value_parser = amount)]
        rate: f64,
        /// Number of years
        #[arg(long, value_parser = amount)]
        years: f64,
        #[command(flatten)]
        output: ExportArgs,
    },
    /// Interest accrued daily on a balance with dated deposits and withdrawals
    DailyInterest {
        /// Balance at the start date
        #[arg(long, value_parser = amount)]
        opening: f64,
        /// Annual interest rate in percent
        #[arg(short, long, value_parser = amount)]
        rate: f64,
        /// First day of interest (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Day interest stops accruing (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// Deposit or withdrawal as DATE:AMOUNT, negative for withdrawals
        #[arg(short, long = "txn", value_parser = transaction, allow_hyphen_values = true)]
        transactions: Vec<Transaction>,
        #[command(flatten)]
        output: ExportArgs,
    },
    /// Evaluate an arithmetic or scientific expression
    Calc {
        /// Expression, e.g. "2 * sin(30) + sqrt(16)"
        #[arg(allow_hyphen_values = true)]
        expression: String,
        /// Angle unit for trigonometric functions: deg or rad
        #[arg(long, default_value = "deg")]
        angle: AngleMode,
    },
}

/// Parses `YYYY-MM-DD:AMOUNT`.
fn transaction(raw: &str) -> Result<Transaction> {
    let (date, value) = raw
        .split_once(':')
        .with_context(|| format!("Transaction '{raw}' must look like DATE:AMOUNT"))?;
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid transaction date '{date}'"))?;
    let amount = parse_amount("Transaction amount", value)?;
    Ok(Transaction { date, amount })
}

pub fn run(command: ToolCommand) -> Result<()> {
    debug!("Running tool command: {command:?}");
    match command {
        ToolCommand::Gst {
            amount,
            rate,
            mode,
            output,
        } => {
            let result = tax::gst(amount, rate, mode)?;
            if !tax::GST_SLABS.contains(&result.rate) {
                println!(
                    "{}",
                    ui::style_text(
                        &format!("Note: {}% is not a standard GST slab", result.rate),
                        ui::StyleType::Subtle
                    )
                );
            }
            ui::print_summary(
                &format!("GST ({})", result.mode),
                &[
                    ("Net amount", ui::format_money(result.net_amount)),
                    ("GST rate", format!("{}%", result.rate)),
                    ("CGST", ui::format_money(result.cgst)),
                    ("SGST", ui::format_money(result.sgst)),
                    ("Total GST", ui::format_money(result.gst_amount)),
                    ("Total amount", ui::format_money(result.total_amount)),
                ],
            );
            output.write(&result, std::slice::from_ref(&result))
        }
        ToolCommand::Inflation {
            amount,
            rate,
            years,
            output,
        } => {
            let result = inflation::inflation(amount, rate, years)?;
            ui::print_summary(
                "Inflation",
                &[
                    ("Amount today", ui::format_money(result.current_amount)),
                    ("Inflation rate", format!("{}%", result.annual_rate)),
                    ("Years", result.years.to_string()),
                    ("Increase in cost", ui::format_money(result.increase)),
                    (
                        "Purchasing power of today's amount",
                        ui::format_money(result.purchasing_power),
                    ),
                    ("Future cost", ui::format_money(result.future_amount)),
                ],
            );
            output.write(&result, std::slice::from_ref(&result))
        }
        ToolCommand::DailyInterest {
            opening,
            rate,
            start,
            end,
            transactions,
            output,
        } => {
            let result = daily_interest::daily_interest(opening, rate, start, end, &transactions)?;

            let mut table = ui::new_styled_table();
            table.set_header(vec![
                ui::header_cell("From"),
                ui::header_cell("To"),
                ui::header_cell("Days"),
                ui::header_cell("Balance"),
                ui::header_cell("Interest"),
            ]);
            for segment in &result.segments {
                table.add_row(vec![
                    Cell::new(segment.from),
                    Cell::new(segment.to),
                    ui::number_cell(segment.days),
                    ui::money_cell(segment.balance),
                    ui::money_cell(segment.interest),
                ]);
            }
            println!("{table}");

            ui::print_summary(
                "Daily interest",
                &[
                    ("Opening balance", ui::format_money(result.opening_balance)),
                    ("Interest rate", format!("{}%", result.annual_rate)),
                    ("Days", result.days.to_string()),
                    ("Closing balance", ui::format_money(result.closing_balance)),
                    ("Total interest", ui::format_money(result.total_interest)),
                ],
            );
            output.write(&result, &result.segments)
        }
        ToolCommand::Calc { expression, angle } => {
            let value = scientific::evaluate(&expression, angle)?;
            println!("{value}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_arg() {
        let parsed = transaction("2024-01-15:-2,500").unwrap();
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(parsed.amount, -2500.0);

        assert!(transaction("2024-01-15").is_err());
        assert!(transaction("15/01/2024:100").is_err());
        assert!(transaction("2024-01-15:abc").is_err());
    }
}
