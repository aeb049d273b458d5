use super::export::ExportArgs;
use super::{amount, ui};
use crate::calc::loan::{self, Installment, Loan, YearSummary};
use crate::calc::restructure::{self, MoratoriumMode, PrepaymentMode, RateChangeMode};
use crate::core::config::AppConfig;
use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::debug;

#[derive(Args, Debug, Clone)]
pub struct LoanArgs {
    /// Loan amount
    #[arg(short, long, value_parser = amount)]
    pub principal: f64,
    /// Annual interest rate in percent
    #[arg(short, long, value_parser = amount)]
    pub rate: f64,
    /// Tenure in months
    #[arg(short = 'n', long)]
    pub months: u32,
}

impl LoanArgs {
    fn loan(&self) -> Result<Loan> {
        Loan::new(self.principal, self.rate, self.months)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum LoanCommand {
    /// Monthly installment, total interest and total payment
    Emi {
        #[command(flatten)]
        loan: LoanArgs,
        #[command(flatten)]
        output: ExportArgs,
    },
    /// Month by month (or year by year) amortization schedule
    Schedule {
        #[command(flatten)]
        loan: LoanArgs,
        /// Roll installments up by year
        #[arg(long)]
        yearly: bool,
        #[command(flatten)]
        output: ExportArgs,
    },
    /// Effect of a one-off part payment
    Prepayment {
        #[command(flatten)]
        loan: LoanArgs,
        /// Part payment amount
        #[arg(long, value_parser = amount)]
        amount: f64,
        /// Installments paid before the part payment
        #[arg(long, default_value_t = 0)]
        after_month: u32,
        /// reduce-emi or reduce-tenure
        #[arg(long, default_value = "reduce-tenure")]
        mode: PrepaymentMode,
        /// Print the revised schedule
        #[arg(long)]
        schedule: bool,
        #[command(flatten)]
        output: ExportArgs,
    },
    /// Effect of pausing installments
    Moratorium {
        #[command(flatten)]
        loan: LoanArgs,
        /// Installments paid before the pause
        #[arg(long, default_value_t = 0)]
        start_after_month: u32,
        /// Months without installments
        #[arg(long)]
        pause_months: u32,
        /// increase-emi or extend-tenure
        #[arg(long, default_value = "extend-tenure")]
        mode: MoratoriumMode,
        /// Print the revised schedule
        #[arg(long)]
        schedule: bool,
        #[command(flatten)]
        output: ExportArgs,
    },
    /// Effect of a change in the interest rate
    RateChange {
        #[command(flatten)]
        loan: LoanArgs,
        /// Installments paid at the old rate
        #[arg(long, default_value_t = 0)]
        after_month: u32,
        /// New annual interest rate in percent
        #[arg(long, value_parser = amount)]
        new_rate: f64,
        /// keep-emi or keep-tenure
        #[arg(long, default_value = "keep-emi")]
        mode: RateChangeMode,
        /// Print the revised schedule
        #[arg(long)]
        schedule: bool,
        #[command(flatten)]
        output: ExportArgs,
    },
    /// Largest loan affordable on a monthly income
    Eligibility {
        /// Net monthly income
        #[arg(long, value_parser = amount)]
        income: f64,
        /// EMIs already being paid each month
        #[arg(long, value_parser = amount, default_value_t = 0.0)]
        existing_emis: f64,
        /// Annual interest rate in percent
        #[arg(short, long, value_parser = amount)]
        rate: f64,
        /// Tenure in months
        #[arg(short = 'n', long)]
        months: u32,
        /// Share of income allowed for EMIs, in percent (defaults to config)
        #[arg(long, value_parser = amount)]
        foir: Option<f64>,
        #[command(flatten)]
        output: ExportArgs,
    },
}

pub fn run(command: LoanCommand, config: &AppConfig) -> Result<()> {
    debug!("Running loan command: {command:?}");
    match command {
        LoanCommand::Emi { loan, output } => {
            let result = loan::emi(loan.principal, loan.rate, loan.months)?;
            ui::print_summary(
                "EMI",
                &[
                    ("Loan amount", ui::format_money(result.principal)),
                    ("Interest rate", format!("{}%", result.annual_rate)),
                    ("Tenure", format!("{} months", result.tenure_months)),
                    ("Total interest", ui::format_money(result.total_interest)),
                    ("Total payment", ui::format_money(result.total_payment)),
                    ("Monthly EMI", ui::format_money(result.emi)),
                ],
            );
            output.write(&result, std::slice::from_ref(&result))
        }
        LoanCommand::Schedule {
            loan,
            yearly,
            output,
        } => {
            let schedule = loan::amortization_schedule(loan.principal, loan.rate, loan.months)?;
            if yearly {
                let years = loan::yearly_summary(&schedule);
                print_yearly(&years);
                output.write(&years, &years)
            } else {
                print_schedule(&schedule);
                output.write(&schedule, &schedule)
            }
        }
        LoanCommand::Prepayment {
            loan,
            amount,
            after_month,
            mode,
            schedule,
            output,
        } => {
            let result = restructure::prepayment(&loan.loan()?, amount, after_month, mode)?;
            ui::print_summary(
                &format!("Prepayment ({})", result.mode),
                &[
                    ("Original EMI", ui::format_money(result.original.emi)),
                    ("New EMI", ui::format_money(result.new_emi)),
                    (
                        "Tenure",
                        format!(
                            "{} → {} months",
                            result.original.tenure_months, result.new_tenure_months
                        ),
                    ),
                    ("Months saved", result.months_saved.to_string()),
                    ("Total interest", ui::format_money(result.total_interest)),
                    ("Interest saved", ui::format_money(result.interest_saved)),
                ],
            );
            if schedule {
                ui::print_separator();
                print_schedule(&result.schedule);
            }
            output.write(&result, &result.schedule)
        }
        LoanCommand::Moratorium {
            loan,
            start_after_month,
            pause_months,
            mode,
            schedule,
            output,
        } => {
            let result =
                restructure::moratorium(&loan.loan()?, start_after_month, pause_months, mode)?;
            ui::print_summary(
                &format!("Moratorium ({})", result.mode),
                &[
                    ("Original EMI", ui::format_money(result.original.emi)),
                    ("Interest accrued", ui::format_money(result.accrued_interest)),
                    ("New EMI", ui::format_money(result.new_emi)),
                    (
                        "Installments after pause",
                        result.remaining_installments.to_string(),
                    ),
                    (
                        "Total tenure",
                        format!("{} months", result.total_tenure_months),
                    ),
                    ("Total interest", ui::format_money(result.total_interest)),
                    ("Extra interest", ui::format_money(result.extra_interest)),
                ],
            );
            if schedule {
                ui::print_separator();
                print_schedule(&result.schedule);
            }
            output.write(&result, &result.schedule)
        }
        LoanCommand::RateChange {
            loan,
            after_month,
            new_rate,
            mode,
            schedule,
            output,
        } => {
            let result = restructure::rate_change(&loan.loan()?, after_month, new_rate, mode)?;
            ui::print_summary(
                &format!("Rate change ({})", result.mode),
                &[
                    (
                        "Interest rate",
                        format!("{}% → {}%", result.original.annual_rate, result.new_rate),
                    ),
                    ("Original EMI", ui::format_money(result.original.emi)),
                    ("New EMI", ui::format_money(result.new_emi)),
                    (
                        "Tenure",
                        format!(
                            "{} → {} months",
                            result.original.tenure_months, result.new_tenure_months
                        ),
                    ),
                    ("Total interest", ui::format_money(result.total_interest)),
                    (
                        "Interest difference",
                        ui::format_money(result.interest_difference),
                    ),
                ],
            );
            if schedule {
                ui::print_separator();
                print_schedule(&result.schedule);
            }
            output.write(&result, &result.schedule)
        }
        LoanCommand::Eligibility {
            income,
            existing_emis,
            rate,
            months,
            foir,
            output,
        } => {
            let foir = foir.unwrap_or(config.defaults.foir);
            let result = loan::eligibility(income, existing_emis, rate, months, foir)?;
            ui::print_summary(
                "Loan eligibility",
                &[
                    ("Monthly income", ui::format_money(result.monthly_income)),
                    ("Existing EMIs", ui::format_money(result.existing_emis)),
                    ("FOIR", format!("{}%", result.foir)),
                    ("Affordable EMI", ui::format_money(result.max_emi)),
                    ("Total interest", ui::format_money(result.total_interest)),
                    ("Eligible loan amount", ui::format_money(result.eligible_amount)),
                ],
            );
            output.write(&result, std::slice::from_ref(&result))
        }
    }
}

/// Prints installments, marking paused months.
pub fn print_schedule(schedule: &[Installment]) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Month"),
        ui::header_cell("Opening"),
        ui::header_cell("Payment"),
        ui::header_cell("Interest"),
        ui::header_cell("Principal"),
        ui::header_cell("Closing"),
    ]);
    for row in schedule {
        table.add_row(vec![
            ui::number_cell(row.month),
            ui::money_cell(row.opening_balance),
            ui::money_cell(row.payment),
            ui::money_cell(row.interest),
            ui::change_cell(row.principal, false),
            ui::money_cell(row.closing_balance),
        ]);
    }
    println!("{table}");
    println!(
        "{} {}",
        ui::style_text("Total interest:", ui::StyleType::TotalLabel),
        ui::style_text(
            &ui::format_money(loan::total_interest(schedule)),
            ui::StyleType::TotalValue
        )
    );
}

fn print_yearly(years: &[YearSummary]) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Year"),
        ui::header_cell("Principal"),
        ui::header_cell("Interest"),
        ui::header_cell("Payment"),
        ui::header_cell("Closing"),
    ]);
    for row in years {
        table.add_row(vec![
            ui::number_cell(row.year),
            ui::money_cell(row.principal),
            ui::money_cell(row.interest),
            ui::money_cell(row.payment),
            ui::money_cell(row.closing_balance),
        ]);
    }
    println!("{table}");
}
