use super::export::ExportArgs;
use super::{amount, ui};
use crate::calc::denomination::{self, DenominationSummary};
use crate::calc::loan;
use crate::core::Store;
use crate::core::config::AppConfig;
use crate::core::records::{
    CASH_BOOK, CashBookEntry, DENOMINATIONS, DenominationCount, EntryKind, LOAN_PROFILES,
    LoanProfile, cash_book_balance,
};
use crate::store::{KeyValueStore, RecordList};
use anyhow::{Context, Result, anyhow, bail};
use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use comfy_table::Cell;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

#[derive(Subcommand, Debug, Clone)]
pub enum DenominationCommand {
    /// Total a set of counts without saving them, e.g. 500x3 100x2
    Count {
        /// VALUExQUANTITY pairs
        #[arg(required = true, value_parser = count)]
        counts: Vec<DenominationCount>,
        #[command(flatten)]
        output: ExportArgs,
    },
    /// Save counts, e.g. 500x3 100x2
    Add {
        /// VALUExQUANTITY pairs
        #[arg(required = true, value_parser = count)]
        counts: Vec<DenominationCount>,
    },
    /// List saved counts
    List,
    /// Total of the saved counts, with the amount in words
    Summary {
        #[command(flatten)]
        output: ExportArgs,
    },
    /// Delete a saved count
    Delete { id: u64 },
    /// Delete all saved counts
    Clear,
}

#[derive(Subcommand, Debug, Clone)]
pub enum LoanProfileCommand {
    /// Save a loan
    Save {
        /// Name to remember the loan by
        #[arg(long)]
        name: String,
        /// Loan amount
        #[arg(short, long, value_parser = amount)]
        principal: f64,
        /// Annual interest rate in percent
        #[arg(short, long, value_parser = amount)]
        rate: f64,
        /// Tenure in months
        #[arg(short = 'n', long)]
        months: u32,
        /// Date of the first installment (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },
    /// List saved loans with their EMI
    List,
    /// Show the EMI of a saved loan
    Show { id: u64 },
    /// Change the terms of a saved loan, e.g. after a rate revision
    Update {
        id: u64,
        /// New loan amount
        #[arg(short, long, value_parser = amount)]
        principal: Option<f64>,
        /// New annual interest rate in percent
        #[arg(short, long, value_parser = amount)]
        rate: Option<f64>,
        /// New tenure in months
        #[arg(short = 'n', long)]
        months: Option<u32>,
    },
    /// Delete a saved loan
    Delete { id: u64 },
}

#[derive(Subcommand, Debug, Clone)]
pub enum CashBookCommand {
    /// Record money in or out
    Add {
        /// credit (money in) or debit (money out)
        kind: EntryKind,
        /// Amount
        #[arg(value_parser = amount)]
        amount: f64,
        /// What the entry is for
        #[arg(short, long, default_value = "")]
        description: String,
        /// Entry date (YYYY-MM-DD), today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List entries with a running balance
    List {
        #[command(flatten)]
        output: ExportArgs,
    },
    /// Current balance
    Balance,
    /// Delete an entry
    Delete { id: u64 },
    /// Delete all entries
    Clear,
}

/// Parses `VALUExQUANTITY`, e.g. `500x3`.
fn count(raw: &str) -> Result<DenominationCount> {
    let (value, quantity) = raw
        .to_lowercase()
        .split_once(['x', '*', '×'])
        .map(|(v, q)| (v.trim().to_string(), q.trim().to_string()))
        .ok_or_else(|| anyhow!("Count '{raw}' must look like VALUExQUANTITY, e.g. 500x3"))?;
    let value = crate::core::validate::parse_amount("Denomination", &value)?;
    let quantity = quantity
        .parse()
        .with_context(|| format!("Quantity '{quantity}' must be a whole number"))?;
    Ok(DenominationCount { value, quantity })
}

fn open_list<T>(config: &AppConfig, name: &str) -> Result<RecordList<T>>
where
    T: Serialize + DeserializeOwned,
{
    let data_path = config.default_data_path()?;
    let store = KeyValueStore::open(&data_path);
    let collection = store
        .get_collection(name, true, true)
        .with_context(|| format!("Saved data is unavailable at {}", data_path.display()))?;
    Ok(RecordList::new(collection))
}

fn print_denomination_summary(summary: &DenominationSummary) {
    for line in &summary.lines {
        if !denomination::DEFAULT_DENOMINATIONS.contains(&line.value) {
            let note = format!("Note: {} is not a standard note or coin", line.value);
            println!("{}", ui::style_text(&note, ui::StyleType::Subtle));
        }
    }
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Denomination"),
        ui::header_cell("Count"),
        ui::header_cell("Total"),
    ]);
    for line in &summary.lines {
        table.add_row(vec![
            ui::money_cell(line.value),
            ui::number_cell(line.quantity),
            ui::money_cell(line.total),
        ]);
    }
    println!("{table}");
    ui::print_summary(
        "Cash total",
        &[
            ("Pieces", summary.total_pieces.to_string()),
            ("In words", summary.amount_in_words.clone()),
            ("Total", ui::format_money(summary.total_amount)),
        ],
    );
}

pub async fn run_denominations(command: DenominationCommand, config: &AppConfig) -> Result<()> {
    debug!("Running denomination command: {command:?}");
    let open = || open_list::<DenominationCount>(config, DENOMINATIONS);
    match command {
        DenominationCommand::Count { counts, output } => {
            let summary = denomination::summarize(&counts)?;
            print_denomination_summary(&summary);
            output.write(&summary, &summary.lines)
        }
        DenominationCommand::Add { counts } => {
            denomination::summarize(&counts)?;
            let list = open()?;
            for item in &counts {
                let id = list.append(item).await?;
                println!("Saved {} x {} as #{}", ui::format_money(item.value), item.quantity, id);
            }
            Ok(())
        }
        DenominationCommand::List => {
            let list = open()?;
            let mut table = ui::new_styled_table();
            table.set_header(vec![
                ui::header_cell("Id"),
                ui::header_cell("Denomination"),
                ui::header_cell("Count"),
            ]);
            for stored in list.list().await? {
                table.add_row(vec![
                    ui::number_cell(stored.id),
                    ui::money_cell(stored.record.value),
                    ui::number_cell(stored.record.quantity),
                ]);
            }
            println!("{table}");
            Ok(())
        }
        DenominationCommand::Summary { output } => {
            let counts: Vec<DenominationCount> =
                open()?.list().await?.into_iter().map(|s| s.record).collect();
            let summary = denomination::summarize(&counts)?;
            print_denomination_summary(&summary);
            output.write(&summary, &summary.lines)
        }
        DenominationCommand::Delete { id } => delete(&open()?, id).await,
        DenominationCommand::Clear => {
            open()?.clear().await;
            println!("Cleared saved denominations");
            Ok(())
        }
    }
}

pub async fn run_loans(command: LoanProfileCommand, config: &AppConfig) -> Result<()> {
    debug!("Running loan profile command: {command:?}");
    let list: RecordList<LoanProfile> = open_list(config, LOAN_PROFILES)?;
    match command {
        LoanProfileCommand::Save {
            name,
            principal,
            rate,
            months,
            start_date,
        } => {
            if name.trim().is_empty() {
                bail!("Loan name must not be blank");
            }
            loan::Loan::new(principal, rate, months)?;
            let id = list
                .append(&LoanProfile {
                    name: name.trim().to_string(),
                    principal,
                    annual_rate: rate,
                    tenure_months: months,
                    start_date,
                })
                .await?;
            println!("Saved loan '{}' as #{}", name.trim(), id);
            Ok(())
        }
        LoanProfileCommand::List => {
            let mut table = ui::new_styled_table();
            table.set_header(vec![
                ui::header_cell("Id"),
                ui::header_cell("Name"),
                ui::header_cell("Principal"),
                ui::header_cell("Rate"),
                ui::header_cell("Months"),
                ui::header_cell("Starts"),
                ui::header_cell("EMI"),
            ]);
            for stored in list.list().await? {
                let profile = &stored.record;
                let emi = loan::emi(profile.principal, profile.annual_rate, profile.tenure_months)
                    .map(|r| ui::format_money(r.emi))
                    .unwrap_or_else(|_| "N/A".to_string());
                table.add_row(vec![
                    ui::number_cell(stored.id),
                    Cell::new(&profile.name),
                    ui::money_cell(profile.principal),
                    ui::number_cell(format!("{}%", profile.annual_rate)),
                    ui::number_cell(profile.tenure_months),
                    Cell::new(
                        profile
                            .start_date
                            .map_or_else(|| "-".to_string(), |d| d.to_string()),
                    ),
                    ui::number_cell(emi),
                ]);
            }
            println!("{table}");
            Ok(())
        }
        LoanProfileCommand::Show { id } => {
            let profile = list
                .get(id)
                .await?
                .ok_or_else(|| anyhow!("No saved loan with id {id}"))?;
            let result = loan::emi(profile.principal, profile.annual_rate, profile.tenure_months)?;
            let mut rows = vec![
                ("Loan amount", ui::format_money(result.principal)),
                ("Interest rate", format!("{}%", result.annual_rate)),
                ("Tenure", format!("{} months", result.tenure_months)),
            ];
            if let Some(start) = profile.start_date {
                let last = start
                    .checked_add_months(chrono::Months::new(profile.tenure_months.saturating_sub(1)))
                    .map_or_else(|| "-".to_string(), |d| d.to_string());
                rows.push(("First installment", start.to_string()));
                rows.push(("Last installment", last));
            }
            rows.push(("Total interest", ui::format_money(result.total_interest)));
            rows.push(("Monthly EMI", ui::format_money(result.emi)));
            ui::print_summary(&profile.name, &rows);
            Ok(())
        }
        LoanProfileCommand::Update {
            id,
            principal,
            rate,
            months,
        } => {
            let mut profile = list
                .get(id)
                .await?
                .ok_or_else(|| anyhow!("No saved loan with id {id}"))?;
            profile.principal = principal.unwrap_or(profile.principal);
            profile.annual_rate = rate.unwrap_or(profile.annual_rate);
            profile.tenure_months = months.unwrap_or(profile.tenure_months);
            loan::Loan::new(profile.principal, profile.annual_rate, profile.tenure_months)?;
            list.update(id, &profile).await?;
            println!("Updated loan '{}'", profile.name);
            Ok(())
        }
        LoanProfileCommand::Delete { id } => delete(&list, id).await,
    }
}

pub async fn run_cash_book(command: CashBookCommand, config: &AppConfig) -> Result<()> {
    debug!("Running cash book command: {command:?}");
    let list: RecordList<CashBookEntry> = open_list(config, CASH_BOOK)?;
    match command {
        CashBookCommand::Add {
            kind,
            amount,
            description,
            date,
        } => {
            crate::core::validate::ensure_positive("Amount", amount)?;
            let entry = CashBookEntry {
                date: date.unwrap_or_else(|| Utc::now().date_naive()),
                description,
                amount,
                kind,
            };
            let id = list.append(&entry).await?;
            println!("Recorded {} of {} as #{}", entry.kind, ui::format_money(amount), id);
            Ok(())
        }
        CashBookCommand::List { output } => {
            let entries = list.list().await?;
            let mut table = ui::new_styled_table();
            table.set_header(vec![
                ui::header_cell("Id"),
                ui::header_cell("Date"),
                ui::header_cell("Description"),
                ui::header_cell("Amount"),
                ui::header_cell("Balance"),
            ]);
            let mut balance = 0.0;
            for stored in &entries {
                balance += stored.record.signed_amount();
                table.add_row(vec![
                    ui::number_cell(stored.id),
                    Cell::new(stored.record.date),
                    Cell::new(&stored.record.description),
                    ui::change_cell(stored.record.signed_amount(), false),
                    ui::money_cell(balance),
                ]);
            }
            println!("{table}");
            let records: Vec<CashBookEntry> = entries.into_iter().map(|s| s.record).collect();
            output.write(&records, &records)
        }
        CashBookCommand::Balance => {
            let entries = list.list().await?;
            let balance = cash_book_balance(entries.iter().map(|s| &s.record));
            ui::print_summary(
                "Cash book",
                &[
                    ("Entries", entries.len().to_string()),
                    ("Balance", ui::format_money(balance)),
                ],
            );
            Ok(())
        }
        CashBookCommand::Delete { id } => delete(&list, id).await,
        CashBookCommand::Clear => {
            list.clear().await;
            println!("Cleared the cash book");
            Ok(())
        }
    }
}

async fn delete<T>(list: &RecordList<T>, id: u64) -> Result<()>
where
    T: Serialize + DeserializeOwned,
{
    if !list.delete(id).await {
        bail!("No saved record with id {id}");
    }
    println!("Deleted #{id}");
    Ok(())
}
