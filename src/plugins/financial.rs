//! Append-only sale ledger and period totals.
//!
//! Records are never edited or deleted once written; a wrong entry is
//! corrected by the operator outside this ledger.

use crate::core::collection::{FlatCollection, Record};
use crate::core::error::CluckError;
use crate::core::output::{self, OutputFormat};
use crate::core::records::RecordStore;
use crate::core::schemas;
use crate::core::time::{self, Period};
use crate::plugins::settings;
use chrono::{DateTime, Local, TimeZone, Utc};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FinancialRecord {
    pub id: String,
    /// Price times units sold, in whole currency units.
    pub sum: u64,
    pub date: DateTime<Utc>,
}

impl Record for FinancialRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinancialSummary {
    pub today: u64,
    pub week: u64,
    pub month: u64,
    pub total: u64,
}

fn ledger(records: &dyn RecordStore) -> FlatCollection<'_, FinancialRecord> {
    FlatCollection::new(records, schemas::FINANCIAL_DATA_KEY)
}

/// Append a sale of `sold` units at `price` each, dated `at`.
pub fn record_sale(
    records: &dyn RecordStore,
    price: u64,
    sold: u64,
    at: DateTime<Utc>,
) -> Result<FinancialRecord, CluckError> {
    let sum = price.checked_mul(sold).ok_or_else(|| {
        CluckError::ValidationError(format!("sale total overflows: {} x {}", price, sold))
    })?;
    let record = FinancialRecord {
        id: time::new_event_id(),
        sum,
        date: at,
    };
    add_record(records, record.clone())?;
    Ok(record)
}

pub fn add_record(records: &dyn RecordStore, record: FinancialRecord) -> Result<(), CluckError> {
    ledger(records).add(record)
}

pub fn list_records(records: &dyn RecordStore) -> Result<Vec<FinancialRecord>, CluckError> {
    ledger(records).all()
}

/// Sum of `records` dated inside `period`, judged on `now`'s calendar.
pub fn period_sum<Tz: TimeZone>(records: &[FinancialRecord], period: Period, now: &DateTime<Tz>) -> u64 {
    records
        .iter()
        .filter(|r| period.contains(&r.date, now))
        .fold(0u64, |acc, r| acc.saturating_add(r.sum))
}

pub fn summary<Tz: TimeZone>(records: &dyn RecordStore, now: &DateTime<Tz>) -> Result<FinancialSummary, CluckError> {
    let all = list_records(records)?;
    Ok(FinancialSummary {
        today: period_sum(&all, Period::Today, now),
        week: period_sum(&all, Period::Week, now),
        month: period_sum(&all, Period::Month, now),
        total: period_sum(&all, Period::All, now),
    })
}

// ===== CLI =====

#[derive(Parser, Debug)]
#[clap(name = "sale", about = "Record sales and view earnings.")]
pub struct SaleCli {
    #[clap(subcommand)]
    pub command: SaleCommand,
}

#[derive(Subcommand, Debug)]
pub enum SaleCommand {
    /// Record a sale made now.
    Add {
        /// Unit price
        #[clap(long)]
        price: u64,
        /// Units sold
        #[clap(long)]
        sold: u64,
    },
    /// List all recorded sales.
    List,
    /// Earnings today, this week, this month and overall.
    Summary,
}

pub fn run_sale_cli(records: &dyn RecordStore, cli: SaleCli, format: OutputFormat) -> Result<(), CluckError> {
    use colored::Colorize;

    let currency = settings::load_settings(records)?.currency;
    match cli.command {
        SaleCommand::Add { price, sold } => {
            let record = record_sale(records, price, sold, Utc::now())?;
            match format {
                OutputFormat::Json => output::print_json(&record)?,
                OutputFormat::Text => println!(
                    "Sale recorded: {} (ID: {})",
                    currency.render(record.sum).bright_green(),
                    record.id
                ),
            }
        }
        SaleCommand::List => {
            let all = list_records(records)?;
            match format {
                OutputFormat::Json => output::print_json(&all)?,
                OutputFormat::Text => {
                    if all.is_empty() {
                        println!("No sales recorded.");
                    }
                    for r in &all {
                        println!(
                            "{}  {:>12}  {}",
                            time::day_key(r.date.with_timezone(&Local).date_naive()),
                            currency.render(r.sum),
                            r.id.dimmed()
                        );
                    }
                }
            }
        }
        SaleCommand::Summary => {
            let s = summary(records, &Local::now())?;
            match format {
                OutputFormat::Json => output::print_json(&s)?,
                OutputFormat::Text => {
                    println!("{:<10} {}", "Today", currency.render(s.today).bright_green());
                    println!("{:<10} {}", "Week", currency.render(s.week).bright_green());
                    println!("{:<10} {}", "Month", currency.render(s.month).bright_green());
                    println!("{:<10} {}", "Total", currency.render(s.total).bright_green().bold());
                }
            }
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "financial",
        "version": "0.1.0",
        "description": "Append-only sale ledger with today/week/month/total earnings",
        "commands": [
            { "name": "sale add", "parameters": ["price", "sold"] },
            { "name": "sale list" },
            { "name": "sale summary" }
        ],
        "storage": [schemas::FINANCIAL_DATA_KEY]
    })
}
