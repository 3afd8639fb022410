//! Points of distribution (shops, online channels, market stalls) and their stock.
//!
//! Entries of every type share one flat list under [`schemas::SHOPS_DATA_KEY`].
//! Statistics are recomputed from that list on every call.

use crate::core::collection::{FlatCollection, Record};
use crate::core::error::CluckError;
use crate::core::output::{self, OutputFormat, compact_line};
use crate::core::records::RecordStore;
use crate::core::schemas;
use crate::core::time;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ShopType {
    Shop,
    Online,
    Market,
}

impl ShopType {
    /// Declaration order; statistics are reported in this order.
    pub const ALL: [ShopType; 3] = [ShopType::Shop, ShopType::Online, ShopType::Market];

    pub fn title(&self) -> &'static str {
        match self {
            ShopType::Shop => "SHOP",
            ShopType::Online => "ONLINE",
            ShopType::Market => "MARKET",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShopEntry {
    pub id: String,
    pub name: String,
    pub eggs_stock: u32,
    pub eggs_sold: u32,
    pub chickens_stock: u32,
    pub chickens_sold: u32,
    #[serde(rename = "type")]
    pub kind: ShopType,
    pub created_at: DateTime<Utc>,
}

impl Record for ShopEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Counts for a new entry or the replacement values of an edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockFigures {
    pub eggs_stock: u32,
    pub eggs_sold: u32,
    pub chickens_stock: u32,
    pub chickens_sold: u32,
}

impl ShopEntry {
    pub fn new(name: &str, kind: ShopType, figures: StockFigures) -> Self {
        Self {
            id: time::new_event_id(),
            name: name.trim().to_string(),
            eggs_stock: figures.eggs_stock,
            eggs_sold: figures.eggs_sold,
            chickens_stock: figures.chickens_stock,
            chickens_sold: figures.chickens_sold,
            kind,
            created_at: Utc::now(),
        }
    }

    /// Eggs still on hand; never negative even if more were sold than stocked.
    pub fn available_eggs(&self) -> u32 {
        self.eggs_stock.saturating_sub(self.eggs_sold)
    }

    pub fn available_chickens(&self) -> u32 {
        self.chickens_stock.saturating_sub(self.chickens_sold)
    }
}

/// Partial edit of an entry. `None` keeps the current value.
/// Id, type and creation time are never editable.
#[derive(Debug, Clone, Default)]
pub struct ShopEntryUpdate {
    pub name: Option<String>,
    pub eggs_stock: Option<u32>,
    pub eggs_sold: Option<u32>,
    pub chickens_stock: Option<u32>,
    pub chickens_sold: Option<u32>,
}

impl ShopEntryUpdate {
    fn apply(self, entry: &mut ShopEntry) {
        if let Some(name) = self.name {
            entry.name = name.trim().to_string();
        }
        if let Some(v) = self.eggs_stock {
            entry.eggs_stock = v;
        }
        if let Some(v) = self.eggs_sold {
            entry.eggs_sold = v;
        }
        if let Some(v) = self.chickens_stock {
            entry.chickens_stock = v;
        }
        if let Some(v) = self.chickens_sold {
            entry.chickens_sold = v;
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ShopTypeStats {
    #[serde(rename = "type")]
    pub kind: ShopType,
    pub total_available_eggs: u64,
    pub total_available_chickens: u64,
    pub entries_count: usize,
}

fn shops(records: &dyn RecordStore) -> FlatCollection<'_, ShopEntry> {
    FlatCollection::new(records, schemas::SHOPS_DATA_KEY)
}

fn validate_name(name: &str) -> Result<(), CluckError> {
    if name.trim().is_empty() {
        return Err(CluckError::ValidationError(
            "shop name must not be empty".into(),
        ));
    }
    Ok(())
}

pub fn add_entry(records: &dyn RecordStore, entry: ShopEntry) -> Result<ShopEntry, CluckError> {
    validate_name(&entry.name)?;
    shops(records).add(entry.clone())?;
    Ok(entry)
}

pub fn list_entries(records: &dyn RecordStore) -> Result<Vec<ShopEntry>, CluckError> {
    shops(records).all()
}

pub fn entries_by_type(records: &dyn RecordStore, kind: ShopType) -> Result<Vec<ShopEntry>, CluckError> {
    Ok(list_entries(records)?
        .into_iter()
        .filter(|e| e.kind == kind)
        .collect())
}

pub fn get_entry(records: &dyn RecordStore, id: &str) -> Result<Option<ShopEntry>, CluckError> {
    shops(records).get(id)
}

/// Replace a stored entry wholesale (matched by id). Unknown ids are a no-op.
///
/// The stored id, type and creation time win over whatever `entry` carries.
pub fn update_entry(records: &dyn RecordStore, entry: ShopEntry) -> Result<bool, CluckError> {
    let collection = shops(records);
    let Some(current) = collection.get(&entry.id)? else {
        return Ok(false);
    };
    validate_name(&entry.name)?;
    collection.update(ShopEntry {
        kind: current.kind,
        created_at: current.created_at,
        ..entry
    })
}

/// Apply a partial edit to the entry with `id`. Returns the edited entry, `None` if absent.
pub fn edit_entry(
    records: &dyn RecordStore,
    id: &str,
    update: ShopEntryUpdate,
) -> Result<Option<ShopEntry>, CluckError> {
    let Some(mut entry) = get_entry(records, id)? else {
        return Ok(None);
    };
    update.apply(&mut entry);
    if !update_entry(records, entry.clone())? {
        return Ok(None);
    }
    Ok(Some(entry))
}

/// Delete the entry with `id`. Unknown ids are a no-op.
pub fn remove_entry(records: &dyn RecordStore, id: &str) -> Result<bool, CluckError> {
    shops(records).remove(id)
}

pub fn summarize(kind: ShopType, entries: &[ShopEntry]) -> ShopTypeStats {
    entries
        .iter()
        .filter(|e| e.kind == kind)
        .fold(
            ShopTypeStats {
                kind,
                total_available_eggs: 0,
                total_available_chickens: 0,
                entries_count: 0,
            },
            |mut stats, e| {
                stats.total_available_eggs += u64::from(e.available_eggs());
                stats.total_available_chickens += u64::from(e.available_chickens());
                stats.entries_count += 1;
                stats
            },
        )
}

pub fn stats_by_type(records: &dyn RecordStore, kind: ShopType) -> Result<ShopTypeStats, CluckError> {
    Ok(summarize(kind, &list_entries(records)?))
}

/// One entry per [`ShopType`], in declaration order.
pub fn all_stats(records: &dyn RecordStore) -> Result<Vec<ShopTypeStats>, CluckError> {
    let entries = list_entries(records)?;
    Ok(ShopType::ALL
        .iter()
        .map(|kind| summarize(*kind, &entries))
        .collect())
}

// ===== CLI =====

#[derive(Parser, Debug)]
#[clap(name = "shop", about = "Manage points of sale and their stock.")]
pub struct ShopCli {
    #[clap(subcommand)]
    pub command: ShopCommand,
}

#[derive(Subcommand, Debug)]
pub enum ShopCommand {
    /// Add a point of sale.
    Add {
        #[clap(long)]
        name: String,
        #[clap(long, value_enum)]
        kind: ShopType,
        #[clap(long, default_value_t = 0)]
        eggs_stock: u32,
        #[clap(long, default_value_t = 0)]
        eggs_sold: u32,
        #[clap(long, default_value_t = 0)]
        chickens_stock: u32,
        #[clap(long, default_value_t = 0)]
        chickens_sold: u32,
    },
    /// List entries, optionally for one type.
    List {
        #[clap(long, value_enum)]
        kind: Option<ShopType>,
    },
    /// Show one entry.
    Get {
        #[clap(long)]
        id: String,
    },
    /// Change an entry's name or figures.
    Edit {
        #[clap(long)]
        id: String,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        eggs_stock: Option<u32>,
        #[clap(long)]
        eggs_sold: Option<u32>,
        #[clap(long)]
        chickens_stock: Option<u32>,
        #[clap(long)]
        chickens_sold: Option<u32>,
    },
    /// Delete an entry.
    Rm {
        #[clap(long)]
        id: String,
    },
    /// Available stock per shop type.
    Stats {
        #[clap(long, value_enum)]
        kind: Option<ShopType>,
    },
}

fn print_entry(entry: &ShopEntry) {
    use colored::Colorize;

    println!(
        "{:<7} {:<28} eggs {:>5} (stock {}, sold {})  chickens {:>4} (stock {}, sold {})  {}",
        entry.kind.title().bright_cyan(),
        compact_line(&entry.name, 28),
        entry.available_eggs().to_string().bright_green(),
        entry.eggs_stock,
        entry.eggs_sold,
        entry.available_chickens().to_string().bright_green(),
        entry.chickens_stock,
        entry.chickens_sold,
        entry.id.dimmed()
    );
}

fn print_stats(stats: &ShopTypeStats) {
    use colored::Colorize;

    println!(
        "{:<7} {:>3} entries  {:>6} eggs  {:>5} chickens available",
        stats.kind.title().bright_cyan().bold(),
        stats.entries_count,
        stats.total_available_eggs.to_string().bright_green(),
        stats.total_available_chickens.to_string().bright_green()
    );
}

pub fn run_shop_cli(records: &dyn RecordStore, cli: ShopCli, format: OutputFormat) -> Result<(), CluckError> {
    match cli.command {
        ShopCommand::Add {
            name,
            kind,
            eggs_stock,
            eggs_sold,
            chickens_stock,
            chickens_sold,
        } => {
            let entry = ShopEntry::new(
                &name,
                kind,
                StockFigures {
                    eggs_stock,
                    eggs_sold,
                    chickens_stock,
                    chickens_sold,
                },
            );
            let entry = add_entry(records, entry)?;
            match format {
                OutputFormat::Json => output::print_json(&entry)?,
                OutputFormat::Text => println!("Shop entry added (ID: {})", entry.id),
            }
        }
        ShopCommand::List { kind } => {
            let entries = match kind {
                Some(kind) => entries_by_type(records, kind)?,
                None => list_entries(records)?,
            };
            match format {
                OutputFormat::Json => output::print_json(&entries)?,
                OutputFormat::Text => {
                    if entries.is_empty() {
                        println!("No shop entries.");
                    }
                    entries.iter().for_each(print_entry);
                }
            }
        }
        ShopCommand::Get { id } => {
            let entry = get_entry(records, &id)?;
            match (format, entry) {
                (OutputFormat::Json, entry) => output::print_json(&entry)?,
                (OutputFormat::Text, Some(entry)) => print_entry(&entry),
                (OutputFormat::Text, None) => println!("No shop entry with id {}.", id),
            }
        }
        ShopCommand::Edit {
            id,
            name,
            eggs_stock,
            eggs_sold,
            chickens_stock,
            chickens_sold,
        } => {
            let update = ShopEntryUpdate {
                name,
                eggs_stock,
                eggs_sold,
                chickens_stock,
                chickens_sold,
            };
            let edited = edit_entry(records, &id, update)?;
            match (format, edited) {
                (OutputFormat::Json, edited) => output::print_json(&edited)?,
                (OutputFormat::Text, Some(entry)) => print_entry(&entry),
                (OutputFormat::Text, None) => {
                    println!("No shop entry with id {}; nothing changed.", id)
                }
            }
        }
        ShopCommand::Rm { id } => {
            let removed = remove_entry(records, &id)?;
            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({
                    "id": id,
                    "removed": removed
                }))?,
                OutputFormat::Text if removed => println!("Removed shop entry {}", id),
                OutputFormat::Text => println!("No shop entry with id {}; nothing changed.", id),
            }
        }
        ShopCommand::Stats { kind } => {
            let stats = match kind {
                Some(kind) => vec![stats_by_type(records, kind)?],
                None => all_stats(records)?,
            };
            match format {
                OutputFormat::Json => output::print_json(&stats)?,
                OutputFormat::Text => stats.iter().for_each(print_stats),
            }
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "shops",
        "version": "0.1.0",
        "description": "Points of sale with egg/chicken stock and per-type availability totals",
        "commands": [
            { "name": "shop add", "parameters": ["name", "kind", "eggs_stock", "eggs_sold", "chickens_stock", "chickens_sold"] },
            { "name": "shop list", "parameters": ["kind"] },
            { "name": "shop get", "parameters": ["id"] },
            { "name": "shop edit", "parameters": ["id", "name", "eggs_stock", "eggs_sold", "chickens_stock", "chickens_sold"] },
            { "name": "shop rm", "parameters": ["id"] },
            { "name": "shop stats", "parameters": ["kind"] }
        ],
        "storage": [schemas::SHOPS_DATA_KEY]
    })
}
