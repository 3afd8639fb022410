//! cluckbook: local-first record keeping for a small poultry farm.
//!
//! Daily egg and hen counts, dated reminders, points of sale with their
//! stock, and a sale ledger with today/week/month totals. Everything lives
//! in one local SQLite file; there is no server and no sync.
//!
//! # Architecture
//!
//! ## Record store
//!
//! Every collection is one serialized blob under a fixed key
//! (`menu_data`, `shops_data`, `financial_data`, `settings_data`) in a
//! [`core::records::RecordStore`]. Mutations rewrite the whole blob. Each key
//! carries a revision counter so a front end can poll for changes.
//!
//! All SQLite access routes through `DbBroker`, which serializes access
//! in-process and journals every operation to `broker.events.jsonl`.
//!
//! ## Subsystems (Plugins)
//!
//! - `ledger`: per-day counts and reminders keyed by `dd.MM.yyyy`
//! - `shops`: points of sale, stock, and per-type availability
//! - `financial`: append-only sale ledger and period totals
//! - `settings`: reminder toggle, currency, count unit
//! - `articles`: embedded husbandry guides
//!
//! # Examples
//!
//! ```bash
//! cluckbook init
//! cluckbook event set --kind eggs --count 42
//! cluckbook shop add --name "Corner shop" --kind shop --eggs-stock 60
//! cluckbook sale add --price 3 --sold 12
//! cluckbook sale summary
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: store, broker, codec, config, time and output primitives
//! - [`plugins`]: subsystem implementations

pub mod core;
pub mod plugins;

use core::{
    config, db,
    error::CluckError,
    output::{self, OutputFormat},
    records::{RecordStore, SqliteRecordStore},
    schemas,
    store::{Store, StoreKind},
};
use plugins::{articles, financial, ledger, settings, shops};

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

const PROJECT_DIR_NAME: &str = ".cluckbook";
const DATA_DIR_NAME: &str = "data";

#[derive(Parser, Debug)]
#[clap(
    name = "cluckbook",
    version = env!("CARGO_PKG_VERSION"),
    about = "Poultry farm record keeping: counts, reminders, shops and sales"
)]
struct Cli {
    /// Store directory. Defaults to the nearest `.cluckbook/data`, then `~/.cluckbook/data`.
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Output format (overrides config.toml).
    #[clap(long, global = true, value_enum)]
    format: Option<OutputFormat>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct SchemaCli {
    /// Optional: filter by subsystem name
    #[clap(long)]
    subsystem: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a `.cluckbook` store in a directory
    Init {
        /// Directory to initialize (defaults to current working directory).
        #[clap(short, long)]
        dir: Option<PathBuf>,
    },

    /// Daily ledger view
    Day(ledger::DayCli),

    /// Egg and hen counts
    Event(ledger::EventCli),

    /// Dated reminders
    Reminder(ledger::ReminderCli),

    /// Points of sale and stock
    Shop(shops::ShopCli),

    /// Sales and earnings
    Sale(financial::SaleCli),

    /// Preferences
    Settings(settings::SettingsCli),

    /// Husbandry guides
    Articles(articles::ArticlesCli),

    /// Per-key revisions and audit journal size
    Status,

    /// Subsystem schemas and discovery
    Schema(SchemaCli),

    /// Print version
    Version,
}

fn find_project_store(start_dir: &Path) -> Option<PathBuf> {
    let mut current_dir = PathBuf::from(start_dir);
    loop {
        let candidate = current_dir.join(PROJECT_DIR_NAME).join(DATA_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !current_dir.pop() {
            return None;
        }
    }
}

/// Pick the store: explicit `--data-dir`, else nearest project store, else the user store.
pub fn resolve_store(data_dir: Option<PathBuf>, current_dir: &Path) -> Result<Store, CluckError> {
    if let Some(dir) = data_dir {
        return Ok(Store::new(StoreKind::Custom, dir));
    }
    if let Some(root) = find_project_store(current_dir) {
        return Ok(Store::new(StoreKind::Project, root));
    }
    let home = std::env::var("HOME")?;
    Ok(Store::new(
        StoreKind::User,
        PathBuf::from(home).join(PROJECT_DIR_NAME).join(DATA_DIR_NAME),
    ))
}

const CONFIG_TEMPLATE: &str = "# cluckbook configuration
[output]
format = \"text\"   # text | json
color = true

[log]
filter = \"warn\"   # overridden by RUST_LOG
";

/// Create `<dir>/.cluckbook/data` with an empty records database and a config template.
pub fn init_project(dir: &Path) -> Result<Store, CluckError> {
    let project_dir = dir.join(PROJECT_DIR_NAME);
    let store = Store::new(StoreKind::Project, project_dir.join(DATA_DIR_NAME));
    db::initialize_records_db(&store.root)?;

    let config_path = project_dir.join(schemas::CONFIG_FILE_NAME);
    if !config_path.exists() {
        fs::write(&config_path, CONFIG_TEMPLATE).map_err(CluckError::IoError)?;
    }
    Ok(store)
}

fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn all_schemas() -> std::collections::BTreeMap<&'static str, serde_json::Value> {
    let mut schemas = std::collections::BTreeMap::new();
    schemas.insert("broker", core::broker::schema());
    schemas.insert("ledger", ledger::schema());
    schemas.insert("shops", shops::schema());
    schemas.insert("financial", financial::schema());
    schemas.insert("settings", settings::schema());
    schemas.insert("articles", articles::schema());
    schemas
}

fn print_status(store: &Store, records: &dyn RecordStore, format: OutputFormat) -> Result<(), CluckError> {
    use colored::Colorize;

    let mut revisions = serde_json::Map::new();
    for key in schemas::ALL_KEYS {
        revisions.insert(key.to_string(), records.revision(key)?.into());
    }
    let audit_events = core::broker::read_audit_log(&store.root)?.len();

    match format {
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "store": store.root,
            "kind": format!("{:?}", store.kind).to_lowercase(),
            "revisions": revisions,
            "audit_events": audit_events
        })),
        OutputFormat::Text => {
            println!("{} {}", "Store".bright_cyan().bold(), store.root.display());
            for (key, rev) in &revisions {
                println!("  {:<16} rev {}", key, rev);
            }
            println!("  {:<16} {}", "audit events", audit_events);
            Ok(())
        }
    }
}

pub fn run() -> Result<(), CluckError> {
    let cli = Cli::parse();
    let current_dir = std::env::current_dir()?;

    match cli.command {
        Command::Version => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::Init { dir } => {
            let target_dir = dir.unwrap_or_else(|| current_dir.clone());
            fs::create_dir_all(&target_dir).map_err(CluckError::IoError)?;
            let target_dir = fs::canonicalize(&target_dir).map_err(CluckError::IoError)?;
            let store = init_project(&target_dir)?;
            println!("cluckbook store initialized at {}", store.root.display());
            return Ok(());
        }
        Command::Schema(schema_cli) => {
            let schemas = all_schemas();
            let value = match schema_cli.subsystem {
                Some(sub) => schemas
                    .get(sub.as_str())
                    .cloned()
                    .ok_or_else(|| CluckError::NotFound(format!("subsystem '{}'", sub)))?,
                None => serde_json::json!({
                    "schema_version": "1.0.0",
                    "subsystems": schemas
                }),
            };
            return output::print_json(&value);
        }
        Command::Articles(articles_cli) => {
            let format = cli.format.unwrap_or(OutputFormat::Text);
            return articles::run_articles_cli(articles_cli, format);
        }
        _ => {}
    }

    let store = resolve_store(cli.data_dir, &current_dir)?;
    let config = config::load_config(store.config_dir())?;
    init_tracing(&config.log.filter);
    if !config.output.color {
        colored::control::set_override(false);
    }
    let format = cli
        .format
        .unwrap_or_else(|| OutputFormat::from_config(&config.output.format));
    tracing::debug!(root = %store.root.display(), kind = ?store.kind, "using store");

    dispatch(&store, cli.command, format)
}

fn dispatch(store: &Store, command: Command, format: OutputFormat) -> Result<(), CluckError> {
    let records = SqliteRecordStore::open(&store.root)?;
    match command {
        Command::Day(c) => ledger::run_day_cli(&records, c, format),
        Command::Event(c) => ledger::run_event_cli(&records, c, format),
        Command::Reminder(c) => ledger::run_reminder_cli(&records, c, format),
        Command::Shop(c) => shops::run_shop_cli(&records, c, format),
        Command::Sale(c) => financial::run_sale_cli(&records, c, format),
        Command::Settings(c) => settings::run_settings_cli(&records, c, format),
        Command::Status => print_status(store, &records, format),
        Command::Version | Command::Init { .. } | Command::Schema(_) | Command::Articles(_) => Ok(()),
    }
}
