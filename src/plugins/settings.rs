//! User preferences: the daily reminder toggle, display currency and count unit.
//!
//! Stored under their own key, apart from the data blobs.

use crate::core::collection::{load_blob, save_blob};
use crate::core::error::CluckError;
use crate::core::output::{self, OutputFormat};
use crate::core::records::RecordStore;
use crate::core::schemas;
use chrono::{DateTime, Duration, NaiveTime, TimeZone};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Hour of day (local) at which the recurring check-in reminder fires.
pub const DAILY_REMINDER_HOUR: u32 = 12;
pub const DAILY_REMINDER_TITLE: &str = "It's time to check your cluck!";
pub const DAILY_REMINDER_BODY: &str = "Open to check";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Uah,
    Rub,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Uah => "₴",
            Currency::Rub => "₽",
        }
    }

    pub fn render(&self, amount: u64) -> String {
        format!("{}{}", amount, self.symbol())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Pieces,
    Dozens,
}

impl Unit {
    /// Render an egg count in this unit: `30` or `2 dz + 6`.
    pub fn render(&self, count: u64) -> String {
        match self {
            Unit::Pieces => count.to_string(),
            Unit::Dozens => {
                let (dozens, rest) = (count / 12, count % 12);
                if rest == 0 {
                    format!("{} dz", dozens)
                } else {
                    format!("{} dz + {}", dozens, rest)
                }
            }
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub reminders_enabled: bool,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub unit: Unit,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reminders_enabled: true,
            currency: Currency::default(),
            unit: Unit::default(),
        }
    }
}

pub fn load_settings(records: &dyn RecordStore) -> Result<Settings, CluckError> {
    load_blob(records, schemas::SETTINGS_DATA_KEY)
}

pub fn save_settings(records: &dyn RecordStore, settings: &Settings) -> Result<(), CluckError> {
    save_blob(records, schemas::SETTINGS_DATA_KEY, settings)
}

pub fn set_reminders_enabled(records: &dyn RecordStore, enabled: bool) -> Result<Settings, CluckError> {
    let mut settings = load_settings(records)?;
    settings.reminders_enabled = enabled;
    save_settings(records, &settings)?;
    Ok(settings)
}

pub fn set_currency(records: &dyn RecordStore, currency: Currency) -> Result<Settings, CluckError> {
    let mut settings = load_settings(records)?;
    settings.currency = currency;
    save_settings(records, &settings)?;
    Ok(settings)
}

pub fn set_unit(records: &dyn RecordStore, unit: Unit) -> Result<Settings, CluckError> {
    let mut settings = load_settings(records)?;
    settings.unit = unit;
    save_settings(records, &settings)?;
    Ok(settings)
}

/// Next firing of the daily noon reminder strictly after `now`, in `now`'s zone.
///
/// Returns `None` only when local noon does not exist on both candidate days
/// (a zone that skips 12:00 twice in a row).
pub fn next_daily_reminder<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let noon = NaiveTime::from_hms_opt(DAILY_REMINDER_HOUR, 0, 0)?;
    let today = now.date_naive();
    [today, today + Duration::days(1)]
        .into_iter()
        .filter_map(|day| now.timezone().from_local_datetime(&day.and_time(noon)).earliest())
        .find(|candidate| candidate > now)
}

// ===== CLI =====

#[derive(Parser, Debug)]
#[clap(name = "settings", about = "Reminder toggle and display preferences.")]
pub struct SettingsCli {
    #[clap(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Show current settings.
    Show,
    /// Turn the daily check-in reminder on or off.
    Reminders {
        #[clap(value_enum)]
        state: Toggle,
    },
    /// Set the display currency.
    Currency {
        #[clap(value_enum)]
        currency: Currency,
    },
    /// Set the unit used to display egg counts.
    Unit {
        #[clap(value_enum)]
        unit: Unit,
    },
}

pub fn run_settings_cli(
    records: &dyn RecordStore,
    cli: SettingsCli,
    format: OutputFormat,
) -> Result<(), CluckError> {
    use colored::Colorize;

    let settings = match cli.command {
        SettingsCommand::Show => load_settings(records)?,
        SettingsCommand::Reminders { state } => set_reminders_enabled(records, state == Toggle::On)?,
        SettingsCommand::Currency { currency } => set_currency(records, currency)?,
        SettingsCommand::Unit { unit } => set_unit(records, unit)?,
    };
    let next = if settings.reminders_enabled {
        next_daily_reminder(&chrono::Local::now())
    } else {
        None
    };

    match format {
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "settings": settings,
            "next_reminder": next.map(|t| t.to_rfc3339()),
        }))?,
        OutputFormat::Text => {
            let reminders = if settings.reminders_enabled {
                "on".bright_green()
            } else {
                "off".bright_red()
            };
            println!("{:<10} {}", "Reminders", reminders);
            println!("{:<10} {:?} ({})", "Currency", settings.currency, settings.currency.symbol());
            println!("{:<10} {:?}", "Unit", settings.unit);
            if let Some(next) = next {
                println!(
                    "{:<10} {} \"{}\" ({})",
                    "Next",
                    next.format("%d.%m.%Y %H:%M"),
                    DAILY_REMINDER_TITLE,
                    DAILY_REMINDER_BODY
                );
            }
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "settings",
        "version": "0.1.0",
        "description": "Daily reminder toggle, display currency and egg count unit",
        "commands": [
            { "name": "settings show" },
            { "name": "settings reminders", "parameters": ["on|off"] },
            { "name": "settings currency", "parameters": ["usd|eur|uah|rub"] },
            { "name": "settings unit", "parameters": ["pieces|dozens"] }
        ],
        "storage": [schemas::SETTINGS_DATA_KEY]
    })
}
