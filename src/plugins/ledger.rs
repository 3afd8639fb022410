//! Date-keyed ledger: one DayRecord (production events + reminders) per calendar date.
//!
//! The whole `dd.MM.yyyy -> DayRecord` mapping is one blob under
//! [`schemas::MENU_DATA_KEY`]; every mutation loads it, edits one day, and
//! writes it back.

use crate::core::collection::{load_blob, save_blob};
use crate::core::error::CluckError;
use crate::core::output::{self, OutputFormat, compact_line};
use crate::core::records::RecordStore;
use crate::core::schemas;
use crate::core::time;
use crate::plugins::settings::{self, Unit};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Eggs,
    Hens,
}

impl EventType {
    pub fn title(&self) -> &'static str {
        match self {
            EventType::Eggs => "Eggs",
            EventType::Hens => "Hens",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub count: u32,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(kind: EventType, count: u32) -> Self {
        Self {
            id: time::new_event_id(),
            kind,
            count,
            created_at: Utc::now(),
        }
    }
}

/// A dated reminder note ("vaccinate the pullets", "collect feed order").
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DayRecord {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub reminders: Vec<Notification>,
}

impl DayRecord {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.reminders.is_empty()
    }

    pub fn event(&self, kind: EventType) -> Option<&Event> {
        self.events.iter().find(|e| e.kind == kind)
    }
}

type DayMap = BTreeMap<String, DayRecord>;

fn load_all(records: &dyn RecordStore) -> Result<DayMap, CluckError> {
    load_blob(records, schemas::MENU_DATA_KEY)
}

fn save_day(records: &dyn RecordStore, date: NaiveDate, day: DayRecord) -> Result<(), CluckError> {
    let mut all = load_all(records)?;
    all.insert(time::day_key(date), day);
    save_blob(records, schemas::MENU_DATA_KEY, &all)
}

fn validate_name(name: &str) -> Result<String, CluckError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CluckError::ValidationError(
            "reminder name must not be empty".into(),
        ));
    }
    Ok(trimmed.to_string())
}

/// The day's record, or an empty one if nothing was ever stored for `date`.
pub fn load_day(records: &dyn RecordStore, date: NaiveDate) -> Result<DayRecord, CluckError> {
    let mut all = load_all(records)?;
    Ok(all.remove(&time::day_key(date)).unwrap_or_default())
}

/// Record the count for `kind` on `date`.
///
/// If the day already has an event of that kind only its count changes; the
/// stored id and creation time are kept. Returns the event as stored.
pub fn upsert_event(
    records: &dyn RecordStore,
    kind: EventType,
    count: u32,
    date: NaiveDate,
) -> Result<Event, CluckError> {
    let mut day = load_day(records, date)?;
    let stored = match day.events.iter_mut().find(|e| e.kind == kind) {
        Some(existing) => {
            existing.count = count;
            existing.clone()
        }
        None => {
            let event = Event::new(kind, count);
            day.events.push(event.clone());
            event
        }
    };
    save_day(records, date, day)?;
    Ok(stored)
}

pub fn get_event(
    records: &dyn RecordStore,
    kind: EventType,
    date: NaiveDate,
) -> Result<Option<Event>, CluckError> {
    Ok(load_day(records, date)?.event(kind).cloned())
}

/// Remove the event with `id` from `date`. Unknown ids are a no-op.
pub fn remove_event(records: &dyn RecordStore, id: &str, date: NaiveDate) -> Result<bool, CluckError> {
    let mut day = load_day(records, date)?;
    let before = day.events.len();
    day.events.retain(|e| e.id != id);
    let removed = day.events.len() != before;
    if removed {
        save_day(records, date, day)?;
    }
    Ok(removed)
}

/// Append a reminder to `date`.
pub fn add_reminder(
    records: &dyn RecordStore,
    name: &str,
    at: NaiveTime,
    date: NaiveDate,
) -> Result<Notification, CluckError> {
    let reminder = Notification {
        id: time::new_event_id(),
        name: validate_name(name)?,
        date,
        time: at,
        created_at: Utc::now(),
    };
    let mut day = load_day(records, date)?;
    day.reminders.push(reminder.clone());
    save_day(records, date, day)?;
    Ok(reminder)
}

/// Partial edit of a reminder. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ReminderEdit {
    pub name: Option<String>,
    pub time: Option<NaiveTime>,
    /// Move the reminder to another day; it is appended there.
    pub date: Option<NaiveDate>,
}

/// Edit the reminder with `id` stored under `date`, keeping its id and creation time.
///
/// Without a date change the reminder keeps its position. Returns `None`
/// (and writes nothing) if no such reminder exists on `date`.
pub fn edit_reminder(
    records: &dyn RecordStore,
    id: &str,
    date: NaiveDate,
    edit: ReminderEdit,
) -> Result<Option<Notification>, CluckError> {
    let mut all = load_all(records)?;
    let key = time::day_key(date);
    let Some(day) = all.get_mut(&key) else {
        return Ok(None);
    };
    let Some(pos) = day.reminders.iter().position(|r| r.id == id) else {
        return Ok(None);
    };
    let name = edit.name.as_deref().map(validate_name).transpose()?;

    {
        let reminder = &mut day.reminders[pos];
        if let Some(name) = name {
            reminder.name = name;
        }
        if let Some(at) = edit.time {
            reminder.time = at;
        }
    }
    let edited = match edit.date {
        Some(target) if target != date => {
            let mut moved = day.reminders.remove(pos);
            moved.date = target;
            all.entry(time::day_key(target))
                .or_default()
                .reminders
                .push(moved.clone());
            moved
        }
        _ => day.reminders[pos].clone(),
    };
    save_blob(records, schemas::MENU_DATA_KEY, &all)?;
    Ok(Some(edited))
}

/// Remove the reminder with `id` from `date`. Unknown ids are a no-op.
pub fn remove_reminder(
    records: &dyn RecordStore,
    id: &str,
    date: NaiveDate,
) -> Result<bool, CluckError> {
    let mut day = load_day(records, date)?;
    let before = day.reminders.len();
    day.reminders.retain(|r| r.id != id);
    let removed = day.reminders.len() != before;
    if removed {
        save_day(records, date, day)?;
    }
    Ok(removed)
}

/// Dates holding at least one event or reminder, oldest first.
pub fn active_days(records: &dyn RecordStore) -> Result<Vec<NaiveDate>, CluckError> {
    let all = load_all(records)?;
    let mut days: Vec<NaiveDate> = all
        .iter()
        .filter(|(_, day)| !day.is_empty())
        .filter_map(|(key, _)| time::parse_day_key(key))
        .collect();
    days.sort();
    Ok(days)
}

// ===== CLI =====

fn resolve_date(raw: Option<&str>) -> Result<NaiveDate, CluckError> {
    match raw {
        Some(raw) => time::parse_date_arg(raw),
        None => Ok(Local::now().date_naive()),
    }
}

#[derive(Parser, Debug)]
#[clap(name = "day", about = "Inspect the daily ledger.")]
pub struct DayCli {
    #[clap(subcommand)]
    pub command: DayCommand,
}

#[derive(Subcommand, Debug)]
pub enum DayCommand {
    /// Show events and reminders for one date.
    Show {
        /// dd.MM.yyyy or yyyy-mm-dd (defaults to today)
        #[clap(long)]
        date: Option<String>,
    },
    /// List every date that has recorded activity.
    List,
}

#[derive(Parser, Debug)]
#[clap(name = "event", about = "Record daily egg and hen counts.")]
pub struct EventCli {
    #[clap(subcommand)]
    pub command: EventCommand,
}

#[derive(Subcommand, Debug)]
pub enum EventCommand {
    /// Set the count for a kind on a date (replaces an existing count).
    Set {
        #[clap(long, value_enum)]
        kind: EventType,
        #[clap(long)]
        count: u32,
        #[clap(long)]
        date: Option<String>,
    },
    /// Remove an event by id.
    Rm {
        #[clap(long)]
        id: String,
        #[clap(long)]
        date: Option<String>,
    },
}

#[derive(Parser, Debug)]
#[clap(name = "reminder", about = "Manage dated reminders.")]
pub struct ReminderCli {
    #[clap(subcommand)]
    pub command: ReminderCommand,
}

#[derive(Subcommand, Debug)]
pub enum ReminderCommand {
    /// Add a reminder.
    Add {
        #[clap(long)]
        name: String,
        /// HH:MM
        #[clap(long)]
        time: String,
        #[clap(long)]
        date: Option<String>,
    },
    /// Rename or reschedule a reminder within its day.
    Edit {
        #[clap(long)]
        id: String,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        time: Option<String>,
        /// Day the reminder is currently stored under
        #[clap(long)]
        date: Option<String>,
        /// Move the reminder to this day
        #[clap(long)]
        move_to: Option<String>,
    },
    /// Remove a reminder by id.
    Rm {
        #[clap(long)]
        id: String,
        #[clap(long)]
        date: Option<String>,
    },
}

fn print_day(date: NaiveDate, day: &DayRecord, unit: Unit) {
    use colored::Colorize;

    println!("{}", time::day_key(date).bright_yellow().bold());
    if day.events.is_empty() {
        println!("  {}", "no counts recorded".dimmed());
    }
    for event in &day.events {
        let count = match event.kind {
            EventType::Eggs => unit.render(u64::from(event.count)),
            EventType::Hens => event.count.to_string(),
        };
        println!(
            "  {:<6} {:>10}  {}",
            event.kind.title().bright_white(),
            count.bright_green(),
            event.id.dimmed()
        );
    }
    for reminder in &day.reminders {
        println!(
            "  {} {}  {}  {}",
            "⏰".bright_cyan(),
            reminder.time.format(time::TIME_FORMAT),
            compact_line(&reminder.name, 48),
            reminder.id.dimmed()
        );
    }
}

fn report_removed(format: OutputFormat, kind: &str, id: &str, removed: bool) -> Result<(), CluckError> {
    match format {
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "id": id,
            "kind": kind,
            "removed": removed
        })),
        OutputFormat::Text => {
            if removed {
                println!("Removed {} {}", kind, id);
            } else {
                println!("No {} with id {} on that date; nothing changed.", kind, id);
            }
            Ok(())
        }
    }
}

pub fn run_day_cli(records: &dyn RecordStore, cli: DayCli, format: OutputFormat) -> Result<(), CluckError> {
    match cli.command {
        DayCommand::Show { date } => {
            let date = resolve_date(date.as_deref())?;
            let day = load_day(records, date)?;
            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({
                    "date": time::day_key(date),
                    "events": day.events,
                    "reminders": day.reminders
                }))?,
                OutputFormat::Text => print_day(date, &day, settings::load_settings(records)?.unit),
            }
        }
        DayCommand::List => {
            let days = active_days(records)?;
            let keys: Vec<String> = days.into_iter().map(time::day_key).collect();
            match format {
                OutputFormat::Json => output::print_json(&keys)?,
                OutputFormat::Text => {
                    for key in keys {
                        println!("{}", key);
                    }
                }
            }
        }
    }
    Ok(())
}

pub fn run_event_cli(records: &dyn RecordStore, cli: EventCli, format: OutputFormat) -> Result<(), CluckError> {
    match cli.command {
        EventCommand::Set { kind, count, date } => {
            let date = resolve_date(date.as_deref())?;
            let event = upsert_event(records, kind, count, date)?;
            match format {
                OutputFormat::Json => output::print_json(&event)?,
                OutputFormat::Text => println!(
                    "{} on {}: {} (id {})",
                    kind.title(),
                    time::day_key(date),
                    event.count,
                    event.id
                ),
            }
        }
        EventCommand::Rm { id, date } => {
            let date = resolve_date(date.as_deref())?;
            let removed = remove_event(records, &id, date)?;
            report_removed(format, "event", &id, removed)?;
        }
    }
    Ok(())
}

pub fn run_reminder_cli(
    records: &dyn RecordStore,
    cli: ReminderCli,
    format: OutputFormat,
) -> Result<(), CluckError> {
    match cli.command {
        ReminderCommand::Add { name, time: at, date } => {
            let date = resolve_date(date.as_deref())?;
            let at = time::parse_time_arg(&at)?;
            let reminder = add_reminder(records, &name, at, date)?;
            match format {
                OutputFormat::Json => output::print_json(&reminder)?,
                OutputFormat::Text => println!("Reminder added (ID: {})", reminder.id),
            }
        }
        ReminderCommand::Edit {
            id,
            name,
            time: at,
            date,
            move_to,
        } => {
            let date = resolve_date(date.as_deref())?;
            let edit = ReminderEdit {
                name,
                time: at.as_deref().map(time::parse_time_arg).transpose()?,
                date: move_to.as_deref().map(time::parse_date_arg).transpose()?,
            };
            let edited = edit_reminder(records, &id, date, edit)?;
            match (format, edited) {
                (OutputFormat::Json, edited) => output::print_json(&edited)?,
                (OutputFormat::Text, Some(r)) => println!(
                    "Reminder {} now '{}' at {}",
                    r.id,
                    r.name,
                    r.time.format(time::TIME_FORMAT)
                ),
                (OutputFormat::Text, None) => {
                    println!("No reminder with id {} on that date; nothing changed.", id)
                }
            }
        }
        ReminderCommand::Rm { id, date } => {
            let date = resolve_date(date.as_deref())?;
            let removed = remove_reminder(records, &id, date)?;
            report_removed(format, "reminder", &id, removed)?;
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "ledger",
        "version": "0.1.0",
        "description": "Per-day egg/hen counts and reminders keyed by dd.MM.yyyy",
        "commands": [
            { "name": "day show", "parameters": ["date"] },
            { "name": "day list" },
            { "name": "event set", "parameters": ["kind", "count", "date"] },
            { "name": "event rm", "parameters": ["id", "date"] },
            { "name": "reminder add", "parameters": ["name", "time", "date"] },
            { "name": "reminder edit", "parameters": ["id", "name", "time", "date", "move_to"] },
            { "name": "reminder rm", "parameters": ["id", "date"] }
        ],
        "storage": [schemas::MENU_DATA_KEY]
    })
}
