//! Output rendering helpers for CLI surfaces.
//!
//! Keeps text output bounded and readable; JSON output is printed pretty.

use crate::core::error::CluckError;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_config(raw: &str) -> Self {
        if raw == "json" {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CluckError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
