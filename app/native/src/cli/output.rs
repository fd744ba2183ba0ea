//! CLI output formatting utilities.

use std::fmt::Write as _;

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::catalog::WallpaperRecord;
use crate::error::CaravelError;

/// Placeholder for missing values in human output.
const UNSET: &str = "-";

/// Prints a value as pretty JSON, colored when stdout is a terminal.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CaravelError> {
    let value = serde_json::to_value(value)?;
    println!("{}", highlight_json(&value, 0));
    Ok(())
}

/// Renders JSON with keys in cyan, strings in green, numbers in yellow and
/// literals in magenta. Coloring is dropped automatically when `colored`
/// detects a non-terminal.
fn highlight_json(value: &Value, depth: usize) -> String {
    let indent = "  ".repeat(depth + 1);
    let closing = "  ".repeat(depth);

    match value {
        Value::Null => "null".magenta().to_string(),
        Value::Bool(b) => b.to_string().magenta().to_string(),
        Value::Number(n) => n.to_string().yellow().to_string(),
        Value::String(_) => value.to_string().green().to_string(),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Array(items) => {
            let mut out = String::from("[\n");
            for (i, item) in items.iter().enumerate() {
                let comma = if i + 1 < items.len() { "," } else { "" };
                let _ = writeln!(out, "{indent}{}{comma}", highlight_json(item, depth + 1));
            }
            out.push_str(&closing);
            out.push(']');
            out
        }
        Value::Object(map) => {
            let mut out = String::from("{\n");
            for (i, (key, item)) in map.iter().enumerate() {
                let comma = if i + 1 < map.len() { "," } else { "" };
                let key = Value::String(key.clone()).to_string();
                let _ = writeln!(
                    out,
                    "{indent}{}: {}{comma}",
                    key.cyan(),
                    highlight_json(item, depth + 1)
                );
            }
            out.push_str(&closing);
            out.push('}');
            out
        }
    }
}

/// Truncates a string to a maximum number of characters, adding an ellipsis
/// if needed. Counts characters, not bytes.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".to_string();
    }

    let kept: String = s.chars().take(max_chars - 1).collect();
    format!("{kept}…")
}

/// Formats an optional field, dimming the placeholder for missing values.
#[must_use]
pub fn optional(value: Option<&str>) -> String {
    value.map_or_else(|| UNSET.dimmed().to_string(), str::to_string)
}

/// Prints the fields of one record as aligned `label: value` lines.
pub fn print_record(record: &WallpaperRecord) {
    let source = record.source_path.display().to_string();
    let fields = [
        ("Name", record.name.as_deref()),
        ("Source", Some(source.as_str())),
        ("Filename", record.filename_light.as_deref()),
        ("Dark filename", record.filename_dark.as_deref()),
        ("Options", record.options.as_deref()),
        ("Shading", record.shade_type.as_deref()),
        ("Primary color", record.primary_color.as_deref()),
        ("Secondary color", record.secondary_color.as_deref()),
    ];

    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in fields {
        println!("{:>width$}  {}", label.bold(), optional(value));
    }
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "")]
    marker: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Filename")]
    filename: String,
    #[tabled(rename = "Dark")]
    dark: String,
    #[tabled(rename = "Options")]
    options: String,
}

/// Prints records as a table, marking the current and the next entry.
pub fn print_record_table(records: &[WallpaperRecord], current: usize) {
    let next = if records.is_empty() { 0 } else { (current + 1) % records.len() };

    let rows: Vec<RecordRow> = records
        .iter()
        .enumerate()
        .map(|(i, record)| RecordRow {
            index: i + 1,
            marker: if i == current {
                "●".green().to_string()
            } else if i == next {
                "→".cyan().to_string()
            } else {
                String::new()
            },
            name: truncate(&record.display_name(), 32),
            filename: optional(record.filename_light.as_deref().map(|f| truncate(f, 48)).as_deref()),
            dark: format_bool(record.filename_dark.is_some()),
            options: optional(record.options.as_deref()),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::new(4..5)).with(Alignment::center()))
        .to_string();

    println!("{}", format!("Wallpapers ({})", records.len()).bold());
    println!("{table}");
}

/// Formats a boolean as a colored mark.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("Adwaita", 10), "Adwaita");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("/usr/share/backgrounds/gnome", 10), "/usr/shar…");
    }

    #[test]
    fn test_truncate_multibyte_utf8() {
        assert_eq!(truncate("Été à Paris", 4), "Été…");
        assert_eq!(truncate("abc", 1), "…");
    }

    #[test]
    fn test_optional_passes_values_through() {
        assert_eq!(optional(Some("zoom")), "zoom");
        assert!(optional(None).contains(UNSET));
    }

    #[test]
    fn test_highlight_json_structure_survives() {
        colored::control::set_override(false);
        let value = serde_json::json!({ "name": "A", "dark": true, "delay": 5, "tags": [] });

        let rendered = highlight_json(&value, 0);
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, value);
    }
}
