//! Export formats for captured entries
//!
//! - Json: pretty-printed array of entries (re-importable)
//! - Csv: `timestamp,level,category,message,data`, one row per entry
//! - Txt: `[ISO timestamp] [LEVEL][category] message`, one line per entry

use super::error::{LoggerError, Result};
use super::log_entry::LogEntry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const CSV_HEADER: &str = "timestamp,level,category,message,data";

/// Export format requested on the `export-logs` channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Txt,
}

impl ExportFormat {
    /// Render entries in this format
    pub fn export(&self, entries: &[Arc<LogEntry>]) -> Result<String> {
        match self {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(entries)?),
            ExportFormat::Csv => Ok(export_csv(entries)),
            ExportFormat::Txt => Ok(export_txt(entries)),
        }
    }

    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Txt => "txt",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "txt" | "text" => Ok(ExportFormat::Txt),
            _ => Err(LoggerError::UnknownExportFormat(s.to_string())),
        }
    }
}

/// Parse a JSON export back into entries
pub fn import_json(json: &str) -> Result<Vec<LogEntry>> {
    Ok(serde_json::from_str(json)?)
}

fn export_csv(entries: &[Arc<LogEntry>]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for entry in entries {
        let data = entry
            .data
            .as_ref()
            .map(|payload| payload.to_json_value().to_string())
            .unwrap_or_default();

        let row = [
            entry.iso_timestamp(),
            entry.level.as_lowercase().to_string(),
            entry.category.clone().unwrap_or_default(),
            entry.message.clone(),
            data,
        ];

        out.push_str(
            &row.iter()
                .map(|cell| quote_csv_cell(cell))
                .collect::<Vec<_>>()
                .join(","),
        );
        out.push('\n');
    }

    out
}

/// Quote a CSV cell when it contains a separator, quote or line break
fn quote_csv_cell(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') || cell.contains('\r') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// One entry as a plain text line
pub fn format_text_line(entry: &LogEntry) -> String {
    match entry.category {
        Some(ref category) => format!(
            "[{}] [{}][{}] {}",
            entry.iso_timestamp(),
            entry.level.to_str(),
            category,
            entry.message
        ),
        None => format!(
            "[{}] [{}] {}",
            entry.iso_timestamp(),
            entry.level.to_str(),
            entry.message
        ),
    }
}

fn export_txt(entries: &[Arc<LogEntry>]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format_text_line(entry));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, LogPayload};

    fn fixed(entry: LogEntry) -> Arc<LogEntry> {
        let mut entry = entry;
        entry.timestamp = 1_700_000_000_123;
        Arc::new(entry)
    }

    #[test]
    fn test_json_roundtrip() {
        let entries = vec![
            fixed(LogEntry::new(LogLevel::Info, "started").with_category("App")),
            fixed(LogEntry::new(LogLevel::Error, "failed").with_data(LogPayload::Text("x".into()))),
        ];

        let json = ExportFormat::Json.export(&entries).unwrap();
        assert!(json.starts_with("[\n"));

        let imported = import_json(&json).unwrap();
        assert_eq!(imported.len(), 2);
        for (original, back) in entries.iter().zip(&imported) {
            assert_eq!(original.id, back.id);
            assert_eq!(original.level, back.level);
            assert_eq!(original.message, back.message);
        }
    }

    #[test]
    fn test_csv_format() {
        let entries = vec![fixed(
            LogEntry::new(LogLevel::Warn, "slow, retrying \"now\"")
                .with_category("Net")
                .with_data(LogPayload::Structured(serde_json::json!({"ms": 900}))),
        )];

        let csv = ExportFormat::Csv.export(&entries).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "2023-11-14T22:13:20.123Z,warn,Net,\"slow, retrying \"\"now\"\"\",\"{\"\"ms\"\":900}\""
        );
    }

    #[test]
    fn test_csv_without_category_or_data() {
        let entries = vec![fixed(LogEntry::new(LogLevel::Info, "plain"))];
        let csv = ExportFormat::Csv.export(&entries).unwrap();
        assert_eq!(csv.lines().nth(1), Some("2023-11-14T22:13:20.123Z,info,,plain,"));
    }

    #[test]
    fn test_txt_format() {
        let entries = vec![
            fixed(LogEntry::new(LogLevel::Error, "db down").with_category("Storage")),
            fixed(LogEntry::new(LogLevel::Info, "no category")),
        ];

        let txt = ExportFormat::Txt.export(&entries).unwrap();
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "[2023-11-14T22:13:20.123Z] [ERROR][Storage] db down");
        assert_eq!(lines[1], "[2023-11-14T22:13:20.123Z] [INFO] no category");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
        assert!(matches!(
            "xml".parse::<ExportFormat>(),
            Err(LoggerError::UnknownExportFormat(_))
        ));
    }

    #[test]
    fn test_empty_export() {
        assert_eq!(ExportFormat::Json.export(&[]).unwrap(), "[]");
        assert_eq!(ExportFormat::Csv.export(&[]).unwrap(), format!("{}\n", CSV_HEADER));
        assert_eq!(ExportFormat::Txt.export(&[]).unwrap(), "");
    }
}
