// CSV and JSON export of table rows

use crate::models::{ChartPoint, Event, Task, User};
use crate::record::Record;
use chrono::{DateTime, SecondsFormat, Utc};
use eyre::{Context, Result};
use serde::Serialize;

/// Export file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!("unknown export format: {} (expected csv or json)", s)),
        }
    }
}

/// Records that can be written as CSV rows
pub trait CsvRow {
    fn csv_header() -> &'static [&'static str];
    fn csv_row(&self) -> Vec<String>;
}

/// Quote a field if it contains a delimiter, quote or line break
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| csv_escape(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Header row followed by one newline-terminated line per record
pub fn to_csv<'a, T, I>(records: I) -> String
where
    T: CsvRow + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut out = csv_line(T::csv_header());
    for record in records {
        out.push_str(&csv_line(record.csv_row().as_slice()));
    }
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a, T> {
    collection: &'a str,
    export_date: String,
    data: Vec<&'a T>,
}

/// Pretty JSON document wrapping the exported records
pub fn to_json<'a, T, I>(records: I, exported_at: DateTime<Utc>) -> Result<String>
where
    T: Record,
    I: IntoIterator<Item = &'a T>,
{
    let export = JsonExport {
        collection: T::storage_key(),
        export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        data: records.into_iter().collect(),
    };
    serde_json::to_string_pretty(&export).context("Failed to serialize export")
}

/// Default download name, e.g. `users.csv` or `chart-data.json`
pub fn file_name<T: Record>(format: ExportFormat) -> String {
    format!("{}.{}", T::export_stem(), format.extension())
}

impl CsvRow for User {
    fn csv_header() -> &'static [&'static str] {
        &["Name", "Email", "Phone", "Role", "Status", "Last Login", "Orders", "Location", "Join Date"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.role.clone(),
            self.status.to_string(),
            self.last_login.to_string(),
            self.orders.to_string(),
            self.location.clone(),
            self.join_date.to_string(),
        ]
    }
}

impl CsvRow for ChartPoint {
    fn csv_header() -> &'static [&'static str] {
        &["Label", "Value", "Color"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![self.label.clone(), self.value.to_string(), self.color.clone().unwrap_or_default()]
    }
}

impl CsvRow for Event {
    fn csv_header() -> &'static [&'static str] {
        &["Title", "Date", "Time", "Location", "Type"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.date.to_string(),
            self.time.clone(),
            self.location.clone().unwrap_or_default(),
            self.kind.to_string(),
        ]
    }
}

impl CsvRow for Task {
    fn csv_header() -> &'static [&'static str] {
        &["Title", "Description", "Assignee", "Due Date", "Priority", "Tags", "Column"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.description.clone(),
            self.assignee.clone(),
            self.due_date.map(|d| d.to_string()).unwrap_or_default(),
            self.priority.to_string(),
            self.tags.join(", "),
            self.column.to_string(),
        ]
    }
}
