//! CSV export of already-fetched report rows.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::ReportPeriod;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv output is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// The exportable reports, each with a fixed column set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Financial,
    Appointments,
    Clients,
    Professionals,
    Audit,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::Financial,
        ReportKind::Appointments,
        ReportKind::Clients,
        ReportKind::Professionals,
        ReportKind::Audit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Financial => "financial",
            ReportKind::Appointments => "appointments",
            ReportKind::Clients => "clients",
            ReportKind::Professionals => "professionals",
            ReportKind::Audit => "audit",
        }
    }

    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            ReportKind::Financial => &["date", "total_income", "total_expenses", "net_result"],
            ReportKind::Appointments => &[
                "appointment_id",
                "date",
                "status",
                "client_name",
                "professional_name",
            ],
            ReportKind::Clients => &["client_id", "full_name", "created_at"],
            ReportKind::Professionals => &["professional_id", "full_name", "total_appointments_in_period"],
            ReportKind::Audit => &["action_type", "actor_email", "target_email", "created_at", "metadata"],
        }
    }

    /// The audit export covers the full log, not a period.
    pub fn has_period(&self) -> bool {
        !matches!(self, ReportKind::Audit)
    }
}

impl core::str::FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown report: {s}"))
    }
}

/// Header line plus one line per record, `\n`-separated, no trailing newline.
///
/// Each record is looked up by header name: strings verbatim, numbers and
/// booleans as JSON text, null or absent as empty, objects and arrays as
/// compact JSON. Fields are quoted only when they need it.
pub fn to_csv<R: Serialize>(records: &[R], headers: &[&str]) -> Result<String, ExportError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for record in records {
        let value = serde_json::to_value(record)?;
        let row: Vec<String> = headers.iter().map(|h| cell(value.get(h))).collect();
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(std::io::Error::other(e.to_string())))?;
    let mut text = String::from_utf8(bytes)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `parallax_{report}_{period}_{date}.csv`; the period is omitted for reports without one.
pub fn export_filename(report: ReportKind, period: ReportPeriod, date: NaiveDate) -> String {
    let date = date.format("%Y-%m-%d");
    if report.has_period() {
        format!("parallax_{}_{}_{}.csv", report.as_str(), period.as_str(), date)
    } else {
        format!("parallax_{}_{}.csv", report.as_str(), date)
    }
}

/// Write `csv` to `dir/filename`, creating `dir` if needed.
pub fn save_csv(dir: &Path, filename: &str, csv: &str) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, csv)?;
    tracing::info!(path = %path.display(), "report exported");
    Ok(path)
}
