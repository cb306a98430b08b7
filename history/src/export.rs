//! CSV/JSON export of processed records.

use chrono::{DateTime, NaiveDate, SecondsFormat};
use shibplay_types::constants::{CSV_HEADERS, EXPORT_FILENAME_PREFIX};
use shibplay_types::{BetRecord, ExportData, ExportFormat};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize export: {0}")]
    Json(#[from] serde_json::Error),
}

/// ISO-8601 UTC rendering of a unix-seconds string; passed through verbatim
/// if it does not parse.
pub fn iso_timestamp(timestamp: &str) -> String {
    timestamp
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| timestamp.to_string())
}

pub fn to_export_data(record: &BetRecord) -> ExportData {
    ExportData {
        round_number: record.round_id.clone(),
        bet_type: record.bet_type.label().to_string(),
        bet_amount: record.amount.clone(),
        timestamp: iso_timestamp(&record.timestamp),
        outcome: record.status.label().to_string(),
        profit_loss: record.profit.clone().unwrap_or_else(|| "0".to_string()),
        transaction_hash: record.transaction_hash.clone(),
        lock_price: record.lock_price.clone(),
        close_price: record.close_price.clone(),
        claimed_amount: record.claimed_amount.clone(),
    }
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn csv_row<'a>(cells: impl IntoIterator<Item = &'a str>) -> String {
    cells.into_iter().map(quote).collect::<Vec<_>>().join(",")
}

/// Header row plus one fully quoted row per record, newline-joined.
pub fn to_csv(records: &[BetRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADERS.join(","));
    for record in records {
        let data = to_export_data(record);
        lines.push(csv_row(data.cells()));
    }
    lines.join("\n")
}

/// Pretty-printed array of [`ExportData`].
pub fn to_json(records: &[BetRecord]) -> Result<String, ExportError> {
    let data: Vec<ExportData> = records.iter().map(to_export_data).collect();
    Ok(serde_json::to_string_pretty(&data)?)
}

/// `shibplay_betting_history[_filtered]_YYYY-MM-DD.<ext>`
pub fn export_filename(format: ExportFormat, filtered: bool, date: NaiveDate) -> String {
    let suffix = if filtered { "_filtered" } else { "" };
    format!(
        "{EXPORT_FILENAME_PREFIX}{suffix}_{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

pub fn export(records: &[BetRecord], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => Ok(to_csv(records)),
        ExportFormat::Json => to_json(records),
    }
}
