use serde::{Deserialize, Serialize};
use std::fmt;

/// Flattened, human-labeled projection of a bet for CSV/JSON output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub round_number: String,
    /// `Bull` or `Bear`.
    pub bet_type: String,
    pub bet_amount: String,
    /// ISO-8601 UTC timestamp.
    pub timestamp: String,
    /// `Won`, `Lost`, `Pending` or `Calculating`.
    pub outcome: String,
    pub profit_loss: String,
    pub transaction_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_amount: Option<String>,
}

impl ExportData {
    /// Cells in CSV header order.
    pub fn cells(&self) -> [&str; 10] {
        [
            &self.round_number,
            &self.bet_type,
            &self.bet_amount,
            &self.timestamp,
            &self.outcome,
            &self.profit_loss,
            &self.transaction_hash,
            self.lock_price.as_deref().unwrap_or(""),
            self.close_price.as_deref().unwrap_or(""),
            self.claimed_amount.as_deref().unwrap_or(""),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
