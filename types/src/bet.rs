//! Raw indexer records and the enriched [`BetRecord`].

use crate::fixed::Fixed;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Accept either a JSON string or a JSON number for numeric-looking fields.
///
/// Indexers disagree on whether `BigInt` columns are quoted.
pub(crate) mod lenient_string {
    use super::*;
    use serde::de::Error;
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Null => Ok(String::new()),
            other => Err(D::Error::custom(format!("expected string or number, got {other}"))),
        }
    }
}

/// Side of a wager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetType {
    /// Price will rise by round close.
    Bull,
    /// Price will fall by round close.
    Bear,
}

impl BetType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bull => "bull",
            Self::Bear => "bear",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bull => "Bull",
            Self::Bear => "Bear",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bull" => Some(Self::Bull),
            "bear" => Some(Self::Bear),
            _ => None,
        }
    }
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a bet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    /// Round has not ended.
    Pending,
    /// Round ended but the lock price is not indexed yet.
    Calculating,
    Won,
    Lost,
}

impl BetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Calculating => "calculating",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Calculating => "Calculating",
            Self::Won => "Won",
            Self::Lost => "Lost",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "calculating" => Some(Self::Calculating),
            "won" => Some(Self::Won),
            "lost" => Some(Self::Lost),
            _ => None,
        }
    }

    /// Won or lost.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized phase of a round as reported by round metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundPhase {
    Upcoming,
    Running,
    Ended,
}

impl RoundPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Running => "running",
            Self::Ended => "ended",
        }
    }

    /// Map the indexer's free-form status string onto a phase.
    pub fn normalize(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "live" | "running" | "locked" | "started" => Self::Running,
            "ended" | "closed" | "finished" | "claimable" | "expired" => Self::Ended,
            _ => Self::Upcoming,
        }
    }
}

/// Raw bull or bear bet event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBet {
    pub id: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub amount: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub log_index: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub round_id: String,
    pub sender: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub timestamp: String,
    pub transaction_hash: String,
}

/// Raw claim event; its presence proves a win.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawClaim {
    pub id: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub amount: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub round_id: String,
    pub sender: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub timestamp: String,
    pub transaction_hash: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub log_index: String,
}

/// Price snapshot taken when a round locks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLockRound {
    pub id: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub epoch: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub lock_price: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub round_id: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub timestamp: String,
    pub transaction_hash: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub log_index: String,
}

/// Price snapshot taken when a round ends.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEndRound {
    pub id: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub epoch: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub close_price: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub round_id: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub timestamp: String,
    pub transaction_hash: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub log_index: String,
}

/// Round metadata (pool sizes, start time, status).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRound {
    pub id: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub round_id: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub price_pool: String,
    #[serde(
        rename = "startTimeStamp",
        deserialize_with = "lenient_string::deserialize"
    )]
    pub start_timestamp: String,
    pub status: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub bear_amount: String,
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub bull_amount: String,
}

/// Every raw collection the processor joins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEvents {
    pub bull_bets: Vec<RawBet>,
    pub bear_bets: Vec<RawBet>,
    pub claims: Vec<RawClaim>,
    pub lock_rounds: Vec<RawLockRound>,
    pub end_rounds: Vec<RawEndRound>,
    pub rounds: Vec<RawRound>,
}

impl RawEvents {
    pub fn total_bets(&self) -> usize {
        self.bull_bets.len() + self.bear_bets.len()
    }
}

/// Round metadata copied onto a bet during enrichment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    pub start_timestamp: Option<i64>,
    pub price_pool: String,
    pub bull_amount: String,
    pub bear_amount: String,
    pub phase: RoundPhase,
    /// `price_pool / bull_amount`, when the bull side is non-empty.
    pub bull_payout: Option<f64>,
    /// `price_pool / bear_amount`, when the bear side is non-empty.
    pub bear_payout: Option<f64>,
}

/// One user wager on one round-side, enriched with its derived outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetRecord {
    /// `<transactionHash>-<logIndex>`.
    pub id: String,
    pub round_id: String,
    pub sender: String,
    pub log_index: String,
    #[serde(rename = "type")]
    pub bet_type: BetType,
    pub amount: String,
    /// Unix seconds.
    pub timestamp: String,
    pub transaction_hash: String,

    pub status: BetStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_price: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<RoundSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_movement: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_duration: Option<i64>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub matches_search: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_highlighted: bool,
}

impl BetRecord {
    /// A pending record carrying only the wager facts.
    pub fn new(
        round_id: impl Into<String>,
        bet_type: BetType,
        amount: impl Into<String>,
        timestamp: impl Into<String>,
        transaction_hash: impl Into<String>,
        log_index: impl Into<String>,
    ) -> Self {
        let transaction_hash = transaction_hash.into();
        let log_index = log_index.into();
        Self {
            id: record_id(&transaction_hash, &log_index),
            round_id: round_id.into(),
            sender: String::new(),
            log_index,
            bet_type,
            amount: amount.into(),
            timestamp: timestamp.into(),
            transaction_hash,
            status: BetStatus::Pending,
            claimed_amount: None,
            profit: None,
            profit_percentage: None,
            lock_price: None,
            close_price: None,
            round: None,
            price_movement: None,
            round_duration: None,
            matches_search: false,
            is_highlighted: false,
        }
    }

    pub fn timestamp_secs(&self) -> Option<i64> {
        parse_timestamp(&self.timestamp)
    }

    pub fn amount_fixed(&self) -> Option<Fixed> {
        Fixed::parse(&self.amount).ok()
    }

    pub fn amount_f64(&self) -> Option<f64> {
        parse_f64(&self.amount)
    }

    pub fn profit_f64(&self) -> Option<f64> {
        self.profit.as_deref().and_then(parse_f64)
    }

    pub fn is_settled(&self) -> bool {
        self.status.is_settled()
    }
}

/// Globally unique record id derived from the emitting log.
pub fn record_id(transaction_hash: &str, log_index: &str) -> String {
    format!("{transaction_hash}-{log_index}")
}

/// Parse a unix-seconds timestamp string.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

/// Parse a finite float.
pub fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
