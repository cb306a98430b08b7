//! Filter and sort state for the betting history view.

use crate::bet::{BetStatus, BetType};
use crate::constants::SECONDS_PER_DAY;
use serde::{Deserialize, Serialize};

/// Filter on personal outcome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeFilter {
    #[default]
    All,
    Won,
    Lost,
    Pending,
    Calculating,
}

impl OutcomeFilter {
    pub const VALUES: [Self; 5] = [
        Self::All,
        Self::Won,
        Self::Lost,
        Self::Pending,
        Self::Calculating,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Pending => "pending",
            Self::Calculating => "calculating",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::VALUES
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(value))
    }

    pub fn matches(self, status: BetStatus) -> bool {
        match self {
            Self::All => true,
            Self::Won => status == BetStatus::Won,
            Self::Lost => status == BetStatus::Lost,
            Self::Pending => status == BetStatus::Pending,
            Self::Calculating => status == BetStatus::Calculating,
        }
    }
}

/// Filter on wager side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetTypeFilter {
    #[default]
    All,
    Bull,
    Bear,
}

impl BetTypeFilter {
    pub const VALUES: [Self; 3] = [Self::All, Self::Bull, Self::Bear];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Bull => "bull",
            Self::Bear => "bear",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::VALUES
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(value))
    }

    pub fn matches(self, bet_type: BetType) -> bool {
        match self {
            Self::All => true,
            Self::Bull => bet_type == BetType::Bull,
            Self::Bear => bet_type == BetType::Bear,
        }
    }
}

/// Round lifecycle view layered over the outcome filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatusFilter {
    #[default]
    All,
    /// Pending bets.
    Live,
    /// Won or lost bets.
    Ended,
    Calculating,
}

impl RoundStatusFilter {
    pub const VALUES: [Self; 4] = [Self::All, Self::Live, Self::Ended, Self::Calculating];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Live => "live",
            Self::Ended => "ended",
            Self::Calculating => "calculating",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::VALUES
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(value))
    }

    pub fn matches(self, status: BetStatus) -> bool {
        match self {
            Self::All => true,
            Self::Live => status == BetStatus::Pending,
            Self::Ended => status.is_settled(),
            Self::Calculating => status == BetStatus::Calculating,
        }
    }
}

/// Date window preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatePreset {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "custom")]
    Custom,
}

impl DatePreset {
    pub const VALUES: [Self; 5] = [
        Self::All,
        Self::Last7Days,
        Self::Last30Days,
        Self::Last90Days,
        Self::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
            Self::Custom => "custom",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::VALUES
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(value))
    }

    pub fn days(self) -> Option<i64> {
        match self {
            Self::Last7Days => Some(7),
            Self::Last30Days => Some(30),
            Self::Last90Days => Some(90),
            Self::All | Self::Custom => None,
        }
    }

    /// Window length in seconds for the rolling presets.
    pub fn window_secs(self) -> Option<i64> {
        self.days().map(|days| days * SECONDS_PER_DAY)
    }
}

/// Date range selection. Bounds are unix seconds and only meaningful for
/// [`DatePreset::Custom`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub preset: DatePreset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

impl DateRange {
    pub fn preset(preset: DatePreset) -> Self {
        Self {
            preset,
            start: None,
            end: None,
        }
    }

    pub fn custom(start: Option<i64>, end: Option<i64>) -> Self {
        Self {
            preset: DatePreset::Custom,
            start,
            end,
        }
    }

    /// Inclusive `[start, end]` bounds relative to `now`, or `None` for no-op.
    pub fn bounds(&self, now: i64) -> Option<(i64, i64)> {
        match self.preset {
            DatePreset::All => None,
            DatePreset::Custom => {
                if self.start.is_none() && self.end.is_none() {
                    return None;
                }
                Some((self.start.unwrap_or(i64::MIN), self.end.unwrap_or(i64::MAX)))
            }
            preset => preset
                .window_secs()
                .map(|window| (now.saturating_sub(window), now)),
        }
    }
}

/// Inclusive wager amount bounds (in whole tokens).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl AmountRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, amount: f64) -> bool {
        self.min.map_or(true, |min| amount >= min) && self.max.map_or(true, |max| amount <= max)
    }
}

/// Complete filter selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub outcome: OutcomeFilter,
    pub bet_type: BetTypeFilter,
    pub round_status: RoundStatusFilter,
    pub date_range: DateRange,
    pub amount_range: AmountRange,
    pub search: String,
}

/// Field the history is ordered by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Date,
    Amount,
    Round,
    Profit,
}

impl SortField {
    pub const VALUES: [Self; 4] = [Self::Date, Self::Amount, Self::Round, Self::Profit];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Round => "round",
            Self::Profit => "profit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::VALUES
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(value))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Ordering of the history view. Defaults to newest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}
