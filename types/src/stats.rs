use serde::{Deserialize, Serialize};

/// Kind of an outcome streak.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakKind {
    Win,
    Lose,
    #[default]
    None,
}

/// The streak still open at the most recent settled bet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentStreak {
    #[serde(rename = "type")]
    pub kind: StreakKind,
    pub count: u32,
}

/// Aggregate statistics over a collection of bets.
///
/// Monetary fields are decimal strings produced by integer-scaled arithmetic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatistics {
    pub total_bets: usize,
    pub won_bets: usize,
    pub lost_bets: usize,
    /// Pending plus calculating.
    pub unsettled_bets: usize,
    pub total_wagered: String,
    pub total_winnings: String,
    pub net_profit: String,
    /// Percentage of settled bets that were won, 2 decimals.
    pub win_rate: f64,
    pub average_bet: String,
    pub longest_win_streak: u32,
    pub longest_lose_streak: u32,
    pub current_streak: CurrentStreak,
}

impl Default for UserStatistics {
    fn default() -> Self {
        Self {
            total_bets: 0,
            won_bets: 0,
            lost_bets: 0,
            unsettled_bets: 0,
            total_wagered: "0".to_string(),
            total_winnings: "0".to_string(),
            net_profit: "0".to_string(),
            win_rate: 0.0,
            average_bet: "0".to_string(),
            longest_win_streak: 0,
            longest_lose_streak: 0,
            current_streak: CurrentStreak::default(),
        }
    }
}

/// Profit of a single bet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BetProfit {
    /// Signed decimal string.
    pub profit: String,
    /// Signed percentage of the wager, 2 decimals.
    pub percentage: f64,
}
