//! Common types for the ShibPlay betting history pipeline.
//!
//! Raw indexer records come in through [`RawEvents`], are enriched into
//! [`BetRecord`]s, narrowed with [`FilterState`]/[`SortState`], and aggregated
//! into [`UserStatistics`]. Amount arithmetic goes through [`Fixed`].

pub mod bet;
pub mod constants;
pub mod error;
pub mod export;
pub mod filter;
pub mod fixed;
pub mod stats;

pub use bet::{
    parse_f64, parse_timestamp, record_id, BetRecord, BetStatus, BetType, RawBet, RawClaim,
    RawEndRound, RawEvents, RawLockRound, RawRound, RoundPhase, RoundSummary,
};
pub use error::{ErrorKind, HistoryError, Report, Violation};
pub use export::{ExportData, ExportFormat};
pub use filter::{
    AmountRange, BetTypeFilter, DatePreset, DateRange, FilterState, OutcomeFilter,
    RoundStatusFilter, SortDirection, SortField, SortState,
};
pub use fixed::{compare_decimal_strings, Fixed, FixedError};
pub use stats::{BetProfit, CurrentStreak, StreakKind, UserStatistics};

#[cfg(test)]
mod tests;
