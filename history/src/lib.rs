//! Betting history pipeline.
//!
//! Raw indexer collections are joined into [`BetRecord`](shibplay_types::BetRecord)s
//! by [`process_bets`], narrowed and ordered by [`apply_filters_and_sort`],
//! summarized by [`calculate_user_stats`] and serialized by [`export()`].
//! [`HistoryView`] ties these together with persisted filter state.
//!
//! Everything except [`store`] is pure and synchronous.

pub mod export;
pub mod filter;
pub mod numeric;
pub mod outcome;
pub mod processor;
pub mod sort;
pub mod stats;
pub mod store;
pub mod validation;
pub mod view;

pub use export::{export, export_filename, to_csv, to_export_data, to_json, ExportError};
pub use filter::{
    apply_filters, apply_filters_and_sort, filter_by_amount_range, filter_by_bet_type,
    filter_by_date_range, filter_by_outcome, filter_by_round_status, filter_by_search,
    get_active_filter_count, has_active_filters, highlight_segments,
};
pub use outcome::{resolve_bet, resolve_outcome, Resolution};
pub use processor::{process_bets, process_snapshot_json, ProcessingConfig, ProcessingSummary};
pub use sort::{sort_records, sorted};
pub use stats::{calculate_bet_profit, calculate_streaks, calculate_user_stats, win_rate};
pub use store::{FileStore, InMemoryStore, KeyValueStore, StoreError};
pub use validation::{
    sanitize_search, validate_filter_state, validate_filters, validate_sort, validate_sort_state,
    FilterValidation, SortValidation,
};
pub use view::{
    load_persisted, save_persisted, HistoryView, LoadedState, PersistedState, SearchDebouncer,
};
