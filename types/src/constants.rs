/// Number of fractional digits carried by [`crate::Fixed`].
pub const FIXED_DECIMALS: u32 = 18;

/// Scale applied to decimal amounts before integer arithmetic (1e18).
pub const FIXED_SCALE: i128 = 1_000_000_000_000_000_000;

/// Precision used when converting aggregated amounts back to strings.
pub const DISPLAY_DECIMALS: u32 = 6;

/// Maximum accepted length of a free-text search term (in characters).
pub const MAX_SEARCH_LENGTH: usize = 100;

/// Characters stripped from search input before it is used.
pub const FORBIDDEN_SEARCH_CHARS: [char; 5] = ['<', '>', '"', '\'', '&'];

/// Seconds in one day, used by the date range presets.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Storage key of the persisted filter/sort state.
pub const FILTER_STORAGE_KEY: &str = "shibplay_betting_history_filters";

/// Prefix of every export filename.
pub const EXPORT_FILENAME_PREFIX: &str = "shibplay_betting_history";

/// Header row of the CSV export.
pub const CSV_HEADERS: [&str; 10] = [
    "Round Number",
    "Bet Type",
    "Bet Amount",
    "Timestamp",
    "Outcome",
    "Profit/Loss",
    "Transaction Hash",
    "Lock Price",
    "Close Price",
    "Claimed Amount",
];

/// Default number of records revealed per page of the infinite-scroll view.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Default delay before a typed search term is committed.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
