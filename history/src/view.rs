//! Stateful history view: persisted filter/sort state, debounced search and
//! infinite-scroll pagination over a processed record collection.

use crate::filter::{apply_filters_and_sort, has_active_filters};
use crate::stats::calculate_user_stats;
use crate::store::{KeyValueStore, StoreError};
use crate::validation::{validate_filter_state, validate_filters, validate_sort};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shibplay_types::constants::{DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_DEBOUNCE_MS, FILTER_STORAGE_KEY};
use shibplay_types::{BetRecord, FilterState, HistoryError, Report, SortState, UserStatistics};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Blob stored under [`FILTER_STORAGE_KEY`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub filters: FilterState,
    pub sort: SortState,
    /// Unix milliseconds at save.
    pub timestamp: i64,
}

/// State recovered from the store plus anything corrected on the way.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadedState {
    pub filters: FilterState,
    pub sort: SortState,
    pub warnings: Vec<HistoryError>,
}

pub fn save_persisted<S: KeyValueStore>(
    store: &mut S,
    filters: &FilterState,
    sort: &SortState,
) -> Result<(), StoreError> {
    let state = PersistedState {
        filters: filters.clone(),
        sort: *sort,
        timestamp: Utc::now().timestamp_millis(),
    };
    store.set(FILTER_STORAGE_KEY, &serde_json::to_string(&state)?)
}

/// Load persisted state, auto-correcting and rewriting anything invalid.
///
/// Unreadable blobs are removed and defaults returned.
pub fn load_persisted<S: KeyValueStore>(store: &mut S) -> Result<LoadedState, StoreError> {
    let Some(raw) = store.get(FILTER_STORAGE_KEY)? else {
        return Ok(LoadedState::default());
    };
    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(%err, "discarding unreadable persisted filters");
            store.remove(FILTER_STORAGE_KEY)?;
            return Ok(LoadedState {
                warnings: vec![HistoryError::parsing(format!(
                    "persisted filters were unreadable: {err}"
                ))],
                ..Default::default()
            });
        }
    };

    let filters = validate_filters(value.get("filters").unwrap_or(&Value::Null));
    let sort = validate_sort(value.get("sort").unwrap_or(&Value::Null));
    let warnings: Vec<HistoryError> = filters
        .errors
        .into_iter()
        .chain(sort.errors)
        .map(HistoryError::from)
        .collect();
    if !warnings.is_empty() {
        warn!(
            violations = warnings.len(),
            "corrected invalid persisted filters"
        );
        save_persisted(store, &filters.sanitized, &sort.sanitized)?;
    }
    Ok(LoadedState {
        filters: filters.sanitized,
        sort: sort.sanitized,
        warnings,
    })
}

/// Trailing-edge debouncer for search input, driven by caller-supplied
/// instants.
#[derive(Clone, Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS))
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record new input; restarts the quiet period.
    pub fn input(&mut self, text: impl Into<String>, at: Instant) {
        self.pending = Some((text.into(), at));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Latest input once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|(_, at)| now.saturating_duration_since(*at) >= self.delay);
        if ready {
            self.pending.take().map(|(text, _)| text)
        } else {
            None
        }
    }

    /// Drop pending input.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Filtered, sorted and paginated view over processed records.
///
/// Every filter or sort change is validated, persisted and resets
/// pagination.
pub struct HistoryView<S: KeyValueStore> {
    store: S,
    records: Vec<BetRecord>,
    filters: FilterState,
    sort: SortState,
    page_size: usize,
    visible_count: usize,
    debouncer: SearchDebouncer,
    warnings: Vec<HistoryError>,
}

impl<S: KeyValueStore> HistoryView<S> {
    /// Open a view, restoring persisted filter/sort state from `store`.
    pub fn open(
        mut store: S,
        records: Vec<BetRecord>,
        page_size: usize,
        debounce: Duration,
    ) -> Result<Self, StoreError> {
        let loaded = load_persisted(&mut store)?;
        let page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        Ok(Self {
            store,
            records,
            filters: loaded.filters,
            sort: loaded.sort,
            page_size,
            visible_count: page_size,
            debouncer: SearchDebouncer::new(debounce),
            warnings: loaded.warnings,
        })
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn records(&self) -> &[BetRecord] {
        &self.records
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn warnings(&self) -> &[HistoryError] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<HistoryError> {
        std::mem::take(&mut self.warnings)
    }

    /// Replace the underlying records (e.g. after a refresh).
    pub fn set_records(&mut self, records: Vec<BetRecord>) {
        self.records = records;
        self.reset();
    }

    pub fn set_filters(&mut self, filters: FilterState) -> Result<(), StoreError> {
        let validation = validate_filter_state(&filters);
        if !validation.is_valid {
            warn!(
                violations = validation.errors.len(),
                "corrected filter input"
            );
        }
        self.warnings.extend(validation.errors.into_iter().map(HistoryError::from));
        self.filters = validation.sanitized;
        self.persist()
    }

    pub fn set_sort(&mut self, sort: SortState) -> Result<(), StoreError> {
        self.sort = sort;
        self.persist()
    }

    /// Restore default filters, keeping the current sort.
    pub fn reset_filters(&mut self) -> Result<(), StoreError> {
        self.debouncer.cancel();
        self.filters = FilterState::default();
        self.persist()
    }

    pub fn input_search(&mut self, text: impl Into<String>, at: Instant) {
        self.debouncer.input(text, at);
    }

    /// Apply debounced search input if its quiet period has elapsed.
    /// Returns whether the filters changed.
    pub fn poll_search(&mut self, now: Instant) -> Result<bool, StoreError> {
        let Some(search) = self.debouncer.poll(now) else {
            return Ok(false);
        };
        debug!(%search, "applying search");
        let filters = FilterState {
            search,
            ..self.filters.clone()
        };
        self.set_filters(filters)?;
        Ok(true)
    }

    pub fn is_filtered(&self) -> bool {
        has_active_filters(&self.filters)
    }

    /// All records matching the current filters, in sort order.
    pub fn results(&self, now: i64) -> Vec<BetRecord> {
        apply_filters_and_sort(&self.records, &self.filters, &self.sort, now)
    }

    /// The currently revealed page prefix.
    pub fn visible(&self, now: i64) -> Vec<BetRecord> {
        let mut results = self.results(now);
        results.truncate(self.visible_count);
        results
    }

    pub fn has_more(&self, now: i64) -> bool {
        self.results(now).len() > self.visible_count
    }

    /// Reveal another page. Returns `false` when everything is visible.
    pub fn load_more(&mut self, now: i64) -> bool {
        if !self.has_more(now) {
            return false;
        }
        self.visible_count = self.visible_count.saturating_add(self.page_size);
        true
    }

    /// Back to the first page.
    pub fn reset(&mut self) {
        self.visible_count = self.page_size;
    }

    /// Statistics over the filtered records.
    pub fn statistics(&self, now: i64) -> Report<UserStatistics> {
        calculate_user_stats(&self.results(now))
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        self.reset();
        save_persisted(&mut self.store, &self.filters, &self.sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use shibplay_types::{BetStatus, BetType, ErrorKind, OutcomeFilter, SortDirection, SortField};

    const NOW: i64 = 1_700_100_000;

    fn records(count: usize) -> Vec<BetRecord> {
        (0..count)
            .map(|i| {
                let mut record = BetRecord::new(
                    i.to_string(),
                    BetType::Bull,
                    "10",
                    (NOW - i as i64).to_string(),
                    format!("0x{i:04}"),
                    "0",
                );
                record.status = if i % 2 == 0 {
                    BetStatus::Won
                } else {
                    BetStatus::Lost
                };
                record.claimed_amount = (i % 2 == 0).then(|| "20".to_string());
                record
            })
            .collect()
    }

    fn view(store: InMemoryStore, count: usize) -> HistoryView<InMemoryStore> {
        HistoryView::open(store, records(count), 5, Duration::from_millis(300)).unwrap()
    }

    fn persisted(store: &InMemoryStore) -> Value {
        serde_json::from_str(&store.get(FILTER_STORAGE_KEY).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn test_debouncer() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::default();
        debouncer.input("0x", start);
        assert_eq!(debouncer.poll(start + Duration::from_millis(100)), None);
        debouncer.input("0xab", start + Duration::from_millis(200));
        assert_eq!(debouncer.poll(start + Duration::from_millis(400)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(500)).as_deref(),
            Some("0xab")
        );
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_load_defaults_when_empty() {
        let mut store = InMemoryStore::new();
        let loaded = load_persisted(&mut store).unwrap();
        assert_eq!(loaded, LoadedState::default());
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_corrects_and_rewrites() {
        let mut store = InMemoryStore::new();
        store
            .set(
                FILTER_STORAGE_KEY,
                r#"{"filters":{"outcome":"bogus","betType":"bear","search":"<x>"},"sort":{"field":"amount","direction":"sideways"},"timestamp":1}"#,
            )
            .unwrap();
        let loaded = load_persisted(&mut store).unwrap();
        assert_eq!(loaded.filters.outcome, OutcomeFilter::All);
        assert_eq!(loaded.filters.bet_type, shibplay_types::BetTypeFilter::Bear);
        assert_eq!(loaded.filters.search, "x");
        assert_eq!(
            loaded.sort,
            SortState::new(SortField::Amount, SortDirection::Desc)
        );
        assert_eq!(loaded.warnings.len(), 3);
        assert!(loaded
            .warnings
            .iter()
            .all(|w| w.kind == ErrorKind::Validation));

        let rewritten = persisted(&store);
        assert_eq!(rewritten["filters"]["outcome"], "all");
        assert_eq!(rewritten["filters"]["search"], "x");
        assert_eq!(rewritten["sort"]["direction"], "desc");

        // A second load is clean.
        assert!(load_persisted(&mut store).unwrap().warnings.is_empty());
    }

    #[test]
    fn test_load_discards_unreadable() {
        let mut store = InMemoryStore::new();
        store.set(FILTER_STORAGE_KEY, "{not json").unwrap();
        let loaded = load_persisted(&mut store).unwrap();
        assert_eq!(loaded.filters, FilterState::default());
        assert_eq!(loaded.warnings[0].kind, ErrorKind::Parsing);
        assert!(store.is_empty());
    }

    #[test]
    fn test_filter_changes_persist_and_reset_pagination() {
        let mut view = view(InMemoryStore::new(), 12);
        assert_eq!(view.visible(NOW).len(), 5);
        assert!(view.load_more(NOW));
        assert_eq!(view.visible(NOW).len(), 10);

        view.set_filters(FilterState {
            outcome: OutcomeFilter::Won,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(view.visible(NOW).len(), 5);
        assert_eq!(view.results(NOW).len(), 6);
        assert!(view.is_filtered());
        assert_eq!(persisted(view.store())["filters"]["outcome"], "won");

        view.set_sort(SortState::new(SortField::Date, SortDirection::Asc)).unwrap();
        let reopened = HistoryView::open(
            InMemoryStore::clone(view.store()),
            records(12),
            5,
            Duration::from_millis(300),
        )
        .unwrap();
        assert_eq!(reopened.filters().outcome, OutcomeFilter::Won);
        assert_eq!(reopened.sort().direction, SortDirection::Asc);
        assert!(reopened.warnings().is_empty());
    }

    #[test]
    fn test_pagination_runs_out() {
        let mut view = view(InMemoryStore::new(), 12);
        assert!(view.has_more(NOW));
        assert!(view.load_more(NOW));
        assert!(view.load_more(NOW));
        assert_eq!(view.visible(NOW).len(), 12);
        assert!(!view.has_more(NOW));
        assert!(!view.load_more(NOW));
        view.reset();
        assert_eq!(view.visible(NOW).len(), 5);
    }

    #[test]
    fn test_refreshed_records_restart_pagination() {
        let mut view = view(InMemoryStore::new(), 12);
        assert!(view.load_more(NOW));
        assert_eq!(view.visible(NOW).len(), 10);

        view.set_records(records(3));
        assert_eq!(view.records().len(), 3);
        assert_eq!(view.visible(NOW).len(), 3);
        assert!(!view.has_more(NOW));

        view.set_records(records(12));
        assert_eq!(view.visible(NOW).len(), 5);
        assert!(view.has_more(NOW));
    }

    #[test]
    fn test_debounced_search_applies_once_quiet() {
        let mut view = view(InMemoryStore::new(), 12);
        let start = Instant::now();
        view.input_search("<0x0011>", start);
        assert!(!view.poll_search(start + Duration::from_millis(10)).unwrap());
        assert_eq!(view.results(NOW).len(), 12);

        assert!(view.poll_search(start + Duration::from_millis(300)).unwrap());
        assert_eq!(view.filters().search, "0x0011");
        let results = view.results(NOW);
        assert_eq!(results.len(), 1);
        assert!(results[0].is_highlighted);
        assert_eq!(view.take_warnings().len(), 1);
        assert!(view.warnings().is_empty());
    }

    #[test]
    fn test_reset_filters_keeps_sort() {
        let mut view = view(InMemoryStore::new(), 4);
        view.set_sort(SortState::new(SortField::Round, SortDirection::Asc)).unwrap();
        view.set_filters(FilterState {
            outcome: OutcomeFilter::Lost,
            ..Default::default()
        })
        .unwrap();
        view.input_search("0x", Instant::now());
        view.reset_filters().unwrap();
        assert_eq!(view.filters(), &FilterState::default());
        assert_eq!(view.sort().field, SortField::Round);
        assert!(!view.is_filtered());
        assert!(!view.poll_search(Instant::now() + Duration::from_secs(1)).unwrap());
    }

    #[test]
    fn test_statistics_follow_filters() {
        let mut view = view(InMemoryStore::new(), 4);
        let all = view.statistics(NOW);
        assert_eq!(all.data().unwrap().total_bets, 4);

        view.set_filters(FilterState {
            outcome: OutcomeFilter::Lost,
            ..Default::default()
        })
        .unwrap();
        let stats = view.statistics(NOW);
        let stats = stats.data().unwrap();
        assert_eq!(stats.total_bets, 2);
        assert_eq!(stats.win_rate, 0.0);
    }
}
