//! Filtering over enriched records.
//!
//! Every filter is a pure function over a slice; [`apply_filters`] composes
//! them as a conjunction in a fixed order: outcome, round status, bet type,
//! date range, amount range, search.

use crate::sort::sort_records;
use shibplay_types::{
    AmountRange, BetRecord, BetTypeFilter, DateRange, FilterState, OutcomeFilter, RoundStatusFilter,
    SortState,
};
use tracing::debug;

fn retain(records: &[BetRecord], keep: impl Fn(&BetRecord) -> bool) -> Vec<BetRecord> {
    records.iter().filter(|&record| keep(record)).cloned().collect()
}

pub fn filter_by_outcome(records: &[BetRecord], outcome: OutcomeFilter) -> Vec<BetRecord> {
    retain(records, |record| outcome.matches(record.status))
}

pub fn filter_by_round_status(records: &[BetRecord], status: RoundStatusFilter) -> Vec<BetRecord> {
    retain(records, |record| status.matches(record.status))
}

pub fn filter_by_bet_type(records: &[BetRecord], bet_type: BetTypeFilter) -> Vec<BetRecord> {
    retain(records, |record| bet_type.matches(record.bet_type))
}

fn in_date_range(record: &BetRecord, bounds: Option<(i64, i64)>) -> bool {
    let Some((start, end)) = bounds else {
        return true;
    };
    // Unparseable timestamps never match an active range.
    record
        .timestamp_secs()
        .is_some_and(|ts| ts >= start && ts <= end)
}

/// Keep records inside the range, evaluated relative to `now` (unix seconds).
pub fn filter_by_date_range(records: &[BetRecord], range: &DateRange, now: i64) -> Vec<BetRecord> {
    let bounds = range.bounds(now);
    retain(records, |record| in_date_range(record, bounds))
}

fn in_amount_range(record: &BetRecord, range: &AmountRange) -> bool {
    if range.is_empty() {
        return true;
    }
    record
        .amount_f64()
        .is_some_and(|amount| range.contains(amount))
}

pub fn filter_by_amount_range(records: &[BetRecord], range: &AmountRange) -> Vec<BetRecord> {
    retain(records, |record| in_amount_range(record, range))
}

/// Per-character lowercase mapping shared by search and highlighting.
fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

fn matches_term(record: &BetRecord, term: &str) -> bool {
    fold_case(&record.round_id).contains(term) || fold_case(&record.transaction_hash).contains(term)
}

/// Keep records whose round id or transaction hash contains `term`
/// (case-insensitive) and tag them for highlighting. A blank term keeps
/// everything untagged.
pub fn filter_by_search(records: &[BetRecord], term: &str) -> Vec<BetRecord> {
    let term = fold_case(term.trim());
    if term.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| matches_term(record, &term))
        .map(|record| BetRecord {
            matches_search: true,
            is_highlighted: true,
            ..record.clone()
        })
        .collect()
}

/// Apply every active filter in order.
pub fn apply_filters(records: &[BetRecord], filters: &FilterState, now: i64) -> Vec<BetRecord> {
    let date_bounds = filters.date_range.bounds(now);
    let narrowed: Vec<BetRecord> = records
        .iter()
        .filter(|record| filters.outcome.matches(record.status))
        .filter(|record| filters.round_status.matches(record.status))
        .filter(|record| filters.bet_type.matches(record.bet_type))
        .filter(|record| in_date_range(record, date_bounds))
        .filter(|record| in_amount_range(record, &filters.amount_range))
        .cloned()
        .collect();
    let filtered = filter_by_search(&narrowed, &filters.search);
    debug!(
        input = records.len(),
        output = filtered.len(),
        "applied filters"
    );
    filtered
}

/// Filter, then order.
pub fn apply_filters_and_sort(
    records: &[BetRecord],
    filters: &FilterState,
    sort: &SortState,
    now: i64,
) -> Vec<BetRecord> {
    let mut filtered = apply_filters(records, filters, now);
    sort_records(&mut filtered, sort);
    filtered
}

/// Whether any filter other than round status differs from its default.
pub fn has_active_filters(filters: &FilterState) -> bool {
    get_active_filter_count(filters) > 0
}

/// Number of non-default filters, round status excluded.
pub fn get_active_filter_count(filters: &FilterState) -> usize {
    [
        filters.outcome != OutcomeFilter::All,
        filters.bet_type != BetTypeFilter::All,
        filters.date_range != DateRange::default(),
        !filters.amount_range.is_empty(),
        !filters.search.trim().is_empty(),
    ]
    .into_iter()
    .filter(|active| *active)
    .count()
}

/// Split `text` into `(segment, matched)` pieces around case-insensitive
/// occurrences of `term`, using the same case folding as [`filter_by_search`].
pub fn highlight_segments(text: &str, term: &str) -> Vec<(String, bool)> {
    let needle = fold_case(term.trim());
    if needle.is_empty() || text.is_empty() {
        return vec![(text.to_string(), false)];
    }

    // Folding may change byte lengths; `origin` maps each folded byte back to
    // the start of the character it came from.
    let mut haystack = String::with_capacity(text.len());
    let mut origin = Vec::with_capacity(text.len());
    for (offset, c) in text.char_indices() {
        for lower in c.to_lowercase() {
            haystack.push(lower);
            origin.extend(std::iter::repeat(offset).take(lower.len_utf8()));
        }
    }
    let char_end = |start: usize| start + text[start..].chars().next().map_or(0, char::len_utf8);

    let mut segments = Vec::new();
    let mut cursor = 0;
    let mut folded_cursor = 0;
    while let Some(offset) = haystack[folded_cursor..].find(&needle) {
        let folded_start = folded_cursor + offset;
        let start = origin[folded_start].max(cursor);
        let end = char_end(origin[folded_start + needle.len() - 1]);
        if start > cursor {
            segments.push((text[cursor..start].to_string(), false));
        }
        segments.push((text[start..end].to_string(), true));
        cursor = end;
        folded_cursor = origin.partition_point(|&o| o < end);
    }
    if cursor < text.len() {
        segments.push((text[cursor..].to_string(), false));
    }
    segments
}
