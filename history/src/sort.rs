//! Stable ordering of enriched records.

use shibplay_types::{BetRecord, SortDirection, SortField, SortState};
use std::cmp::Ordering;

fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Numeric round ids come first in numeric order, then the rest by string.
fn round_key(round_id: &str) -> (bool, u64, &str) {
    match round_id.trim().parse::<u64>() {
        Ok(round) => (false, round, ""),
        Err(_) => (true, 0, round_id),
    }
}

/// Ascending comparison on a single field.
///
/// Unparseable dates and amounts sort as the smallest value; missing profit
/// counts as zero.
pub fn compare_by(field: SortField, a: &BetRecord, b: &BetRecord) -> Ordering {
    match field {
        SortField::Date => a
            .timestamp_secs()
            .unwrap_or(i64::MIN)
            .cmp(&b.timestamp_secs().unwrap_or(i64::MIN)),
        SortField::Amount => compare_f64(
            a.amount_f64().unwrap_or(f64::MIN),
            b.amount_f64().unwrap_or(f64::MIN),
        ),
        SortField::Round => round_key(&a.round_id).cmp(&round_key(&b.round_id)),
        SortField::Profit => {
            compare_f64(a.profit_f64().unwrap_or(0.0), b.profit_f64().unwrap_or(0.0))
        }
    }
}

/// Sort in place; ties keep their relative order.
pub fn sort_records(records: &mut [BetRecord], sort: &SortState) {
    records.sort_by(|a, b| {
        let ordering = compare_by(sort.field, a, b);
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Sorted copy.
pub fn sorted(records: &[BetRecord], sort: &SortState) -> Vec<BetRecord> {
    let mut records = records.to_vec();
    sort_records(&mut records, sort);
    records
}
