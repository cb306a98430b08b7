//! Self-correcting validation of filter and sort state.
//!
//! Validation never rejects: every invalid field is replaced with a legal
//! value and the replacement is reported as a [`Violation`]. Feeding a
//! sanitized state back through validation always reports it as valid.

use serde_json::{Map, Value};
use shibplay_types::constants::{FORBIDDEN_SEARCH_CHARS, MAX_SEARCH_LENGTH};
use shibplay_types::{
    AmountRange, BetTypeFilter, DatePreset, DateRange, FilterState, OutcomeFilter,
    RoundStatusFilter, SortDirection, SortField, SortState, Violation,
};

#[derive(Clone, Debug, PartialEq)]
pub struct FilterValidation {
    pub is_valid: bool,
    pub errors: Vec<Violation>,
    pub sanitized: FilterState,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SortValidation {
    pub is_valid: bool,
    pub errors: Vec<Violation>,
    pub sanitized: SortState,
}

/// Strip `< > " ' &` and cap at the maximum search length (in characters).
pub fn sanitize_search(search: &str) -> String {
    search
        .chars()
        .filter(|c| !FORBIDDEN_SEARCH_CHARS.contains(c))
        .take(MAX_SEARCH_LENGTH)
        .collect()
}

fn correct_search(search: String, errors: &mut Vec<Violation>) -> String {
    let sanitized = sanitize_search(&search);
    if sanitized != search {
        errors.push(Violation::new("search", "removed forbidden characters or excess length"));
    }
    sanitized
}

fn correct_date_range(range: DateRange, errors: &mut Vec<Violation>) -> DateRange {
    match (range.preset, range.start, range.end) {
        (DatePreset::Custom, None, None) => {
            errors.push(Violation::new(
                "dateRange",
                "custom range needs a start or end; reset to all",
            ));
            DateRange::default()
        }
        (DatePreset::Custom, Some(start), Some(end)) if start > end => {
            errors.push(Violation::new("dateRange", "start was after end; swapped"));
            DateRange::custom(Some(end), Some(start))
        }
        (DatePreset::Custom, _, _) => range,
        (preset, None, None) => DateRange::preset(preset),
        (preset, _, _) => {
            errors.push(Violation::new(
                "dateRange",
                format!("bounds are ignored for preset {}; cleared", preset.as_str()),
            ));
            DateRange::preset(preset)
        }
    }
}

fn correct_amount_bound(
    bound: Option<f64>,
    name: &str,
    errors: &mut Vec<Violation>,
) -> Option<f64> {
    match bound {
        Some(value) if !value.is_finite() || value < 0.0 => {
            errors.push(Violation::new(
                format!("amountRange.{name}"),
                format!("{value} is not a non-negative amount; cleared"),
            ));
            None
        }
        other => other,
    }
}

fn correct_amount_range(range: AmountRange, errors: &mut Vec<Violation>) -> AmountRange {
    let min = correct_amount_bound(range.min, "min", errors);
    let max = correct_amount_bound(range.max, "max", errors);
    match (min, max) {
        (Some(min), Some(max)) if min > max => {
            errors.push(Violation::new("amountRange", "min was above max; swapped"));
            AmountRange::new(Some(max), Some(min))
        }
        _ => AmountRange::new(min, max),
    }
}

fn correct(filters: FilterState, errors: &mut Vec<Violation>) -> FilterState {
    FilterState {
        date_range: correct_date_range(filters.date_range, errors),
        amount_range: correct_amount_range(filters.amount_range, errors),
        search: correct_search(filters.search, errors),
        ..filters
    }
}

/// Validate an already-typed filter state.
pub fn validate_filter_state(filters: &FilterState) -> FilterValidation {
    let mut errors = Vec::new();
    let sanitized = correct(filters.clone(), &mut errors);
    FilterValidation {
        is_valid: errors.is_empty(),
        errors,
        sanitized,
    }
}

fn enum_field<T: Default>(
    object: &Map<String, Value>,
    key: &str,
    parse: fn(&str) -> Option<T>,
    errors: &mut Vec<Violation>,
) -> T {
    match object.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(Value::String(raw)) => parse(raw).unwrap_or_else(|| {
            errors.push(Violation::new(key, format!("unknown value {raw:?}; reset")));
            T::default()
        }),
        Some(other) => {
            errors.push(Violation::new(key, format!("expected a string, got {other}")));
            T::default()
        }
    }
}

fn number_field<T>(
    object: &Map<String, Value>,
    key: &str,
    field: &str,
    read: fn(&Value) -> Option<T>,
    errors: &mut Vec<Violation>,
) -> Option<T> {
    match object.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => read(value).or_else(|| {
            errors.push(Violation::new(
                format!("{field}.{key}"),
                format!("{value} is not a number; cleared"),
            ));
            None
        }),
    }
}

fn read_secs(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn read_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => shibplay_types::parse_f64(s),
        _ => None,
    }
}

fn object_field<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    errors: &mut Vec<Violation>,
) -> Option<&'a Map<String, Value>> {
    match object.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Object(inner)) => Some(inner),
        Some(other) => {
            errors.push(Violation::new(key, format!("expected an object, got {other}")));
            None
        }
    }
}

fn date_range_field(object: &Map<String, Value>, errors: &mut Vec<Violation>) -> DateRange {
    let Some(range) = object_field(object, "dateRange", errors) else {
        return DateRange::default();
    };
    let preset = match range.get("preset") {
        None | Some(Value::Null) => DatePreset::default(),
        Some(Value::String(raw)) => DatePreset::parse(raw).unwrap_or_else(|| {
            errors.push(Violation::new(
                "dateRange.preset",
                format!("unknown value {raw:?}; reset"),
            ));
            DatePreset::default()
        }),
        Some(other) => {
            errors.push(Violation::new(
                "dateRange.preset",
                format!("expected a string, got {other}"),
            ));
            DatePreset::default()
        }
    };
    DateRange {
        preset,
        start: number_field(range, "start", "dateRange", read_secs, errors),
        end: number_field(range, "end", "dateRange", read_secs, errors),
    }
}

fn amount_range_field(object: &Map<String, Value>, errors: &mut Vec<Violation>) -> AmountRange {
    let Some(range) = object_field(object, "amountRange", errors) else {
        return AmountRange::default();
    };
    AmountRange::new(
        number_field(range, "min", "amountRange", read_amount, errors),
        number_field(range, "max", "amountRange", read_amount, errors),
    )
}

fn search_field(object: &Map<String, Value>, errors: &mut Vec<Violation>) -> String {
    match object.get("search") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(search)) => search.clone(),
        Some(other) => {
            errors.push(Violation::new(
                "search",
                format!("expected a string, got {other}; emptied"),
            ));
            String::new()
        }
    }
}

/// Validate untyped filter input (e.g. persisted JSON).
pub fn validate_filters(input: &Value) -> FilterValidation {
    let mut errors = Vec::new();
    let Some(object) = input.as_object() else {
        errors.push(Violation::new("filters", "expected an object; reset to defaults"));
        return FilterValidation {
            is_valid: false,
            errors,
            sanitized: FilterState::default(),
        };
    };

    let parsed = FilterState {
        outcome: enum_field(object, "outcome", OutcomeFilter::parse, &mut errors),
        bet_type: enum_field(object, "betType", BetTypeFilter::parse, &mut errors),
        round_status: enum_field(object, "roundStatus", RoundStatusFilter::parse, &mut errors),
        date_range: date_range_field(object, &mut errors),
        amount_range: amount_range_field(object, &mut errors),
        search: search_field(object, &mut errors),
    };
    let sanitized = correct(parsed, &mut errors);
    FilterValidation {
        is_valid: errors.is_empty(),
        errors,
        sanitized,
    }
}

/// Validate untyped sort input.
pub fn validate_sort(input: &Value) -> SortValidation {
    let mut errors = Vec::new();
    let Some(object) = input.as_object() else {
        errors.push(Violation::new("sort", "expected an object; reset to defaults"));
        return SortValidation {
            is_valid: false,
            errors,
            sanitized: SortState::default(),
        };
    };
    let sanitized = SortState {
        field: enum_field(object, "field", SortField::parse, &mut errors),
        direction: enum_field(object, "direction", SortDirection::parse, &mut errors),
    };
    SortValidation {
        is_valid: errors.is_empty(),
        errors,
        sanitized,
    }
}

/// Typed sort state is legal by construction.
pub fn validate_sort_state(sort: &SortState) -> SortValidation {
    SortValidation {
        is_valid: true,
        errors: Vec::new(),
        sanitized: *sort,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_bogus_outcome_and_script_search() {
        let result = validate_filters(&json!({"outcome": "bogus", "search": "<script>"}));
        assert!(!result.is_valid);
        assert_eq!(result.sanitized.outcome, OutcomeFilter::All);
        assert_eq!(result.sanitized.search, "script");
        let fields: Vec<_> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["outcome", "search"]);
    }

    #[test]
    fn test_valid_filters_pass_untouched() {
        let input = json!({
            "outcome": "won",
            "betType": "BEAR",
            "roundStatus": "ended",
            "dateRange": {"preset": "custom", "start": 10, "end": 20},
            "amountRange": {"min": 1.5, "max": "3"},
            "search": "0xabc"
        });
        let result = validate_filters(&input);
        assert!(result.is_valid, "{:?}", result.errors);
        assert_eq!(result.sanitized.bet_type, BetTypeFilter::Bear);
        assert_eq!(
            result.sanitized.date_range,
            DateRange::custom(Some(10), Some(20))
        );
        assert_eq!(
            result.sanitized.amount_range,
            AmountRange::new(Some(1.5), Some(3.0))
        );
    }

    #[test]
    fn test_ranges_are_repaired() {
        let input = json!({
            "dateRange": {"preset": "custom", "start": 20, "end": 10},
            "amountRange": {"min": 9, "max": 2}
        });
        let result = validate_filters(&input);
        assert_eq!(
            result.sanitized.date_range,
            DateRange::custom(Some(10), Some(20))
        );
        assert_eq!(
            result.sanitized.amount_range,
            AmountRange::new(Some(2.0), Some(9.0))
        );
        assert_eq!(result.errors.len(), 2);

        let input = json!({
            "dateRange": {"preset": "custom"},
            "amountRange": {"min": -1, "max": "many"}
        });
        let result = validate_filters(&input);
        assert_eq!(result.sanitized.date_range, DateRange::default());
        assert!(result.sanitized.amount_range.is_empty());
        assert_eq!(result.errors.len(), 3);

        let input = json!({"dateRange": {"preset": "7d", "start": 1}});
        let result = validate_filters(&input);
        assert_eq!(
            result.sanitized.date_range,
            DateRange::preset(DatePreset::Last7Days)
        );
        assert!(!result.is_valid);
    }

    #[test]
    fn test_wrong_types_reset() {
        let result = validate_filters(&json!({"outcome": 3, "search": 7, "dateRange": "soon"}));
        assert_eq!(result.sanitized, FilterState::default());
        assert_eq!(result.errors.len(), 3);

        let result = validate_filters(&json!([1, 2]));
        assert!(!result.is_valid);
        assert_eq!(result.sanitized, FilterState::default());
    }

    #[test]
    fn test_search_length_cap() {
        let long = "a".repeat(150);
        assert_eq!(sanitize_search(&long).chars().count(), MAX_SEARCH_LENGTH);
        assert_eq!(sanitize_search("a&b'c\"d"), "abcd");
    }

    #[test]
    fn test_typed_validation() {
        let filters = FilterState {
            amount_range: AmountRange::new(Some(f64::NAN), None),
            search: "<b>".to_string(),
            ..Default::default()
        };
        let result = validate_filter_state(&filters);
        assert!(!result.is_valid);
        assert!(result.sanitized.amount_range.is_empty());
        assert_eq!(result.sanitized.search, "b");
    }

    #[test]
    fn test_validate_sort() {
        let result = validate_sort(&json!({"field": "profit", "direction": "ASC"}));
        assert!(result.is_valid);
        assert_eq!(
            result.sanitized,
            SortState::new(SortField::Profit, SortDirection::Asc)
        );

        let result = validate_sort(&json!({"field": "size", "direction": "up"}));
        assert!(!result.is_valid);
        assert_eq!(result.sanitized, SortState::default());
        assert_eq!(result.errors.len(), 2);

        assert!(validate_sort_state(&SortState::default()).is_valid);
    }

    fn any_enum() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            "[a-z]{0,8}".prop_map(Value::from),
            any::<i32>().prop_map(Value::from),
        ]
    }

    fn any_number() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            (-1000.0f64..1000.0).prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[0-9a-z.-]{0,6}".prop_map(Value::from),
        ]
    }

    fn any_filters() -> impl Strategy<Value = Value> {
        (
            any_enum(),
            any_enum(),
            prop_oneof![Just("all"), Just("7d"), Just("custom"), Just("never")],
            any_number(),
            any_number(),
            any_number(),
            any_number(),
            ".{0,150}",
        )
            .prop_map(|(outcome, bet_type, preset, start, end, min, max, search)| {
                json!({
                    "outcome": outcome,
                    "betType": bet_type,
                    "dateRange": {"preset": preset, "start": start, "end": end},
                    "amountRange": {"min": min, "max": max},
                    "search": search,
                })
            })
    }

    proptest! {
        #[test]
        fn test_sanitized_filters_are_a_fixed_point(input in any_filters()) {
            let first = validate_filters(&input);
            let again = validate_filters(&serde_json::to_value(&first.sanitized).unwrap());
            prop_assert!(again.is_valid, "{:?}", again.errors);
            prop_assert_eq!(again.sanitized, first.sanitized);
        }
    }
}
