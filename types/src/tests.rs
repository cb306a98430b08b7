use super::*;
use crate::constants::FIXED_SCALE;
use proptest::prelude::*;

#[test]
fn test_raw_events_accept_numbers_and_missing_fields() {
    let json = r#"{
        "bullBets": [{
            "id": "b1",
            "amount": 1.5,
            "logIndex": 3,
            "roundId": "42",
            "sender": "0xAbC",
            "timestamp": 1700000000,
            "transactionHash": "0xdead"
        }],
        "bearBets": [{ "id": "b2", "roundId": "43" }],
        "rounds": [{ "roundId": 42, "startTimeStamp": "1699999700", "status": "Live" }]
    }"#;
    let events: RawEvents = serde_json::from_str(json).unwrap();
    assert_eq!(events.total_bets(), 2);

    let bull = &events.bull_bets[0];
    assert_eq!(bull.amount, "1.5");
    assert_eq!(bull.log_index, "3");
    assert_eq!(bull.timestamp, "1700000000");

    let bear = &events.bear_bets[0];
    assert_eq!(bear.amount, "");
    assert_eq!(bear.sender, "");

    assert!(events.claims.is_empty());
    assert_eq!(events.rounds[0].start_timestamp, "1699999700");
    assert_eq!(
        RoundPhase::normalize(&events.rounds[0].status),
        RoundPhase::Running
    );
}

#[test]
fn test_raw_events_reject_wrong_shape() {
    assert!(serde_json::from_str::<RawEvents>(r#"{"bullBets": 5}"#).is_err());
    assert!(serde_json::from_str::<RawEvents>(r#"[1, 2]"#).is_err());
}

#[test]
fn test_round_phase_normalize() {
    assert_eq!(RoundPhase::normalize("ENDED"), RoundPhase::Ended);
    assert_eq!(RoundPhase::normalize(" claimable "), RoundPhase::Ended);
    assert_eq!(RoundPhase::normalize("locked"), RoundPhase::Running);
    assert_eq!(RoundPhase::normalize("whatever"), RoundPhase::Upcoming);
    assert_eq!(RoundPhase::normalize(""), RoundPhase::Upcoming);
}

#[test]
fn test_enum_parsing_is_lenient() {
    assert_eq!(BetType::parse(" BULL "), Some(BetType::Bull));
    assert_eq!(BetStatus::parse("Won"), Some(BetStatus::Won));
    assert_eq!(
        OutcomeFilter::parse("CALCULATING"),
        Some(OutcomeFilter::Calculating)
    );
    assert_eq!(DatePreset::parse("30D"), Some(DatePreset::Last30Days));
    assert_eq!(SortField::parse("profit"), Some(SortField::Profit));
    assert_eq!(SortDirection::parse("up"), None);
    assert_eq!(ExportFormat::parse("Csv"), Some(ExportFormat::Csv));
    assert_eq!(OutcomeFilter::parse("bogus"), None);
}

#[test]
fn test_round_status_filter_groups() {
    assert!(RoundStatusFilter::Live.matches(BetStatus::Pending));
    assert!(!RoundStatusFilter::Live.matches(BetStatus::Calculating));
    assert!(RoundStatusFilter::Ended.matches(BetStatus::Won));
    assert!(RoundStatusFilter::Ended.matches(BetStatus::Lost));
    assert!(!RoundStatusFilter::Ended.matches(BetStatus::Pending));
    assert!(RoundStatusFilter::Calculating.matches(BetStatus::Calculating));
    assert!(RoundStatusFilter::All.matches(BetStatus::Lost));
}

#[test]
fn test_date_range_bounds() {
    let now = 10_000_000;
    assert_eq!(DateRange::default().bounds(now), None);
    assert_eq!(
        DateRange::preset(DatePreset::Last7Days).bounds(now),
        Some((now - 7 * 86_400, now))
    );
    assert_eq!(DateRange::custom(None, None).bounds(now), None);
    assert_eq!(
        DateRange::custom(Some(5), None).bounds(now),
        Some((5, i64::MAX))
    );
}

#[test]
fn test_filter_state_serde_shape() {
    let state = FilterState {
        outcome: OutcomeFilter::Won,
        date_range: DateRange::preset(DatePreset::Last90Days),
        ..Default::default()
    };
    let value = serde_json::to_value(&state).unwrap();
    assert_eq!(value["outcome"], "won");
    assert_eq!(value["betType"], "all");
    assert_eq!(value["roundStatus"], "all");
    assert_eq!(value["dateRange"]["preset"], "90d");
    assert_eq!(value["search"], "");

    let back: FilterState = serde_json::from_value(value).unwrap();
    assert_eq!(back, state);
}

#[test]
fn test_bet_record_serde_skips_empty_fields() {
    let record = BetRecord::new("7", BetType::Bear, "2", "1700000000", "0xabc", "1");
    assert_eq!(record.id, "0xabc-1");
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["type"], "bear");
    assert_eq!(value["status"], "pending");
    assert!(value.get("profit").is_none());
    assert!(value.get("matchesSearch").is_none());
}

#[test]
fn test_history_error_serializes_kind_as_type() {
    let err = HistoryError::parsing("bad amount").with_record("0xabc-1");
    assert!(!err.retryable);
    let value = serde_json::to_value(&err).unwrap();
    assert_eq!(value["type"], "parsing");
    assert_eq!(value["recordId"], "0xabc-1");
    assert_eq!(err.to_string(), "parsing error (0xabc-1): bad amount");

    assert!(HistoryError::network("down").retryable);
    assert!(!HistoryError::unknown("?").retryable);
}

#[test]
fn test_report_helpers() {
    let complete: Report<Vec<u8>> = Report::from_parts(vec![1], vec![]);
    assert!(complete.is_complete());
    assert!(complete.warnings().is_empty());

    let partial = Report::from_parts(vec![1], vec![HistoryError::parsing("x")]);
    assert_eq!(partial.warnings().len(), 1);
    assert_eq!(partial.clone().map(|v| v.len()).data(), Some(&1));

    let failed: Report<Vec<u8>> = Report::Failed(HistoryError::parsing("shape"));
    let (data, errors) = failed.into_parts();
    assert!(data.is_empty());
    assert_eq!(errors.len(), 1);
}

proptest! {
    #[test]
    fn prop_fixed_parse_matches_components(int in 0u64..1_000_000_000, frac in 0u64..1_000_000) {
        let text = format!("{int}.{frac:06}");
        let parsed = Fixed::parse(&text).unwrap();
        let expected = int as i128 * FIXED_SCALE + frac as i128 * 1_000_000_000_000;
        prop_assert_eq!(parsed.raw(), expected);
        prop_assert_eq!(Fixed::parse(&parsed.to_decimal_string(6)).unwrap(), parsed);
    }
}
