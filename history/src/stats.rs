//! Statistics over a collection of enriched bets.
//!
//! Sums are computed on [`Fixed`] mantissas so that totals over thousands of
//! bets match an exact big-integer reference. Only single-record figures
//! (per-bet profit, percentages) use floats.

use crate::numeric::{format_float, round_to};
use shibplay_types::{
    constants::DISPLAY_DECIMALS, parse_f64, BetProfit, BetRecord, BetStatus, CurrentStreak, Fixed,
    HistoryError, Report, StreakKind, UserStatistics,
};
use tracing::{debug, warn};

/// Profit of a single bet.
///
/// Anything other than a claimed win is a full loss of the wager. Returns
/// `None` when the amounts do not parse.
pub fn calculate_bet_profit(
    amount: &str,
    status: BetStatus,
    claimed_amount: Option<&str>,
) -> Option<BetProfit> {
    let amount = parse_f64(amount)?;
    let claimed = match (status, claimed_amount) {
        (BetStatus::Won, Some(claimed)) => Some(parse_f64(claimed)?),
        _ => None,
    };

    let Some(claimed) = claimed else {
        return Some(BetProfit {
            profit: format_float(-amount, DISPLAY_DECIMALS),
            percentage: -100.0,
        });
    };

    let profit = claimed - amount;
    let percentage = if amount > 0.0 {
        round_to(profit / amount * 100.0, 2)
    } else {
        0.0
    };
    Some(BetProfit {
        profit: format_float(profit, DISPLAY_DECIMALS),
        percentage,
    })
}

/// Percentage of settled bets that were won, 2 decimals.
pub fn win_rate(won: usize, lost: usize) -> f64 {
    let settled = won + lost;
    if settled == 0 {
        return 0.0;
    }
    round_to(won as f64 / settled as f64 * 100.0, 2)
}

/// Longest win streak, longest lose streak and the streak still open.
///
/// Considers settled bets only, in ascending timestamp order. Bets whose
/// timestamp does not parse are skipped.
pub fn calculate_streaks<'a>(
    records: impl IntoIterator<Item = &'a BetRecord>,
) -> (u32, u32, CurrentStreak) {
    let mut settled: Vec<(i64, BetStatus)> = records
        .into_iter()
        .filter(|record| record.is_settled())
        .filter_map(|record| record.timestamp_secs().map(|ts| (ts, record.status)))
        .collect();
    settled.sort_by_key(|(ts, _)| *ts);

    let mut longest_win = 0u32;
    let mut longest_lose = 0u32;
    let mut current = CurrentStreak::default();
    for (_, status) in settled {
        let kind = if status == BetStatus::Won {
            StreakKind::Win
        } else {
            StreakKind::Lose
        };
        if current.kind == kind {
            current.count += 1;
        } else {
            current = CurrentStreak { kind, count: 1 };
        }
        match kind {
            StreakKind::Win => longest_win = longest_win.max(current.count),
            StreakKind::Lose => longest_lose = longest_lose.max(current.count),
            StreakKind::None => {}
        }
    }
    (longest_win, longest_lose, current)
}

fn missing_fields(record: &BetRecord) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if record.amount.trim().is_empty() {
        missing.push("amount");
    }
    if record.timestamp.trim().is_empty() {
        missing.push("timestamp");
    }
    missing
}

#[derive(Default)]
struct Totals {
    wagered: Fixed,
    winnings: Fixed,
    priced: usize,
}

fn accumulate(records: &[&BetRecord], errors: &mut Vec<HistoryError>) -> Option<Totals> {
    let mut totals = Totals::default();
    for record in records {
        let Some(amount) = record.amount_fixed() else {
            errors.push(
                HistoryError::parsing(format!("unparseable amount {:?}", record.amount))
                    .with_record(&record.id),
            );
            continue;
        };
        totals.wagered = totals.wagered.checked_add(amount)?;
        totals.priced += 1;

        if record.status != BetStatus::Won {
            continue;
        }
        let Some(claimed) = record.claimed_amount.as_deref() else {
            continue;
        };
        match Fixed::parse(claimed) {
            Ok(claimed) => totals.winnings = totals.winnings.checked_add(claimed)?,
            Err(err) => errors.push(
                HistoryError::parsing(format!("unparseable claimed amount: {err}"))
                    .with_record(&record.id),
            ),
        }
    }
    Some(totals)
}

/// Aggregate a record collection into [`UserStatistics`].
///
/// Never fails: invalid records are skipped and reported, and a failed
/// aggregation degrades to zeroed monetary fields.
pub fn calculate_user_stats(records: &[BetRecord]) -> Report<UserStatistics> {
    if records.is_empty() {
        return Report::Complete(UserStatistics::default());
    }

    let mut errors = Vec::new();
    let valid: Vec<&BetRecord> = records
        .iter()
        .filter(|record| {
            let missing = missing_fields(record);
            if missing.is_empty() {
                return true;
            }
            errors.push(
                HistoryError::validation(format!("missing {}", missing.join(", ")))
                    .with_record(&record.id),
            );
            false
        })
        .collect();

    if valid.is_empty() {
        errors.push(HistoryError::validation("no valid records to compute statistics from"));
        return Report::Partial {
            data: UserStatistics::default(),
            warnings: errors,
        };
    }

    let mut stats = UserStatistics {
        total_bets: valid.len(),
        ..Default::default()
    };
    for record in &valid {
        match record.status {
            BetStatus::Won => stats.won_bets += 1,
            BetStatus::Lost => stats.lost_bets += 1,
            BetStatus::Pending | BetStatus::Calculating => stats.unsettled_bets += 1,
        }
    }
    stats.win_rate = win_rate(stats.won_bets, stats.lost_bets);

    match accumulate(&valid, &mut errors) {
        Some(totals) => match totals.winnings.checked_sub(totals.wagered) {
            Some(net) => {
                stats.total_wagered = totals.wagered.to_decimal_string(DISPLAY_DECIMALS);
                stats.total_winnings = totals.winnings.to_decimal_string(DISPLAY_DECIMALS);
                stats.net_profit = net.to_decimal_string(DISPLAY_DECIMALS);
                stats.average_bet = totals
                    .wagered
                    .div_count(totals.priced)
                    .unwrap_or(Fixed::ZERO)
                    .to_decimal_string(DISPLAY_DECIMALS);
            }
            None => errors.push(HistoryError::calculation("net profit overflow")),
        },
        None => {
            warn!(records = valid.len(), "amount accumulation overflowed");
            errors.push(HistoryError::calculation("amount accumulation overflow"));
        }
    }

    let (longest_win, longest_lose, current) = calculate_streaks(valid.iter().copied());
    stats.longest_win_streak = longest_win;
    stats.longest_lose_streak = longest_lose;
    stats.current_streak = current;

    debug!(
        total = stats.total_bets,
        win_rate = stats.win_rate,
        errors = errors.len(),
        "computed user statistics"
    );
    Report::from_parts(stats, errors)
}
