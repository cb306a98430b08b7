//! Record processor: joins raw indexer collections into enriched bets.
//!
//! The raw streams (bull bets, bear bets, claims, lock rounds, end rounds,
//! round metadata) are independent; rounds and claims are matched to bets by
//! `roundId` (and sender, for claims) with no referential guarantee. One bad
//! record never aborts the batch: it is reported as a `parsing` error and
//! processing continues.

use crate::numeric::round_to;
use crate::outcome::{addresses_match, resolve_outcome};
use crate::stats::calculate_bet_profit;
use serde::{Deserialize, Serialize};
use shibplay_types::{
    parse_timestamp, record_id, BetRecord, BetStatus, BetType, Fixed, HistoryError, RawBet,
    RawClaim, RawEndRound, RawEvents, RawLockRound, RawRound, Report, RoundPhase, RoundSummary,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Optional enrichments applied while processing. All enabled by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub include_round_metadata: bool,
    pub include_price_movement: bool,
    pub include_round_duration: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            include_round_metadata: true,
            include_price_movement: true,
            include_round_duration: true,
        }
    }
}

/// Status counts over a processed collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub total: usize,
    pub won: usize,
    pub lost: usize,
    pub pending: usize,
    pub calculating: usize,
    pub errors: usize,
}

impl ProcessingSummary {
    pub fn from_records(records: &[BetRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Default::default()
        };
        for record in records {
            match record.status {
                BetStatus::Won => summary.won += 1,
                BetStatus::Lost => summary.lost += 1,
                BetStatus::Pending => summary.pending += 1,
                BetStatus::Calculating => summary.calculating += 1,
            }
        }
        summary
    }

    /// Counts over a processing report, including its warnings.
    pub fn from_report(report: &Report<Vec<BetRecord>>) -> Self {
        match report {
            Report::Failed(_) => Self {
                errors: 1,
                ..Default::default()
            },
            _ => Self {
                errors: report.warnings().len(),
                ..Self::from_records(report.data().map(Vec::as_slice).unwrap_or_default())
            },
        }
    }
}

/// Lookup tables over the round-level streams, keyed by `roundId`.
struct RoundIndex<'a> {
    locks: HashMap<&'a str, &'a RawLockRound>,
    ends: HashMap<&'a str, &'a RawEndRound>,
    rounds: HashMap<&'a str, &'a RawRound>,
    claims: HashMap<(&'a str, String), &'a RawClaim>,
}

impl<'a> RoundIndex<'a> {
    fn build(events: &'a RawEvents, user_address: &str) -> Self {
        let mut locks = HashMap::new();
        for lock in &events.lock_rounds {
            locks.entry(lock.round_id.as_str()).or_insert(lock);
        }
        let mut ends = HashMap::new();
        for end in &events.end_rounds {
            ends.entry(end.round_id.as_str()).or_insert(end);
        }
        let mut rounds = HashMap::new();
        for round in &events.rounds {
            rounds.entry(round.round_id.as_str()).or_insert(round);
        }
        let mut claims = HashMap::new();
        for claim in events
            .claims
            .iter()
            .filter(|claim| addresses_match(&claim.sender, user_address))
        {
            claims
                .entry((claim.round_id.as_str(), claim.sender.trim().to_ascii_lowercase()))
                .or_insert(claim);
        }
        Self {
            locks,
            ends,
            rounds,
            claims,
        }
    }

    fn claim(&self, round_id: &str, sender: &str) -> Option<&'a RawClaim> {
        self.claims
            .get(&(round_id, sender.trim().to_ascii_lowercase()))
            .copied()
    }
}

/// Process every bet placed by `user_address` into enriched records.
///
/// Output is ordered newest first by numeric timestamp; records with equal
/// timestamps keep their input order (bull stream before bear stream).
pub fn process_bets(
    events: &RawEvents,
    user_address: &str,
    config: &ProcessingConfig,
) -> Report<Vec<BetRecord>> {
    if user_address.trim().is_empty() {
        return Report::Failed(HistoryError::validation("user address is empty"));
    }

    let index = RoundIndex::build(events, user_address);
    let bets = events
        .bull_bets
        .iter()
        .map(|bet| (bet, BetType::Bull))
        .chain(events.bear_bets.iter().map(|bet| (bet, BetType::Bear)))
        .filter(|(bet, _)| addresses_match(&bet.sender, user_address));

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    let mut errors = Vec::new();
    for (bet, bet_type) in bets {
        let id = record_id(&bet.transaction_hash, &bet.log_index);
        if !seen.insert(id.clone()) {
            debug!(%id, "skipping duplicate bet event");
            continue;
        }
        match process_bet(bet, bet_type, id, &index, config) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(%err, "skipping bet");
                errors.push(err);
            }
        }
    }

    // Every kept record has a parsed timestamp.
    records.sort_by_key(|record| std::cmp::Reverse(record.timestamp_secs().unwrap_or(i64::MIN)));

    let summary = ProcessingSummary {
        errors: errors.len(),
        ..ProcessingSummary::from_records(&records)
    };
    info!(
        user = user_address,
        total = summary.total,
        won = summary.won,
        lost = summary.lost,
        pending = summary.pending,
        calculating = summary.calculating,
        errors = summary.errors,
        "processed betting history"
    );
    Report::from_parts(records, errors)
}

/// Deserialize a raw snapshot and process it.
///
/// A document that does not have the expected shape yields
/// [`Report::Failed`] rather than an error.
pub fn process_snapshot_json(
    json: &str,
    user_address: &str,
    config: &ProcessingConfig,
) -> Report<Vec<BetRecord>> {
    match serde_json::from_str::<RawEvents>(json) {
        Ok(events) => process_bets(&events, user_address, config),
        Err(err) => {
            warn!(%err, "raw snapshot has unexpected shape");
            Report::Failed(HistoryError::parsing(format!(
                "raw data is not structured as expected: {err}"
            )))
        }
    }
}

fn process_bet(
    bet: &RawBet,
    bet_type: BetType,
    id: String,
    index: &RoundIndex<'_>,
    config: &ProcessingConfig,
) -> Result<BetRecord, HistoryError> {
    let fail = |message: String| HistoryError::parsing(message).with_record(id.clone());

    if bet.round_id.trim().is_empty() {
        return Err(fail("missing round id".to_string()));
    }
    if parse_timestamp(&bet.timestamp).is_none() {
        return Err(fail(format!("invalid timestamp {:?}", bet.timestamp)));
    }
    let amount = Fixed::parse(&bet.amount)
        .map_err(|err| fail(format!("invalid amount {:?}: {err}", bet.amount)))?;
    if amount.is_negative() {
        return Err(fail(format!("negative amount {:?}", bet.amount)));
    }

    let lock = index.locks.get(bet.round_id.as_str()).copied();
    let end = index.ends.get(bet.round_id.as_str()).copied();
    let claim = index.claim(&bet.round_id, &bet.sender);
    let resolution = resolve_outcome(bet_type, claim, lock, end);

    let profit = match (resolution.status, &resolution.claimed_amount) {
        (BetStatus::Lost, _) | (BetStatus::Won, Some(_)) => calculate_bet_profit(
            &bet.amount,
            resolution.status,
            resolution.claimed_amount.as_deref(),
        ),
        _ => None,
    };

    let round = config
        .include_round_metadata
        .then(|| index.rounds.get(bet.round_id.as_str()).map(|round| round_summary(round)))
        .flatten();
    let price_movement = config
        .include_price_movement
        .then(|| price_movement(lock, end))
        .flatten();
    let round_duration = config
        .include_round_duration
        .then(|| round_duration(lock, end))
        .flatten();

    Ok(BetRecord {
        id,
        round_id: bet.round_id.clone(),
        sender: bet.sender.clone(),
        log_index: bet.log_index.clone(),
        bet_type,
        amount: bet.amount.clone(),
        timestamp: bet.timestamp.trim().to_string(),
        transaction_hash: bet.transaction_hash.clone(),
        status: resolution.status,
        claimed_amount: resolution.claimed_amount,
        profit: profit.as_ref().map(|p| p.profit.clone()),
        profit_percentage: profit.map(|p| p.percentage),
        lock_price: resolution.lock_price,
        close_price: resolution.close_price,
        round,
        price_movement,
        round_duration,
        matches_search: false,
        is_highlighted: false,
    })
}

/// `(close - lock) / lock * 100`, 2 decimals, when lock price is positive.
pub fn price_movement(lock: Option<&RawLockRound>, end: Option<&RawEndRound>) -> Option<f64> {
    let lock = Fixed::parse(&lock?.lock_price).ok()?;
    let close = Fixed::parse(&end?.close_price).ok()?;
    if !lock.is_positive() {
        return None;
    }
    let delta = close.checked_sub(lock)?;
    Some(round_to(delta.to_f64() / lock.to_f64() * 100.0, 2))
}

/// Seconds between lock and end snapshots.
pub fn round_duration(lock: Option<&RawLockRound>, end: Option<&RawEndRound>) -> Option<i64> {
    let locked_at = parse_timestamp(&lock?.timestamp)?;
    let ended_at = parse_timestamp(&end?.timestamp)?;
    ended_at.checked_sub(locked_at)
}

fn payout(pool: Option<Fixed>, side: &str) -> Option<f64> {
    let side = Fixed::parse(side).ok().filter(|side| side.is_positive())?;
    Some(round_to(pool?.to_f64() / side.to_f64(), 2))
}

/// Copy round metadata into its enrichment shape.
pub fn round_summary(round: &RawRound) -> RoundSummary {
    let pool = Fixed::parse(&round.price_pool).ok();
    RoundSummary {
        start_timestamp: parse_timestamp(&round.start_timestamp),
        price_pool: round.price_pool.clone(),
        bull_amount: round.bull_amount.clone(),
        bear_amount: round.bear_amount.clone(),
        phase: RoundPhase::normalize(&round.status),
        bull_payout: payout(pool, &round.bull_amount),
        bear_payout: payout(pool, &round.bear_amount),
    }
}
