//! Outcome resolution for a single bet.
//!
//! Rules, first match wins:
//!
//! 1. A claim by the bettor for the round proves a win.
//! 2. No end-round snapshot: the round is still running (`pending`).
//! 3. End snapshot without a lock snapshot: `calculating` until indexing catches up.
//! 4. Close vs lock price decides: up favors bull, down favors bear, a tie
//!    favors neither side.
//! 5. Prices that do not parse: `calculating`.
//!
//! Resolution never fails.

use shibplay_types::{
    compare_decimal_strings, BetStatus, BetType, RawBet, RawClaim, RawEndRound, RawLockRound,
};
use std::cmp::Ordering;
use tracing::debug;

/// Derived outcome fields of one bet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub status: BetStatus,
    pub lock_price: Option<String>,
    pub close_price: Option<String>,
    pub claimed_amount: Option<String>,
}

/// Case-insensitive address comparison.
pub fn addresses_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Find the claim made by `sender` for `round_id`, if any.
pub fn find_claim<'a>(
    claims: &'a [RawClaim],
    round_id: &str,
    sender: &str,
) -> Option<&'a RawClaim> {
    claims
        .iter()
        .find(|claim| claim.round_id == round_id && addresses_match(&claim.sender, sender))
}

/// Resolve a raw bet against the full claim list and its round snapshots.
pub fn resolve_bet(
    bet: &RawBet,
    bet_type: BetType,
    claims: &[RawClaim],
    lock: Option<&RawLockRound>,
    end: Option<&RawEndRound>,
) -> Resolution {
    let claim = find_claim(claims, &bet.round_id, &bet.sender);
    resolve_outcome(bet_type, claim, lock, end)
}

/// Resolve with the claim already looked up.
pub fn resolve_outcome(
    bet_type: BetType,
    claim: Option<&RawClaim>,
    lock: Option<&RawLockRound>,
    end: Option<&RawEndRound>,
) -> Resolution {
    let lock_price = lock.map(|lock| lock.lock_price.clone());
    let close_price = end.map(|end| end.close_price.clone());

    if let Some(claim) = claim {
        return Resolution {
            status: BetStatus::Won,
            lock_price,
            close_price,
            claimed_amount: Some(claim.amount.clone()),
        };
    }

    let status = match (lock, end) {
        (_, None) => BetStatus::Pending,
        (None, Some(_)) => BetStatus::Calculating,
        (Some(lock), Some(end)) => price_outcome(bet_type, &lock.lock_price, &end.close_price),
    };

    Resolution {
        status,
        lock_price,
        close_price,
        claimed_amount: None,
    }
}

/// Compare close against lock for the given side.
///
/// A tie is a loss for both sides; refunds on ties are handled by the
/// contract and surface here as a claim.
pub fn price_outcome(bet_type: BetType, lock_price: &str, close_price: &str) -> BetStatus {
    let Some(direction) = compare_decimal_strings(close_price, lock_price) else {
        debug!(lock_price, close_price, "unparseable round prices");
        return BetStatus::Calculating;
    };
    let won = match (bet_type, direction) {
        (BetType::Bull, Ordering::Greater) => true,
        (BetType::Bear, Ordering::Less) => true,
        _ => false,
    };
    if won {
        BetStatus::Won
    } else {
        BetStatus::Lost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bet(round_id: &str, sender: &str) -> RawBet {
        RawBet {
            id: "bet".to_string(),
            amount: "1".to_string(),
            log_index: "0".to_string(),
            round_id: round_id.to_string(),
            sender: sender.to_string(),
            timestamp: "1700000000".to_string(),
            transaction_hash: "0xbet".to_string(),
        }
    }

    fn claim(round_id: &str, sender: &str, amount: &str) -> RawClaim {
        RawClaim {
            id: "claim".to_string(),
            amount: amount.to_string(),
            round_id: round_id.to_string(),
            sender: sender.to_string(),
            timestamp: "1700000400".to_string(),
            transaction_hash: "0xclaim".to_string(),
            log_index: "0".to_string(),
        }
    }

    fn lock(price: &str) -> RawLockRound {
        RawLockRound {
            round_id: "1".to_string(),
            lock_price: price.to_string(),
            timestamp: "1700000100".to_string(),
            ..Default::default()
        }
    }

    fn end(price: &str) -> RawEndRound {
        RawEndRound {
            round_id: "1".to_string(),
            close_price: price.to_string(),
            timestamp: "1700000400".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_matrix() {
        let cases: [(BetType, Option<&str>, Option<&str>, BetStatus); 9] = [
            (BetType::Bull, None, None, BetStatus::Pending),
            (BetType::Bull, Some("100"), None, BetStatus::Pending),
            (BetType::Bear, None, Some("100"), BetStatus::Calculating),
            (BetType::Bull, Some("100"), Some("101"), BetStatus::Won),
            (BetType::Bull, Some("100"), Some("99"), BetStatus::Lost),
            (BetType::Bear, Some("100"), Some("99"), BetStatus::Won),
            (BetType::Bear, Some("100"), Some("101"), BetStatus::Lost),
            (BetType::Bull, Some("100"), Some("100.0"), BetStatus::Lost),
            (BetType::Bear, Some("100"), Some("100"), BetStatus::Lost),
        ];
        for (bet_type, lock_price, close_price, expected) in cases {
            let lock = lock_price.map(lock);
            let end = close_price.map(end);
            let resolution = resolve_outcome(bet_type, None, lock.as_ref(), end.as_ref());
            assert_eq!(
                resolution.status, expected,
                "{bet_type:?} lock={lock_price:?} close={close_price:?}"
            );
            assert_eq!(resolution.claimed_amount, None);
        }
    }

    #[test]
    fn test_claim_wins_regardless_of_prices() {
        let claims = vec![claim("1", "0xUSER", "1.9")];
        let lock = lock("100");
        let end = end("50");
        let resolution = resolve_bet(
            &bet("1", "0xuser"),
            BetType::Bull,
            &claims,
            Some(&lock),
            Some(&end),
        );
        assert_eq!(resolution.status, BetStatus::Won);
        assert_eq!(resolution.claimed_amount.as_deref(), Some("1.9"));
        assert_eq!(resolution.lock_price.as_deref(), Some("100"));
        assert_eq!(resolution.close_price.as_deref(), Some("50"));

        // Claim with no price data at all.
        let resolution = resolve_bet(&bet("1", "0xuser"), BetType::Bear, &claims, None, None);
        assert_eq!(resolution.status, BetStatus::Won);
    }

    #[test]
    fn test_claim_must_match_round_and_sender() {
        let claims = vec![claim("2", "0xuser", "1"), claim("1", "0xother", "1")];
        assert!(find_claim(&claims, "1", "0xuser").is_none());
        assert!(find_claim(&claims, "2", "0XUSER").is_some());
    }

    #[test]
    fn test_unparseable_prices_degrade_to_calculating() {
        let lock = lock("n/a");
        let end = end("101");
        let resolution = resolve_outcome(BetType::Bull, None, Some(&lock), Some(&end));
        assert_eq!(resolution.status, BetStatus::Calculating);
        assert_eq!(
            price_outcome(BetType::Bear, "1", ""),
            BetStatus::Calculating
        );
    }

    #[test]
    fn test_prices_compare_as_decimals_not_strings() {
        // "9.5" > "10" lexicographically, but not numerically.
        assert_eq!(price_outcome(BetType::Bull, "9.5", "10"), BetStatus::Won);
        assert_eq!(price_outcome(BetType::Bear, "9.5", "10"), BetStatus::Lost);
    }
}
