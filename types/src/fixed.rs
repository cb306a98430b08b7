//! Fixed-point decimal arithmetic for wager amounts and prices.
//!
//! Amounts arrive from the indexer as decimal strings. Summing them as floats
//! drifts after a few hundred records, so every accumulation is done on an
//! `i128` mantissa scaled by [`FIXED_SCALE`] (1e18) and only converted back to a
//! string at the edge.

use crate::constants::{FIXED_DECIMALS, FIXED_SCALE};
use std::{cmp::Ordering, fmt, str::FromStr};
use thiserror::Error;

/// Errors produced while parsing or combining [`Fixed`] values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FixedError {
    #[error("empty decimal string")]
    Empty,
    #[error("invalid decimal string: {0:?}")]
    Invalid(String),
    #[error("decimal overflow")]
    Overflow,
}

/// Signed decimal with 18 fractional digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(i128);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(FIXED_SCALE);

    pub const fn from_raw(raw: i128) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i128 {
        self.0
    }

    pub fn from_int(value: i64) -> Self {
        Self(value as i128 * FIXED_SCALE)
    }

    /// Parse a plain decimal string (`[+-]digits[.digits]`).
    ///
    /// Fractional digits beyond 18 are floored away.
    pub fn parse(input: &str) -> Result<Self, FixedError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(FixedError::Empty);
        }

        let (negative, unsigned) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (unsigned, ""),
        };
        let invalid = || FixedError::Invalid(input.to_string());
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let mut integer: i128 = 0;
        for digit in int_part.bytes() {
            integer = integer
                .checked_mul(10)
                .and_then(|v| v.checked_add((digit - b'0') as i128))
                .ok_or(FixedError::Overflow)?;
        }

        let mut fraction: i128 = 0;
        let mut truncated = false;
        for (idx, digit) in frac_part.bytes().enumerate() {
            if idx as u32 >= FIXED_DECIMALS {
                truncated |= digit != b'0';
                continue;
            }
            fraction = fraction * 10 + (digit - b'0') as i128;
        }
        let kept = frac_part.len().min(FIXED_DECIMALS as usize) as u32;
        fraction *= 10i128.pow(FIXED_DECIMALS - kept);

        let magnitude = integer
            .checked_mul(FIXED_SCALE)
            .and_then(|v| v.checked_add(fraction))
            .ok_or(FixedError::Overflow)?;

        if negative {
            // Floor, not truncate: -0.1e-18 becomes -1e-18.
            let value = -magnitude;
            Ok(Self(if truncated { value - 1 } else { value }))
        } else {
            Ok(Self(magnitude))
        }
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Integer division by a count, truncating toward zero.
    pub fn div_count(self, count: usize) -> Option<Self> {
        if count == 0 {
            return None;
        }
        Some(Self(self.0 / count as i128))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Lossy conversion used for ratios and percentages.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / FIXED_SCALE as f64
    }

    /// Render with at most `decimals` fractional digits, rounding half away
    /// from zero and stripping trailing zeros.
    pub fn to_decimal_string(self, decimals: u32) -> String {
        let decimals = decimals.min(FIXED_DECIMALS);
        let divisor = 10i128.pow(FIXED_DECIMALS - decimals);
        let magnitude = self.0.unsigned_abs();
        let divisor_u = divisor as u128;
        let mut quotient = magnitude / divisor_u;
        if (magnitude % divisor_u) * 2 >= divisor_u {
            quotient += 1;
        }

        let unit = 10u128.pow(decimals);
        let integer = quotient / unit;
        let fraction = quotient % unit;

        let mut out = String::new();
        if self.0 < 0 && quotient != 0 {
            out.push('-');
        }
        out.push_str(&integer.to_string());
        if decimals > 0 && fraction != 0 {
            let digits = format!("{:0width$}", fraction, width = decimals as usize);
            out.push('.');
            out.push_str(digits.trim_end_matches('0'));
        }
        out
    }
}

impl FromStr for Fixed {
    type Err = FixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string(FIXED_DECIMALS))
    }
}

/// Compare two decimal strings without going through floating point.
///
/// Returns `None` when either side does not parse.
pub fn compare_decimal_strings(a: &str, b: &str) -> Option<Ordering> {
    let a = Fixed::parse(a).ok()?;
    let b = Fixed::parse(b).ok()?;
    Some(a.cmp(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integers_and_fractions() {
        assert_eq!(Fixed::parse("1").unwrap(), Fixed::ONE);
        assert_eq!(Fixed::parse("100.0").unwrap(), Fixed::from_int(100));
        assert_eq!(Fixed::parse(".5").unwrap().raw(), FIXED_SCALE / 2);
        assert_eq!(Fixed::parse("0.000000000000000001").unwrap().raw(), 1);
        assert_eq!(Fixed::parse(" +2.5 ").unwrap().raw(), 5 * FIXED_SCALE / 2);
        assert_eq!(Fixed::parse("-3").unwrap(), Fixed::from_int(-3));
    }

    #[test]
    fn test_parse_floors_extra_digits() {
        assert_eq!(Fixed::parse("0.0000000000000000019").unwrap().raw(), 1);
        assert_eq!(Fixed::parse("-0.0000000000000000011").unwrap().raw(), -2);
        assert_eq!(Fixed::parse("-0.0000000000000000010").unwrap().raw(), -1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Fixed::parse(""), Err(FixedError::Empty));
        assert!(matches!(Fixed::parse("abc"), Err(FixedError::Invalid(_))));
        assert!(matches!(Fixed::parse("1.2.3"), Err(FixedError::Invalid(_))));
        assert!(matches!(Fixed::parse("-"), Err(FixedError::Invalid(_))));
        assert!(matches!(Fixed::parse("."), Err(FixedError::Invalid(_))));
        assert!(matches!(Fixed::parse("1e18"), Err(FixedError::Invalid(_))));
        assert_eq!(
            Fixed::parse("999999999999999999999999999"),
            Err(FixedError::Overflow)
        );
    }

    #[test]
    fn test_decimal_string_rounding() {
        let value = Fixed::parse("1.2345675").unwrap();
        assert_eq!(value.to_decimal_string(6), "1.234568");
        assert_eq!(Fixed::parse("180.000").unwrap().to_decimal_string(6), "180");
        assert_eq!(
            Fixed::parse("-0.0000001").unwrap().to_decimal_string(6),
            "0"
        );
        assert_eq!(Fixed::parse("-12.5").unwrap().to_decimal_string(6), "-12.5");
        assert_eq!(Fixed::parse("0.1").unwrap().to_string(), "0.1");
    }

    #[test]
    fn test_sum_is_exact() {
        let mut total = Fixed::ZERO;
        for _ in 0..1000 {
            total = total.checked_add(Fixed::parse("0.1").unwrap()).unwrap();
        }
        assert_eq!(total, Fixed::from_int(100));
    }

    #[test]
    fn test_div_count() {
        let total = Fixed::from_int(350);
        assert_eq!(
            total.div_count(3).unwrap().to_decimal_string(6),
            "116.666667"
        );
        assert_eq!(total.div_count(0), None);
    }

    #[test]
    fn test_compare_decimal_strings() {
        assert_eq!(
            compare_decimal_strings("2.10", "2.1"),
            Some(Ordering::Equal)
        );
        assert_eq!(
            compare_decimal_strings("10", "9.99"),
            Some(Ordering::Greater)
        );
        assert_eq!(compare_decimal_strings("x", "1"), None);
    }
}
