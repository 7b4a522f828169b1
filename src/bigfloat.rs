//! Exact decimal numbers for SGF Real values.
//!
//! A [`BigFloat`] is `±digits * 10^exponent` with any number of digits.
//! Values such as komi `6.5` or `1.001` are stored exactly, so a parse-render
//! cycle never drifts the way a binary `f64` would, and no real is too long
//! to read. Only construction, comparison and formatting are supported; this
//! is not a decimal arithmetic library.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when text is not a valid SGF Real.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BigFloatError {
    #[error("invalid real number {0:?}")]
    Invalid(String),
}

/// An exact decimal value, always kept normalized.
///
/// Normalized means the digit string has no leading or trailing zeros, and
/// zero is the empty string with exponent 0 and no sign. Derived equality is
/// therefore numeric equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigFloat {
    negative: bool,
    /// ASCII digits of the magnitude.
    digits: String,
    exponent: i64,
}

impl BigFloat {
    pub const ZERO: BigFloat = BigFloat {
        negative: false,
        digits: String::new(),
        exponent: 0,
    };

    fn normalized(negative: bool, digits: &str, exponent: i64) -> Self {
        let significant = digits.trim_start_matches('0');
        let kept = significant.trim_end_matches('0');
        if kept.is_empty() {
            return Self::ZERO;
        }
        Self {
            negative,
            digits: kept.to_string(),
            exponent: exponent + (significant.len() - kept.len()) as i64,
        }
    }

    /// Build `mantissa * 10^exponent`.
    pub fn new(mantissa: i64, exponent: i32) -> Self {
        Self::normalized(
            mantissa < 0,
            &mantissa.unsigned_abs().to_string(),
            i64::from(exponent),
        )
    }

    /// Build from an integer holding all digits and the number of those digits
    /// that belong after the decimal point: `from_scaled(1001, 3)` is `1.001`.
    pub fn from_scaled(value: i64, fraction_len: u32) -> Self {
        Self::normalized(
            value < 0,
            &value.unsigned_abs().to_string(),
            -i64::from(fraction_len),
        )
    }

    /// Significant digits of the magnitude; empty for zero.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    /// Approximate value, for display and heuristics only.
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    fn signum(&self) -> i8 {
        match (self.is_zero(), self.negative) {
            (true, _) => 0,
            (false, true) => -1,
            (false, false) => 1,
        }
    }

    /// Compare absolute values.
    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        // Place of the leading digit decides unless both lead at the same place.
        let lead = |x: &Self| x.digits.len() as i64 + x.exponent;
        // With no trailing zeros, aligned digit strings compare as text.
        lead(self)
            .cmp(&lead(other))
            .then_with(|| self.digits.cmp(&other.digits))
    }
}

impl Default for BigFloat {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for BigFloat {
    fn from(value: i64) -> Self {
        Self::new(value, 0)
    }
}

impl Neg for BigFloat {
    type Output = BigFloat;

    fn neg(mut self) -> BigFloat {
        if !self.is_zero() {
            self.negative = !self.negative;
        }
        self
    }
}

impl Ord for BigFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        let sign = self.signum().cmp(&other.signum());
        if sign != Ordering::Equal || self.is_zero() {
            return sign;
        }
        let ord = self.cmp_magnitude(other);
        if self.negative { ord.reverse() } else { ord }
    }
}

impl PartialOrd for BigFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BigFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        if self.negative {
            f.write_str("-")?;
        }
        let digits = self.digits.as_str();
        if self.exponent >= 0 {
            f.write_str(digits)?;
            for _ in 0..self.exponent {
                f.write_str("0")?;
            }
            return Ok(());
        }
        let frac_len = self.exponent.unsigned_abs() as usize;
        if digits.len() > frac_len {
            let (int, frac) = digits.split_at(digits.len() - frac_len);
            write!(f, "{int}.{frac}")
        } else {
            write!(f, "0.{}{digits}", "0".repeat(frac_len - digits.len()))
        }
    }
}

impl FromStr for BigFloat {
    type Err = BigFloatError;

    /// Parse `[+-]?digits(.digits)?`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BigFloatError::Invalid(s.to_string());
        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (int, frac) = match body.split_once('.') {
            Some((int, frac)) => (int, frac),
            None => (body, ""),
        };
        if int.is_empty() || body.ends_with('.') {
            return Err(invalid());
        }
        if !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let fraction_len = i64::try_from(frac.len()).map_err(|_| invalid())?;
        Ok(Self::normalized(negative, &format!("{int}{frac}"), -fraction_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bf(s: &str) -> BigFloat {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(bf("6.5").to_string(), "6.5");
        assert_eq!(bf("1.001").to_string(), "1.001");
        assert_eq!(bf("-0.5").to_string(), "-0.5");
        assert_eq!(bf("+7").to_string(), "7");
        assert_eq!(bf("100").to_string(), "100");
        assert_eq!(bf("0.000").to_string(), "0");
        assert_eq!(bf("0.05").to_string(), "0.05");
        assert_eq!(bf("007.50").to_string(), "7.5");
    }

    #[test]
    fn test_normalization_gives_numeric_equality() {
        assert_eq!(bf("6.50"), bf("6.5"));
        assert_eq!(bf("100"), BigFloat::new(1, 2));
        assert_eq!(bf("-0"), BigFloat::ZERO);
        assert_eq!(bf("-0.00"), BigFloat::ZERO);
        assert_eq!(BigFloat::from_scaled(1001, 3), bf("1.001"));
        assert_eq!(BigFloat::from_scaled(-2500, 2), bf("-25"));
        assert_eq!(bf("1200").digits(), "12");
        assert_eq!(bf("1200").exponent(), 2);
    }

    #[test]
    fn test_ordering() {
        assert!(bf("1.001") > bf("1"));
        assert!(bf("0.5") < bf("5"));
        assert!(bf("-3") < bf("-2.5"));
        assert!(bf("-0.1") < BigFloat::ZERO);
        assert!(bf("99.99") < bf("100"));
        assert!(bf("12") > bf("9.999999"));
        assert!(bf("1.2") < bf("1.23"));
        assert_eq!(bf("2.50").cmp(&bf("2.5")), Ordering::Equal);
    }

    #[test]
    fn test_many_digits_are_kept_exactly() {
        let long = "12345678901234567890.5";
        assert_eq!(bf(long).to_string(), long);
        let tiny = "0.000000000000000000000000000001";
        assert_eq!(bf(tiny).to_string(), tiny);
        assert!(bf("12345678901234567890.5") < bf("12345678901234567890.51"));
        assert!(bf("-98765432109876543210") < bf("-98765432109876543209"));
        assert!(bf(tiny) > BigFloat::ZERO);
    }

    #[test]
    fn test_invalid_input() {
        assert!("".parse::<BigFloat>().is_err());
        assert!("1.".parse::<BigFloat>().is_err());
        assert!(".5".parse::<BigFloat>().is_err());
        assert!("1e5".parse::<BigFloat>().is_err());
        assert!("--1".parse::<BigFloat>().is_err());
    }

    #[test]
    fn test_neg_and_to_f64() {
        assert_eq!(-bf("6.5"), bf("-6.5"));
        assert_eq!(-BigFloat::ZERO, BigFloat::ZERO);
        assert!((bf("7.5").to_f64() - 7.5).abs() < 1e-12);
    }
}
