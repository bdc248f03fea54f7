//! Fixed-point currency amounts.
//!
//! All budget arithmetic goes through [`Money`], which stores whole cents in an
//! `i64`. Amounts are parsed from user text once and then carried around as
//! values, so repeated sums never pick up floating point drift.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use super::error::{PlannerError, PlannerResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    cents: i64,
}

impl Money {
    pub const ZERO: Money = Money { cents: 0 };
    /// Largest magnitude accepted from user input: ten trillion in major units
    pub const MAX: Money = Money {
        cents: 1_000_000_000_000_000,
    };

    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    pub const fn from_dollars(dollars: i64) -> Self {
        Self { cents: dollars * 100 }
    }

    pub fn cents(&self) -> i64 {
        self.cents
    }

    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Parse a user-entered amount such as `"$1,234.56"`.
    ///
    /// Every character other than digits, `.` and `-` is discarded first. What
    /// remains must be an optionally negative decimal with at most two
    /// fractional digits, and its magnitude may not exceed [`Money::MAX`].
    pub fn parse(raw: &str) -> PlannerResult<Money> {
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();
        let invalid = || PlannerError::InvalidAmount(raw.to_string());

        let (negative, unsigned) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };
        if unsigned.contains('-') {
            return Err(invalid());
        }

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.len() > 2 || fraction.contains('.') {
            return Err(invalid());
        }

        let whole_cents = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .ok()
                .and_then(|w| w.checked_mul(100))
                .ok_or_else(invalid)?
        };
        let fraction_cents = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse::<i64>().map_err(|_| invalid())?,
        };

        let cents = whole_cents.checked_add(fraction_cents).ok_or_else(invalid)?;
        if cents > Self::MAX.cents {
            return Err(invalid());
        }
        Ok(Money::from_cents(if negative { -cents } else { cents }))
    }

    /// Parse an amount that will be used as a budget; budgets are never negative.
    pub fn parse_budget(raw: &str) -> PlannerResult<Money> {
        let amount = Self::parse(raw)?;
        if amount.is_negative() {
            return Err(PlannerError::InvalidAmount(raw.to_string()));
        }
        Ok(amount)
    }

    /// Saturates at the `i64` bounds instead of wrapping
    pub fn add(self, other: Money) -> Money {
        Money::from_cents(self.cents.saturating_add(other.cents))
    }

    pub fn subtract(self, other: Money) -> Money {
        Money::from_cents(self.cents.saturating_sub(other.cents))
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.cents.checked_add(other.cents).map(Money::from_cents)
    }

    pub fn compare(&self, other: &Money) -> Ordering {
        self.cents.cmp(&other.cents)
    }

    /// Display form with the default `$` symbol, e.g. `$1,234.56`
    pub fn format(&self) -> String {
        self.format_with("$")
    }

    /// Display form with a configured currency symbol
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let magnitude = self.cents.unsigned_abs();
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            group_thousands(magnitude / 100),
            magnitude % 100
        )
    }

    /// Ungrouped decimal form without a symbol (`1234.56`), used in stored documents
    pub fn to_plain_string(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let magnitude = self.cents.unsigned_abs();
        format!("{}{}.{:02}", sign, magnitude / 100, magnitude % 100)
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::add(self, rhs)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = Money::add(*self, rhs);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        self.subtract(rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_symbols_and_grouping() {
        assert_eq!(Money::parse("$1,234.56").unwrap().cents(), 123_456);
        assert_eq!(Money::parse(" 10.5 ").unwrap().cents(), 1_050);
        assert_eq!(Money::parse("USD 300").unwrap().cents(), 30_000);
        assert_eq!(Money::parse(".75").unwrap().cents(), 75);
        assert_eq!(Money::parse("12.").unwrap().cents(), 1_200);
        assert_eq!(Money::parse("-$5.25").unwrap().cents(), -525);
    }

    #[test]
    fn test_parse_rejects_malformed_amounts() {
        for raw in ["", "$", "abc", "1.234", "1.2.3", "12-3", "--5", "."] {
            assert!(
                matches!(Money::parse(raw), Err(PlannerError::InvalidAmount(_))),
                "expected {:?} to be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_parse_budget_rejects_negative() {
        assert!(Money::parse_budget("-1").is_err());
        assert_eq!(Money::parse_budget("$0").unwrap(), Money::ZERO);
    }

    #[test]
    fn test_format() {
        assert_eq!(Money::from_cents(123_456).format(), "$1,234.56");
        assert_eq!(Money::from_cents(5).format(), "$0.05");
        assert_eq!(Money::from_dollars(1_000_000).format(), "$1,000,000.00");
        assert_eq!(Money::from_cents(-99_950).format(), "-$999.50");
        assert_eq!(Money::from_cents(2_500).format_with("€"), "€25.00");
        assert_eq!(Money::from_cents(-123_456).to_plain_string(), "-1234.56");
    }

    #[test]
    fn test_repeated_sums_are_exact() {
        let dime = Money::parse("0.10").unwrap();
        let total: Money = std::iter::repeat(dime).take(1_000).sum();
        assert_eq!(total, Money::from_dollars(100));
    }

    #[test]
    fn test_parse_rejects_amounts_above_max() {
        assert_eq!(Money::parse("$10,000,000,000,000").unwrap(), Money::MAX);
        assert!(matches!(
            Money::parse("$90,000,000,000,000,000"),
            Err(PlannerError::InvalidAmount(_))
        ));
        assert!(Money::parse("-10000000000000.01").is_err());
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = Money::from_cents(i64::MAX - 1);
        assert_eq!(huge + Money::from_dollars(1), Money::from_cents(i64::MAX));
        assert_eq!(Money::from_cents(i64::MIN) - Money::from_cents(1), Money::from_cents(i64::MIN));
        assert_eq!(huge.checked_add(Money::from_dollars(1)), None);

        let total: Money = [huge, huge, huge].iter().sum();
        assert_eq!(total, Money::from_cents(i64::MAX));
    }

    #[test]
    fn test_arithmetic_and_compare() {
        let a = Money::from_dollars(300);
        let b = Money::from_dollars(250);
        assert_eq!(a.add(b), Money::from_dollars(550));
        assert_eq!(a - b, Money::from_dollars(50));
        assert_eq!(b.subtract(a), Money::from_dollars(-50));
        assert_eq!(a.compare(&b), Ordering::Greater);
        assert!(b < a);
    }
}
