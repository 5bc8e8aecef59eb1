use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};

/// Signed amount of money, always held at two decimal places.
///
/// Negative values are outflows (spending), positive values are inflows
/// (income, payments, refunds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    /// Largest magnitude accepted for a single record: one billion dollars.
    /// Keeps SQL sums over stored cents far from `i64` overflow.
    pub const MAX_ABS_CENTS: i64 = 100_000_000_000;

    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Returns `None` when the value does not fit in an `i64` count of cents.
    pub fn to_cents(self) -> Option<i64> {
        self.0.checked_mul(Decimal::ONE_HUNDRED)?.round().to_i64()
    }

    /// Rounds to cents, halves away from zero (`4.745` → `4.75`, `-4.745` → `-4.75`).
    /// Cents, or `None` beyond [`Money::MAX_ABS_CENTS`].
    pub fn bounded_cents(self) -> Option<i64> {
        self.to_cents()
            .filter(|cents| cents.unsigned_abs() <= Self::MAX_ABS_CENTS as u64)
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Nearest `f64` to the exact decimal value, e.g. for JSON output.
    pub fn to_f64(self) -> f64 {
        self.0.to_string().parse().unwrap_or_default()
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_outflow(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_inflow(self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_outflow() {
            write!(f, "-${:.2}", self.0.abs())
        } else {
            write!(f, "${:.2}", self.0.abs())
        }
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn to_f64_is_nearest() {
        assert_eq!(Money::from_cents(45315).to_f64(), 453.15);
        assert_eq!(Money::from_cents(-4210).to_f64(), -42.1);
        assert_eq!(Money::zero().to_f64(), 0.0);
    }

    #[test]
    fn cents_round_trip() {
        assert_eq!(Money::from_cents(-4210).to_cents(), Some(-4210));
        assert_eq!(Money::from_cents(0).to_cents(), Some(0));
    }

    #[test]
    fn from_decimal_rounds_to_two_places() {
        let m = Money::from_decimal(Decimal::from_str("4.755").unwrap());
        assert_eq!(m.to_cents(), Some(476));
    }

    #[test]
    fn half_cents_round_away_from_zero() {
        let cents = |s: &str| Money::from_decimal(Decimal::from_str(s).unwrap()).to_cents();
        assert_eq!(cents("4.745"), Some(475));
        assert_eq!(cents("-4.745"), Some(-475));
        assert_eq!(cents("4.744"), Some(474));
    }

    #[test]
    fn negation_flips_direction() {
        let charge = Money::from_cents(475);
        assert!(charge.is_inflow());
        assert!((-charge).is_outflow());
        assert_eq!((-charge).to_cents(), Some(-475));
    }

    #[test]
    fn zero_is_neither_inflow_nor_outflow() {
        assert!(!Money::zero().is_inflow());
        assert!(!Money::zero().is_outflow());
        assert!(!(-Money::zero()).is_outflow());
    }

    #[test]
    fn display_shows_sign_before_currency() {
        assert_eq!(Money::from_cents(-4210).to_string(), "-$42.10");
        assert_eq!(Money::from_cents(1500).to_string(), "$15.00");
    }

    #[test]
    fn sum_of_amounts() {
        let total: Money = [475, -4210, 100].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.to_cents(), Some(-3635));
    }

    #[test]
    fn bounded_cents_stop_at_one_billion() {
        assert_eq!(
            Money::from_cents(-Money::MAX_ABS_CENTS).bounded_cents(),
            Some(-Money::MAX_ABS_CENTS)
        );
        assert_eq!(Money::from_cents(Money::MAX_ABS_CENTS + 1).bounded_cents(), None);
        assert_eq!(Money::from_cents(i64::MIN).bounded_cents(), None);
    }

    #[test]
    fn oversized_value_has_no_cents() {
        let huge = Money::from_decimal(Decimal::MAX);
        assert_eq!(huge.to_cents(), None);
    }
}
