//! Fixed-point money value objects.
//!
//! Persisted money columns hold at most 9 digits. Prices carry one fractional
//! digit; wages, salaries, commissions and client cash carry two. Every
//! construction rounds half-up (midpoint away from zero) to the type's scale.

use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Total number of digits a persisted money column can hold.
pub const MAX_DIGITS: u32 = 9;

fn to_scale(value: Decimal, scale: u32, field: &'static str) -> DomainResult<Decimal> {
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);

    let limit = Decimal::from(10_i64.pow(MAX_DIGITS - scale));
    if rounded.abs() >= limit {
        return Err(DomainError::validation(
            field,
            format!("{rounded} exceeds {MAX_DIGITS} digits with {scale} decimal places"),
        ));
    }
    Ok(rounded)
}

macro_rules! fixed_point {
    ($(#[$meta:meta])* $t:ident, scale = $scale:expr, field = $field:literal, signed = $signed:expr) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "Decimal", into = "Decimal")]
        pub struct $t(Decimal);

        impl $t {
            /// Number of fractional digits stored.
            pub const SCALE: u32 = $scale;

            /// Round `value` to this type's scale and check the digit limit.
            pub fn new(value: Decimal) -> DomainResult<Self> {
                if !$signed && value.is_sign_negative() && !value.is_zero() {
                    return Err(DomainError::validation($field, "must not be negative"));
                }
                Ok(Self(to_scale(value, Self::SCALE, $field)?))
            }

            pub fn zero() -> Self {
                let mut zero = Decimal::ZERO;
                zero.rescale(Self::SCALE);
                Self(zero)
            }

            pub fn from_int(units: i64) -> DomainResult<Self> {
                Self::new(Decimal::from(units))
            }

            pub fn amount(&self) -> Decimal {
                self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0.is_zero()
            }

            pub fn checked_add(self, other: Self) -> DomainResult<Self> {
                let sum = self
                    .0
                    .checked_add(other.0)
                    .ok_or_else(|| DomainError::validation($field, "addition overflow"))?;
                Self::new(sum)
            }

            pub fn checked_sub(self, other: Self) -> DomainResult<Self> {
                let diff = self
                    .0
                    .checked_sub(other.0)
                    .ok_or_else(|| DomainError::validation($field, "subtraction overflow"))?;
                Self::new(diff)
            }

            /// `self × quantity`.
            pub fn times(self, quantity: u32) -> DomainResult<Self> {
                let product = self
                    .0
                    .checked_mul(Decimal::from(quantity))
                    .ok_or_else(|| DomainError::validation($field, "multiplication overflow"))?;
                Self::new(product)
            }

            /// Sum of all values; zero for an empty iterator.
            pub fn sum<I>(values: I) -> DomainResult<Self>
            where
                I: IntoIterator<Item = Self>,
            {
                values
                    .into_iter()
                    .try_fold(Self::zero(), |acc, v| acc.checked_add(v))
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::zero()
            }
        }

        impl TryFrom<Decimal> for $t {
            type Error = DomainError;

            fn try_from(value: Decimal) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for Decimal {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = Decimal::from_str(s.trim())
                    .map_err(|e| DomainError::validation($field, e.to_string()))?;
                Self::new(value)
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

fixed_point!(
    /// Product, line and order price: 9 digits, 1 decimal place, never negative.
    Price,
    scale = 1,
    field = "price",
    signed = false
);

fixed_point!(
    /// Wage, salary, commission and client cash: 9 digits, 2 decimal places.
    ///
    /// Signed, since a money-change balance can be negative when the client
    /// hands over less than the order total.
    Money,
    scale = 2,
    field = "money",
    signed = true
);

impl Price {
    /// Widen to a two-decimal `Money` value.
    pub fn to_money(self) -> DomainResult<Money> {
        Money::new(self.0)
    }
}

/// Whole-number allowance percentage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent(u32);

impl Percent {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// `amount × self / 100`, unrounded.
    pub fn of(&self, amount: Decimal) -> Decimal {
        amount * Decimal::from(self.0) / Decimal::ONE_HUNDRED
    }
}

impl core::ops::Add for Percent {
    type Output = Percent;

    fn add(self, rhs: Self) -> Self::Output {
        Percent(self.0.saturating_add(rhs.0))
    }
}

impl core::fmt::Display for Percent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn price_rounds_half_up_to_one_decimal() {
        assert_eq!(Price::new(d("10.25")).unwrap().amount(), d("10.3"));
        assert_eq!(Price::new(d("10.24")).unwrap().amount(), d("10.2"));
        assert_eq!(Price::new(d("10.35")).unwrap().amount(), d("10.4"));
    }

    #[test]
    fn money_rounds_half_up_to_two_decimals() {
        assert_eq!(Money::new(d("0.125")).unwrap().amount(), d("0.13"));
        assert_eq!(Money::new(d("-0.125")).unwrap().amount(), d("-0.13"));
    }

    #[test]
    fn display_keeps_the_column_scale() {
        assert_eq!(Price::from_int(120).unwrap().to_string(), "120.0");
        assert_eq!(Money::from_int(5).unwrap().to_string(), "5.00");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn nine_digit_limit_is_enforced() {
        assert!(Price::new(d("99999999.9")).is_ok());
        assert!(Price::new(d("100000000")).is_err());
        assert!(Money::new(d("9999999.99")).is_ok());
        assert!(Money::new(d("10000000")).is_err());
    }

    #[test]
    fn price_rejects_negative_values() {
        let err = Price::new(d("-1")).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert!(Money::new(d("-1")).is_ok());
    }

    #[test]
    fn price_parses_and_deserializes_through_validation() {
        let p: Price = "120.5".parse().unwrap();
        assert_eq!(p.amount(), d("120.5"));

        let json = serde_json::to_string(&p).unwrap();
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);

        assert!(serde_json::from_str::<Price>("\"-3\"").is_err());
    }

    #[test]
    fn percent_of_amount() {
        assert_eq!(Percent::new(20).of(d("100")), d("20"));
        assert_eq!((Percent::new(10) + Percent::new(5)).value(), 15);
    }

    #[test]
    fn sum_of_nothing_is_zero() {
        assert_eq!(Price::sum(Vec::new()).unwrap(), Price::zero());
    }

    proptest! {
        #[test]
        fn times_matches_repeated_addition(tenths in 0i64..100_000, qty in 0u32..50) {
            let price = Price::new(Decimal::new(tenths, 1)).unwrap();
            let repeated = Price::sum(std::iter::repeat(price).take(qty as usize)).unwrap();
            prop_assert_eq!(price.times(qty).unwrap(), repeated);
        }
    }
}
