//! Money: a decimal amount tagged with a commodity.
//!
//! Arithmetic between two [`Money`] values is only defined when both
//! carry the same commodity; crossing commodities requires an explicit
//! [`Money::convert`] with a rate. The checked methods return a
//! [`MoneyError`] on mismatch, the operator impls `debug_assert` like
//! the rest of the arithmetic in this workspace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use thiserror::Error;

use crate::intern::Symbol;

/// Error raised by checked cross-commodity operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Two values of different commodities met in an operation that
    /// requires a single commodity.
    #[error("commodity mismatch: {left} vs {right}")]
    CommodityMismatch {
        /// Commodity of the left operand.
        left: Symbol,
        /// Commodity of the right operand.
        right: Symbol,
    },
}

/// An amount of a single commodity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// The decimal amount.
    pub amount: Decimal,
    /// The commodity mnemonic the amount is denominated in.
    pub commodity: Symbol,
}

impl Money {
    /// Create a new money value.
    #[must_use]
    pub fn new(amount: Decimal, commodity: impl Into<Symbol>) -> Self {
        Self {
            amount,
            commodity: commodity.into(),
        }
    }

    /// Zero in the given commodity.
    #[must_use]
    pub fn zero(commodity: impl Into<Symbol>) -> Self {
        Self::new(Decimal::ZERO, commodity)
    }

    /// Check if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Check if the amount is strictly negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.amount.is_sign_negative()
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self::new(self.amount.abs(), self.commodity.clone())
    }

    /// Add another value of the same commodity.
    pub fn checked_add(&self, other: &Self) -> Result<Self, MoneyError> {
        self.require_same(other)?;
        Ok(Self::new(
            self.amount + other.amount,
            self.commodity.clone(),
        ))
    }

    /// Subtract another value of the same commodity.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, MoneyError> {
        self.require_same(other)?;
        Ok(Self::new(
            self.amount - other.amount,
            self.commodity.clone(),
        ))
    }

    /// Multiply by a dimensionless scalar.
    #[must_use]
    pub fn mul_scalar(&self, scalar: Decimal) -> Self {
        Self::new(self.amount * scalar, self.commodity.clone())
    }

    /// Convert into another commodity at an explicit rate.
    ///
    /// This is the only sanctioned way to change a value's commodity:
    /// `amount * rate`, re-tagged.
    #[must_use]
    pub fn convert(&self, target: impl Into<Symbol>, rate: Decimal) -> Self {
        Self::new(self.amount * rate, target)
    }

    /// Compare amounts, failing when the commodities differ.
    pub fn checked_cmp(&self, other: &Self) -> Result<Ordering, MoneyError> {
        self.require_same(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    /// Round to the given number of decimal places.
    #[must_use]
    pub fn round_dp(&self, dp: u32) -> Self {
        Self::new(self.amount.round_dp(dp), self.commodity.clone())
    }

    /// Render for display: conventional currency symbol where one is
    /// known, rounded to two decimals. Display only; never feed the
    /// result back into computation.
    #[must_use]
    pub fn format(&self) -> String {
        let rounded = self.amount.round_dp(2);
        match currency_symbol(&self.commodity) {
            Some(sym) => format!("{sym}{rounded:.2}"),
            None => format!("{rounded:.2} {}", self.commodity),
        }
    }

    fn require_same(&self, other: &Self) -> Result<(), MoneyError> {
        if self.commodity == other.commodity {
            Ok(())
        } else {
            Err(MoneyError::CommodityMismatch {
                left: self.commodity.clone(),
                right: other.commodity.clone(),
            })
        }
    }
}

/// Conventional symbol for the common currencies; anything else is
/// rendered with its mnemonic.
fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "EUR" => Some("\u{20ac}"),
        "USD" | "CAD" | "AUD" => Some("$"),
        "GBP" => Some("\u{a3}"),
        "JPY" => Some("\u{a5}"),
        "CHF" => Some("Fr"),
        "INR" => Some("\u{20b9}"),
        _ => None,
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.commodity)
    }
}

impl PartialOrd for Money {
    /// Ordering is only defined within one commodity; comparing across
    /// commodities yields `None`.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        (self.commodity == other.commodity).then(|| self.amount.cmp(&other.amount))
    }
}

impl Add for &Money {
    type Output = Money;

    fn add(self, other: &Money) -> Money {
        debug_assert_eq!(
            self.commodity, other.commodity,
            "Cannot add money of different commodities"
        );
        Money::new(self.amount + other.amount, self.commodity.clone())
    }
}

impl Sub for &Money {
    type Output = Money;

    fn sub(self, other: &Money) -> Money {
        debug_assert_eq!(
            self.commodity, other.commodity,
            "Cannot subtract money of different commodities"
        );
        Money::new(self.amount - other.amount, self.commodity.clone())
    }
}

impl Neg for &Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money::new(-self.amount, self.commodity.clone())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        &self + &other
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        &self - &other
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}

impl AddAssign<&Self> for Money {
    fn add_assign(&mut self, other: &Self) {
        debug_assert_eq!(
            self.commodity, other.commodity,
            "Cannot add money of different commodities"
        );
        self.amount += other.amount;
    }
}

impl SubAssign<&Self> for Money {
    fn sub_assign(&mut self, other: &Self) {
        debug_assert_eq!(
            self.commodity, other.commodity,
            "Cannot subtract money of different commodities"
        );
        self.amount -= other.amount;
    }
}
