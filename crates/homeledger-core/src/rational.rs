//! Exact rational numbers at the entity boundary.
//!
//! Split values and quantities are persisted and transported as
//! numerator/denominator pairs so that no binary floating point ever
//! touches a monetary figure. The engine converts them to
//! [`Decimal`] on entry via [`Rational::to_decimal`], which is where a
//! corrupt pair (zero denominator) surfaces.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error converting a persisted rational into a decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RationalError {
    /// The denominator is zero.
    #[error("rational {numer}/0 has a zero denominator")]
    ZeroDenominator {
        /// Numerator of the offending pair.
        numer: i64,
    },
}

/// An exact numerator/denominator pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    /// Numerator.
    pub numer: i64,
    /// Denominator. Zero is representable (storage is untrusted) but
    /// rejected on conversion.
    pub denom: i64,
}

impl Rational {
    /// Create a rational from a numerator/denominator pair.
    #[must_use]
    pub const fn new(numer: i64, denom: i64) -> Self {
        Self { numer, denom }
    }

    /// Zero, as `0/1`.
    pub const ZERO: Self = Self::new(0, 1);

    /// Check whether the pair can be converted at all.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.denom != 0
    }

    /// Convert to a decimal, failing on a zero denominator.
    ///
    /// The division is performed in `Decimal` space and is exact up to
    /// 28 significant digits, which is far beyond any bookkeeping
    /// precision in practice.
    pub fn to_decimal(&self) -> Result<Decimal, RationalError> {
        if self.denom == 0 {
            return Err(RationalError::ZeroDenominator { numer: self.numer });
        }
        Ok(Decimal::from(self.numer) / Decimal::from(self.denom))
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::new(n, 1)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numer, self.denom)
    }
}
