//! Commodity reference data.
//!
//! A commodity is any tradeable unit: a national currency or an
//! investment (stock, mutual fund, ...). Commodities are immutable
//! reference data supplied by the storage collaborator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::intern::Symbol;

/// The category a commodity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Namespace {
    /// A national currency (EUR, USD, ...).
    Currency,
    /// An exchange-traded stock.
    Stock,
    /// A mutual fund.
    Mutual,
    /// A non-mutual fund (ETF and the like).
    Fund,
    /// Anything else (loyalty points, metals, ...).
    Other,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Currency => write!(f, "CURRENCY"),
            Self::Stock => write!(f, "STOCK"),
            Self::Mutual => write!(f, "MUTUAL"),
            Self::Fund => write!(f, "FUND"),
            Self::Other => write!(f, "OTHER"),
        }
    }
}

/// A tradeable unit of value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commodity {
    /// Stable identity.
    pub guid: String,
    /// Short code, e.g. `EUR` or `GOOGL`.
    pub mnemonic: Symbol,
    /// Category of the commodity.
    pub namespace: Namespace,
}

impl Commodity {
    /// Create a commodity.
    pub fn new(
        guid: impl Into<String>,
        mnemonic: impl Into<Symbol>,
        namespace: Namespace,
    ) -> Self {
        Self {
            guid: guid.into(),
            mnemonic: mnemonic.into(),
            namespace,
        }
    }

    /// Shorthand for a currency commodity whose guid equals its code.
    pub fn currency(code: &str) -> Self {
        Self::new(code, code, Namespace::Currency)
    }

    /// Check whether this is a national currency.
    #[must_use]
    pub fn is_currency(&self) -> bool {
        self.namespace == Namespace::Currency
    }

    /// Check whether this is an investment commodity.
    ///
    /// Investments are quoted against a natural currency and valued
    /// through the price book rather than traded at par.
    #[must_use]
    pub fn is_investment(&self) -> bool {
        matches!(
            self.namespace,
            Namespace::Stock | Namespace::Mutual | Namespace::Fund
        )
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.mnemonic, self.namespace)
    }
}
