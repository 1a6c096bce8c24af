//! Transactions and their splits.
//!
//! A transaction owns its splits; a split never outlives or is shared
//! across transactions. Split `value` is always denominated in the
//! transaction currency, `quantity` in the posted account's own
//! commodity. For ordinary (non-investment) accounts the two are
//! numerically equal whenever the account commodity matches the
//! transaction currency.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::intern::Symbol;
use crate::rational::Rational;

/// One leg of a double-entry transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// Stable identity.
    pub guid: String,
    /// Owning transaction guid.
    pub transaction: String,
    /// Account this leg is posted to.
    pub account: String,
    /// Amount in the transaction currency, exact rational.
    pub value: Rational,
    /// Amount in the account commodity, exact rational.
    pub quantity: Rational,
}

impl Split {
    /// Create a split.
    pub fn new(
        guid: impl Into<String>,
        transaction: impl Into<String>,
        account: impl Into<String>,
        value: Rational,
        quantity: Rational,
    ) -> Self {
        Self {
            guid: guid.into(),
            transaction: transaction.into(),
            account: account.into(),
            value,
            quantity,
        }
    }

    /// Create a split whose value and quantity coincide (the common
    /// case for accounts denominated in the transaction currency).
    pub fn even(
        guid: impl Into<String>,
        transaction: impl Into<String>,
        account: impl Into<String>,
        amount: Rational,
    ) -> Self {
        Self::new(guid, transaction, account, amount, amount)
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}  value {}  qty {}", self.account, self.value, self.quantity)
    }
}

/// A dated, balanced group of splits sharing one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Stable identity.
    pub guid: String,
    /// Posting date.
    pub date: NaiveDate,
    /// Currency every split value is denominated in.
    pub currency: Symbol,
    /// Free-form description.
    pub description: String,
    /// The legs; owned, at least one (validation enforces the rest).
    pub splits: Vec<Split>,
}

impl Transaction {
    /// Create a transaction.
    pub fn new(
        guid: impl Into<String>,
        date: NaiveDate,
        currency: impl Into<Symbol>,
        description: impl Into<String>,
        splits: Vec<Split>,
    ) -> Self {
        Self {
            guid: guid.into(),
            date,
            currency: currency.into(),
            description: description.into(),
            splits,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} \"{}\"", self.date, self.currency, self.description)?;
        for split in &self.splits {
            writeln!(f, "{split}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn even_split_mirrors_value() {
        let s = Split::even("s1", "t1", "acc", Rational::new(1500, 100));
        assert_eq!(s.value, s.quantity);
    }

    #[test]
    fn serde_round_trip() {
        let tx = Transaction::new(
            "t1",
            date(2024, 3, 1),
            "EUR",
            "groceries",
            vec![
                Split::even("s1", "t1", "expenses", Rational::new(2350, 100)),
                Split::even("s2", "t1", "bank", Rational::new(-2350, 100)),
            ],
        );

        let json = serde_json::to_string(&tx).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, back);
    }

    #[test]
    fn display_lists_splits() {
        let tx = Transaction::new(
            "t1",
            date(2024, 3, 1),
            "EUR",
            "coffee",
            vec![Split::even("s1", "t1", "expenses", Rational::new(3, 1))],
        );
        let rendered = format!("{tx}");
        assert!(rendered.contains("\"coffee\""));
        assert!(rendered.contains("expenses"));
    }
}
