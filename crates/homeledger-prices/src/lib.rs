//! Price book for as-of-date exchange rate resolution.
//!
//! The book stores dated quotes (`commodity` priced in `currency`) and
//! answers "what is the rate between A and B as of date D". Lookup is
//! deterministic and never fails: missing data degrades to a 1:1 rate
//! tagged [`RateSource::Fallback`] so that reporting stays available
//! with incomplete price history. Callers that care (a UI warning
//! badge, say) inspect [`Rate::is_fallback`].
//!
//! Selection rules, in order:
//!
//! 1. `from == to` is always 1 ([`RateSource::Identity`]).
//! 2. The latest quote for the pair dated at or before the reference
//!    date; failing that, the earliest quote after it.
//! 3. The same for the inverse pair, inverted ([`RateSource::Inverted`]).
//! 4. Non-currency commodities are quoted against their natural
//!    currency; when the requested target differs, a second
//!    currency/currency leg is resolved and multiplied in.
//! 5. Nothing found: rate 1, [`RateSource::Fallback`].
//!
//! Quotes are keyed by `(commodity, currency, date)`; re-inserting an
//! existing key replaces the value, so the last upsert wins on
//! same-date ties.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use homeledger_core::{Commodity, Money, Namespace, Symbol};

/// One dated quote: `commodity` priced in `currency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Commodity being priced.
    pub commodity: Symbol,
    /// Currency the price is denominated in.
    pub currency: Symbol,
    /// Quote date.
    pub date: NaiveDate,
    /// Units of `currency` per unit of `commodity`.
    pub value: Decimal,
}

impl PriceQuote {
    /// Create a quote.
    pub fn new(
        commodity: impl Into<Symbol>,
        currency: impl Into<Symbol>,
        date: NaiveDate,
        value: Decimal,
    ) -> Self {
        Self {
            commodity: commodity.into(),
            currency: currency.into(),
            date,
            value,
        }
    }
}

/// How a resolved rate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateSource {
    /// Same commodity on both sides.
    Identity,
    /// A quote for the pair (possibly via an investment's natural
    /// currency leg).
    Quoted,
    /// A quote for the inverse pair, inverted.
    Inverted,
    /// No usable quote; the documented 1:1 degradation.
    Fallback,
}

/// A resolved exchange rate plus its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// Multiplier taking the source commodity into the target.
    pub value: Decimal,
    /// Where the rate came from.
    pub source: RateSource,
}

impl Rate {
    /// The 1:1 identity rate.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            value: Decimal::ONE,
            source: RateSource::Identity,
        }
    }

    /// A directly quoted rate.
    #[must_use]
    pub const fn quoted(value: Decimal) -> Self {
        Self {
            value,
            source: RateSource::Quoted,
        }
    }

    /// A rate obtained from the inverse pair.
    #[must_use]
    pub const fn inverted(value: Decimal) -> Self {
        Self {
            value,
            source: RateSource::Inverted,
        }
    }

    /// The missing-price degradation: 1:1.
    #[must_use]
    pub const fn fallback() -> Self {
        Self {
            value: Decimal::ONE,
            source: RateSource::Fallback,
        }
    }

    /// Whether this rate is the missing-price degradation.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self.source, RateSource::Fallback)
    }
}

/// Read-only index of price quotes for one snapshot.
///
/// Build it once from the snapshot's commodities and quotes, then
/// share it across an entire aggregation pass.
#[derive(Debug, Default, Clone)]
pub struct PriceBook {
    /// Declared commodity namespaces; undeclared mnemonics are treated
    /// as currencies.
    namespaces: HashMap<Symbol, Namespace>,
    /// `(commodity, currency)` pair to date-ordered values. Ordered
    /// maps throughout: the date key makes the upsert-replace
    /// tie-break implicit, and the pair key fixes the scan order so
    /// identical snapshots always resolve identical rates.
    pairs: BTreeMap<(Symbol, Symbol), BTreeMap<NaiveDate, Decimal>>,
}

impl PriceBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from commodity reference data and a quote stream.
    pub fn from_snapshot<'a, C, Q>(commodities: C, quotes: Q) -> Self
    where
        C: IntoIterator<Item = &'a Commodity>,
        Q: IntoIterator<Item = PriceQuote>,
    {
        let mut book = Self::new();
        for commodity in commodities {
            book.declare(commodity);
        }
        for quote in quotes {
            book.upsert(quote);
        }
        book
    }

    /// Record a commodity's namespace.
    pub fn declare(&mut self, commodity: &Commodity) {
        self.namespaces
            .insert(commodity.mnemonic.clone(), commodity.namespace);
    }

    /// Insert or replace a quote keyed by `(commodity, currency, date)`.
    pub fn upsert(&mut self, quote: PriceQuote) {
        self.pairs
            .entry((quote.commodity, quote.currency))
            .or_default()
            .insert(quote.date, quote.value);
    }

    /// Number of stored quotes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.values().map(BTreeMap::len).sum()
    }

    /// Whether the book holds no quotes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.values().all(BTreeMap::is_empty)
    }

    /// Resolve the exchange rate from `from` to `to` as of `as_of`.
    ///
    /// Never fails; see the module docs for the selection rules.
    #[must_use]
    pub fn rate(&self, from: &str, to: &str, as_of: NaiveDate) -> Rate {
        if from == to {
            return Rate::identity();
        }

        if self.is_noncurrency(from) {
            return self.investment_rate(from, to, as_of);
        }

        self.currency_rate(from, to, as_of)
    }

    /// Convert a money value into `to` as of `as_of`, returning the
    /// converted value together with the rate used.
    #[must_use]
    pub fn convert(&self, money: &Money, to: &str, as_of: NaiveDate) -> (Money, Rate) {
        let rate = self.rate(&money.commodity, to, as_of);
        (money.convert(to, rate.value), rate)
    }

    fn is_noncurrency(&self, mnemonic: &str) -> bool {
        self.namespaces
            .get(mnemonic)
            .is_some_and(|ns| *ns != Namespace::Currency)
    }

    /// Pair lookup between two currencies: direct, then inverse.
    fn currency_rate(&self, from: &str, to: &str, as_of: NaiveDate) -> Rate {
        if let Some(value) = self.pair_value(from, to, as_of) {
            return Rate::quoted(value);
        }
        if let Some(value) = self.pair_value(to, from, as_of) {
            if !value.is_zero() {
                return Rate::inverted(Decimal::ONE / value);
            }
        }
        Rate::fallback()
    }

    /// Investments are quoted against their natural currency; resolve
    /// that quote first and chain a currency leg when the caller wants
    /// a different target.
    fn investment_rate(&self, from: &str, to: &str, as_of: NaiveDate) -> Rate {
        let Some((natural, price)) = self.natural_quote(from, as_of) else {
            return Rate::fallback();
        };

        if natural == to {
            return Rate::quoted(price);
        }

        let leg = self.currency_rate(natural.as_str(), to, as_of);
        if leg.is_fallback() {
            // A degraded second leg taints the whole rate.
            return Rate {
                value: price * leg.value,
                source: RateSource::Fallback,
            };
        }
        Rate::quoted(price * leg.value)
    }

    /// The quote picked for a commodity regardless of quote currency:
    /// latest at-or-before wins, then earliest after, preferring any
    /// at-or-before quote over any later one. When two currencies
    /// carry a quote on the same best date the first pair in index
    /// order wins (lexicographic by quote currency).
    fn natural_quote(&self, commodity: &str, as_of: NaiveDate) -> Option<(Symbol, Decimal)> {
        use std::ops::Bound;

        let mut best_before: Option<(NaiveDate, Symbol, Decimal)> = None;
        let mut best_after: Option<(NaiveDate, Symbol, Decimal)> = None;

        for ((base, quote_ccy), by_date) in &self.pairs {
            if base.as_str() != commodity {
                continue;
            }
            if let Some((date, value)) = by_date.range(..=as_of).next_back() {
                if best_before.as_ref().map_or(true, |(d, _, _)| date > d) {
                    best_before = Some((*date, quote_ccy.clone(), *value));
                }
            }
            let after = (Bound::Excluded(as_of), Bound::Unbounded);
            if let Some((date, value)) = by_date.range(after).next() {
                if best_after.as_ref().map_or(true, |(d, _, _)| date < d) {
                    best_after = Some((*date, quote_ccy.clone(), *value));
                }
            }
        }

        best_before
            .or(best_after)
            .map(|(_, currency, value)| (currency, value))
    }

    /// Value for one directed pair: latest at-or-before, else earliest
    /// after.
    fn pair_value(&self, base: &str, quote: &str, as_of: NaiveDate) -> Option<Decimal> {
        let by_date = self
            .pairs
            .get(&(Symbol::new(base), Symbol::new(quote)))?;

        if let Some((_, value)) = by_date.range(..=as_of).next_back() {
            return Some(*value);
        }
        by_date.range(..).next().map(|(_, value)| *value)
    }
}
