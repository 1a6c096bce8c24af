//! Investment position replay.
//!
//! [`investment_snapshot`] replays the ordered postings of a single
//! investment account into a point-in-time position: quantity held,
//! average-cost basis, realized and unrealized profit, dividends, and
//! valuation in both the position currency and a reporting currency.
//!
//! The replay is a pure function: every call starts from the first
//! posting and cuts off at `as_of`. "Set the view to this date", never
//! "advance from wherever it was"; there is no hidden cursor to
//! rewind.
//!
//! Precondition: postings are sorted ascending by transaction date.
//! This is not re-validated; an unsorted slice silently produces wrong
//! running totals.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::trace;

use homeledger_core::{Account, Money, Symbol};
use homeledger_prices::PriceBook;

/// One split of the investment account, joined with its transaction.
///
/// `value` is in the transaction currency, `quantity` in the account
/// commodity (shares/units). The caller joins splits to transactions
/// and converts rationals before handing them over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountPosting {
    /// Transaction date.
    pub date: NaiveDate,
    /// Change in units held; zero for dividend postings.
    pub quantity: Decimal,
    /// Signed amount in the transaction currency.
    pub value: Decimal,
    /// The transaction currency.
    pub currency: Symbol,
}

impl AccountPosting {
    /// Create a posting.
    pub fn new(
        date: NaiveDate,
        quantity: Decimal,
        value: Decimal,
        currency: impl Into<Symbol>,
    ) -> Self {
        Self {
            date,
            quantity,
            value,
            currency: currency.into(),
        }
    }
}

/// A dividend received on the position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dividend {
    /// Date the dividend posted.
    pub when: NaiveDate,
    /// Amount in the position currency.
    pub amount: Money,
    /// Amount converted into the reporting currency as of the
    /// snapshot date.
    pub amount_in_currency: Money,
}

/// Point-in-time projection of one investment account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentSnapshot {
    /// Units held at the snapshot date.
    pub quantity: Decimal,
    /// Blended per-unit cost (average-cost basis), position currency.
    pub avg_price: Money,
    /// Remaining cost basis of the held units.
    pub cost: Money,
    /// Market value of the held units at the snapshot date.
    pub value: Money,
    /// `value - cost`.
    pub unrealized_profit: Money,
    /// Unrealized profit as a percentage of cost; 0 when cost is 0.
    pub unrealized_profit_pct: Decimal,
    /// Profit locked in by completed sales up to the snapshot date.
    pub realized_profit: Money,
    /// Realized profit as a percentage of cost; 0 when cost is 0.
    pub realized_profit_pct: Decimal,
    /// Dividends received up to the snapshot date.
    pub dividends: Vec<Dividend>,
    /// Sum of dividends, position currency.
    pub realized_dividends: Money,
    /// True when at least one posting was processed and no units
    /// remain held.
    pub is_closed: bool,
    /// `value` in the reporting currency.
    pub value_in_currency: Money,
    /// `cost` in the reporting currency.
    pub cost_in_currency: Money,
    /// `realized_profit` in the reporting currency.
    pub realized_profit_in_currency: Money,
    /// `realized_dividends` in the reporting currency.
    pub realized_dividends_in_currency: Money,
}

/// Replay `postings` up to and including `as_of`.
///
/// Buys accumulate cost at the price paid; sells realize
/// `proceeds - avg_price * units_sold` and shrink the basis
/// proportionally without moving the average (average-cost
/// accounting, not FIFO/LIFO); zero-quantity postings are dividends.
/// Division-by-zero guards yield 0% instead of propagating.
#[must_use]
pub fn investment_snapshot(
    account: &Account,
    postings: &[AccountPosting],
    reporting_currency: &str,
    prices: &PriceBook,
    as_of: NaiveDate,
) -> InvestmentSnapshot {
    // Position currency: the transaction currency of the postings
    // (uniform per account by convention), reporting currency when
    // the account has no activity yet.
    let position_currency: Symbol = postings
        .first()
        .map_or_else(|| Symbol::new(reporting_currency), |p| p.currency.clone());

    let mut quantity = Decimal::ZERO;
    let mut cost = Decimal::ZERO;
    let mut avg_price = Decimal::ZERO;
    let mut realized = Decimal::ZERO;
    let mut dividends: Vec<Dividend> = Vec::new();
    let mut dividend_sum = Decimal::ZERO;
    let mut processed = 0usize;

    for posting in postings {
        if posting.date > as_of {
            break;
        }
        processed += 1;

        if posting.quantity.is_zero() {
            // No unit change: dividend income posted against the
            // position.
            let amount = Money::new(posting.value, posting.currency.clone());
            let (amount_in_currency, _) = prices.convert(&amount, reporting_currency, as_of);
            dividend_sum += posting.value;
            dividends.push(Dividend {
                when: posting.date,
                amount,
                amount_in_currency,
            });
        } else if posting.quantity > Decimal::ZERO {
            // Buy: basis grows by the amount paid.
            cost += posting.value;
            quantity += posting.quantity;
            avg_price = if quantity.is_zero() {
                Decimal::ZERO
            } else {
                cost / quantity
            };
        } else {
            // Sell: realize against the blended cost; the average is
            // untouched.
            let units_sold = posting.quantity.abs();
            let proceeds = posting.value.abs();
            let basis_removed = avg_price * units_sold;
            realized += proceeds - basis_removed;
            cost -= basis_removed;
            quantity += posting.quantity;
            trace!(
                %units_sold,
                %proceeds,
                %basis_removed,
                "realized sale"
            );
        }
    }

    let price = prices.rate(&account.commodity, &position_currency, as_of);
    let value = quantity * price.value;

    let unrealized = value - cost;
    let unrealized_pct = pct_of_cost(unrealized, cost);
    let realized_pct = pct_of_cost(realized, cost);

    let cost_money = Money::new(cost, position_currency.clone());
    let value_money = Money::new(value, position_currency.clone());
    let realized_money = Money::new(realized, position_currency.clone());
    let dividends_money = Money::new(dividend_sum, position_currency.clone());

    let (value_in_currency, _) = prices.convert(&value_money, reporting_currency, as_of);
    let (cost_in_currency, _) = prices.convert(&cost_money, reporting_currency, as_of);
    let (realized_profit_in_currency, _) =
        prices.convert(&realized_money, reporting_currency, as_of);
    let (realized_dividends_in_currency, _) =
        prices.convert(&dividends_money, reporting_currency, as_of);

    InvestmentSnapshot {
        quantity,
        avg_price: Money::new(avg_price, position_currency.clone()),
        unrealized_profit: Money::new(unrealized, position_currency),
        unrealized_profit_pct: unrealized_pct,
        realized_profit_pct: realized_pct,
        cost: cost_money,
        value: value_money,
        realized_profit: realized_money,
        realized_dividends: dividends_money,
        dividends,
        is_closed: processed > 0 && quantity.is_zero(),
        value_in_currency,
        cost_in_currency,
        realized_profit_in_currency,
        realized_dividends_in_currency,
    }
}

/// Percentage of cost with the zero-cost guard: 0% instead of a NaN
/// or infinity.
fn pct_of_cost(part: Decimal, cost: Decimal) -> Decimal {
    if cost.is_zero() {
        Decimal::ZERO
    } else {
        part / cost * Decimal::ONE_HUNDRED
    }
}
