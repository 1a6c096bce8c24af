//! Read-path reporting over a validated ledger.
//!
//! Two projections live here, both pure functions over data the caller
//! supplies:
//!
//! - [`aggregate`] rolls account balances up the tree as of a date,
//!   converting commodities through a [`PriceBook`] and bucketing the
//!   top-level children into per-category totals.
//! - [`investment_snapshot`] replays an investment account's postings
//!   into an average-cost position view with realized and unrealized
//!   profit and dividend history.
//!
//! Neither function touches storage or holds state between calls;
//! changing the view date means calling again with a different
//! `as_of`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod balance;
pub mod investment;

pub use balance::{aggregate, BalanceReport};
pub use investment::{investment_snapshot, AccountPosting, Dividend, InvestmentSnapshot};

pub use homeledger_prices::PriceBook;
