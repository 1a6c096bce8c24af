//! Core types for homeledger
//!
//! This crate provides the data model shared by the ledger engine:
//!
//! - [`Symbol`] - Interned commodity mnemonics and currency codes
//! - [`Rational`] - Exact numerator/denominator transport values
//! - [`Money`] - A decimal amount tagged with a commodity
//! - [`Commodity`] - Currency or investment reference data
//! - [`Account`] / [`AccountTree`] - The checked account hierarchy
//! - [`Transaction`] / [`Split`] - Double-entry records
//!
//! Everything here is plain immutable data: validation lives in
//! `homeledger-validate`, price resolution in `homeledger-prices`,
//! and reporting in `homeledger-report`. Storage collaborators load
//! and save these types (serde) but the engine never does I/O.
//!
//! # Example
//!
//! ```
//! use homeledger_core::{Money, Rational, Split, Transaction};
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let tx = Transaction::new(
//!     "t1",
//!     NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
//!     "EUR",
//!     "Salary",
//!     vec![
//!         Split::even("s1", "t1", "acct-bank", Rational::new(250000, 100)),
//!         Split::even("s2", "t1", "acct-salary", Rational::new(-250000, 100)),
//!     ],
//! );
//!
//! let posted = Money::new(tx.splits[0].value.to_decimal()?, tx.currency.clone());
//! assert_eq!(posted.amount, dec!(2500));
//! # Ok::<(), homeledger_core::RationalError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod commodity;
pub mod intern;
pub mod money;
pub mod rational;
pub mod transaction;

pub use account::{Account, AccountTree, AccountType, SignConstraint, TreeError};
pub use commodity::{Commodity, Namespace};
pub use intern::{Symbol, SymbolTable};
pub use money::{Money, MoneyError};
pub use rational::{Rational, RationalError};
pub use transaction::{Split, Transaction};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
