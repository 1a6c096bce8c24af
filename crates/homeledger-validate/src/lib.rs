//! Write-path validation for proposed transactions.
//!
//! [`validate_transaction`] is consulted at the moment a transaction
//! is proposed, before it is allowed to mutate state. It is a pure
//! function over the transaction and the account tree: no I/O, no
//! price lookups (balance is checked in transaction-currency units
//! only), and idempotent.
//!
//! The error taxonomy is closed and name-stable so that callers can
//! map each failure to a specific user-facing message:
//!
//! | Kind | Description |
//! |------|-------------|
//! | `splitsNum` | Fewer than two splits on a non-investment transaction |
//! | `splitsDuplicateAccounts` | Two splits posted to the same account |
//! | `fieldMissing` | A split references an account that does not exist |
//! | `invalidNumber` | A split value or quantity is not a valid rational |
//! | `valueSymbol` | Sign convention violated for an income/expense account |
//! | `splitsBalance` | Split values do not sum to zero within tolerance |
//!
//! Checks run in that order and the first violation wins. A lone
//! split posted to an investment account is exempt from both the
//! two-split minimum and the balance check: its offsetting leg is
//! brokerage-held and implicit.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use rust_decimal::Decimal;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

use homeledger_core::{AccountTree, SignConstraint, Transaction};

pub use homeledger_core::TreeError;
pub use tree::{check_account_removable, validate_tree};

mod tree;

/// A rejected transaction, first violation wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Fewer than two splits and no investment-typed account involved.
    #[error("transaction {transaction} needs at least two splits, got {count}")]
    SplitsNum {
        /// Offending transaction guid.
        transaction: String,
        /// Number of splits present.
        count: usize,
    },
    /// The same account appears on more than one split.
    #[error("transaction {transaction} posts account {account} more than once")]
    SplitsDuplicateAccounts {
        /// Offending transaction guid.
        transaction: String,
        /// The repeated account guid.
        account: String,
    },
    /// A split references an account missing from the tree.
    #[error("split {split} references unknown account {account}")]
    FieldMissing {
        /// Offending split guid.
        split: String,
        /// The unresolvable account guid.
        account: String,
    },
    /// A split value or quantity cannot be read as a number.
    #[error("split {split} carries an invalid {field} ({detail})")]
    InvalidNumber {
        /// Offending split guid.
        split: String,
        /// Which field was invalid, `value` or `quantity`.
        field: &'static str,
        /// Underlying conversion failure.
        detail: String,
    },
    /// Sign convention violated: income must post `<= 0`, expense
    /// `>= 0`.
    #[error("split {split} on {account} violates the sign convention (value {value})")]
    ValueSymbol {
        /// Offending split guid.
        split: String,
        /// Account the split posts to.
        account: String,
        /// The signed value found.
        value: Decimal,
    },
    /// Split values do not cancel out in the transaction currency.
    #[error("transaction {transaction} is unbalanced by {residual} {currency}")]
    SplitsBalance {
        /// Offending transaction guid.
        transaction: String,
        /// Signed residual left after summing all split values.
        residual: Decimal,
        /// Transaction currency.
        currency: String,
    },
}

impl LedgerError {
    /// Stable kind tag for user-facing error mapping.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SplitsNum { .. } => "splitsNum",
            Self::SplitsDuplicateAccounts { .. } => "splitsDuplicateAccounts",
            Self::FieldMissing { .. } => "fieldMissing",
            Self::InvalidNumber { .. } => "invalidNumber",
            Self::ValueSymbol { .. } => "valueSymbol",
            Self::SplitsBalance { .. } => "splitsBalance",
        }
    }
}

/// Tunables for validation.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Absolute tolerance on the split-value sum, absorbing
    /// rational-to-decimal rounding. One thousandth of a currency
    /// unit by default; confirm against historical fixtures before
    /// changing.
    pub balance_tolerance: Decimal,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            // 0.001
            balance_tolerance: Decimal::new(1, 3),
        }
    }
}

/// Validate a proposed transaction with default options.
pub fn validate_transaction(
    transaction: &Transaction,
    accounts: &AccountTree,
) -> Result<(), LedgerError> {
    validate_transaction_with_options(transaction, accounts, &ValidationOptions::default())
}

/// Validate a proposed transaction.
///
/// Pure and side-effect free; a failure must block the mutation on
/// the write path (no partial writes).
pub fn validate_transaction_with_options(
    transaction: &Transaction,
    accounts: &AccountTree,
    options: &ValidationOptions,
) -> Result<(), LedgerError> {
    check_splits_num(transaction, accounts)?;
    check_duplicate_accounts(transaction)?;
    check_split_fields(transaction, accounts)?;
    check_value_signs(transaction, accounts)?;
    if !single_investment_leg(transaction, accounts) {
        check_balance(transaction, options)?;
    }
    Ok(())
}

/// A lone split posted to an investment account. Such transactions
/// bypass the two-split minimum and the balance check; the lone value
/// cannot cancel out by construction.
fn single_investment_leg(transaction: &Transaction, accounts: &AccountTree) -> bool {
    transaction.splits.len() < 2
        && transaction.splits.iter().any(|split| {
            accounts
                .get(&split.account)
                .is_some_and(|account| account.account_type.is_investment())
        })
}

/// At least two splits, unless the investment exemption applies.
fn check_splits_num(
    transaction: &Transaction,
    accounts: &AccountTree,
) -> Result<(), LedgerError> {
    if transaction.splits.len() >= 2 || single_investment_leg(transaction, accounts) {
        return Ok(());
    }
    debug!(
        transaction = %transaction.guid,
        count = transaction.splits.len(),
        "rejected: too few splits"
    );
    Err(LedgerError::SplitsNum {
        transaction: transaction.guid.clone(),
        count: transaction.splits.len(),
    })
}

fn check_duplicate_accounts(transaction: &Transaction) -> Result<(), LedgerError> {
    let mut seen = HashSet::with_capacity(transaction.splits.len());
    for split in &transaction.splits {
        if !seen.insert(split.account.as_str()) {
            return Err(LedgerError::SplitsDuplicateAccounts {
                transaction: transaction.guid.clone(),
                account: split.account.clone(),
            });
        }
    }
    Ok(())
}

/// Every split resolves to an account and carries convertible
/// rationals.
fn check_split_fields(
    transaction: &Transaction,
    accounts: &AccountTree,
) -> Result<(), LedgerError> {
    for split in &transaction.splits {
        if accounts.get(&split.account).is_none() {
            return Err(LedgerError::FieldMissing {
                split: split.guid.clone(),
                account: split.account.clone(),
            });
        }
        for (field, rational) in [("value", &split.value), ("quantity", &split.quantity)] {
            if let Err(err) = rational.to_decimal() {
                return Err(LedgerError::InvalidNumber {
                    split: split.guid.clone(),
                    field,
                    detail: err.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn check_value_signs(
    transaction: &Transaction,
    accounts: &AccountTree,
) -> Result<(), LedgerError> {
    for split in &transaction.splits {
        let Some(account) = accounts.get(&split.account) else {
            continue; // already rejected by check_split_fields
        };
        let Some(constraint) = account.account_type.sign_constraint() else {
            continue;
        };
        // Field checks ran first, so the conversion cannot fail here.
        let value = split.value.to_decimal().unwrap_or_default();
        let violated = match constraint {
            SignConstraint::NonPositive => value > Decimal::ZERO,
            SignConstraint::NonNegative => value < Decimal::ZERO,
        };
        if violated {
            debug!(
                split = %split.guid,
                account = %split.account,
                %value,
                "rejected: sign convention"
            );
            return Err(LedgerError::ValueSymbol {
                split: split.guid.clone(),
                account: split.account.clone(),
                value,
            });
        }
    }
    Ok(())
}

/// Split values are already in the transaction currency, so balance
/// is a direct sum; no price resolution is ever involved here.
fn check_balance(
    transaction: &Transaction,
    options: &ValidationOptions,
) -> Result<(), LedgerError> {
    let mut residual = Decimal::ZERO;
    for split in &transaction.splits {
        residual += split.value.to_decimal().unwrap_or_default();
    }
    if residual.abs() > options.balance_tolerance {
        debug!(
            transaction = %transaction.guid,
            %residual,
            "rejected: unbalanced"
        );
        return Err(LedgerError::SplitsBalance {
            transaction: transaction.guid.clone(),
            residual,
            currency: transaction.currency.to_string(),
        });
    }
    Ok(())
}
