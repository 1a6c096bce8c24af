//! Property-based tests for transaction validation.
//!
//! Randomized transactions exercise the balance and sign checks:
//! structurally sound, balanced transactions must always pass, and
//! unbalanced ones must always be rejected with the balance error,
//! regardless of the amounts involved.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use homeledger_core::{Account, AccountTree, AccountType, Rational, Split, Transaction};
use homeledger_validate::{validate_transaction, LedgerError};

fn tree() -> AccountTree {
    let root = Account::new("root", None, AccountType::Root, "EUR")
        .with_children(vec![
            "bank".into(),
            "cash".into(),
            "food".into(),
            "salary".into(),
        ])
        .placeholder();
    AccountTree::build(vec![
        root,
        Account::new("bank", Some("root".into()), AccountType::Bank, "EUR"),
        Account::new("cash", Some("root".into()), AccountType::Cash, "EUR"),
        Account::new("food", Some("root".into()), AccountType::Expense, "EUR"),
        Account::new("salary", Some("root".into()), AccountType::Income, "EUR"),
    ])
    .unwrap()
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2020i32..2026, 1u32..13, 1u32..29)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Cent amounts as rationals over denominator 100.
fn cents_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000
}

fn tx(date: NaiveDate, splits: Vec<Split>) -> Transaction {
    Transaction::new("t1", date, "EUR", "generated", splits)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A two-leg transfer between unconstrained accounts with values
    /// summing to exactly zero always validates.
    #[test]
    fn balanced_transfer_always_passes(
        date in date_strategy(),
        cents in cents_strategy(),
    ) {
        let t = tx(date, vec![
            Split::even("s1", "t1", "cash", Rational::new(cents, 100)),
            Split::even("s2", "t1", "bank", Rational::new(-cents, 100)),
        ]);
        prop_assert!(validate_transaction(&t, &tree()).is_ok());
    }

    /// Any residual beyond the tolerance is rejected as a balance
    /// error, and the reported residual matches the skew.
    #[test]
    fn unbalanced_transfer_always_rejected(
        date in date_strategy(),
        cents in cents_strategy(),
        skew in 1i64..100_000,
    ) {
        let t = tx(date, vec![
            Split::even("s1", "t1", "cash", Rational::new(cents + skew, 100)),
            Split::even("s2", "t1", "bank", Rational::new(-cents, 100)),
        ]);
        match validate_transaction(&t, &tree()) {
            Err(LedgerError::SplitsBalance { residual, .. }) => {
                prop_assert_eq!(residual, Decimal::new(skew, 2));
            }
            other => prop_assert!(false, "expected SplitsBalance, got {:?}", other),
        }
    }

    /// Income accounts never accept positive values, whatever the
    /// amount on the other leg.
    #[test]
    fn positive_income_always_rejected(
        date in date_strategy(),
        cents in cents_strategy(),
    ) {
        let t = tx(date, vec![
            Split::even("s1", "t1", "salary", Rational::new(cents, 100)),
            Split::even("s2", "t1", "bank", Rational::new(-cents, 100)),
        ]);
        prop_assert_eq!(
            validate_transaction(&t, &tree()).unwrap_err().kind(),
            "valueSymbol"
        );
    }

    /// Validation is a pure function: same inputs, same verdict.
    #[test]
    fn verdict_is_deterministic(
        date in date_strategy(),
        cents in cents_strategy(),
        skew in 0i64..200,
    ) {
        let t = tx(date, vec![
            Split::even("s1", "t1", "food", Rational::new(cents + skew, 100)),
            Split::even("s2", "t1", "bank", Rational::new(-cents, 100)),
        ]);
        let accounts = tree();
        prop_assert_eq!(
            validate_transaction(&t, &accounts),
            validate_transaction(&t, &accounts)
        );
    }
}
