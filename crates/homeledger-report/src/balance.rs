//! Account-tree balance aggregation.
//!
//! [`aggregate`] walks the account hierarchy post-order from each
//! requested root, converting every child subtotal into its parent's
//! commodity through the price book and summing upward. Direct
//! children of a requested root additionally roll up into per-category
//! totals keyed by [`AccountType`], the canonical input for balance
//! sheets, income statements and net-worth views.
//!
//! Missing prices degrade to the book's 1:1 fallback; aggregation
//! never aborts on incomplete price history.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, trace};

use homeledger_core::{Account, AccountTree, AccountType, Money};
use homeledger_prices::PriceBook;

/// Totals produced by one aggregation pass.
///
/// Account totals and category totals are separate maps; category
/// keys are typed rather than mangled into the guid namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct BalanceReport {
    /// Aggregated total per account guid, in each account's own
    /// commodity. Contains every account reachable from the requested
    /// roots.
    pub account_totals: HashMap<String, Money>,
    /// Per-category totals over the direct children of the requested
    /// roots.
    pub category_totals: HashMap<AccountType, Money>,
}

/// Aggregate account balances as of a date.
///
/// `leaf_totals` is the externally pre-computed sum of split
/// quantities per account (a `GROUP BY` over splits up to `as_of`,
/// supplied by the storage collaborator); accounts without an entry
/// count as zero in their own commodity. The map is only read, never
/// mutated; repeated calls with identical inputs produce identical
/// output.
#[must_use]
pub fn aggregate(
    roots: &[&str],
    tree: &AccountTree,
    prices: &PriceBook,
    as_of: NaiveDate,
    leaf_totals: &HashMap<String, Money>,
) -> BalanceReport {
    let mut report = BalanceReport::default();

    for root in roots {
        let Some(account) = tree.get(root) else {
            debug!(root, "aggregation root not found, skipping");
            continue;
        };

        let total = aggregate_account(account, tree, prices, as_of, leaf_totals, &mut report);
        report.account_totals.insert(account.guid.clone(), total);

        for child_guid in &account.children {
            let Some(child) = tree.get(child_guid) else {
                continue;
            };
            let Some(child_total) = report.account_totals.get(child_guid).cloned() else {
                continue;
            };
            roll_into_category(&mut report, child.account_type, child_total, prices, as_of);
        }
    }

    report
}

/// Post-order: children first, each converted into this account's
/// commodity, then this account's own leaf total.
fn aggregate_account(
    account: &Account,
    tree: &AccountTree,
    prices: &PriceBook,
    as_of: NaiveDate,
    leaf_totals: &HashMap<String, Money>,
    report: &mut BalanceReport,
) -> Money {
    let mut total = own_total(account, prices, as_of, leaf_totals);

    for child_guid in &account.children {
        let Some(child) = tree.get(child_guid) else {
            continue;
        };
        let child_total = aggregate_account(child, tree, prices, as_of, leaf_totals, report);
        let (converted, rate) = prices.convert(&child_total, &account.commodity, as_of);
        if rate.is_fallback() && child.commodity != account.commodity {
            trace!(
                child = %child.guid,
                from = %child.commodity,
                to = %account.commodity,
                "no price for child subtotal, using 1:1 fallback"
            );
        }
        total += &converted;
        report
            .account_totals
            .insert(child.guid.clone(), child_total);
    }

    total
}

/// The account's direct split sum, defaulting to zero in its own
/// commodity (placeholders have no direct splits by definition).
fn own_total(
    account: &Account,
    prices: &PriceBook,
    as_of: NaiveDate,
    leaf_totals: &HashMap<String, Money>,
) -> Money {
    match leaf_totals.get(&account.guid) {
        Some(money) if money.commodity == account.commodity => money.clone(),
        // Storage handed a subtotal in a foreign commodity; convert
        // rather than corrupt the sum.
        Some(money) => prices.convert(money, &account.commodity, as_of).0,
        None => Money::zero(account.commodity.clone()),
    }
}

/// Accumulate a direct root child into its category bucket. Later
/// same-type children are converted into the first-seen entry's
/// commodity before summing.
fn roll_into_category(
    report: &mut BalanceReport,
    category: AccountType,
    total: Money,
    prices: &PriceBook,
    as_of: NaiveDate,
) {
    match report.category_totals.get_mut(&category) {
        Some(existing) => {
            let (converted, _) = prices.convert(&total, &existing.commodity, as_of);
            *existing += &converted;
        }
        None => {
            report.category_totals.insert(category, total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homeledger_core::{Commodity, Namespace};
    use homeledger_prices::PriceQuote;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn account(
        guid: &str,
        parent: Option<&str>,
        account_type: AccountType,
        commodity: &str,
        children: &[&str],
    ) -> Account {
        Account::new(
            guid,
            parent.map(String::from),
            account_type,
            commodity,
        )
        .with_children(children.iter().map(|c| (*c).to_string()).collect())
    }

    fn money(amount: rust_decimal::Decimal, commodity: &str) -> Money {
        Money::new(amount, commodity)
    }

    #[test]
    fn leaf_total_defaults_to_zero() {
        let tree = AccountTree::build(vec![
            account("root", None, AccountType::Root, "EUR", &["bank"]),
            account("bank", Some("root"), AccountType::Bank, "EUR", &[]),
        ])
        .unwrap();

        let report = aggregate(
            &["root"],
            &tree,
            &PriceBook::new(),
            date(2024, 1, 1),
            &HashMap::new(),
        );

        assert_eq!(report.account_totals["bank"], Money::zero("EUR"));
        assert_eq!(report.account_totals["root"], Money::zero("EUR"));
        assert_eq!(report.category_totals[&AccountType::Bank], Money::zero("EUR"));
    }

    #[test]
    fn converts_children_into_parent_commodity() {
        let tree = AccountTree::build(vec![
            account("root", None, AccountType::Root, "EUR", &["expenses"]),
            account(
                "expenses",
                Some("root"),
                AccountType::Expense,
                "EUR",
                &["a5", "a6"],
            ),
            account("a5", Some("expenses"), AccountType::Expense, "EUR", &[]),
            account("a6", Some("expenses"), AccountType::Expense, "USD", &[]),
        ])
        .unwrap();

        let mut book = PriceBook::new();
        book.upsert(PriceQuote::new("USD", "EUR", date(2024, 1, 1), dec!(0.9)));

        let mut leaves = HashMap::new();
        leaves.insert("a5".to_string(), money(dec!(500), "EUR"));
        leaves.insert("a6".to_string(), money(dec!(200), "USD"));

        let report = aggregate(&["root"], &tree, &book, date(2024, 6, 1), &leaves);

        // 500 + 200 * 0.9
        assert_eq!(report.account_totals["expenses"].amount, dec!(680.0));
        assert_eq!(
            report.category_totals[&AccountType::Expense].amount,
            dec!(680.0)
        );
        // leaf totals preserved in their own commodities
        assert_eq!(report.account_totals["a6"], money(dec!(200), "USD"));
    }

    #[test]
    fn investment_children_valued_through_price_book() {
        let tree = AccountTree::build(vec![
            account("root", None, AccountType::Root, "EUR", &["assets"]),
            account(
                "assets",
                Some("root"),
                AccountType::Asset,
                "EUR",
                &["h1", "h2"],
            ),
            account("h1", Some("assets"), AccountType::Stock, "TICKER1", &[]),
            account("h2", Some("assets"), AccountType::Stock, "TICKER2", &[]),
        ])
        .unwrap();

        let commodities = [
            Commodity::currency("EUR"),
            Commodity::currency("USD"),
            Commodity::new("t1", "TICKER1", Namespace::Stock),
            Commodity::new("t2", "TICKER2", Namespace::Stock),
        ];
        let book = PriceBook::from_snapshot(
            commodities.iter(),
            [
                PriceQuote::new("TICKER1", "EUR", date(2024, 1, 1), dec!(100)),
                PriceQuote::new("TICKER2", "USD", date(2024, 1, 1), dec!(50)),
                PriceQuote::new("USD", "EUR", date(2024, 1, 1), dec!(0.9)),
            ],
        );

        let mut leaves = HashMap::new();
        leaves.insert("h1".to_string(), money(dec!(2), "TICKER1"));
        leaves.insert("h2".to_string(), money(dec!(5), "TICKER2"));

        let report = aggregate(&["root"], &tree, &book, date(2024, 6, 1), &leaves);

        // 2*100 + 5*50*0.9 = 425
        assert_eq!(report.account_totals["assets"].amount, dec!(425.0));
        assert_eq!(
            report.category_totals[&AccountType::Asset].amount,
            dec!(425.0)
        );
    }

    #[test]
    fn missing_prices_fall_back_to_parity() {
        let tree = AccountTree::build(vec![
            account("root", None, AccountType::Root, "EUR", &["cash"]),
            account("cash", Some("root"), AccountType::Cash, "CHF", &[]),
        ])
        .unwrap();

        let mut leaves = HashMap::new();
        leaves.insert("cash".to_string(), money(dec!(120), "CHF"));

        // Empty price book: CHF child still aggregates at 1:1.
        let report = aggregate(
            &["root"],
            &tree,
            &PriceBook::new(),
            date(2024, 1, 1),
            &leaves,
        );

        assert_eq!(report.account_totals["root"].amount, dec!(120));
        assert_eq!(report.account_totals["root"].commodity, "EUR");
    }

    #[test]
    fn same_category_siblings_accumulate() {
        let tree = AccountTree::build(vec![
            account("root", None, AccountType::Root, "EUR", &["e1", "e2"]),
            account("e1", Some("root"), AccountType::Expense, "EUR", &[]),
            account("e2", Some("root"), AccountType::Expense, "USD", &[]),
        ])
        .unwrap();

        let mut book = PriceBook::new();
        book.upsert(PriceQuote::new("USD", "EUR", date(2024, 1, 1), dec!(0.5)));

        let mut leaves = HashMap::new();
        leaves.insert("e1".to_string(), money(dec!(10), "EUR"));
        leaves.insert("e2".to_string(), money(dec!(30), "USD"));

        let report = aggregate(&["root"], &tree, &book, date(2024, 2, 1), &leaves);

        // Second sibling converts into the first entry's commodity.
        assert_eq!(
            report.category_totals[&AccountType::Expense],
            money(dec!(25.0), "EUR")
        );
    }

    #[test]
    fn aggregate_does_not_mutate_inputs_and_is_idempotent() {
        let tree = AccountTree::build(vec![
            account("root", None, AccountType::Root, "EUR", &["bank"]),
            account("bank", Some("root"), AccountType::Bank, "EUR", &[]),
        ])
        .unwrap();

        let mut leaves = HashMap::new();
        leaves.insert("bank".to_string(), money(dec!(77), "EUR"));
        let before = leaves.clone();

        let book = PriceBook::new();
        let first = aggregate(&["root"], &tree, &book, date(2024, 1, 1), &leaves);
        let second = aggregate(&["root"], &tree, &book, date(2024, 1, 1), &leaves);

        assert_eq!(first, second);
        assert_eq!(leaves, before);
    }

    #[test]
    fn unknown_root_is_skipped() {
        let tree = AccountTree::build(vec![account(
            "root",
            None,
            AccountType::Root,
            "EUR",
            &[],
        )])
        .unwrap();

        let report = aggregate(
            &["ghost"],
            &tree,
            &PriceBook::new(),
            date(2024, 1, 1),
            &HashMap::new(),
        );
        assert!(report.account_totals.is_empty());
    }
}
