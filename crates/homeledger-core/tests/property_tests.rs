//! Property tests for the core value types.
//!
//! Randomized inputs pin the exactness of rational conversion and the
//! commodity discipline of money arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;

use homeledger_core::{Money, MoneyError, Rational};

/// Denominators whose decimal expansion terminates, so conversion is
/// exact and scaling back recovers the numerator.
fn terminating_denom() -> impl Strategy<Value = i64> {
    prop::sample::select(vec![1i64, 2, 4, 5, 8, 10, 20, 25, 50, 100, 1000])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn terminating_rationals_convert_exactly(
        numer in -1_000_000i64..1_000_000,
        denom in terminating_denom(),
    ) {
        let d = Rational::new(numer, denom).to_decimal().unwrap();
        prop_assert_eq!(d * Decimal::from(denom), Decimal::from(numer));
    }

    #[test]
    fn zero_denominator_always_fails(numer in any::<i64>()) {
        prop_assert!(!Rational::new(numer, 0).is_valid());
        prop_assert!(Rational::new(numer, 0).to_decimal().is_err());
    }

    /// Same-commodity addition commutes and negation cancels.
    #[test]
    fn money_addition_commutes(
        a in -1_000_000i64..1_000_000,
        b in -1_000_000i64..1_000_000,
    ) {
        let x = Money::new(Decimal::new(a, 2), "EUR");
        let y = Money::new(Decimal::new(b, 2), "EUR");
        prop_assert_eq!(&x + &y, &y + &x);
        prop_assert_eq!((&x + &(-&x)).amount, Decimal::ZERO);
    }

    /// Crossing commodities is an error for every amount, not just the
    /// obvious ones.
    #[test]
    fn cross_commodity_checked_ops_fail(a in any::<i32>(), b in any::<i32>()) {
        let eur = Money::new(Decimal::from(a), "EUR");
        let usd = Money::new(Decimal::from(b), "USD");
        prop_assert!(
            matches!(
                eur.checked_add(&usd),
                Err(MoneyError::CommodityMismatch { .. })
            ),
            "expected CommodityMismatch from checked_add across commodities"
        );
        prop_assert!(eur.checked_cmp(&usd).is_err());
    }
}
