//! Tests for Money, Rate and line pricing

use core_kernel::{compute_line_total, Currency, Money, MoneyError, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn lkr(amount: Decimal) -> Money {
    Money::new(amount, Currency::LKR)
}

mod creation {
    use super::*;

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = lkr(dec!(100.123456789));
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_sum_of_empty_is_zero() {
        let total = Money::sum(Currency::LKR, Vec::new());
        assert!(total.is_zero());
        assert_eq!(total.currency(), Currency::LKR);
    }

    #[test]
    fn test_sum_adds_amounts() {
        let total = Money::sum(Currency::LKR, vec![lkr(dec!(4000)), lkr(dec!(1000.50))]);
        assert_eq!(total.amount(), dec!(5000.50));
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_sub_mismatch() {
        let a = lkr(dec!(10));
        let b = Money::new(dec!(10), Currency::USD);
        assert!(matches!(a.checked_sub(&b), Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_checked_add_overflow() {
        let half = lkr(Decimal::MAX / dec!(2) + dec!(1000));
        assert_eq!(half.checked_add(&half), Err(MoneyError::Overflow));
        assert_eq!(Money::checked_sum(Currency::LKR, vec![half, half]), Err(MoneyError::Overflow));
        assert_eq!(lkr(Decimal::MIN).checked_sub(&lkr(dec!(1))), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_checked_sum_adds_amounts() {
        let total = Money::checked_sum(Currency::LKR, vec![lkr(dec!(700)), lkr(dec!(300))]).unwrap();
        assert_eq!(total.amount(), dec!(1000));
    }

    #[test]
    fn test_amount_limit() {
        assert!(lkr(Money::MAX_AMOUNT).is_within_limit());
        assert!(lkr(-Money::MAX_AMOUNT).is_within_limit());
        assert!(!lkr(Money::MAX_AMOUNT + dec!(0.01)).is_within_limit());
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(lkr(dec!(10)).divide(Decimal::ZERO), Err(MoneyError::DivisionByZero));
    }

    #[test]
    fn test_unit_value_rescale() {
        // 3 units for 1000 keeps its per-unit value when rescaled to 2 units
        let unit = lkr(dec!(1000)).divide(dec!(3)).unwrap();
        assert_eq!(unit.multiply(dec!(2)).round_to_currency().amount(), dec!(666.67));
    }

    #[test]
    fn test_ratio_of_discount() {
        let discount = lkr(dec!(1000));
        let subtotal = lkr(dec!(10000));
        assert_eq!(discount.ratio_of(&subtotal).unwrap(), dec!(0.1));
    }
}

mod display {
    use super::*;

    #[test]
    fn test_money_display() {
        assert_eq!(lkr(dec!(1234.5)).to_string(), "Rs 1234.50");
    }

    #[test]
    fn test_rate_display() {
        assert!(Rate::from_percentage(dec!(12.5)).to_string().starts_with("12.5"));
    }
}

mod pricing {
    use super::*;

    #[test]
    fn test_line_total_matches_manual_arithmetic() {
        let line = compute_line_total(lkr(dec!(1500)), 2, dec!(5));
        assert_eq!(line.gross.amount(), dec!(3000));
        assert_eq!(line.discount_amount.amount(), dec!(150));
        assert_eq!(line.total.amount(), dec!(2850));
    }

    #[test]
    fn test_gross_equals_discount_plus_total() {
        let line = compute_line_total(lkr(dec!(19.99)), 7, dec!(12.5));
        assert_eq!(line.gross, line.discount_amount + line.total);
    }
}
