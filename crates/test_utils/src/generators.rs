//! Property-Based Test Generators
//!
//! Proptest strategies for amounts, order lines and return batches.

use proptest::prelude::*;
use rust_decimal::Decimal;

/// Whole-rupee amount between `min` and `max` inclusive
pub fn amount_strategy(min: i64, max: i64) -> impl Strategy<Value = Decimal> {
    (min..=max).prop_map(Decimal::from)
}

/// Amount with cents, between 1.00 and 100,000.00
pub fn amount_with_cents_strategy() -> impl Strategy<Value = Decimal> {
    (100i64..=10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Item discount percentage: 0, a round figure, or one with decimals
pub fn discount_percent_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(Decimal::ZERO),
        (1i64..=50).prop_map(Decimal::from),
        (1i64..=5000).prop_map(|bp| Decimal::new(bp, 2)),
    ]
}

/// One order line: quantity, unit price and item discount percentage
pub fn order_line_strategy() -> impl Strategy<Value = (u32, Decimal, Decimal)> {
    (1u32..=50, amount_with_cents_strategy(), discount_percent_strategy())
}

/// Between one and five order lines
pub fn order_lines_strategy() -> impl Strategy<Value = Vec<(u32, Decimal, Decimal)>> {
    prop::collection::vec(order_line_strategy(), 1..=5)
}

/// Order-level discount as a percentage of the subtotal
pub fn order_discount_percent_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=30).prop_map(Decimal::from)
}

/// Return quantities per line, including zero and negative entries
pub fn return_quantities_strategy(lines: usize) -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-3i64..=60, lines)
}
