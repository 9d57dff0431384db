//! Custom Test Assertions
//!
//! Assertion helpers for ledger invariants, with messages that show the
//! figures involved.

use core_kernel::Money;
use domain_receivables::{Order, OrderItem};
use rust_decimal::Decimal;

/// Asserts that a Money value has the expected amount
pub fn assert_money_eq(actual: Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Expected {} {}, got {}",
        actual.currency().symbol(),
        expected,
        actual
    );
}

/// Asserts that a Money value is not negative
pub fn assert_money_non_negative(money: Money) {
    assert!(
        !money.is_negative(),
        "Expected a non-negative amount, got {}",
        money
    );
}

/// Asserts `total == subtotal - discount` and `subtotal == sum(line totals)`
pub fn assert_order_totals_consistent(order: &Order, items: &[OrderItem]) {
    assert!(
        order.totals_consistent(),
        "Order {} total {} != subtotal {} - discount {}",
        order.order_number,
        order.total_amount,
        order.subtotal,
        order.discount_amount
    );

    let lines = Money::sum(order.subtotal.currency(), items.iter().map(|i| i.line_total));
    assert_eq!(
        lines, order.subtotal,
        "Order {} subtotal {} != sum of line totals {}",
        order.order_number, order.subtotal, lines
    );
}
