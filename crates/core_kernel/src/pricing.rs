//! Line pricing
//!
//! `compute_line_total` is the one place a line's discount and total are
//! derived from its primitive fields. Billing, purchasing and the return
//! processor all call it instead of trusting a persisted line total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{Money, Rate};

/// The derived figures of a priced line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTotal {
    /// Unit price times quantity
    pub gross: Money,
    /// Discount taken off the gross amount
    pub discount_amount: Money,
    /// Gross minus discount
    pub total: Money,
}

/// Computes a line's discount and total from unit price, quantity and
/// discount percentage
///
/// The discount is rounded to the currency's decimal places and the total
/// is derived from the rounded discount, so `gross == discount_amount + total`
/// holds exactly.
///
/// # Example
///
/// ```
/// use core_kernel::{compute_line_total, Money, Currency};
/// use rust_decimal_macros::dec;
///
/// let line = compute_line_total(Money::new(dec!(250), Currency::LKR), 4, dec!(10));
/// assert_eq!(line.discount_amount.amount(), dec!(100));
/// assert_eq!(line.total.amount(), dec!(900));
/// ```
pub fn compute_line_total(unit_price: Money, quantity: u32, discount_percent: Decimal) -> LineTotal {
    let gross = unit_price.multiply(Decimal::from(quantity)).round_to_currency();
    let discount_amount = Rate::from_percentage(discount_percent)
        .apply(&gross)
        .round_to_currency();

    LineTotal {
        gross,
        discount_amount,
        total: gross - discount_amount,
    }
}
