//! Orders, order items, products and inventory movements

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{
    compute_line_total, CoreError, CustomerId, InventoryTransactionId, Money, MoneyError,
    OrderId, OrderItemId, ProductId,
};
use domain_treasury::PaymentStatus;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Confirmed,
    Processing,
    Completed,
    /// Logical cancellation; rows are never deleted
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(OrderStatus::Draft),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "processing" => Ok(OrderStatus::Processing),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(CoreError::unknown_value("order status", other)),
        }
    }
}

/// A customer order (invoice)
///
/// `total_amount == subtotal - discount_amount` after every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub customer_id: CustomerId,
    pub order_date: NaiveDate,
    /// Sum of line totals before the order-level discount
    pub subtotal: Money,
    pub discount_amount: Money,
    pub total_amount: Money,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }

    /// Order-level discount as a fraction of the subtotal
    pub fn discount_fraction(&self) -> Result<Decimal, MoneyError> {
        self.discount_amount.ratio_of(&self.subtotal)
    }

    /// Applies a new subtotal, reapplying `discount_fraction` to it
    ///
    /// The discount is rounded to the currency and the total derived from
    /// it, so the order stays internally consistent.
    pub fn reprice(&mut self, subtotal: Money, discount_fraction: Decimal) {
        let discount = subtotal.multiply(discount_fraction).round_to_currency();
        self.subtotal = subtotal;
        self.discount_amount = discount;
        self.total_amount = subtotal - discount;
        self.updated_at = Utc::now();
    }

    /// Returns true if the stored totals add up
    pub fn totals_consistent(&self) -> bool {
        self.subtotal.checked_sub(&self.discount_amount).ok() == Some(self.total_amount)
    }
}

/// A line on an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
    pub discount_percent: Decimal,
    /// Derived from the fields above; recomputed on read
    pub line_total: Money,
}

impl OrderItem {
    /// Creates an item with its line total computed
    pub fn new(
        order_id: OrderId,
        product_id: ProductId,
        quantity: u32,
        unit_price: Money,
        discount_percent: Decimal,
    ) -> Self {
        let line_total = compute_line_total(unit_price, quantity, discount_percent).total;
        Self {
            id: OrderItemId::new_v7(),
            order_id,
            product_id,
            quantity,
            unit_price,
            discount_percent,
            line_total,
        }
    }

    /// Line total derived from unit price, quantity and discount
    pub fn recomputed_line_total(&self) -> Money {
        compute_line_total(self.unit_price, self.quantity, self.discount_percent).total
    }

    /// Replaces a stale stored line total with the recomputed one
    ///
    /// Returns true if the stored value was stale.
    pub fn normalize(&mut self) -> bool {
        let recomputed = self.recomputed_line_total();
        if recomputed == self.line_total {
            return false;
        }
        self.line_total = recomputed;
        true
    }

    /// Current line total divided by the current quantity
    pub fn unit_line_value(&self) -> Result<Money, MoneyError> {
        self.line_total.divide(Decimal::from(self.quantity))
    }

    /// Reduces the quantity, rescaling the line total by its unit line value
    ///
    /// Returns the value taken off the line. `returned` is clamped to the
    /// current quantity. The remaining line total is rounded to the currency
    /// and the returned value is the difference, so nothing is lost to
    /// rounding.
    pub fn reduce_quantity(&mut self, returned: u32) -> Result<Money, MoneyError> {
        let returned = returned.min(self.quantity);
        if returned == 0 {
            return Ok(Money::zero(self.line_total.currency()));
        }

        let unit = self.unit_line_value()?;
        let before = self.line_total;
        self.quantity -= returned;
        self.line_total = unit.multiply(Decimal::from(self.quantity)).round_to_currency();
        before.checked_sub(&self.line_total)
    }
}

/// A stocked product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub stock_quantity: i64,
}

/// Kind of stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryTransactionType {
    Sale,
    Purchase,
    Return,
    Adjustment,
}

impl InventoryTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryTransactionType::Sale => "sale",
            InventoryTransactionType::Purchase => "purchase",
            InventoryTransactionType::Return => "return",
            InventoryTransactionType::Adjustment => "adjustment",
        }
    }
}

impl std::str::FromStr for InventoryTransactionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(InventoryTransactionType::Sale),
            "purchase" => Ok(InventoryTransactionType::Purchase),
            "return" => Ok(InventoryTransactionType::Return),
            "adjustment" => Ok(InventoryTransactionType::Adjustment),
            other => Err(CoreError::unknown_value("inventory transaction type", other)),
        }
    }
}

/// Audit record of a stock movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryTransaction {
    pub id: InventoryTransactionId,
    pub product_id: ProductId,
    pub transaction_type: InventoryTransactionType,
    /// Signed change in stock
    pub quantity: i64,
    pub reference_order: Option<OrderId>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InventoryTransaction {
    /// Records units coming back into stock from an order
    pub fn order_return(product_id: ProductId, quantity: u32, order_id: OrderId, notes: impl Into<String>) -> Self {
        Self {
            id: InventoryTransactionId::new_v7(),
            product_id,
            transaction_type: InventoryTransactionType::Return,
            quantity: i64::from(quantity),
            reference_order: Some(order_id),
            notes: Some(notes.into()),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn lkr(v: Decimal) -> Money {
        Money::new(v, Currency::LKR)
    }

    fn order(subtotal: Decimal, discount: Decimal) -> Order {
        Order {
            id: OrderId::new(),
            order_number: "INV-0001".to_string(),
            customer_id: CustomerId::new(),
            order_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            subtotal: lkr(subtotal),
            discount_amount: lkr(discount),
            total_amount: lkr(subtotal - discount),
            payment_status: PaymentStatus::Unpaid,
            status: OrderStatus::Confirmed,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_reprice_keeps_discount_rate() {
        let mut order = order(dec!(10000), dec!(1000));
        let fraction = order.discount_fraction().unwrap();

        order.reprice(lkr(dec!(8000)), fraction);

        assert_eq!(order.discount_amount.amount(), dec!(800));
        assert_eq!(order.total_amount.amount(), dec!(7200));
        assert!(order.totals_consistent());
    }

    #[test]
    fn test_reprice_without_subtotal() {
        let mut order = order(dec!(0), dec!(0));
        let fraction = order.discount_fraction().unwrap();
        assert_eq!(fraction, Decimal::ZERO);

        order.reprice(lkr(dec!(0)), fraction);
        assert!(order.total_amount.is_zero());
    }

    #[test]
    fn test_normalize_rewrites_stale_total() {
        let mut item = OrderItem::new(OrderId::new(), ProductId::new(), 4, lkr(dec!(250)), dec!(10));
        assert_eq!(item.line_total.amount(), dec!(900));
        assert!(!item.normalize());

        // stored with the discount applied twice
        item.line_total = lkr(dec!(810));
        assert!(item.normalize());
        assert_eq!(item.line_total.amount(), dec!(900));
    }

    #[test]
    fn test_reduce_quantity_returns_taken_value() {
        let mut item = OrderItem::new(OrderId::new(), ProductId::new(), 10, lkr(dec!(200)), dec!(0));
        assert_eq!(item.unit_line_value().unwrap().amount(), dec!(200));

        let taken = item.reduce_quantity(3).unwrap();
        assert_eq!(taken.amount(), dec!(600));
        assert_eq!(item.quantity, 7);
        assert_eq!(item.line_total.amount(), dec!(1400));
    }

    #[test]
    fn test_reduce_quantity_clamps() {
        let mut item = OrderItem::new(OrderId::new(), ProductId::new(), 2, lkr(dec!(50)), dec!(0));
        let taken = item.reduce_quantity(5).unwrap();
        assert_eq!(taken.amount(), dec!(100));
        assert_eq!(item.quantity, 0);
        assert!(item.line_total.is_zero());
    }

    #[test]
    fn test_reduce_quantity_keeps_discounted_unit_value() {
        // 3 units at 1000 less 10%: each unit carries 900 of the line
        let mut item = OrderItem::new(OrderId::new(), ProductId::new(), 3, lkr(dec!(1000)), dec!(10));
        assert_eq!(item.line_total.amount(), dec!(2700));

        let taken = item.reduce_quantity(1).unwrap();
        assert_eq!(taken.amount(), dec!(900));
        assert_eq!(item.line_total.amount(), dec!(1800));
    }

    #[test]
    fn test_reduce_quantity_rounding_is_conserved() {
        let mut item = OrderItem::new(OrderId::new(), ProductId::new(), 3, lkr(dec!(333.33)), dec!(0));
        item.line_total = lkr(dec!(1000));

        let taken = item.reduce_quantity(1).unwrap();
        assert_eq!(item.line_total.amount(), dec!(666.67));
        assert_eq!(taken.amount(), dec!(333.33));
        assert_eq!(taken + item.line_total, lkr(dec!(1000)));
    }
}
