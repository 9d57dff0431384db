//! Order Return/Cancel Processor
//!
//! Two mutually exclusive adjustments on an existing order:
//!
//! - **cancel**: restock every line, release the unpaid remainder from the
//!   customer's outstanding balance, and mark the order cancelled. No rows
//!   are deleted.
//! - **return**: restock selected quantities, shrink or delete the lines,
//!   reprice the order at its original discount rate, and credit the
//!   customer with the part of the returned value that was still unpaid.
//!
//! Writes follow a fixed order: stock movements and their audit rows, then
//! the customer balance, then the order row last.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use core_kernel::{Money, OrderId, OrderItemId};
use domain_treasury::{CallerRole, PaymentStatus};

use crate::customer::{decrease_outstanding, load_customer};
use crate::error::ReceivablesError;
use crate::order::{InventoryTransaction, Order, OrderItem, OrderStatus};
use crate::payment::{derived_status, paid_to_date};
use crate::ports::ReceivablesPort;

/// Adjustment requested on an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentAction {
    Cancel,
    PartialReturn,
}

impl FromStr for AdjustmentAction {
    type Err = ReceivablesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cancel" => Ok(AdjustmentAction::Cancel),
            "return" | "partial_return" => Ok(AdjustmentAction::PartialReturn),
            other => Err(ReceivablesError::InvalidAction(other.to_string())),
        }
    }
}

/// Quantity to return from one order line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLine {
    pub order_item_id: OrderItemId,
    /// Entries with zero or negative quantities are skipped
    pub quantity: i64,
}

/// Result of a cancel or return
#[derive(Debug, Clone, Serialize)]
pub struct AdjustmentOutcome {
    pub action: AdjustmentAction,
    pub order: Order,
    /// Lines that actually changed stock
    pub lines_applied: usize,
    pub units_restocked: i64,
    /// Value taken off the order
    pub returned_value: Money,
    /// Amount the customer's outstanding balance was lowered by
    pub customer_credit: Money,
    pub customer_outstanding: Money,
}

/// Cancels orders and processes partial returns
pub struct ReturnProcessor {
    store: Arc<dyn ReceivablesPort>,
}

impl ReturnProcessor {
    pub fn new(store: Arc<dyn ReceivablesPort>) -> Self {
        Self { store }
    }

    /// Dispatches on an action string (`cancel` or `return`)
    ///
    /// # Errors
    ///
    /// `InvalidAction` for any other action, before anything is read.
    pub async fn process(
        &self,
        order_id: OrderId,
        action: &str,
        lines: &[ReturnLine],
        role: CallerRole,
    ) -> Result<AdjustmentOutcome, ReceivablesError> {
        match action.parse::<AdjustmentAction>()? {
            AdjustmentAction::Cancel => self.cancel(order_id, role).await,
            AdjustmentAction::PartialReturn => self.partial_return(order_id, lines, role).await,
        }
    }

    /// Fully cancels an order that is not yet paid
    ///
    /// # Errors
    ///
    /// `InsufficientRole`, `OrderNotFound`, `OrderCancelled`, `AlreadyPaid`
    /// or `CustomerNotFound`, all before the first write.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn cancel(&self, order_id: OrderId, role: CallerRole) -> Result<AdjustmentOutcome, ReceivablesError> {
        role.require_admin("cancel an order")?;
        let store = self.store.as_ref();

        let mut order = self.load_open_order(order_id).await?;
        let (items, stale) = self.load_items(&order).await?;

        let paid = paid_to_date(store, &order).await?;
        if derived_status(&order, paid) == PaymentStatus::Paid {
            return Err(ReceivablesError::AlreadyPaid(order.order_number.clone()));
        }
        load_customer(store, order.customer_id).await?;

        self.persist_normalized(&items, &stale).await?;

        let mut units_restocked = 0;
        for item in &items {
            self.restock(&order, item, item.quantity, "Order cancelled").await?;
            units_restocked += i64::from(item.quantity);
        }

        let unpaid = (order.total_amount - paid).floor_at_zero();
        let customer_outstanding = if unpaid.is_positive() {
            decrease_outstanding(store, order.customer_id, unpaid).await?
        } else {
            load_customer(store, order.customer_id).await?.outstanding_balance
        };

        order.status = OrderStatus::Cancelled;
        order.payment_status = PaymentStatus::Unpaid;
        order.updated_at = chrono::Utc::now();
        store.update_order(&order).await?;

        info!(
            order_number = %order.order_number,
            units_restocked,
            released = %unpaid,
            "Order cancelled"
        );

        Ok(AdjustmentOutcome {
            action: AdjustmentAction::Cancel,
            returned_value: order.total_amount,
            order,
            lines_applied: items.len(),
            units_restocked,
            customer_credit: unpaid,
            customer_outstanding,
        })
    }

    /// Returns part of an order
    ///
    /// Quantities are clamped to what is left on each line; lines with a
    /// non-positive quantity are ignored.
    ///
    /// # Errors
    ///
    /// `InsufficientRole`, `OrderNotFound`, `OrderCancelled`,
    /// `NoItemsProvided`, `OrderItemNotFound` or `CustomerNotFound`, all
    /// before the first write.
    #[instrument(skip(self, lines), fields(order_id = %order_id, lines = lines.len()))]
    pub async fn partial_return(
        &self,
        order_id: OrderId,
        lines: &[ReturnLine],
        role: CallerRole,
    ) -> Result<AdjustmentOutcome, ReceivablesError> {
        role.require_admin("return order items")?;
        let store = self.store.as_ref();

        let mut order = self.load_open_order(order_id).await?;
        if lines.is_empty() {
            return Err(ReceivablesError::NoItemsProvided);
        }

        let (items, stale) = self.load_items(&order).await?;
        let applicable: Vec<&ReturnLine> = lines.iter().filter(|l| l.quantity > 0).collect();
        if let Some(unknown) = applicable
            .iter()
            .find(|l| !items.iter().any(|i| i.id == l.order_item_id))
        {
            return Err(ReceivablesError::OrderItemNotFound(unknown.order_item_id.to_string()));
        }

        let customer = load_customer(store, order.customer_id).await?;
        if applicable.is_empty() {
            return Ok(AdjustmentOutcome {
                action: AdjustmentAction::PartialReturn,
                order,
                lines_applied: 0,
                units_restocked: 0,
                returned_value: Money::zero(customer.outstanding_balance.currency()),
                customer_credit: Money::zero(customer.outstanding_balance.currency()),
                customer_outstanding: customer.outstanding_balance,
            });
        }

        let currency = order.total_amount.currency();
        let old_total = order.total_amount;
        let discount_fraction = order
            .discount_fraction()
            .map_err(|e| ReceivablesError::InvalidAmount(e.to_string()))?;
        let paid = paid_to_date(store, &order).await?;

        self.persist_normalized(&items, &stale).await?;

        let mut remaining: HashMap<OrderItemId, OrderItem> =
            items.iter().map(|i| (i.id, i.clone())).collect();
        let mut returned_value = Money::zero(currency);
        let mut units_restocked = 0;
        let mut lines_applied = 0;

        for line in applicable {
            let Some(item) = remaining.get_mut(&line.order_item_id) else {
                continue;
            };
            let requested = u32::try_from(line.quantity).unwrap_or(u32::MAX);
            let clamped = requested.min(item.quantity);
            if clamped == 0 {
                continue;
            }
            if clamped < requested {
                warn!(
                    order_item_id = %item.id,
                    requested,
                    available = item.quantity,
                    "Return quantity clamped to the remaining quantity"
                );
            }

            self.restock(&order, item, clamped, "Partial return").await?;

            let taken = item
                .reduce_quantity(clamped)
                .map_err(|e| ReceivablesError::InvalidAmount(e.to_string()))?;
            returned_value = returned_value + taken;
            if item.quantity == 0 {
                store.delete_order_item(item.id).await?;
            } else {
                store.update_order_item(item).await?;
            }

            units_restocked += i64::from(clamped);
            lines_applied += 1;
        }

        let subtotal = Money::sum(
            currency,
            items
                .iter()
                .filter_map(|i| remaining.get(&i.id))
                .filter(|i| i.quantity > 0)
                .map(|i| i.line_total),
        );
        order.reprice(subtotal, discount_fraction);
        order.payment_status = PaymentStatus::from_amounts(paid, order.total_amount);

        let customer_credit = unpaid_return_credit(returned_value, paid, old_total);
        let customer_outstanding = if customer_credit.is_positive() {
            decrease_outstanding(store, order.customer_id, customer_credit).await?
        } else {
            load_customer(store, order.customer_id).await?.outstanding_balance
        };

        store.update_order(&order).await?;

        info!(
            order_number = %order.order_number,
            lines_applied,
            returned_value = %returned_value,
            customer_credit = %customer_credit,
            total = %order.total_amount,
            "Order items returned"
        );

        Ok(AdjustmentOutcome {
            action: AdjustmentAction::PartialReturn,
            order,
            lines_applied,
            units_restocked,
            returned_value,
            customer_credit,
            customer_outstanding,
        })
    }

    async fn load_open_order(&self, order_id: OrderId) -> Result<Order, ReceivablesError> {
        let order = self.store.get_order(order_id).await.map_err(|e| {
            ReceivablesError::or_not_found(e, || ReceivablesError::OrderNotFound(order_id.to_string()))
        })?;
        if order.is_cancelled() {
            return Err(ReceivablesError::OrderCancelled(order.order_number));
        }
        Ok(order)
    }

    /// Reads the order's lines with their totals recomputed, returning the
    /// ids of lines whose stored total was stale
    async fn load_items(&self, order: &Order) -> Result<(Vec<OrderItem>, Vec<OrderItemId>), ReceivablesError> {
        let mut items = self.store.list_order_items(order.id).await?;
        let mut stale = Vec::new();
        for item in &mut items {
            let stored = item.line_total;
            if item.normalize() {
                warn!(
                    order_item_id = %item.id,
                    stored = %stored,
                    recomputed = %item.line_total,
                    "Stale line total recomputed"
                );
                stale.push(item.id);
            }
        }
        Ok((items, stale))
    }

    async fn persist_normalized(&self, items: &[OrderItem], stale: &[OrderItemId]) -> Result<(), ReceivablesError> {
        for item in items.iter().filter(|i| stale.contains(&i.id)) {
            self.store.update_order_item(item).await?;
        }
        Ok(())
    }

    async fn restock(&self, order: &Order, item: &OrderItem, quantity: u32, note: &str) -> Result<(), ReceivablesError> {
        let product = self.store.get_product(item.product_id).await?;
        self.store
            .update_product_stock(product.id, product.stock_quantity + i64::from(quantity))
            .await?;
        self.store
            .insert_inventory_transaction(&InventoryTransaction::order_return(
                product.id,
                quantity,
                order.id,
                format!("{}: {}", note, order.order_number),
            ))
            .await?;
        Ok(())
    }
}

/// Portion of a returned value that the customer had not paid yet
///
/// `max(0, returned - max(0, paid - (old_total - returned)))`: payments
/// first cover what the customer keeps, and only the excess covered the
/// returned goods.
pub fn unpaid_return_credit(returned: Money, paid: Money, old_total: Money) -> Money {
    let kept = old_total - returned;
    let paid_for_returned = (paid - kept).floor_at_zero();
    (returned - paid_for_returned).floor_at_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn lkr(v: rust_decimal::Decimal) -> Money {
        Money::new(v, Currency::LKR)
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("cancel".parse::<AdjustmentAction>().unwrap(), AdjustmentAction::Cancel);
        assert_eq!("return".parse::<AdjustmentAction>().unwrap(), AdjustmentAction::PartialReturn);
        let err = "refund".parse::<AdjustmentAction>().unwrap_err();
        assert_eq!(err.kind(), "invalid_action");
    }

    #[test]
    fn test_unpaid_credit_when_nothing_paid() {
        let credit = unpaid_return_credit(lkr(dec!(1800)), lkr(dec!(0)), lkr(dec!(9000)));
        assert_eq!(credit.amount(), dec!(1800));
    }

    #[test]
    fn test_unpaid_credit_when_fully_paid() {
        let credit = unpaid_return_credit(lkr(dec!(1800)), lkr(dec!(9000)), lkr(dec!(9000)));
        assert!(credit.is_zero());
    }

    #[test]
    fn test_unpaid_credit_partially_paid() {
        // 8,000 paid of 9,000; the kept 7,200 is covered, 800 of the return was paid
        let credit = unpaid_return_credit(lkr(dec!(1800)), lkr(dec!(8000)), lkr(dec!(9000)));
        assert_eq!(credit.amount(), dec!(1000));
    }
}
