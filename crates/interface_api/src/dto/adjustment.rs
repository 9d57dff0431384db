//! Order cancel/return DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::OrderItemId;
use domain_receivables::{AdjustmentAction, AdjustmentOutcome, ReturnLine};

#[derive(Debug, Deserialize)]
pub struct ReturnLineRequest {
    pub order_item_id: Uuid,
    pub quantity: i64,
}

impl From<&ReturnLineRequest> for ReturnLine {
    fn from(line: &ReturnLineRequest) -> Self {
        ReturnLine {
            order_item_id: OrderItemId::from_uuid(line.order_item_id),
            quantity: line.quantity,
        }
    }
}

/// `action` is `cancel` or `return`; `items` is read for returns only
#[derive(Debug, Deserialize)]
pub struct AdjustmentRequest {
    pub action: String,
    #[serde(default)]
    pub items: Vec<ReturnLineRequest>,
}

#[derive(Debug, Serialize)]
pub struct AdjustmentResponse {
    pub action: String,
    pub order_id: Uuid,
    pub order_status: String,
    pub payment_status: String,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub lines_applied: usize,
    pub units_restocked: i64,
    pub returned_value: Decimal,
    pub customer_credit: Decimal,
    pub customer_outstanding: Decimal,
}

impl From<AdjustmentOutcome> for AdjustmentResponse {
    fn from(o: AdjustmentOutcome) -> Self {
        let action = match o.action {
            AdjustmentAction::Cancel => "cancel",
            AdjustmentAction::PartialReturn => "partial_return",
        };
        Self {
            action: action.to_string(),
            order_id: *o.order.id.as_uuid(),
            order_status: o.order.status.as_str().to_string(),
            payment_status: o.order.payment_status.as_str().to_string(),
            subtotal: o.order.subtotal.amount(),
            discount_amount: o.order.discount_amount.amount(),
            total_amount: o.order.total_amount.amount(),
            lines_applied: o.lines_applied,
            units_restocked: o.units_restocked,
            returned_value: o.returned_value.amount(),
            customer_credit: o.customer_credit.amount(),
            customer_outstanding: o.customer_outstanding.amount(),
        }
    }
}
