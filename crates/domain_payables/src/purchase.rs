//! Purchases and purchase items

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{compute_line_total, CoreError, Money, ProductId, PurchaseId, PurchaseItemId, SupplierId};
use domain_treasury::PaymentStatus;

/// Purchase lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Ordered,
    Received,
    Cancelled,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Ordered => "ordered",
            PurchaseStatus::Received => "received",
            PurchaseStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for PurchaseStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ordered" | "pending" => Ok(PurchaseStatus::Ordered),
            "received" => Ok(PurchaseStatus::Received),
            "cancelled" => Ok(PurchaseStatus::Cancelled),
            other => Err(CoreError::unknown_value("purchase status", other)),
        }
    }
}

/// A purchase from a supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub purchase_number: String,
    pub supplier_id: SupplierId,
    pub purchase_date: NaiveDate,
    pub subtotal: Money,
    pub discount_amount: Money,
    pub total_amount: Money,
    /// Total minus supplier payments that still count
    pub balance_due: Money,
    pub payment_status: PaymentStatus,
    pub status: PurchaseStatus,
    pub updated_at: DateTime<Utc>,
}

impl Purchase {
    pub fn is_cancelled(&self) -> bool {
        self.status == PurchaseStatus::Cancelled
    }

    /// Recomputes subtotal and total from the purchase lines
    ///
    /// The stored subtotal and total are not trusted. A purchase with no
    /// lines keeps its stored figures.
    pub fn recompute_totals(&mut self, items: &[PurchaseItem]) {
        if items.is_empty() {
            return;
        }
        let currency = self.total_amount.currency();
        let subtotal = Money::sum(currency, items.iter().map(|i| i.recomputed_line_total()));
        self.subtotal = subtotal;
        self.total_amount = (subtotal - self.discount_amount).floor_at_zero();
    }

    /// Applies the counted paid amount to the balance and payment status
    pub fn apply_paid(&mut self, paid: Money) {
        self.balance_due = (self.total_amount - paid).floor_at_zero();
        self.payment_status = PaymentStatus::from_amounts(paid, self.total_amount);
        self.updated_at = Utc::now();
    }
}

/// A line on a purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub id: PurchaseItemId,
    pub purchase_id: PurchaseId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_cost: Money,
    pub discount_percent: Decimal,
    pub line_total: Money,
}

impl PurchaseItem {
    pub fn new(
        purchase_id: PurchaseId,
        product_id: ProductId,
        quantity: u32,
        unit_cost: Money,
        discount_percent: Decimal,
    ) -> Self {
        Self {
            id: PurchaseItemId::new_v7(),
            purchase_id,
            product_id,
            quantity,
            unit_cost,
            discount_percent,
            line_total: compute_line_total(unit_cost, quantity, discount_percent).total,
        }
    }

    pub fn recomputed_line_total(&self) -> Money {
        compute_line_total(self.unit_cost, self.quantity, self.discount_percent).total
    }
}
