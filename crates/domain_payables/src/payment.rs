//! Supplier payments

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, Currency, Money, PurchaseId, SupplierId, SupplierPaymentId};
use domain_treasury::{counts_toward_balance, ChequeDetails, ChequeStatus, PaymentMethod};

/// A payment made to a supplier against one purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierPayment {
    pub id: SupplierPaymentId,
    pub payment_number: String,
    pub purchase_id: PurchaseId,
    pub supplier_id: SupplierId,
    pub amount: Money,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub cheque: Option<ChequeDetails>,
    pub cheque_status: Option<ChequeStatus>,
    /// Company account the money leaves from
    pub account_id: AccountId,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SupplierPayment {
    pub fn counts(&self) -> bool {
        counts_toward_balance(self.cheque_status)
    }

    pub fn is_cheque(&self) -> bool {
        self.method == PaymentMethod::Cheque && self.cheque_status.is_some()
    }
}

/// Sums the supplier payments that count toward a purchase
pub fn counted_total(currency: Currency, payments: &[SupplierPayment]) -> Money {
    Money::sum(currency, payments.iter().filter(|p| p.counts()).map(|p| p.amount))
}
