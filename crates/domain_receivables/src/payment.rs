//! Customer payments and derived order payment status

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use core_kernel::{AccountId, Currency, CustomerId, Money, OrderId, PaymentId};
use domain_treasury::{counts_toward_balance, ChequeDetails, ChequeStatus, PaymentMethod, PaymentStatus};

use crate::error::ReceivablesError;
use crate::order::Order;
use crate::ports::{PaymentQuery, ReceivablesPort};

/// A payment received against one order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub payment_number: String,
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub amount: Money,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    /// Present for cheque payments
    pub cheque: Option<ChequeDetails>,
    /// `None` for non-cheque payments
    pub cheque_status: Option<ChequeStatus>,
    /// Company account the funds land in
    pub deposit_account_id: Option<AccountId>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Returns true unless this is a returned cheque
    pub fn counts(&self) -> bool {
        counts_toward_balance(self.cheque_status)
    }

    pub fn is_cheque(&self) -> bool {
        self.method == PaymentMethod::Cheque && self.cheque_status.is_some()
    }
}

/// Sums the payments that count toward settling their order
pub fn counted_total(currency: Currency, payments: &[Payment]) -> Money {
    Money::sum(currency, payments.iter().filter(|p| p.counts()).map(|p| p.amount))
}

/// Amount paid on an order so far, excluding returned cheques
pub(crate) async fn paid_to_date<P>(store: &P, order: &Order) -> Result<Money, ReceivablesError>
where
    P: ReceivablesPort + ?Sized,
{
    let payments = store.list_payments(PaymentQuery::for_order(order.id)).await?;
    Ok(counted_total(order.total_amount.currency(), &payments))
}

/// Derives an order's payment status from its counted payments and writes
/// it back when it changed
pub(crate) async fn refresh_payment_status<P>(
    store: &P,
    order_id: OrderId,
) -> Result<PaymentStatus, ReceivablesError>
where
    P: ReceivablesPort + ?Sized,
{
    let mut order = store
        .get_order(order_id)
        .await
        .map_err(|e| ReceivablesError::or_not_found(e, || ReceivablesError::OrderNotFound(order_id.to_string())))?;

    let paid = paid_to_date(store, &order).await?;
    let derived = PaymentStatus::from_amounts(paid, order.total_amount);

    if derived != order.payment_status {
        order.payment_status = derived;
        order.updated_at = Utc::now();
        store.update_order(&order).await?;
    }
    Ok(derived)
}

/// Derives the payment status and warns when the stored one disagrees
pub(crate) fn derived_status(order: &Order, paid: Money) -> PaymentStatus {
    let derived = PaymentStatus::from_amounts(paid, order.total_amount);
    if derived != order.payment_status {
        warn!(
            order_id = %order.id,
            stored = %order.payment_status,
            derived = %derived,
            "Stored payment status disagrees with payments"
        );
    }
    derived
}
