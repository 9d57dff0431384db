//! Receivables domain errors

use thiserror::Error;

use core_kernel::{Money, OrderId, PortError};
use domain_treasury::TreasuryError;

/// Errors raised by the customer-side settlement and returns flows
///
/// Every variant except `Storage` is a business-rule violation raised
/// before the first write of the operation that reports it.
#[derive(Debug, Error)]
pub enum ReceivablesError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order item not found: {0}")]
    OrderItemNotFound(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    /// Cancel attempted on a fully paid order
    #[error("Order {0} is fully paid and must be refunded instead of cancelled")]
    AlreadyPaid(String),

    #[error("Order {0} is already cancelled")]
    OrderCancelled(String),

    /// Empty return list or settlement selection
    #[error("No items provided")]
    NoItemsProvided,

    #[error("Invalid action '{0}', expected 'cancel' or 'return'")]
    InvalidAction(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Payment method '{0}' cannot settle an invoice")]
    UnsupportedMethod(String),

    #[error("Customer {0} has no outstanding invoices")]
    NoOutstandingInvoices(String),

    #[error("Allocated amount {allocated} exceeds the instrument amount {available}")]
    OverAllocation { allocated: Money, available: Money },

    #[error("Settle amount {requested} exceeds the balance {balance} of invoice {invoice}")]
    ExceedsInvoiceBalance {
        invoice: OrderId,
        requested: Money,
        balance: Money,
    },

    #[error("Payment {0} is not a cheque payment")]
    NotACheque(String),

    #[error(transparent)]
    Treasury(#[from] TreasuryError),

    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl ReceivablesError {
    /// Stable snake_case code for the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ReceivablesError::OrderNotFound(_) => "order_not_found",
            ReceivablesError::OrderItemNotFound(_) => "order_item_not_found",
            ReceivablesError::CustomerNotFound(_) => "customer_not_found",
            ReceivablesError::PaymentNotFound(_) => "payment_not_found",
            ReceivablesError::AlreadyPaid(_) => "already_paid",
            ReceivablesError::OrderCancelled(_) => "order_cancelled",
            ReceivablesError::NoItemsProvided => "no_items_provided",
            ReceivablesError::InvalidAction(_) => "invalid_action",
            ReceivablesError::InvalidAmount(_) => "invalid_amount",
            ReceivablesError::UnsupportedMethod(_) => "unsupported_method",
            ReceivablesError::NoOutstandingInvoices(_) => "no_outstanding_invoices",
            ReceivablesError::OverAllocation { .. } => "over_allocation",
            ReceivablesError::ExceedsInvoiceBalance { .. } => "exceeds_invoice_balance",
            ReceivablesError::NotACheque(_) => "not_a_cheque",
            ReceivablesError::Treasury(e) => e.kind(),
            ReceivablesError::Storage(_) => "storage_error",
        }
    }

    /// Maps a store `NotFound` to the given typed error, keeping anything
    /// else as a storage failure
    pub(crate) fn or_not_found(err: PortError, not_found: impl FnOnce() -> Self) -> Self {
        if err.is_not_found() {
            not_found()
        } else {
            ReceivablesError::Storage(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_over_allocation_message() {
        let err = ReceivablesError::OverAllocation {
            allocated: Money::new(dec!(1200), Currency::LKR),
            available: Money::new(dec!(1000), Currency::LKR),
        };
        assert_eq!(err.kind(), "over_allocation");
        assert!(err.to_string().contains("exceeds the instrument amount"));
    }

    #[test]
    fn test_not_found_mapping() {
        let err = ReceivablesError::or_not_found(PortError::not_found("Order", "ORD-1"), || {
            ReceivablesError::OrderNotFound("ORD-1".to_string())
        });
        assert_eq!(err.kind(), "order_not_found");

        let err = ReceivablesError::or_not_found(PortError::connection("down"), || {
            ReceivablesError::OrderNotFound("ORD-1".to_string())
        });
        assert_eq!(err.kind(), "storage_error");
    }

    #[test]
    fn test_treasury_kind_passes_through() {
        let err: ReceivablesError = TreasuryError::MissingAccount("select one".into()).into();
        assert_eq!(err.kind(), "missing_account");
    }
}
