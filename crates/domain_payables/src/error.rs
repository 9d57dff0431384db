//! Payables domain errors

use thiserror::Error;

use core_kernel::{Money, PortError, PurchaseId};
use domain_treasury::{OverdraftAdvisory, TreasuryError};

/// Errors raised by the supplier payment flows
#[derive(Debug, Error)]
pub enum PayablesError {
    #[error("Purchase not found: {0}")]
    PurchaseNotFound(String),

    #[error("Supplier payment not found: {0}")]
    PaymentNotFound(String),

    #[error("Purchase {0} is cancelled")]
    PurchaseCancelled(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Payment method '{0}' cannot pay a supplier")]
    UnsupportedMethod(String),

    #[error("Payment {requested} exceeds the balance due {balance} of purchase {purchase}")]
    ExceedsPurchaseBalance {
        purchase: PurchaseId,
        requested: Money,
        balance: Money,
    },

    #[error("Supplier payment {0} is not a cheque payment")]
    NotACheque(String),

    /// The payment would overdraw the account and the caller has not
    /// confirmed it
    #[error("Confirmation required: {advisory}")]
    OverdraftNotConfirmed { advisory: Box<OverdraftAdvisory> },

    #[error(transparent)]
    Treasury(#[from] TreasuryError),

    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl PayablesError {
    /// Stable snake_case code for the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            PayablesError::PurchaseNotFound(_) => "purchase_not_found",
            PayablesError::PaymentNotFound(_) => "payment_not_found",
            PayablesError::PurchaseCancelled(_) => "purchase_cancelled",
            PayablesError::InvalidAmount(_) => "invalid_amount",
            PayablesError::UnsupportedMethod(_) => "unsupported_method",
            PayablesError::ExceedsPurchaseBalance { .. } => "exceeds_purchase_balance",
            PayablesError::NotACheque(_) => "not_a_cheque",
            PayablesError::OverdraftNotConfirmed { .. } => "overdraft_not_confirmed",
            PayablesError::Treasury(e) => e.kind(),
            PayablesError::Storage(_) => "storage_error",
        }
    }

    /// The advisory carried by `OverdraftNotConfirmed`
    pub fn advisory(&self) -> Option<&OverdraftAdvisory> {
        match self {
            PayablesError::OverdraftNotConfirmed { advisory } => Some(advisory),
            _ => None,
        }
    }

    pub(crate) fn or_not_found(err: PortError, not_found: impl FnOnce() -> Self) -> Self {
        if err.is_not_found() {
            not_found()
        } else {
            PayablesError::Storage(err)
        }
    }
}
