//! Payables Domain - Supplier Payments
//!
//! Supplier-side mirror of the receivables flows. A supplier payment
//! always targets exactly one purchase, and the direction of the account
//! mutation is reversed: money leaves a company account.
//!
//! [`PayablesSettlement`] records payments (with an overdraft confirmation
//! step) and clears or returns issued cheques. A purchase's `balance_due`
//! and `payment_status` are recomputed from its lines and the payments that
//! still count on every write.

pub mod purchase;
pub mod payment;
pub mod settlement;
pub mod ports;
pub mod error;

pub use purchase::{Purchase, PurchaseItem, PurchaseStatus};
pub use payment::{SupplierPayment, counted_total};
pub use settlement::{
    PayablesSettlement, SupplierPaymentRequest, SupplierPaymentOutcome, SupplierChequeTransition,
};
pub use ports::PayablesPort;
pub use error::PayablesError;

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockPayablesPort;
