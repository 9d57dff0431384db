//! Receivables Domain - Customer Settlement and Returns
//!
//! This crate implements the customer side of the back office:
//!
//! - **Cheque lifecycle**: [`ChequeLifecycleManager`] moves received cheques
//!   through deposit, clearance and return, crediting the deposit account
//!   or reinstating the customer's debt.
//! - **Settlement allocation**: [`SettlementAllocator`] spreads one payment
//!   instrument over several outstanding invoices, one payment row each.
//! - **Returns and cancellations**: [`ReturnProcessor`] restocks inventory
//!   and recomputes order totals, payment status and the customer's
//!   outstanding balance.
//!
//! # Invariants
//!
//! - `total_amount == subtotal - discount_amount` for every order after any
//!   mutation, and `subtotal` equals the sum of the remaining line totals.
//! - Returned cheques never count toward an order's paid amount.
//! - A customer's outstanding balance never goes below zero.
//!
//! All services depend on [`ReceivablesPort`] only and hold no state
//! between calls.

pub mod order;
pub mod customer;
pub mod payment;
pub mod cheque;
pub mod settlement;
pub mod returns;
pub mod ports;
pub mod error;

pub use order::{Order, OrderItem, OrderStatus, Product, InventoryTransaction, InventoryTransactionType};
pub use customer::Customer;
pub use payment::{Payment, counted_total};
pub use cheque::{ChequeLifecycleManager, ChequeTransition};
pub use settlement::{
    SettlementAllocator, SettlementDraft, Instrument, Selection, AllocationResult,
    AllocationFailure, OutstandingInvoice, auto_fill_amount,
};
pub use returns::{ReturnProcessor, ReturnLine, AdjustmentAction, AdjustmentOutcome, unpaid_return_credit};
pub use ports::{ReceivablesPort, PaymentQuery};
pub use error::ReceivablesError;

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockReceivablesPort;
