//! Treasury Domain - Company Accounts and Cheque Rules
//!
//! This crate holds what the customer and supplier sides share:
//!
//! - **Company accounts**: cash, bank, overdraft and loan accounts with a
//!   signed running balance. Balances may go negative; an overdraft is
//!   surfaced as an [`OverdraftAdvisory`] rather than blocked.
//! - **Cheque state machine**: `pending -> deposited -> passed | returned`,
//!   with the transitions allowed for received and issued cheques.
//! - **Payment status**: `unpaid | partial | paid`, always derived from the
//!   payments that still count (returned cheques never count).
//! - **Caller roles**: the capability passed into privileged operations.
//!
//! # Cheque Lifecycle
//!
//! ```text
//!            ┌──────────► passed   (terminal)
//! pending ───┼──► deposited ──┬──► passed
//!            └──────────► returned (terminal)
//!                             └──► returned
//! ```
//!
//! Issued (supplier) cheques never pass through `deposited`.

pub mod account;
pub mod cheque;
pub mod settlement;
pub mod access;
pub mod balances;
pub mod ports;
pub mod error;

pub use account::{CompanyAccount, AccountKind, OverdraftAdvisory};
pub use cheque::{ChequeStatus, ChequeDirection, ChequeDetails, ChequeMeta, validate_transition, counts_toward_balance};
pub use settlement::{PaymentMethod, PaymentStatus, generate_payment_number};
pub use access::CallerRole;
pub use ports::TreasuryPort;
pub use error::TreasuryError;

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockTreasuryPort;
