//! Treasury domain errors

use thiserror::Error;

use core_kernel::PortError;
use crate::access::CallerRole;
use crate::cheque::{ChequeDirection, ChequeStatus};

/// Errors shared by every flow that touches cheques or company accounts
#[derive(Debug, Error)]
pub enum TreasuryError {
    /// Cheque status change not permitted from the current state
    #[error("Cannot move a {direction} cheque from {from} to {to}")]
    InvalidTransition {
        direction: ChequeDirection,
        from: ChequeStatus,
        to: ChequeStatus,
    },

    /// Cheque method chosen without number, date or bank
    #[error("Missing cheque details: {0}")]
    MissingChequeDetails(String),

    /// Deposit or payment account not selected, or not resolvable
    #[error("Account required: {0}")]
    MissingAccount(String),

    /// The caller's role does not allow the operation
    #[error("Role '{role}' is not allowed to {operation}")]
    InsufficientRole {
        operation: String,
        role: CallerRole,
    },

    /// Unexpected ledger store failure
    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl TreasuryError {
    /// Stable snake_case code for the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            TreasuryError::InvalidTransition { .. } => "invalid_transition",
            TreasuryError::MissingChequeDetails(_) => "missing_cheque_details",
            TreasuryError::MissingAccount(_) => "missing_account",
            TreasuryError::InsufficientRole { .. } => "insufficient_role",
            TreasuryError::Storage(_) => "storage_error",
        }
    }
}
