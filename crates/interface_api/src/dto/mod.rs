//! Request/response data transfer objects
//!
//! Amounts travel as plain decimals in the ledger currency.

pub mod settlement;
pub mod adjustment;
pub mod supplier;
