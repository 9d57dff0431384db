//! Request handlers

pub mod health;
pub mod settlement;
pub mod cheque;
pub mod adjustment;
pub mod supplier;
