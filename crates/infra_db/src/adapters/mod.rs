//! Domain Adapters
//!
//! Implementations of the domain ports on top of the repositories. Rows are
//! converted to domain values here, and `DatabaseError`s to `PortError`s.

mod convert;
pub mod ledger;

pub use ledger::PostgresLedgerAdapter;
