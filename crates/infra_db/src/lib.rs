//! Infrastructure Database Layer
//!
//! The PostgreSQL ledger store behind the treasury, receivables and
//! payables ports, built on SQLx.
//!
//! # Architecture
//!
//! Repositories own the SQL for one domain's tables and return plain row
//! types. [`PostgresLedgerAdapter`] wraps them, attaches the ledger
//! currency to stored amounts and implements the domain ports. Every port
//! method maps to a single statement; there are no multi-statement
//! transactions, so each service orders its own writes.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresLedgerAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/ledger")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresLedgerAdapter::new(pool, Currency::LKR);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool, MIGRATOR};
pub use error::DatabaseError;
pub use adapters::PostgresLedgerAdapter;
