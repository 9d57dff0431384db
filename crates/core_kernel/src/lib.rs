//! Core Kernel - Foundational types for the distribution back office
//!
//! This crate provides the building blocks shared by the receivables,
//! payables and treasury domains:
//! - Money types with precise decimal arithmetic
//! - Line pricing (`compute_line_total`), the single source of truth for
//!   line totals used by billing, purchasing and returns
//! - Strongly-typed identifiers
//! - Port infrastructure for the ledger store adapters

pub mod money;
pub mod pricing;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError, Rate};
pub use pricing::{compute_line_total, LineTotal};
pub use identifiers::{
    OrderId, OrderItemId, ProductId, CustomerId, PaymentId, InventoryTransactionId,
    SupplierId, PurchaseId, PurchaseItemId, SupplierPaymentId, AccountId, BankId,
};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
pub use error::CoreError;
