//! Repository implementations
//!
//! Each repository owns the SQL for one domain's tables and speaks in raw
//! row types (UUIDs, decimals, text enumerations). The adapter layer turns
//! rows into domain values.

pub mod treasury;
pub mod receivables;
pub mod payables;

pub use treasury::{AccountRow, TreasuryRepository};
pub use receivables::{
    CustomerRow, InventoryTransactionRow, OrderItemRow, OrderRow, PaymentRow, ProductRow,
    ReceivablesRepository,
};
pub use payables::{PayablesRepository, PurchaseItemRow, PurchaseRow, SupplierPaymentRow};
