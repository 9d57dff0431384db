//! PostgreSQL Ledger Adapter
//!
//! One adapter serves all three ledger ports. The receivables and payables
//! ports extend `TreasuryPort`, so a single `PostgresLedgerAdapter` can be
//! handed to every service as `Arc<dyn ReceivablesPort>` or
//! `Arc<dyn PayablesPort>`.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use core_kernel::Currency;
//! use infra_db::adapters::PostgresLedgerAdapter;
//! use domain_receivables::{ReceivablesPort, SettlementAllocator};
//!
//! let adapter = Arc::new(PostgresLedgerAdapter::new(pool, Currency::LKR));
//! let allocator = SettlementAllocator::new(adapter.clone());
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AccountId, AdapterHealth, Currency, CustomerId, DomainPort, HealthCheckResult, HealthCheckable,
    Money, OrderId, OrderItemId, PaymentId, PortError, ProductId, PurchaseId, SupplierPaymentId,
};
use domain_payables::{PayablesPort, Purchase, PurchaseItem, SupplierPayment};
use domain_receivables::{
    Customer, InventoryTransaction, Order, OrderItem, Payment, PaymentQuery, Product, ReceivablesPort,
};
use domain_treasury::{ChequeStatus, CompanyAccount, TreasuryPort};

use crate::adapters::convert::*;
use crate::repositories::{PayablesRepository, ReceivablesRepository, TreasuryRepository};

const ADAPTER_ID: &str = "postgres-ledger-adapter";

/// PostgreSQL-backed ledger store
///
/// Amounts are read back in `currency`, the single ledger currency.
/// Database errors become `PortError`s: missing rows are
/// `PortError::NotFound`, unique violations `Conflict`, pool and I/O
/// failures `Connection`.
#[derive(Debug, Clone)]
pub struct PostgresLedgerAdapter {
    treasury: TreasuryRepository,
    receivables: ReceivablesRepository,
    payables: PayablesRepository,
    currency: Currency,
}

impl PostgresLedgerAdapter {
    pub fn new(pool: PgPool, currency: Currency) -> Self {
        Self {
            treasury: TreasuryRepository::new(pool.clone()),
            receivables: ReceivablesRepository::new(pool.clone()),
            payables: PayablesRepository::new(pool),
            currency,
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }
}

impl DomainPort for PostgresLedgerAdapter {}

#[async_trait]
impl HealthCheckable for PostgresLedgerAdapter {
    /// Runs `SELECT 1` against the pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = self.treasury.ping().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(()) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };

        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl TreasuryPort for PostgresLedgerAdapter {
    #[instrument(skip(self), fields(account_id = %id))]
    async fn get_company_account(&self, id: AccountId) -> Result<CompanyAccount, PortError> {
        debug!("Fetching company account");
        let row = self.treasury.get_account(*id.as_uuid()).await?;
        Ok(account_from_row(row, self.currency)?)
    }

    #[instrument(skip(self), fields(account_id = %id, new_balance = %new_balance))]
    async fn update_company_account_balance(
        &self,
        id: AccountId,
        new_balance: Money,
    ) -> Result<CompanyAccount, PortError> {
        let row = self.treasury.set_balance(*id.as_uuid(), new_balance.amount()).await?;
        Ok(account_from_row(row, self.currency)?)
    }
}

#[async_trait]
impl ReceivablesPort for PostgresLedgerAdapter {
    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order(&self, id: OrderId) -> Result<Order, PortError> {
        debug!("Fetching order");
        let row = self.receivables.get_order(*id.as_uuid()).await?;
        Ok(order_from_row(row, self.currency)?)
    }

    #[instrument(skip(self), fields(customer_id = %customer_id))]
    async fn list_orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, PortError> {
        let rows = self.receivables.list_orders_for_customer(*customer_id.as_uuid()).await?;
        debug!(count = rows.len(), "Fetched customer orders");
        Ok(rows
            .into_iter()
            .map(|row| order_from_row(row, self.currency))
            .collect::<Result<_, _>>()?)
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    async fn list_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, PortError> {
        let rows = self.receivables.list_order_items(*order_id.as_uuid()).await?;
        Ok(rows
            .into_iter()
            .map(|row| order_item_from_row(row, self.currency))
            .collect::<Result<_, _>>()?)
    }

    #[instrument(skip_all, fields(order_item_id = %item.id, quantity = item.quantity))]
    async fn update_order_item(&self, item: &OrderItem) -> Result<(), PortError> {
        let row = order_item_to_row(item)?;
        Ok(self.receivables.update_order_item(&row).await?)
    }

    #[instrument(skip(self), fields(order_item_id = %id))]
    async fn delete_order_item(&self, id: OrderItemId) -> Result<(), PortError> {
        Ok(self.receivables.delete_order_item(*id.as_uuid()).await?)
    }

    #[instrument(skip_all, fields(order_id = %order.id, status = order.status.as_str()))]
    async fn update_order(&self, order: &Order) -> Result<(), PortError> {
        Ok(self.receivables.update_order(&order_to_row(order)).await?)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Product, PortError> {
        let row = self.receivables.get_product(*id.as_uuid()).await?;
        Ok(product_from_row(row))
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn update_product_stock(&self, id: ProductId, new_quantity: i64) -> Result<(), PortError> {
        Ok(self.receivables.set_stock(*id.as_uuid(), new_quantity).await?)
    }

    #[instrument(skip_all, fields(product_id = %transaction.product_id, quantity = transaction.quantity))]
    async fn insert_inventory_transaction(&self, transaction: &InventoryTransaction) -> Result<(), PortError> {
        let row = inventory_transaction_to_row(transaction);
        Ok(self.receivables.insert_inventory_transaction(&row).await?)
    }

    #[instrument(skip(self))]
    async fn list_payments(&self, query: PaymentQuery) -> Result<Vec<Payment>, PortError> {
        let rows = self
            .receivables
            .list_payments(
                query.order_id.map(|id| *id.as_uuid()),
                query.customer_id.map(|id| *id.as_uuid()),
            )
            .await?;
        debug!(count = rows.len(), "Fetched payments");
        Ok(rows
            .into_iter()
            .map(|row| payment_from_row(row, self.currency))
            .collect::<Result<_, _>>()?)
    }

    #[instrument(skip(self), fields(payment_id = %id))]
    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
        let row = self.receivables.get_payment(*id.as_uuid()).await?;
        Ok(payment_from_row(row, self.currency)?)
    }

    #[instrument(skip_all, fields(payment_number = %payment.payment_number, order_id = %payment.order_id))]
    async fn insert_payment(&self, payment: &Payment) -> Result<(), PortError> {
        Ok(self.receivables.insert_payment(&payment_to_row(payment)).await?)
    }

    #[instrument(skip(self), fields(payment_id = %id, status = %status))]
    async fn update_payment_cheque_status(
        &self,
        id: PaymentId,
        status: ChequeStatus,
        deposit_account_id: Option<AccountId>,
    ) -> Result<Payment, PortError> {
        let row = self
            .receivables
            .set_cheque_status(*id.as_uuid(), status.as_str(), deposit_account_id.map(|a| *a.as_uuid()))
            .await?;
        Ok(payment_from_row(row, self.currency)?)
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    async fn get_customer(&self, id: CustomerId) -> Result<Customer, PortError> {
        let row = self.receivables.get_customer(*id.as_uuid()).await?;
        Ok(customer_from_row(row, self.currency))
    }

    #[instrument(skip(self), fields(customer_id = %id, new_balance = %new_balance))]
    async fn update_customer_outstanding_balance(
        &self,
        id: CustomerId,
        new_balance: Money,
    ) -> Result<(), PortError> {
        Ok(self
            .receivables
            .set_outstanding_balance(*id.as_uuid(), new_balance.amount())
            .await?)
    }
}

#[async_trait]
impl PayablesPort for PostgresLedgerAdapter {
    #[instrument(skip(self), fields(purchase_id = %id))]
    async fn get_purchase(&self, id: PurchaseId) -> Result<Purchase, PortError> {
        debug!("Fetching purchase");
        let row = self.payables.get_purchase(*id.as_uuid()).await?;
        Ok(purchase_from_row(row, self.currency)?)
    }

    #[instrument(skip(self), fields(purchase_id = %purchase_id))]
    async fn list_purchase_items(&self, purchase_id: PurchaseId) -> Result<Vec<PurchaseItem>, PortError> {
        let rows = self.payables.list_purchase_items(*purchase_id.as_uuid()).await?;
        Ok(rows
            .into_iter()
            .map(|row| purchase_item_from_row(row, self.currency))
            .collect::<Result<_, _>>()?)
    }

    #[instrument(skip_all, fields(purchase_id = %purchase.id, balance_due = %purchase.balance_due))]
    async fn update_purchase(&self, purchase: &Purchase) -> Result<(), PortError> {
        Ok(self.payables.update_purchase(&purchase_to_row(purchase)).await?)
    }

    #[instrument(skip(self), fields(purchase_id = %purchase_id))]
    async fn list_supplier_payments(&self, purchase_id: PurchaseId) -> Result<Vec<SupplierPayment>, PortError> {
        let rows = self.payables.list_supplier_payments(*purchase_id.as_uuid()).await?;
        Ok(rows
            .into_iter()
            .map(|row| supplier_payment_from_row(row, self.currency))
            .collect::<Result<_, _>>()?)
    }

    #[instrument(skip(self), fields(payment_id = %id))]
    async fn get_supplier_payment(&self, id: SupplierPaymentId) -> Result<SupplierPayment, PortError> {
        let row = self.payables.get_supplier_payment(*id.as_uuid()).await?;
        Ok(supplier_payment_from_row(row, self.currency)?)
    }

    #[instrument(skip_all, fields(payment_number = %payment.payment_number, purchase_id = %payment.purchase_id))]
    async fn insert_supplier_payment(&self, payment: &SupplierPayment) -> Result<(), PortError> {
        Ok(self
            .payables
            .insert_supplier_payment(&supplier_payment_to_row(payment))
            .await?)
    }

    #[instrument(skip(self), fields(payment_id = %id, status = %status))]
    async fn update_supplier_payment_status(
        &self,
        id: SupplierPaymentId,
        status: ChequeStatus,
    ) -> Result<SupplierPayment, PortError> {
        let row = self.payables.set_cheque_status(*id.as_uuid(), status.as_str()).await?;
        Ok(supplier_payment_from_row(row, self.currency)?)
    }
}
