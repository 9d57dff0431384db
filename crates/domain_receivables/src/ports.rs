//! Receivables Domain Ports
//!
//! `ReceivablesPort` is the customer-side view of the ledger store. Each
//! method is a single statement against the store; there is no
//! cross-statement transaction, so the services order their writes.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_receivables::{ReceivablesPort, ReturnProcessor};
//!
//! let store: Arc<dyn ReceivablesPort> = Arc::new(PostgresLedgerAdapter::new(pool, currency));
//! let returns = ReturnProcessor::new(store.clone());
//! ```

use async_trait::async_trait;

use core_kernel::{AccountId, CustomerId, Money, OrderId, OrderItemId, PaymentId, PortError, ProductId};
use domain_treasury::{ChequeStatus, TreasuryPort};

use crate::customer::Customer;
use crate::order::{InventoryTransaction, Order, OrderItem, Product};
use crate::payment::Payment;

/// Filter for listing payments
#[derive(Debug, Clone, Default)]
pub struct PaymentQuery {
    pub order_id: Option<OrderId>,
    pub customer_id: Option<CustomerId>,
}

impl PaymentQuery {
    pub fn for_order(order_id: OrderId) -> Self {
        Self {
            order_id: Some(order_id),
            customer_id: None,
        }
    }

    pub fn for_customer(customer_id: CustomerId) -> Self {
        Self {
            order_id: None,
            customer_id: Some(customer_id),
        }
    }

    /// Returns true if the payment satisfies every set filter
    pub fn matches(&self, payment: &Payment) -> bool {
        self.order_id.map_or(true, |id| payment.order_id == id)
            && self.customer_id.map_or(true, |id| payment.customer_id == id)
    }
}

/// Customer-side ledger store operations
#[async_trait]
pub trait ReceivablesPort: TreasuryPort {
    // Orders

    async fn get_order(&self, id: OrderId) -> Result<Order, PortError>;

    /// All orders of a customer, oldest first
    async fn list_orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, PortError>;

    async fn list_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, PortError>;

    async fn update_order_item(&self, item: &OrderItem) -> Result<(), PortError>;

    async fn delete_order_item(&self, id: OrderItemId) -> Result<(), PortError>;

    /// Writes the order's totals, payment status and status
    async fn update_order(&self, order: &Order) -> Result<(), PortError>;

    // Stock

    async fn get_product(&self, id: ProductId) -> Result<Product, PortError>;

    async fn update_product_stock(&self, id: ProductId, new_quantity: i64) -> Result<(), PortError>;

    async fn insert_inventory_transaction(&self, transaction: &InventoryTransaction) -> Result<(), PortError>;

    // Payments

    async fn list_payments(&self, query: PaymentQuery) -> Result<Vec<Payment>, PortError>;

    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError>;

    async fn insert_payment(&self, payment: &Payment) -> Result<(), PortError>;

    /// Sets the cheque status, and the deposit account when one is given
    async fn update_payment_cheque_status(
        &self,
        id: PaymentId,
        status: ChequeStatus,
        deposit_account_id: Option<AccountId>,
    ) -> Result<Payment, PortError>;

    // Customers

    async fn get_customer(&self, id: CustomerId) -> Result<Customer, PortError>;

    async fn update_customer_outstanding_balance(
        &self,
        id: CustomerId,
        new_balance: Money,
    ) -> Result<(), PortError>;
}

/// Mock implementation for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use core_kernel::{DomainPort, HealthCheckable, HealthCheckResult};
    use domain_treasury::{CompanyAccount, MockTreasuryPort};

    /// In-memory mock implementation of ReceivablesPort
    ///
    /// Clones share state, so a test can keep a handle for assertions
    /// after handing one to a service.
    #[derive(Debug, Default, Clone)]
    pub struct MockReceivablesPort {
        treasury: MockTreasuryPort,
        orders: Arc<RwLock<HashMap<OrderId, Order>>>,
        items: Arc<RwLock<Vec<OrderItem>>>,
        products: Arc<RwLock<HashMap<ProductId, Product>>>,
        inventory: Arc<RwLock<Vec<InventoryTransaction>>>,
        payments: Arc<RwLock<Vec<Payment>>>,
        customers: Arc<RwLock<HashMap<CustomerId, Customer>>>,
        failing_payment_orders: Arc<RwLock<HashSet<OrderId>>>,
    }

    impl MockReceivablesPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn treasury(&self) -> &MockTreasuryPort {
            &self.treasury
        }

        pub async fn add_account(&self, account: CompanyAccount) {
            self.treasury.insert_account(account).await;
        }

        pub async fn add_customer(&self, customer: Customer) {
            self.customers.write().await.insert(customer.id, customer);
        }

        pub async fn add_order(&self, order: Order) {
            self.orders.write().await.insert(order.id, order);
        }

        pub async fn add_order_item(&self, item: OrderItem) {
            self.items.write().await.push(item);
        }

        pub async fn add_product(&self, product: Product) {
            self.products.write().await.insert(product.id, product);
        }

        pub async fn add_payment(&self, payment: Payment) {
            self.payments.write().await.push(payment);
        }

        /// Makes every payment insert for this order fail
        pub async fn fail_payment_inserts_for(&self, order_id: OrderId) {
            self.failing_payment_orders.write().await.insert(order_id);
        }

        pub async fn account(&self, id: AccountId) -> Option<CompanyAccount> {
            self.treasury.account(id).await
        }

        pub async fn order(&self, id: OrderId) -> Option<Order> {
            self.orders.read().await.get(&id).cloned()
        }

        pub async fn order_items(&self, order_id: OrderId) -> Vec<OrderItem> {
            self.items
                .read()
                .await
                .iter()
                .filter(|i| i.order_id == order_id)
                .cloned()
                .collect()
        }

        pub async fn product(&self, id: ProductId) -> Option<Product> {
            self.products.read().await.get(&id).cloned()
        }

        pub async fn customer(&self, id: CustomerId) -> Option<Customer> {
            self.customers.read().await.get(&id).cloned()
        }

        pub async fn payments_for(&self, order_id: OrderId) -> Vec<Payment> {
            self.payments
                .read()
                .await
                .iter()
                .filter(|p| p.order_id == order_id)
                .cloned()
                .collect()
        }

        pub async fn payment_count(&self) -> usize {
            self.payments.read().await.len()
        }

        pub async fn inventory_transactions(&self) -> Vec<InventoryTransaction> {
            self.inventory.read().await.clone()
        }
    }

    impl DomainPort for MockReceivablesPort {}

    #[async_trait]
    impl HealthCheckable for MockReceivablesPort {
        async fn health_check(&self) -> HealthCheckResult {
            self.treasury.health_check().await
        }
    }

    #[async_trait]
    impl TreasuryPort for MockReceivablesPort {
        async fn get_company_account(&self, id: AccountId) -> Result<CompanyAccount, PortError> {
            self.treasury.get_company_account(id).await
        }

        async fn update_company_account_balance(
            &self,
            id: AccountId,
            new_balance: Money,
        ) -> Result<CompanyAccount, PortError> {
            self.treasury.update_company_account_balance(id, new_balance).await
        }
    }

    #[async_trait]
    impl ReceivablesPort for MockReceivablesPort {
        async fn get_order(&self, id: OrderId) -> Result<Order, PortError> {
            self.orders
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Order", id))
        }

        async fn list_orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, PortError> {
            let mut orders: Vec<Order> = self
                .orders
                .read()
                .await
                .values()
                .filter(|o| o.customer_id == customer_id)
                .cloned()
                .collect();
            orders.sort_by(|a, b| a.order_date.cmp(&b.order_date).then(a.order_number.cmp(&b.order_number)));
            Ok(orders)
        }

        async fn list_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, PortError> {
            Ok(self.order_items(order_id).await)
        }

        async fn update_order_item(&self, item: &OrderItem) -> Result<(), PortError> {
            let mut items = self.items.write().await;
            let stored = items
                .iter_mut()
                .find(|i| i.id == item.id)
                .ok_or_else(|| PortError::not_found("OrderItem", item.id))?;
            *stored = item.clone();
            Ok(())
        }

        async fn delete_order_item(&self, id: OrderItemId) -> Result<(), PortError> {
            let mut items = self.items.write().await;
            let before = items.len();
            items.retain(|i| i.id != id);
            if items.len() == before {
                return Err(PortError::not_found("OrderItem", id));
            }
            Ok(())
        }

        async fn update_order(&self, order: &Order) -> Result<(), PortError> {
            let mut orders = self.orders.write().await;
            let stored = orders
                .get_mut(&order.id)
                .ok_or_else(|| PortError::not_found("Order", order.id))?;
            *stored = order.clone();
            Ok(())
        }

        async fn get_product(&self, id: ProductId) -> Result<Product, PortError> {
            self.products
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Product", id))
        }

        async fn update_product_stock(&self, id: ProductId, new_quantity: i64) -> Result<(), PortError> {
            let mut products = self.products.write().await;
            let product = products
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Product", id))?;
            product.stock_quantity = new_quantity;
            Ok(())
        }

        async fn insert_inventory_transaction(&self, transaction: &InventoryTransaction) -> Result<(), PortError> {
            self.inventory.write().await.push(transaction.clone());
            Ok(())
        }

        async fn list_payments(&self, query: PaymentQuery) -> Result<Vec<Payment>, PortError> {
            Ok(self
                .payments
                .read()
                .await
                .iter()
                .filter(|p| query.matches(p))
                .cloned()
                .collect())
        }

        async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
            self.payments
                .read()
                .await
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Payment", id))
        }

        async fn insert_payment(&self, payment: &Payment) -> Result<(), PortError> {
            if self.failing_payment_orders.read().await.contains(&payment.order_id) {
                return Err(PortError::connection(format!(
                    "insert rejected for order {}",
                    payment.order_id
                )));
            }
            self.payments.write().await.push(payment.clone());
            Ok(())
        }

        async fn update_payment_cheque_status(
            &self,
            id: PaymentId,
            status: ChequeStatus,
            deposit_account_id: Option<AccountId>,
        ) -> Result<Payment, PortError> {
            let mut payments = self.payments.write().await;
            let payment = payments
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| PortError::not_found("Payment", id))?;
            payment.cheque_status = Some(status);
            if deposit_account_id.is_some() {
                payment.deposit_account_id = deposit_account_id;
            }
            Ok(payment.clone())
        }

        async fn get_customer(&self, id: CustomerId) -> Result<Customer, PortError> {
            self.customers
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Customer", id))
        }

        async fn update_customer_outstanding_balance(
            &self,
            id: CustomerId,
            new_balance: Money,
        ) -> Result<(), PortError> {
            let mut customers = self.customers.write().await;
            let customer = customers
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Customer", id))?;
            customer.outstanding_balance = new_balance;
            Ok(())
        }
    }
}
