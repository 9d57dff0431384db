//! Payables Domain Ports
//!
//! `PayablesPort` is the supplier-side view of the ledger store.

use async_trait::async_trait;

use core_kernel::{PortError, PurchaseId, SupplierPaymentId};
use domain_treasury::{ChequeStatus, TreasuryPort};

use crate::payment::SupplierPayment;
use crate::purchase::{Purchase, PurchaseItem};

/// Supplier-side ledger store operations
#[async_trait]
pub trait PayablesPort: TreasuryPort {
    async fn get_purchase(&self, id: PurchaseId) -> Result<Purchase, PortError>;

    async fn list_purchase_items(&self, purchase_id: PurchaseId) -> Result<Vec<PurchaseItem>, PortError>;

    /// Writes the purchase's totals, balance due and payment status
    async fn update_purchase(&self, purchase: &Purchase) -> Result<(), PortError>;

    async fn list_supplier_payments(&self, purchase_id: PurchaseId) -> Result<Vec<SupplierPayment>, PortError>;

    async fn get_supplier_payment(&self, id: SupplierPaymentId) -> Result<SupplierPayment, PortError>;

    async fn insert_supplier_payment(&self, payment: &SupplierPayment) -> Result<(), PortError>;

    async fn update_supplier_payment_status(
        &self,
        id: SupplierPaymentId,
        status: ChequeStatus,
    ) -> Result<SupplierPayment, PortError>;
}

/// Mock implementation for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use core_kernel::{AccountId, DomainPort, HealthCheckable, HealthCheckResult, Money};
    use domain_treasury::{CompanyAccount, MockTreasuryPort};

    /// In-memory mock implementation of PayablesPort
    #[derive(Debug, Default, Clone)]
    pub struct MockPayablesPort {
        treasury: MockTreasuryPort,
        purchases: Arc<RwLock<HashMap<PurchaseId, Purchase>>>,
        items: Arc<RwLock<Vec<PurchaseItem>>>,
        payments: Arc<RwLock<Vec<SupplierPayment>>>,
    }

    impl MockPayablesPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn treasury(&self) -> &MockTreasuryPort {
            &self.treasury
        }

        pub async fn add_account(&self, account: CompanyAccount) {
            self.treasury.insert_account(account).await;
        }

        pub async fn add_purchase(&self, purchase: Purchase) {
            self.purchases.write().await.insert(purchase.id, purchase);
        }

        pub async fn add_purchase_item(&self, item: PurchaseItem) {
            self.items.write().await.push(item);
        }

        pub async fn add_supplier_payment(&self, payment: SupplierPayment) {
            self.payments.write().await.push(payment);
        }

        pub async fn account(&self, id: AccountId) -> Option<CompanyAccount> {
            self.treasury.account(id).await
        }

        pub async fn purchase(&self, id: PurchaseId) -> Option<Purchase> {
            self.purchases.read().await.get(&id).cloned()
        }

        pub async fn supplier_payments(&self, purchase_id: PurchaseId) -> Vec<SupplierPayment> {
            self.payments
                .read()
                .await
                .iter()
                .filter(|p| p.purchase_id == purchase_id)
                .cloned()
                .collect()
        }
    }

    impl DomainPort for MockPayablesPort {}

    #[async_trait]
    impl HealthCheckable for MockPayablesPort {
        async fn health_check(&self) -> HealthCheckResult {
            self.treasury.health_check().await
        }
    }

    #[async_trait]
    impl TreasuryPort for MockPayablesPort {
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
    impl PayablesPort for MockPayablesPort {
        async fn get_purchase(&self, id: PurchaseId) -> Result<Purchase, PortError> {
            self.purchases
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Purchase", id))
        }

        async fn list_purchase_items(&self, purchase_id: PurchaseId) -> Result<Vec<PurchaseItem>, PortError> {
            Ok(self
                .items
                .read()
                .await
                .iter()
                .filter(|i| i.purchase_id == purchase_id)
                .cloned()
                .collect())
        }

        async fn update_purchase(&self, purchase: &Purchase) -> Result<(), PortError> {
            let mut purchases = self.purchases.write().await;
            let stored = purchases
                .get_mut(&purchase.id)
                .ok_or_else(|| PortError::not_found("Purchase", purchase.id))?;
            *stored = purchase.clone();
            Ok(())
        }

        async fn list_supplier_payments(&self, purchase_id: PurchaseId) -> Result<Vec<SupplierPayment>, PortError> {
            Ok(self.supplier_payments(purchase_id).await)
        }

        async fn get_supplier_payment(&self, id: SupplierPaymentId) -> Result<SupplierPayment, PortError> {
            self.payments
                .read()
                .await
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| PortError::not_found("SupplierPayment", id))
        }

        async fn insert_supplier_payment(&self, payment: &SupplierPayment) -> Result<(), PortError> {
            self.payments.write().await.push(payment.clone());
            Ok(())
        }

        async fn update_supplier_payment_status(
            &self,
            id: SupplierPaymentId,
            status: ChequeStatus,
        ) -> Result<SupplierPayment, PortError> {
            let mut payments = self.payments.write().await;
            let payment = payments
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| PortError::not_found("SupplierPayment", id))?;
            payment.cheque_status = Some(status);
            Ok(payment.clone())
        }
    }
}
