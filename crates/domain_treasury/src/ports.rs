//! Treasury Domain Ports
//!
//! `TreasuryPort` is the slice of the ledger store that owns company
//! accounts. The receivables and payables ports extend it, so one adapter
//! serves every flow that moves money in or out of an account.

use async_trait::async_trait;

use core_kernel::{AccountId, DomainPort, HealthCheckable, Money, PortError};

use crate::account::CompanyAccount;

/// Ledger store operations on company accounts
#[async_trait]
pub trait TreasuryPort: DomainPort + HealthCheckable {
    /// Retrieves an account, or `PortError::NotFound`
    async fn get_company_account(&self, id: AccountId) -> Result<CompanyAccount, PortError>;

    /// Overwrites the account's current balance
    ///
    /// Callers read the current balance immediately before writing; the
    /// store performs no arithmetic of its own.
    async fn update_company_account_balance(
        &self,
        id: AccountId,
        new_balance: Money,
    ) -> Result<CompanyAccount, PortError>;
}

/// In-memory accounts for tests
///
/// The receivables and payables mocks embed this store and delegate their
/// `TreasuryPort` methods to it.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use chrono::Utc;
    use core_kernel::{AdapterHealth, HealthCheckResult};

    /// In-memory mock implementation of TreasuryPort
    #[derive(Debug, Default, Clone)]
    pub struct MockTreasuryPort {
        accounts: Arc<RwLock<HashMap<AccountId, CompanyAccount>>>,
    }

    impl MockTreasuryPort {
        /// Creates an empty mock
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a mock pre-populated with accounts
        pub async fn with_accounts(accounts: Vec<CompanyAccount>) -> Self {
            let mock = Self::new();
            for account in accounts {
                mock.insert_account(account).await;
            }
            mock
        }

        /// Adds or replaces an account
        pub async fn insert_account(&self, account: CompanyAccount) {
            self.accounts.write().await.insert(account.id, account);
        }

        /// Returns a snapshot of an account
        pub async fn account(&self, id: AccountId) -> Option<CompanyAccount> {
            self.accounts.read().await.get(&id).cloned()
        }
    }

    impl DomainPort for MockTreasuryPort {}

    #[async_trait]
    impl HealthCheckable for MockTreasuryPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-treasury".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl TreasuryPort for MockTreasuryPort {
        async fn get_company_account(&self, id: AccountId) -> Result<CompanyAccount, PortError> {
            self.accounts
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("CompanyAccount", id))
        }

        async fn update_company_account_balance(
            &self,
            id: AccountId,
            new_balance: Money,
        ) -> Result<CompanyAccount, PortError> {
            let mut accounts = self.accounts.write().await;
            let account = accounts
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("CompanyAccount", id))?;
            account.current_balance = new_balance;
            account.updated_at = Utc::now();
            Ok(account.clone())
        }
    }
}
