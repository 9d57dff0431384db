//! Company account repository

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const ACCOUNT_COLUMNS: &str =
    "account_id, name, kind, opening_balance, current_balance, is_active, updated_at";

/// Database row for a company account
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub account_id: Uuid,
    pub name: String,
    pub kind: String,
    pub opening_balance: Decimal,
    pub current_balance: Decimal,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

/// Reads and writes `company_accounts`
#[derive(Debug, Clone)]
pub struct TreasuryRepository {
    pool: PgPool,
}

impl TreasuryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_account(&self, account_id: Uuid) -> Result<AccountRow, DatabaseError> {
        let sql = format!("SELECT {} FROM company_accounts WHERE account_id = $1", ACCOUNT_COLUMNS);
        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("CompanyAccount", account_id))
    }

    /// Overwrites the current balance and returns the updated row
    pub async fn set_balance(&self, account_id: Uuid, balance: Decimal) -> Result<AccountRow, DatabaseError> {
        let sql = format!(
            "UPDATE company_accounts SET current_balance = $2, updated_at = now() \
             WHERE account_id = $1 RETURNING {}",
            ACCOUNT_COLUMNS
        );
        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(account_id)
            .bind(balance)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("CompanyAccount", account_id))
    }

    /// Round-trip query used by health checks
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
