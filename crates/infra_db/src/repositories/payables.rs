//! Payables repository

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const PURCHASE_COLUMNS: &str = "purchase_id, purchase_number, supplier_id, purchase_date, subtotal, \
     discount_amount, total_amount, balance_due, payment_status, status, updated_at";

const SUPPLIER_PAYMENT_COLUMNS: &str = "supplier_payment_id, payment_number, purchase_id, supplier_id, \
     amount, payment_date, method, cheque_number, cheque_date, bank_id, cheque_status, account_id, \
     notes, created_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PurchaseRow {
    pub purchase_id: Uuid,
    pub purchase_number: String,
    pub supplier_id: Uuid,
    pub purchase_date: NaiveDate,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub balance_due: Decimal,
    pub payment_status: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PurchaseItemRow {
    pub purchase_item_id: Uuid,
    pub purchase_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub discount_percent: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SupplierPaymentRow {
    pub supplier_payment_id: Uuid,
    pub payment_number: String,
    pub purchase_id: Uuid,
    pub supplier_id: Uuid,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: String,
    pub cheque_number: Option<String>,
    pub cheque_date: Option<NaiveDate>,
    pub bank_id: Option<Uuid>,
    pub cheque_status: Option<String>,
    pub account_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Reads and writes purchases and supplier payments
#[derive(Debug, Clone)]
pub struct PayablesRepository {
    pool: PgPool,
}

impl PayablesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_purchase(&self, purchase_id: Uuid) -> Result<PurchaseRow, DatabaseError> {
        let sql = format!("SELECT {} FROM purchases WHERE purchase_id = $1", PURCHASE_COLUMNS);
        sqlx::query_as::<_, PurchaseRow>(&sql)
            .bind(purchase_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Purchase", purchase_id))
    }

    pub async fn list_purchase_items(&self, purchase_id: Uuid) -> Result<Vec<PurchaseItemRow>, DatabaseError> {
        Ok(sqlx::query_as::<_, PurchaseItemRow>(
            r#"
            SELECT purchase_item_id, purchase_id, product_id, quantity,
                   unit_cost, discount_percent, line_total
            FROM purchase_items
            WHERE purchase_id = $1
            ORDER BY purchase_item_id
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Writes totals, balance due and payment status
    pub async fn update_purchase(&self, row: &PurchaseRow) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE purchases
            SET subtotal = $2, discount_amount = $3, total_amount = $4,
                balance_due = $5, payment_status = $6, updated_at = now()
            WHERE purchase_id = $1
            "#,
        )
        .bind(row.purchase_id)
        .bind(row.subtotal)
        .bind(row.discount_amount)
        .bind(row.total_amount)
        .bind(row.balance_due)
        .bind(&row.payment_status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Purchase", row.purchase_id));
        }
        Ok(())
    }

    pub async fn list_supplier_payments(&self, purchase_id: Uuid) -> Result<Vec<SupplierPaymentRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM supplier_payments WHERE purchase_id = $1 ORDER BY created_at",
            SUPPLIER_PAYMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, SupplierPaymentRow>(&sql)
            .bind(purchase_id)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn get_supplier_payment(&self, payment_id: Uuid) -> Result<SupplierPaymentRow, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM supplier_payments WHERE supplier_payment_id = $1",
            SUPPLIER_PAYMENT_COLUMNS
        );
        sqlx::query_as::<_, SupplierPaymentRow>(&sql)
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("SupplierPayment", payment_id))
    }

    pub async fn insert_supplier_payment(&self, row: &SupplierPaymentRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO supplier_payments (
                supplier_payment_id, payment_number, purchase_id, supplier_id, amount,
                payment_date, method, cheque_number, cheque_date, bank_id,
                cheque_status, account_id, notes, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(row.supplier_payment_id)
        .bind(&row.payment_number)
        .bind(row.purchase_id)
        .bind(row.supplier_id)
        .bind(row.amount)
        .bind(row.payment_date)
        .bind(&row.method)
        .bind(&row.cheque_number)
        .bind(row.cheque_date)
        .bind(row.bank_id)
        .bind(&row.cheque_status)
        .bind(row.account_id)
        .bind(&row.notes)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn set_cheque_status(&self, payment_id: Uuid, cheque_status: &str) -> Result<SupplierPaymentRow, DatabaseError> {
        let sql = format!(
            "UPDATE supplier_payments SET cheque_status = $2 WHERE supplier_payment_id = $1 RETURNING {}",
            SUPPLIER_PAYMENT_COLUMNS
        );
        sqlx::query_as::<_, SupplierPaymentRow>(&sql)
            .bind(payment_id)
            .bind(cheque_status)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("SupplierPayment", payment_id))
    }
}
