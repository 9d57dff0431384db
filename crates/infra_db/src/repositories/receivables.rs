//! Receivables repository
//!
//! Orders, order lines, products and their stock movements, customer
//! payments and customer balances. Every method is one statement; the
//! domain services decide the order of writes.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const ORDER_COLUMNS: &str = "order_id, order_number, customer_id, order_date, subtotal, \
     discount_amount, total_amount, payment_status, status, updated_at";

const ORDER_ITEM_COLUMNS: &str =
    "order_item_id, order_id, product_id, quantity, unit_price, discount_percent, line_total";

const PAYMENT_COLUMNS: &str = "payment_id, payment_number, order_id, customer_id, amount, \
     payment_date, method, cheque_number, cheque_date, bank_id, cheque_status, \
     deposit_account_id, notes, created_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub order_id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub order_date: NaiveDate,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_status: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItemRow {
    pub order_item_id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub product_id: Uuid,
    pub name: String,
    pub stock_quantity: i64,
}

#[derive(Debug, Clone)]
pub struct InventoryTransactionRow {
    pub transaction_id: Uuid,
    pub product_id: Uuid,
    pub transaction_type: String,
    pub quantity: i64,
    pub reference_order: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database row for a customer payment
///
/// Cheque metadata is flattened into nullable columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentRow {
    pub payment_id: Uuid,
    pub payment_number: String,
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: String,
    pub cheque_number: Option<String>,
    pub cheque_date: Option<NaiveDate>,
    pub bank_id: Option<Uuid>,
    pub cheque_status: Option<String>,
    pub deposit_account_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerRow {
    pub customer_id: Uuid,
    pub name: String,
    pub outstanding_balance: Decimal,
}

/// Reads and writes the customer-side tables
#[derive(Debug, Clone)]
pub struct ReceivablesRepository {
    pool: PgPool,
}

impl ReceivablesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Orders

    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderRow, DatabaseError> {
        let sql = format!("SELECT {} FROM orders WHERE order_id = $1", ORDER_COLUMNS);
        sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Order", order_id))
    }

    /// A customer's orders, oldest first
    pub async fn list_orders_for_customer(&self, customer_id: Uuid) -> Result<Vec<OrderRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM orders WHERE customer_id = $1 ORDER BY order_date, order_number",
            ORDER_COLUMNS
        );
        Ok(sqlx::query_as::<_, OrderRow>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Writes totals, payment status and status
    pub async fn update_order(&self, row: &OrderRow) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET subtotal = $2, discount_amount = $3, total_amount = $4,
                payment_status = $5, status = $6, updated_at = now()
            WHERE order_id = $1
            "#,
        )
        .bind(row.order_id)
        .bind(row.subtotal)
        .bind(row.discount_amount)
        .bind(row.total_amount)
        .bind(&row.payment_status)
        .bind(&row.status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Order", row.order_id));
        }
        Ok(())
    }

    // Order items

    pub async fn list_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItemRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM order_items WHERE order_id = $1 ORDER BY order_item_id",
            ORDER_ITEM_COLUMNS
        );
        Ok(sqlx::query_as::<_, OrderItemRow>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Writes quantity and line total
    pub async fn update_order_item(&self, row: &OrderItemRow) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE order_items SET quantity = $2, line_total = $3 WHERE order_item_id = $1")
            .bind(row.order_item_id)
            .bind(row.quantity)
            .bind(row.line_total)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("OrderItem", row.order_item_id));
        }
        Ok(())
    }

    pub async fn delete_order_item(&self, order_item_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM order_items WHERE order_item_id = $1")
            .bind(order_item_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("OrderItem", order_item_id));
        }
        Ok(())
    }

    // Stock

    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductRow, DatabaseError> {
        sqlx::query_as::<_, ProductRow>("SELECT product_id, name, stock_quantity FROM products WHERE product_id = $1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Product", product_id))
    }

    pub async fn set_stock(&self, product_id: Uuid, quantity: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE products SET stock_quantity = $2 WHERE product_id = $1")
            .bind(product_id)
            .bind(quantity)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Product", product_id));
        }
        Ok(())
    }

    pub async fn insert_inventory_transaction(&self, row: &InventoryTransactionRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO inventory_transactions (
                transaction_id, product_id, transaction_type, quantity,
                reference_order, notes, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(row.transaction_id)
        .bind(row.product_id)
        .bind(&row.transaction_type)
        .bind(row.quantity)
        .bind(row.reference_order)
        .bind(&row.notes)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // Payments

    /// Payments matching the set filters, oldest first
    pub async fn list_payments(
        &self,
        order_id: Option<Uuid>,
        customer_id: Option<Uuid>,
    ) -> Result<Vec<PaymentRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM payments \
             WHERE ($1::uuid IS NULL OR order_id = $1) AND ($2::uuid IS NULL OR customer_id = $2) \
             ORDER BY created_at",
            PAYMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(order_id)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn get_payment(&self, payment_id: Uuid) -> Result<PaymentRow, DatabaseError> {
        let sql = format!("SELECT {} FROM payments WHERE payment_id = $1", PAYMENT_COLUMNS);
        sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Payment", payment_id))
    }

    pub async fn insert_payment(&self, row: &PaymentRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                payment_id, payment_number, order_id, customer_id, amount,
                payment_date, method, cheque_number, cheque_date, bank_id,
                cheque_status, deposit_account_id, notes, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(row.payment_id)
        .bind(&row.payment_number)
        .bind(row.order_id)
        .bind(row.customer_id)
        .bind(row.amount)
        .bind(row.payment_date)
        .bind(&row.method)
        .bind(&row.cheque_number)
        .bind(row.cheque_date)
        .bind(row.bank_id)
        .bind(&row.cheque_status)
        .bind(row.deposit_account_id)
        .bind(&row.notes)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Sets the cheque status, keeping the stored deposit account when
    /// `deposit_account_id` is `None`
    pub async fn set_cheque_status(
        &self,
        payment_id: Uuid,
        cheque_status: &str,
        deposit_account_id: Option<Uuid>,
    ) -> Result<PaymentRow, DatabaseError> {
        let sql = format!(
            "UPDATE payments \
             SET cheque_status = $2, deposit_account_id = COALESCE($3, deposit_account_id) \
             WHERE payment_id = $1 RETURNING {}",
            PAYMENT_COLUMNS
        );
        sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(payment_id)
            .bind(cheque_status)
            .bind(deposit_account_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Payment", payment_id))
    }

    // Customers

    pub async fn get_customer(&self, customer_id: Uuid) -> Result<CustomerRow, DatabaseError> {
        sqlx::query_as::<_, CustomerRow>(
            "SELECT customer_id, name, outstanding_balance FROM customers WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Customer", customer_id))
    }

    pub async fn set_outstanding_balance(&self, customer_id: Uuid, balance: Decimal) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE customers SET outstanding_balance = $2 WHERE customer_id = $1")
            .bind(customer_id)
            .bind(balance)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Customer", customer_id));
        }
        Ok(())
    }
}
