//! Row <-> domain conversions
//!
//! Amounts are stored as bare decimals; the adapter's ledger currency is
//! attached on the way out. Text enumerations are parsed with the domain
//! types' `FromStr`, so an unknown stored value is a decode error rather
//! than a silent default.

use std::fmt::Display;
use std::str::FromStr;

use uuid::Uuid;

use core_kernel::{BankId, Currency, Money};
use domain_payables::{Purchase, PurchaseItem, SupplierPayment};
use domain_receivables::{Customer, InventoryTransaction, Order, OrderItem, Payment, Product};
use domain_treasury::{ChequeDetails, CompanyAccount};

use crate::error::DatabaseError;
use crate::repositories::{
    AccountRow, CustomerRow, InventoryTransactionRow, OrderItemRow, OrderRow, PaymentRow, ProductRow,
    PurchaseItemRow, PurchaseRow, SupplierPaymentRow,
};

fn parse<T>(column: &str, value: &str) -> Result<T, DatabaseError>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|e| DatabaseError::decode(column, e))
}

fn parse_opt<T>(column: &str, value: Option<&str>) -> Result<Option<T>, DatabaseError>
where
    T: FromStr,
    T::Err: Display,
{
    value.map(|v| parse(column, v)).transpose()
}

fn quantity_from_db(column: &str, value: i32) -> Result<u32, DatabaseError> {
    u32::try_from(value).map_err(|e| DatabaseError::decode(column, e))
}

fn quantity_to_db(column: &str, value: u32) -> Result<i32, DatabaseError> {
    i32::try_from(value).map_err(|e| DatabaseError::decode(column, e))
}

/// Rebuilds cheque details from the flattened columns
///
/// Both number and date must be present; a row with only one of them is
/// treated as carrying no cheque.
fn cheque_from_columns(
    number: Option<&str>,
    date: Option<chrono::NaiveDate>,
    bank_id: Option<Uuid>,
) -> Option<ChequeDetails> {
    match (number, date) {
        (Some(number), Some(date)) => Some(ChequeDetails {
            cheque_number: number.to_string(),
            cheque_date: date,
            bank_id: bank_id.map(BankId::from),
        }),
        _ => None,
    }
}

pub fn account_from_row(row: AccountRow, currency: Currency) -> Result<CompanyAccount, DatabaseError> {
    Ok(CompanyAccount {
        id: row.account_id.into(),
        name: row.name,
        kind: parse("kind", &row.kind)?,
        opening_balance: Money::new(row.opening_balance, currency),
        current_balance: Money::new(row.current_balance, currency),
        is_active: row.is_active,
        updated_at: row.updated_at,
    })
}

pub fn order_from_row(row: OrderRow, currency: Currency) -> Result<Order, DatabaseError> {
    Ok(Order {
        id: row.order_id.into(),
        order_number: row.order_number,
        customer_id: row.customer_id.into(),
        order_date: row.order_date,
        subtotal: Money::new(row.subtotal, currency),
        discount_amount: Money::new(row.discount_amount, currency),
        total_amount: Money::new(row.total_amount, currency),
        payment_status: parse("payment_status", &row.payment_status)?,
        status: parse("status", &row.status)?,
        updated_at: row.updated_at,
    })
}

pub fn order_to_row(order: &Order) -> OrderRow {
    OrderRow {
        order_id: *order.id.as_uuid(),
        order_number: order.order_number.clone(),
        customer_id: *order.customer_id.as_uuid(),
        order_date: order.order_date,
        subtotal: order.subtotal.amount(),
        discount_amount: order.discount_amount.amount(),
        total_amount: order.total_amount.amount(),
        payment_status: order.payment_status.as_str().to_string(),
        status: order.status.as_str().to_string(),
        updated_at: order.updated_at,
    }
}

pub fn order_item_from_row(row: OrderItemRow, currency: Currency) -> Result<OrderItem, DatabaseError> {
    Ok(OrderItem {
        id: row.order_item_id.into(),
        order_id: row.order_id.into(),
        product_id: row.product_id.into(),
        quantity: quantity_from_db("quantity", row.quantity)?,
        unit_price: Money::new(row.unit_price, currency),
        discount_percent: row.discount_percent,
        line_total: Money::new(row.line_total, currency),
    })
}

pub fn order_item_to_row(item: &OrderItem) -> Result<OrderItemRow, DatabaseError> {
    Ok(OrderItemRow {
        order_item_id: *item.id.as_uuid(),
        order_id: *item.order_id.as_uuid(),
        product_id: *item.product_id.as_uuid(),
        quantity: quantity_to_db("quantity", item.quantity)?,
        unit_price: item.unit_price.amount(),
        discount_percent: item.discount_percent,
        line_total: item.line_total.amount(),
    })
}

pub fn product_from_row(row: ProductRow) -> Product {
    Product {
        id: row.product_id.into(),
        name: row.name,
        stock_quantity: row.stock_quantity,
    }
}

pub fn inventory_transaction_to_row(transaction: &InventoryTransaction) -> InventoryTransactionRow {
    InventoryTransactionRow {
        transaction_id: *transaction.id.as_uuid(),
        product_id: *transaction.product_id.as_uuid(),
        transaction_type: transaction.transaction_type.as_str().to_string(),
        quantity: transaction.quantity,
        reference_order: transaction.reference_order.map(|id| *id.as_uuid()),
        notes: transaction.notes.clone(),
        created_at: transaction.created_at,
    }
}

pub fn payment_from_row(row: PaymentRow, currency: Currency) -> Result<Payment, DatabaseError> {
    Ok(Payment {
        id: row.payment_id.into(),
        payment_number: row.payment_number,
        order_id: row.order_id.into(),
        customer_id: row.customer_id.into(),
        amount: Money::new(row.amount, currency),
        payment_date: row.payment_date,
        method: parse("method", &row.method)?,
        cheque: cheque_from_columns(row.cheque_number.as_deref(), row.cheque_date, row.bank_id),
        cheque_status: parse_opt("cheque_status", row.cheque_status.as_deref())?,
        deposit_account_id: row.deposit_account_id.map(Into::into),
        notes: row.notes,
        created_at: row.created_at,
    })
}

pub fn payment_to_row(payment: &Payment) -> PaymentRow {
    let cheque = payment.cheque.as_ref();
    PaymentRow {
        payment_id: *payment.id.as_uuid(),
        payment_number: payment.payment_number.clone(),
        order_id: *payment.order_id.as_uuid(),
        customer_id: *payment.customer_id.as_uuid(),
        amount: payment.amount.amount(),
        payment_date: payment.payment_date,
        method: payment.method.as_str().to_string(),
        cheque_number: cheque.map(|c| c.cheque_number.clone()),
        cheque_date: cheque.map(|c| c.cheque_date),
        bank_id: cheque.and_then(|c| c.bank_id).map(|id| *id.as_uuid()),
        cheque_status: payment.cheque_status.map(|s| s.as_str().to_string()),
        deposit_account_id: payment.deposit_account_id.map(|id| *id.as_uuid()),
        notes: payment.notes.clone(),
        created_at: payment.created_at,
    }
}

pub fn customer_from_row(row: CustomerRow, currency: Currency) -> Customer {
    Customer {
        id: row.customer_id.into(),
        name: row.name,
        outstanding_balance: Money::new(row.outstanding_balance, currency),
    }
}

pub fn purchase_from_row(row: PurchaseRow, currency: Currency) -> Result<Purchase, DatabaseError> {
    Ok(Purchase {
        id: row.purchase_id.into(),
        purchase_number: row.purchase_number,
        supplier_id: row.supplier_id.into(),
        purchase_date: row.purchase_date,
        subtotal: Money::new(row.subtotal, currency),
        discount_amount: Money::new(row.discount_amount, currency),
        total_amount: Money::new(row.total_amount, currency),
        balance_due: Money::new(row.balance_due, currency),
        payment_status: parse("payment_status", &row.payment_status)?,
        status: parse("status", &row.status)?,
        updated_at: row.updated_at,
    })
}

pub fn purchase_to_row(purchase: &Purchase) -> PurchaseRow {
    PurchaseRow {
        purchase_id: *purchase.id.as_uuid(),
        purchase_number: purchase.purchase_number.clone(),
        supplier_id: *purchase.supplier_id.as_uuid(),
        purchase_date: purchase.purchase_date,
        subtotal: purchase.subtotal.amount(),
        discount_amount: purchase.discount_amount.amount(),
        total_amount: purchase.total_amount.amount(),
        balance_due: purchase.balance_due.amount(),
        payment_status: purchase.payment_status.as_str().to_string(),
        status: purchase.status.as_str().to_string(),
        updated_at: purchase.updated_at,
    }
}

pub fn purchase_item_from_row(row: PurchaseItemRow, currency: Currency) -> Result<PurchaseItem, DatabaseError> {
    Ok(PurchaseItem {
        id: row.purchase_item_id.into(),
        purchase_id: row.purchase_id.into(),
        product_id: row.product_id.into(),
        quantity: quantity_from_db("quantity", row.quantity)?,
        unit_cost: Money::new(row.unit_cost, currency),
        discount_percent: row.discount_percent,
        line_total: Money::new(row.line_total, currency),
    })
}

pub fn supplier_payment_from_row(row: SupplierPaymentRow, currency: Currency) -> Result<SupplierPayment, DatabaseError> {
    Ok(SupplierPayment {
        id: row.supplier_payment_id.into(),
        payment_number: row.payment_number,
        purchase_id: row.purchase_id.into(),
        supplier_id: row.supplier_id.into(),
        amount: Money::new(row.amount, currency),
        payment_date: row.payment_date,
        method: parse("method", &row.method)?,
        cheque: cheque_from_columns(row.cheque_number.as_deref(), row.cheque_date, row.bank_id),
        cheque_status: parse_opt("cheque_status", row.cheque_status.as_deref())?,
        account_id: row.account_id.into(),
        notes: row.notes,
        created_at: row.created_at,
    })
}

pub fn supplier_payment_to_row(payment: &SupplierPayment) -> SupplierPaymentRow {
    let cheque = payment.cheque.as_ref();
    SupplierPaymentRow {
        supplier_payment_id: *payment.id.as_uuid(),
        payment_number: payment.payment_number.clone(),
        purchase_id: *payment.purchase_id.as_uuid(),
        supplier_id: *payment.supplier_id.as_uuid(),
        amount: payment.amount.amount(),
        payment_date: payment.payment_date,
        method: payment.method.as_str().to_string(),
        cheque_number: cheque.map(|c| c.cheque_number.clone()),
        cheque_date: cheque.map(|c| c.cheque_date),
        bank_id: cheque.and_then(|c| c.bank_id).map(|id| *id.as_uuid()),
        cheque_status: payment.cheque_status.map(|s| s.as_str().to_string()),
        account_id: *payment.account_id.as_uuid(),
        notes: payment.notes.clone(),
        created_at: payment.created_at,
    }
}
