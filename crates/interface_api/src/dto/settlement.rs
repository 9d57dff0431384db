//! Settlement and customer cheque DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{AccountId, BankId, Currency, Money, OrderId};
use domain_receivables::{
    AllocationFailure, AllocationResult, ChequeTransition, Instrument, OutstandingInvoice, Payment, Selection,
};
use domain_treasury::{ChequeMeta, PaymentMethod};

use crate::error::ApiError;

/// Cheque metadata as entered; completeness is checked by the domain
#[derive(Debug, Default, Deserialize)]
pub struct ChequeInput {
    pub cheque_number: Option<String>,
    pub cheque_date: Option<NaiveDate>,
    pub bank_id: Option<Uuid>,
}

impl From<ChequeInput> for ChequeMeta {
    fn from(input: ChequeInput) -> Self {
        ChequeMeta {
            cheque_number: input.cheque_number,
            cheque_date: input.cheque_date,
            bank_id: input.bank_id.map(BankId::from_uuid),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub invoice_id: Uuid,
    pub settle_amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct SettlementRequest {
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: String,
    pub cheque: Option<ChequeInput>,
    pub deposit_account_id: Option<Uuid>,
    pub notes: Option<String>,
    #[serde(default)]
    pub selections: Vec<SelectionRequest>,
}

impl SettlementRequest {
    /// Splits the request into the instrument and its selections
    pub fn into_domain(self, currency: Currency) -> Result<(Instrument, Vec<Selection>), ApiError> {
        let method: PaymentMethod = self.method.parse()?;
        let instrument = Instrument {
            amount: Money::new(self.amount, currency),
            date: self.payment_date,
            method,
            cheque: self.cheque.map(ChequeMeta::from),
            deposit_account_id: self.deposit_account_id.map(AccountId::from_uuid),
            notes: self.notes,
        };
        let selections = self
            .selections
            .into_iter()
            .map(|s| Selection {
                invoice_id: OrderId::from_uuid(s.invoice_id),
                settle_amount: Money::new(s.settle_amount, currency),
            })
            .collect();
        Ok((instrument, selections))
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub payment_number: String,
    pub order_id: Uuid,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: String,
    pub cheque_status: Option<String>,
    pub deposit_account_id: Option<Uuid>,
}

impl From<&Payment> for PaymentResponse {
    fn from(p: &Payment) -> Self {
        Self {
            id: *p.id.as_uuid(),
            payment_number: p.payment_number.clone(),
            order_id: *p.order_id.as_uuid(),
            amount: p.amount.amount(),
            payment_date: p.payment_date,
            method: p.method.as_str().to_string(),
            cheque_status: p.cheque_status.map(|s| s.as_str().to_string()),
            deposit_account_id: p.deposit_account_id.map(|a| *a.as_uuid()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AllocationFailureResponse {
    pub invoice_id: Uuid,
    pub amount: Decimal,
    pub reason: String,
}

impl From<&AllocationFailure> for AllocationFailureResponse {
    fn from(f: &AllocationFailure) -> Self {
        Self {
            invoice_id: *f.invoice_id.as_uuid(),
            amount: f.amount.amount(),
            reason: f.reason.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SettlementResponse {
    pub created_count: usize,
    pub failed_count: usize,
    pub total_allocated: Decimal,
    pub customer_outstanding: Decimal,
    pub payments: Vec<PaymentResponse>,
    pub failures: Vec<AllocationFailureResponse>,
}

impl From<AllocationResult> for SettlementResponse {
    fn from(r: AllocationResult) -> Self {
        Self {
            created_count: r.created_count,
            failed_count: r.failed_count,
            total_allocated: r.total_allocated.amount(),
            customer_outstanding: r.customer_outstanding.amount(),
            payments: r.payments.iter().map(PaymentResponse::from).collect(),
            failures: r.failures.iter().map(AllocationFailureResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OutstandingInvoiceResponse {
    pub order_id: Uuid,
    pub order_number: String,
    pub order_date: NaiveDate,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance: Decimal,
}

impl From<OutstandingInvoice> for OutstandingInvoiceResponse {
    fn from(inv: OutstandingInvoice) -> Self {
        Self {
            order_id: *inv.order_id.as_uuid(),
            order_number: inv.order_number,
            order_date: inv.order_date,
            total_amount: inv.total_amount.amount(),
            paid_amount: inv.paid_amount.amount(),
            balance: inv.balance.amount(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChequeStatusRequest {
    pub status: String,
    /// Company account the cheque is deposited into
    pub deposit_account_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChequeTransitionResponse {
    pub payment: PaymentResponse,
    pub previous_status: String,
    pub order_payment_status: Option<String>,
    pub customer_outstanding: Option<Decimal>,
    pub account_balance: Option<Decimal>,
}

impl From<ChequeTransition> for ChequeTransitionResponse {
    fn from(t: ChequeTransition) -> Self {
        Self {
            payment: PaymentResponse::from(&t.payment),
            previous_status: t.previous_status.as_str().to_string(),
            order_payment_status: t.order_payment_status.map(|s| s.as_str().to_string()),
            customer_outstanding: t.customer_outstanding.map(|m| m.amount()),
            account_balance: t.account_balance.map(|m| m.amount()),
        }
    }
}
