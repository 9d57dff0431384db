//! Supplier payment and account DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{AccountId, Currency, Money, PurchaseId};
use domain_payables::{Purchase, SupplierChequeTransition, SupplierPayment, SupplierPaymentOutcome, SupplierPaymentRequest};
use domain_treasury::{ChequeMeta, OverdraftAdvisory, PaymentMethod};

use crate::dto::settlement::ChequeInput;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SupplierPaymentBody {
    pub purchase_id: Uuid,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: String,
    pub cheque: Option<ChequeInput>,
    pub account_id: Option<Uuid>,
    pub notes: Option<String>,
    /// Set after the caller has seen the overdraft advisory
    #[serde(default)]
    pub overdraft_confirmed: bool,
}

impl SupplierPaymentBody {
    pub fn into_domain(self, currency: Currency) -> Result<SupplierPaymentRequest, ApiError> {
        let method: PaymentMethod = self.method.parse()?;
        Ok(SupplierPaymentRequest {
            purchase_id: PurchaseId::from_uuid(self.purchase_id),
            amount: Money::new(self.amount, currency),
            payment_date: self.payment_date,
            method,
            cheque: self.cheque.map(ChequeMeta::from),
            account_id: self.account_id.map(AccountId::from_uuid),
            notes: self.notes,
            overdraft_confirmed: self.overdraft_confirmed,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SupplierPaymentResponse {
    pub id: Uuid,
    pub payment_number: String,
    pub purchase_id: Uuid,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: String,
    pub cheque_status: Option<String>,
    pub account_id: Uuid,
}

impl From<&SupplierPayment> for SupplierPaymentResponse {
    fn from(p: &SupplierPayment) -> Self {
        Self {
            id: *p.id.as_uuid(),
            payment_number: p.payment_number.clone(),
            purchase_id: *p.purchase_id.as_uuid(),
            amount: p.amount.amount(),
            payment_date: p.payment_date,
            method: p.method.as_str().to_string(),
            cheque_status: p.cheque_status.map(|s| s.as_str().to_string()),
            account_id: *p.account_id.as_uuid(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PurchaseBalanceResponse {
    pub purchase_id: Uuid,
    pub purchase_number: String,
    pub total_amount: Decimal,
    pub balance_due: Decimal,
    pub payment_status: String,
}

impl From<&Purchase> for PurchaseBalanceResponse {
    fn from(p: &Purchase) -> Self {
        Self {
            purchase_id: *p.id.as_uuid(),
            purchase_number: p.purchase_number.clone(),
            total_amount: p.total_amount.amount(),
            balance_due: p.balance_due.amount(),
            payment_status: p.payment_status.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdvisoryResponse {
    pub account_id: Uuid,
    pub account_name: String,
    pub account_kind: String,
    pub current_balance: Decimal,
    pub new_balance: Decimal,
    pub facility: bool,
    pub message: String,
}

impl From<&OverdraftAdvisory> for AdvisoryResponse {
    fn from(a: &OverdraftAdvisory) -> Self {
        Self {
            account_id: *a.account_id.as_uuid(),
            account_name: a.account_name.clone(),
            account_kind: a.account_kind.as_str().to_string(),
            current_balance: a.current_balance.amount(),
            new_balance: a.new_balance.amount(),
            facility: a.facility,
            message: a.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SupplierPaymentOutcomeResponse {
    pub payment: SupplierPaymentResponse,
    pub purchase: PurchaseBalanceResponse,
    pub account_balance: Option<Decimal>,
    pub advisory: Option<AdvisoryResponse>,
}

impl From<SupplierPaymentOutcome> for SupplierPaymentOutcomeResponse {
    fn from(o: SupplierPaymentOutcome) -> Self {
        Self {
            payment: SupplierPaymentResponse::from(&o.payment),
            purchase: PurchaseBalanceResponse::from(&o.purchase),
            account_balance: o.account_balance.map(|m| m.amount()),
            advisory: o.advisory.as_ref().map(AdvisoryResponse::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SupplierChequeTransitionResponse {
    pub payment: SupplierPaymentResponse,
    pub previous_status: String,
    pub purchase: PurchaseBalanceResponse,
    pub account_balance: Option<Decimal>,
    pub advisory: Option<AdvisoryResponse>,
}

impl From<SupplierChequeTransition> for SupplierChequeTransitionResponse {
    fn from(t: SupplierChequeTransition) -> Self {
        Self {
            payment: SupplierPaymentResponse::from(&t.payment),
            previous_status: t.previous_status.as_str().to_string(),
            purchase: PurchaseBalanceResponse::from(&t.purchase),
            account_balance: t.account_balance.map(|m| m.amount()),
            advisory: t.advisory.as_ref().map(AdvisoryResponse::from),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SupplierChequeStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AdvisoryQuery {
    pub amount: Decimal,
}

/// `advisory` is null when the account can cover the amount
#[derive(Debug, Serialize)]
pub struct OverdraftPreviewResponse {
    pub account_id: Uuid,
    pub amount: Decimal,
    pub advisory: Option<AdvisoryResponse>,
}
