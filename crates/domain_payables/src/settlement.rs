//! Accounts-Payable Settlement
//!
//! Records supplier payments against a single purchase and clears issued
//! cheques. Money leaves a company account when it actually moves:
//!
//! - cash and bank payments debit the paying account when recorded;
//! - cheques debit it only when they pass;
//! - a returned cheque never debited anything, so only the purchase's
//!   balance due is restored.
//!
//! Account balances may go negative. When a payment would overdraw an
//! account the caller gets an [`OverdraftAdvisory`] and must confirm before
//! the payment is recorded; a cheque that passes is never blocked.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use core_kernel::{AccountId, Money, PurchaseId, SupplierPaymentId};
use domain_treasury::balances::{self, debit_account, resolve_account};
use domain_treasury::{
    generate_payment_number, validate_transition, CallerRole, ChequeDirection, ChequeMeta,
    ChequeStatus, OverdraftAdvisory, PaymentMethod,
};

use crate::error::PayablesError;
use crate::payment::{counted_total, SupplierPayment};
use crate::ports::PayablesPort;
use crate::purchase::Purchase;

/// A supplier payment as entered by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierPaymentRequest {
    pub purchase_id: PurchaseId,
    pub amount: Money,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub cheque: Option<ChequeMeta>,
    /// Paying company account
    pub account_id: Option<AccountId>,
    pub notes: Option<String>,
    /// Set once the caller has seen and accepted the overdraft advisory
    #[serde(default)]
    pub overdraft_confirmed: bool,
}

/// Result of recording a supplier payment
#[derive(Debug, Clone, Serialize)]
pub struct SupplierPaymentOutcome {
    pub payment: SupplierPayment,
    pub purchase: Purchase,
    /// Account balance after an immediate debit (cash and bank only)
    pub account_balance: Option<Money>,
    /// Present when the payment overdrew the account with confirmation
    pub advisory: Option<OverdraftAdvisory>,
}

/// Result of a supplier cheque transition
#[derive(Debug, Clone, Serialize)]
pub struct SupplierChequeTransition {
    pub payment: SupplierPayment,
    pub previous_status: ChequeStatus,
    pub purchase: Purchase,
    pub account_balance: Option<Money>,
    /// Present when passing the cheque overdrew the account
    pub advisory: Option<OverdraftAdvisory>,
}

/// Supplier-side payments and cheque clearance
pub struct PayablesSettlement {
    store: Arc<dyn PayablesPort>,
}

impl PayablesSettlement {
    pub fn new(store: Arc<dyn PayablesPort>) -> Self {
        Self { store }
    }

    /// Previews whether paying `amount` from an account would overdraw it
    pub async fn overdraft_advisory(
        &self,
        account_id: AccountId,
        amount: Money,
    ) -> Result<Option<OverdraftAdvisory>, PayablesError> {
        check_amount(amount)?;
        Ok(balances::overdraft_advisory(self.store.as_ref(), account_id, amount).await?)
    }

    /// Records a payment to a supplier
    ///
    /// # Errors
    ///
    /// Before any write: `InvalidAmount`, `PurchaseNotFound`,
    /// `PurchaseCancelled`, `UnsupportedMethod`, `MissingAccount`,
    /// `MissingChequeDetails`, `ExceedsPurchaseBalance`, and
    /// `OverdraftNotConfirmed` when the account would go negative and
    /// `overdraft_confirmed` is not set.
    #[instrument(skip_all, fields(
        purchase_id = %request.purchase_id,
        amount = %request.amount,
        method = %request.method,
        role = %role
    ))]
    pub async fn record_supplier_payment(
        &self,
        request: SupplierPaymentRequest,
        role: CallerRole,
    ) -> Result<SupplierPaymentOutcome, PayablesError> {
        let store = self.store.as_ref();

        check_amount(request.amount)?;

        let mut purchase = self.load_purchase(request.purchase_id).await?;
        if purchase.is_cancelled() {
            return Err(PayablesError::PurchaseCancelled(purchase.purchase_number));
        }
        if !request.method.is_settlement_instrument() {
            return Err(PayablesError::UnsupportedMethod(request.method.to_string()));
        }

        let account = resolve_account(store, request.account_id, "pay the supplier from").await?;

        let cheque = match request.method {
            PaymentMethod::Cheque => Some(request.cheque.clone().unwrap_or_default().validate(false)?),
            _ => None,
        };

        let paid = self.refresh_balance(&mut purchase).await?;
        if request.amount > purchase.balance_due {
            return Err(PayablesError::ExceedsPurchaseBalance {
                purchase: purchase.id,
                requested: request.amount,
                balance: purchase.balance_due,
            });
        }

        let advisory = account.overdraft_advisory(request.amount);
        if let Some(advisory) = &advisory {
            if !request.overdraft_confirmed {
                return Err(PayablesError::OverdraftNotConfirmed {
                    advisory: Box::new(advisory.clone()),
                });
            }
            warn!(account = %advisory.account_name, new_balance = %advisory.new_balance, "Overdraft confirmed by caller");
        }

        let payment = SupplierPayment {
            id: SupplierPaymentId::new_v7(),
            payment_number: generate_payment_number("SPAY"),
            purchase_id: purchase.id,
            supplier_id: purchase.supplier_id,
            amount: request.amount,
            payment_date: request.payment_date,
            method: request.method,
            cheque_status: cheque.as_ref().map(|_| ChequeStatus::Pending),
            cheque,
            account_id: account.id,
            notes: request.notes,
            created_at: Utc::now(),
        };
        store.insert_supplier_payment(&payment).await?;

        let account_balance = if payment.is_cheque() {
            None
        } else {
            let (updated, _) = debit_account(store, account.id, payment.amount).await?;
            Some(updated.current_balance)
        };

        purchase.apply_paid(paid + payment.amount);
        store.update_purchase(&purchase).await?;

        info!(
            payment_number = %payment.payment_number,
            purchase_number = %purchase.purchase_number,
            balance_due = %purchase.balance_due,
            "Supplier payment recorded"
        );

        Ok(SupplierPaymentOutcome {
            payment,
            purchase,
            account_balance,
            advisory: if account_balance.is_some() { advisory } else { None },
        })
    }

    /// Moves an issued cheque to `passed` or `returned`
    ///
    /// Passing debits the paying account and reports an advisory if that
    /// overdrew it. Returning restores the purchase's balance due.
    ///
    /// # Errors
    ///
    /// `InsufficientRole`, `PaymentNotFound`, `NotACheque`,
    /// `InvalidTransition` or `PurchaseNotFound`, all before the first write.
    #[instrument(skip_all, fields(payment_id = %payment_id, to = %new_status, role = %role))]
    pub async fn transition_supplier_cheque(
        &self,
        payment_id: SupplierPaymentId,
        new_status: ChequeStatus,
        role: CallerRole,
    ) -> Result<SupplierChequeTransition, PayablesError> {
        role.require_admin("change a supplier cheque status")?;
        let store = self.store.as_ref();

        let payment = store.get_supplier_payment(payment_id).await.map_err(|e| {
            PayablesError::or_not_found(e, || PayablesError::PaymentNotFound(payment_id.to_string()))
        })?;
        let current = match payment.cheque_status {
            Some(status) if payment.is_cheque() => status,
            _ => return Err(PayablesError::NotACheque(payment.payment_number)),
        };
        validate_transition(ChequeDirection::Issued, current, new_status)?;

        let mut purchase = self.load_purchase(payment.purchase_id).await?;
        if new_status == ChequeStatus::Passed {
            resolve_account(store, Some(payment.account_id), "clear the cheque from").await?;
        }

        let updated = store.update_supplier_payment_status(payment_id, new_status).await?;

        let mut account_balance = None;
        let mut advisory = None;
        if new_status == ChequeStatus::Passed {
            let (account, overdraft) = debit_account(store, payment.account_id, payment.amount).await?;
            account_balance = Some(account.current_balance);
            advisory = overdraft;
        }

        self.refresh_balance(&mut purchase).await?;
        store.update_purchase(&purchase).await?;

        info!(
            payment_number = %updated.payment_number,
            from = %current,
            to = %new_status,
            balance_due = %purchase.balance_due,
            "Supplier cheque status changed"
        );

        Ok(SupplierChequeTransition {
            payment: updated,
            previous_status: current,
            purchase,
            account_balance,
            advisory,
        })
    }

    async fn load_purchase(&self, id: PurchaseId) -> Result<Purchase, PayablesError> {
        self.store
            .get_purchase(id)
            .await
            .map_err(|e| PayablesError::or_not_found(e, || PayablesError::PurchaseNotFound(id.to_string())))
    }

    /// Recomputes totals from the lines and the balance due from the
    /// counted payments, returning the counted paid amount
    async fn refresh_balance(&self, purchase: &mut Purchase) -> Result<Money, PayablesError> {
        let items = self.store.list_purchase_items(purchase.id).await?;
        let payments = self.store.list_supplier_payments(purchase.id).await?;

        let stored_total = purchase.total_amount;
        purchase.recompute_totals(&items);
        if purchase.total_amount != stored_total {
            warn!(
                purchase_id = %purchase.id,
                stored = %stored_total,
                recomputed = %purchase.total_amount,
                "Stale purchase total recomputed"
            );
        }

        let paid = counted_total(purchase.total_amount.currency(), &payments);
        purchase.apply_paid(paid);
        Ok(paid)
    }
}

/// Rejects amounts that are not positive or exceed `Money::MAX_AMOUNT`
fn check_amount(amount: Money) -> Result<(), PayablesError> {
    if !amount.is_positive() {
        return Err(PayablesError::InvalidAmount(format!(
            "amount must be greater than zero, got {}",
            amount
        )));
    }
    if !amount.is_within_limit() {
        return Err(PayablesError::InvalidAmount(format!(
            "amount {} is above the limit of {}",
            amount,
            Money::MAX_AMOUNT
        )));
    }
    Ok(())
}
