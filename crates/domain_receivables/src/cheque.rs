//! Cheque Lifecycle Manager (received cheques)
//!
//! Moves a customer cheque through `pending -> deposited -> passed | returned`
//! and applies the side effects of each step:
//!
//! | to          | effect                                                        |
//! |-------------|---------------------------------------------------------------|
//! | `deposited` | records the company account the cheque was deposited into    |
//! | `passed`    | credits the deposit account with the cheque amount           |
//! | `returned`  | re-adds the amount to the customer's outstanding balance and  |
//! |             | recomputes the order's payment status                         |
//!
//! A returned cheque on a cancelled order changes no balance: the
//! cancellation already released the customer from that order.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use core_kernel::{AccountId, Money, PaymentId};
use domain_treasury::balances::{credit_account, resolve_account};
use domain_treasury::{validate_transition, ChequeDirection, ChequeStatus, PaymentStatus};

use crate::customer::increase_outstanding;
use crate::error::ReceivablesError;
use crate::payment::{refresh_payment_status, Payment};
use crate::ports::ReceivablesPort;

/// Outcome of a cheque transition
#[derive(Debug, Clone, Serialize)]
pub struct ChequeTransition {
    pub payment: Payment,
    pub previous_status: ChequeStatus,
    /// Set when the transition recomputed the order's payment status
    pub order_payment_status: Option<PaymentStatus>,
    /// Set when the customer's outstanding balance changed
    pub customer_outstanding: Option<Money>,
    /// Set when the deposit account was credited
    pub account_balance: Option<Money>,
}

/// State machine for cheques received from customers
pub struct ChequeLifecycleManager {
    store: Arc<dyn ReceivablesPort>,
}

impl ChequeLifecycleManager {
    pub fn new(store: Arc<dyn ReceivablesPort>) -> Self {
        Self { store }
    }

    /// Moves a cheque payment to `new_status`
    ///
    /// `deposit_account_id` overrides the account stored on the payment.
    ///
    /// # Errors
    ///
    /// - `PaymentNotFound` / `NotACheque` for an unknown or non-cheque payment
    /// - `InvalidTransition` if the move is not allowed from the current status
    /// - `MissingAccount` when depositing or passing without a resolvable account
    #[instrument(skip_all, fields(payment_id = %payment_id, to = %new_status))]
    pub async fn transition(
        &self,
        payment_id: PaymentId,
        new_status: ChequeStatus,
        deposit_account_id: Option<AccountId>,
    ) -> Result<ChequeTransition, ReceivablesError> {
        let store = self.store.as_ref();

        let payment = store.get_payment(payment_id).await.map_err(|e| {
            ReceivablesError::or_not_found(e, || ReceivablesError::PaymentNotFound(payment_id.to_string()))
        })?;

        let current = match payment.cheque_status {
            Some(status) if payment.is_cheque() => status,
            _ => return Err(ReceivablesError::NotACheque(payment.payment_number.clone())),
        };
        validate_transition(ChequeDirection::Received, current, new_status)?;

        let account_id = match new_status {
            ChequeStatus::Deposited | ChequeStatus::Passed => {
                let requested = deposit_account_id.or(payment.deposit_account_id);
                let account = resolve_account(store, requested, "deposit the cheque into").await?;
                Some(account.id)
            }
            _ => None,
        };

        let order = store.get_order(payment.order_id).await.map_err(|e| {
            ReceivablesError::or_not_found(e, || ReceivablesError::OrderNotFound(payment.order_id.to_string()))
        })?;

        let updated = store
            .update_payment_cheque_status(payment_id, new_status, account_id)
            .await?;

        let mut outcome = ChequeTransition {
            payment: updated,
            previous_status: current,
            order_payment_status: None,
            customer_outstanding: None,
            account_balance: None,
        };

        match new_status {
            ChequeStatus::Passed => {
                if let Some(account_id) = account_id {
                    let account = credit_account(store, account_id, payment.amount).await?;
                    outcome.account_balance = Some(account.current_balance);
                }
            }
            ChequeStatus::Returned if !order.is_cancelled() => {
                let balance = increase_outstanding(store, payment.customer_id, payment.amount).await?;
                outcome.customer_outstanding = Some(balance);
                outcome.order_payment_status = Some(refresh_payment_status(store, order.id).await?);
            }
            _ => {}
        }

        info!(
            payment_number = %outcome.payment.payment_number,
            from = %current,
            to = %new_status,
            amount = %payment.amount,
            "Cheque status changed"
        );
        Ok(outcome)
    }
}
