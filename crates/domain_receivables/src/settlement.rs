//! Invoice Settlement Allocator
//!
//! Lets one payment instrument (a cheque, a cash receipt or a bank transfer)
//! settle several of a customer's outstanding invoices in one action,
//! producing one payment row per invoice.
//!
//! Validation is fail-fast and happens before any write. The inserts that
//! follow are best-effort: a failed insert is logged and reported, and the
//! remaining invoices are still processed.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use core_kernel::{AccountId, Currency, CustomerId, Money, OrderId, PaymentId};
use domain_treasury::balances::{credit_account, resolve_account};
use domain_treasury::{generate_payment_number, ChequeMeta, ChequeStatus, PaymentMethod};

use crate::customer::{decrease_outstanding, load_customer};
use crate::error::ReceivablesError;
use crate::order::Order;
use crate::payment::{counted_total, refresh_payment_status, Payment};
use crate::ports::{PaymentQuery, ReceivablesPort};

/// An unsettled invoice and its remaining balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingInvoice {
    pub order_id: OrderId,
    pub order_number: String,
    pub order_date: NaiveDate,
    pub total_amount: Money,
    /// Sum of payments that still count (returned cheques excluded)
    pub paid_amount: Money,
    pub balance: Money,
}

impl OutstandingInvoice {
    fn from_order(order: &Order, payments: &[Payment]) -> Self {
        let currency = order.total_amount.currency();
        let own: Vec<Payment> = payments.iter().filter(|p| p.order_id == order.id).cloned().collect();
        let paid_amount = counted_total(currency, &own);
        Self {
            order_id: order.id,
            order_number: order.order_number.clone(),
            order_date: order.order_date,
            total_amount: order.total_amount,
            paid_amount,
            balance: (order.total_amount - paid_amount).floor_at_zero(),
        }
    }
}

/// The payment instrument being allocated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub amount: Money,
    pub date: NaiveDate,
    pub method: PaymentMethod,
    /// Required for cheques
    pub cheque: Option<ChequeMeta>,
    /// Required for bank transfers, optional for cash and cheques
    pub deposit_account_id: Option<AccountId>,
    pub notes: Option<String>,
}

/// Amount to settle on one invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub invoice_id: OrderId,
    pub settle_amount: Money,
}

/// An invoice whose payment insert failed
#[derive(Debug, Clone, Serialize)]
pub struct AllocationFailure {
    pub invoice_id: OrderId,
    pub amount: Money,
    pub reason: String,
}

/// Result of an allocation; partial success is reported, not raised
#[derive(Debug, Clone, Serialize)]
pub struct AllocationResult {
    pub created_count: usize,
    pub failed_count: usize,
    /// Sum of the payments actually created
    pub total_allocated: Money,
    pub payments: Vec<Payment>,
    pub failures: Vec<AllocationFailure>,
    pub customer_outstanding: Money,
}

/// Allocates one instrument across a customer's outstanding invoices
pub struct SettlementAllocator {
    store: Arc<dyn ReceivablesPort>,
}

impl SettlementAllocator {
    pub fn new(store: Arc<dyn ReceivablesPort>) -> Self {
        Self { store }
    }

    /// Lists the customer's non-cancelled orders with a positive balance,
    /// oldest first
    #[instrument(skip(self))]
    pub async fn list_outstanding_invoices(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<OutstandingInvoice>, ReceivablesError> {
        Ok(self
            .customer_invoices(customer_id)
            .await?
            .into_iter()
            .filter(|inv| inv.balance.is_positive())
            .collect())
    }

    /// Every non-cancelled order of the customer with its derived balance,
    /// settled ones included
    async fn customer_invoices(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<OutstandingInvoice>, ReceivablesError> {
        let store = self.store.as_ref();
        load_customer(store, customer_id).await?;

        let orders = store.list_orders_for_customer(customer_id).await?;
        let payments = store.list_payments(PaymentQuery::for_customer(customer_id)).await?;

        Ok(orders
            .iter()
            .filter(|o| !o.is_cancelled())
            .map(|o| OutstandingInvoice::from_order(o, &payments))
            .collect())
    }

    /// Settles the selected invoices from one instrument
    ///
    /// # Errors
    ///
    /// Fails before writing anything with `CustomerNotFound`,
    /// `NoOutstandingInvoices`, `InvalidAmount`, `UnsupportedMethod`,
    /// `MissingChequeDetails`, `MissingAccount`, `NoItemsProvided`,
    /// `OverAllocation`, `OrderNotFound` or `ExceedsInvoiceBalance`.
    /// Insert failures after validation are reported in the result.
    #[instrument(skip(self, instrument, selections), fields(
        amount = %instrument.amount,
        method = %instrument.method,
        selections = selections.len()
    ))]
    pub async fn allocate(
        &self,
        customer_id: CustomerId,
        instrument: Instrument,
        selections: Vec<Selection>,
    ) -> Result<AllocationResult, ReceivablesError> {
        let store = self.store.as_ref();

        let invoices = self.customer_invoices(customer_id).await?;
        if !invoices.iter().any(|inv| inv.balance.is_positive()) {
            return Err(ReceivablesError::NoOutstandingInvoices(customer_id.to_string()));
        }

        if !instrument.amount.is_positive() {
            return Err(ReceivablesError::InvalidAmount(format!(
                "instrument amount must be greater than zero, got {}",
                instrument.amount
            )));
        }
        if !instrument.amount.is_within_limit() {
            return Err(ReceivablesError::InvalidAmount(format!(
                "instrument amount {} is above the limit of {}",
                instrument.amount,
                Money::MAX_AMOUNT
            )));
        }
        if !instrument.method.is_settlement_instrument() {
            return Err(ReceivablesError::UnsupportedMethod(instrument.method.to_string()));
        }

        let cheque = match instrument.method {
            PaymentMethod::Cheque => Some(instrument.cheque.clone().unwrap_or_default().validate(true)?),
            _ => None,
        };

        let deposit_account = match (instrument.method, instrument.deposit_account_id) {
            (PaymentMethod::Bank, id) => Some(resolve_account(store, id, "receive the transfer into").await?),
            (_, Some(id)) => Some(resolve_account(store, Some(id), "receive the payment into").await?),
            (_, None) => None,
        };

        if let Some(oversized) = selections.iter().find(|s| !s.settle_amount.is_within_limit()) {
            return Err(ReceivablesError::InvalidAmount(format!(
                "settle amount {} for invoice {} is above the limit of {}",
                oversized.settle_amount,
                oversized.invoice_id,
                Money::MAX_AMOUNT
            )));
        }

        let selections = merge_selections(selections)?;
        if selections.is_empty() {
            return Err(ReceivablesError::NoItemsProvided);
        }

        let currency = instrument.amount.currency();
        let requested = Money::checked_sum(currency, selections.iter().map(|s| s.settle_amount))
            .map_err(|e| ReceivablesError::InvalidAmount(e.to_string()))?;
        if requested > instrument.amount {
            return Err(ReceivablesError::OverAllocation {
                allocated: requested,
                available: instrument.amount,
            });
        }

        for selection in &selections {
            let invoice = invoices
                .iter()
                .find(|inv| inv.order_id == selection.invoice_id)
                .ok_or_else(|| ReceivablesError::OrderNotFound(selection.invoice_id.to_string()))?;

            if selection.settle_amount > invoice.balance {
                return Err(ReceivablesError::ExceedsInvoiceBalance {
                    invoice: invoice.order_id,
                    requested: selection.settle_amount,
                    balance: invoice.balance,
                });
            }
        }

        let mut payments = Vec::with_capacity(selections.len());
        let mut failures = Vec::new();

        for selection in &selections {
            let payment = Payment {
                id: PaymentId::new_v7(),
                payment_number: generate_payment_number("PAY"),
                order_id: selection.invoice_id,
                customer_id,
                amount: selection.settle_amount,
                payment_date: instrument.date,
                method: instrument.method,
                cheque: cheque.clone(),
                cheque_status: cheque.as_ref().map(|_| ChequeStatus::Pending),
                deposit_account_id: deposit_account.as_ref().map(|a| a.id),
                notes: instrument.notes.clone(),
                created_at: Utc::now(),
            };

            match store.insert_payment(&payment).await {
                Ok(()) => payments.push(payment),
                Err(e) => {
                    warn!(
                        invoice_id = %selection.invoice_id,
                        amount = %selection.settle_amount,
                        error = %e,
                        "Settlement payment insert failed, continuing"
                    );
                    failures.push(AllocationFailure {
                        invoice_id: selection.invoice_id,
                        amount: selection.settle_amount,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let total_allocated = Money::sum(currency, payments.iter().map(|p| p.amount));

        let customer_outstanding = if total_allocated.is_positive() {
            decrease_outstanding(store, customer_id, total_allocated).await?
        } else {
            load_customer(store, customer_id).await?.outstanding_balance
        };

        if let Some(account) = &deposit_account {
            if instrument.method != PaymentMethod::Cheque && total_allocated.is_positive() {
                credit_account(store, account.id, total_allocated).await?;
            }
        }

        for payment in &payments {
            refresh_payment_status(store, payment.order_id).await?;
        }

        info!(
            customer_id = %customer_id,
            created = payments.len(),
            failed = failures.len(),
            total_allocated = %total_allocated,
            "Settlement allocated"
        );

        Ok(AllocationResult {
            created_count: payments.len(),
            failed_count: failures.len(),
            total_allocated,
            payments,
            failures,
            customer_outstanding,
        })
    }
}

/// Drops non-positive selections and merges repeated invoices, keeping the
/// order in which invoices first appear
fn merge_selections(selections: Vec<Selection>) -> Result<Vec<Selection>, ReceivablesError> {
    let mut merged: Vec<Selection> = Vec::new();
    for selection in selections.into_iter().filter(|s| s.settle_amount.is_positive()) {
        match merged.iter_mut().find(|m| m.invoice_id == selection.invoice_id) {
            Some(existing) => {
                existing.settle_amount = existing
                    .settle_amount
                    .checked_add(&selection.settle_amount)
                    .map_err(|e| ReceivablesError::InvalidAmount(e.to_string()))?;
            }
            None => merged.push(selection),
        }
    }
    Ok(merged)
}

/// Default settle amount when an invoice is toggled on
///
/// The invoice balance, capped at the instrument's remaining capacity.
pub fn auto_fill_amount(balance: Money, remaining_capacity: Money) -> Money {
    balance.min(remaining_capacity.floor_at_zero())
}

/// Working state of a settlement form before it is submitted
///
/// Tracks which invoices are selected and how much of the instrument each
/// one takes, so a caller can pre-fill amounts the way the allocator will
/// accept them.
#[derive(Debug, Clone)]
pub struct SettlementDraft {
    instrument_amount: Money,
    selected: Vec<Selection>,
}

impl SettlementDraft {
    pub fn new(instrument_amount: Money) -> Self {
        Self {
            instrument_amount,
            selected: Vec::new(),
        }
    }

    pub fn set_instrument_amount(&mut self, amount: Money) {
        self.instrument_amount = amount;
    }

    pub fn is_selected(&self, invoice_id: OrderId) -> bool {
        self.selected.iter().any(|s| s.invoice_id == invoice_id)
    }

    /// Sum of all selected settle amounts
    pub fn allocated(&self) -> Money {
        Money::sum(self.currency(), self.selected.iter().map(|s| s.settle_amount))
    }

    /// Instrument amount not yet taken by any selection, never negative
    pub fn remaining_capacity(&self) -> Money {
        (self.instrument_amount - self.allocated()).floor_at_zero()
    }

    /// Toggles an invoice on or off
    ///
    /// Toggling on auto-fills `min(balance, remaining capacity)` and returns
    /// the filled amount; toggling off frees its capacity and returns `None`.
    pub fn toggle(&mut self, invoice: &OutstandingInvoice) -> Option<Money> {
        if self.is_selected(invoice.order_id) {
            self.selected.retain(|s| s.invoice_id != invoice.order_id);
            return None;
        }

        let amount = auto_fill_amount(invoice.balance, self.remaining_capacity());
        self.selected.push(Selection {
            invoice_id: invoice.order_id,
            settle_amount: amount,
        });
        Some(amount)
    }

    /// Sets the amount for a selected invoice, clamped to its balance and
    /// to the capacity left by the other selections
    ///
    /// Returns the amount actually set, or `None` if the invoice is not selected.
    pub fn set_amount(&mut self, invoice: &OutstandingInvoice, amount: Money) -> Option<Money> {
        let currency = self.currency();
        let others = Money::sum(
            currency,
            self.selected
                .iter()
                .filter(|s| s.invoice_id != invoice.order_id)
                .map(|s| s.settle_amount),
        );
        let capacity = (self.instrument_amount - others).floor_at_zero();
        let clamped = amount.floor_at_zero().min(auto_fill_amount(invoice.balance, capacity));

        let selection = self.selected.iter_mut().find(|s| s.invoice_id == invoice.order_id)?;
        selection.settle_amount = clamped;
        Some(clamped)
    }

    /// Selections ready to pass to [`SettlementAllocator::allocate`]
    pub fn into_selections(self) -> Vec<Selection> {
        self.selected
    }

    fn currency(&self) -> Currency {
        self.instrument_amount.currency()
    }
}
