//! Customers and their outstanding balance
//!
//! The outstanding balance is shared by returns, cancellations, cheque
//! transitions and settlements. Each change re-reads the stored value and
//! decrements are floored at zero.

use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{CustomerId, Money};

use crate::error::ReceivablesError;
use crate::ports::ReceivablesPort;

/// A customer account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    /// Running total owed across unpaid and partially paid orders
    pub outstanding_balance: Money,
}

/// Loads a customer, mapping a missing row to `CustomerNotFound`
pub(crate) async fn load_customer<P>(store: &P, id: CustomerId) -> Result<Customer, ReceivablesError>
where
    P: ReceivablesPort + ?Sized,
{
    store
        .get_customer(id)
        .await
        .map_err(|e| ReceivablesError::or_not_found(e, || ReceivablesError::CustomerNotFound(id.to_string())))
}

/// Lowers the customer's outstanding balance by `amount`, never below zero
///
/// Returns the new balance.
pub(crate) async fn decrease_outstanding<P>(
    store: &P,
    id: CustomerId,
    amount: Money,
) -> Result<Money, ReceivablesError>
where
    P: ReceivablesPort + ?Sized,
{
    let customer = load_customer(store, id).await?;
    let new_balance = (customer.outstanding_balance - amount).floor_at_zero();
    store.update_customer_outstanding_balance(id, new_balance).await?;
    debug!(customer_id = %id, amount = %amount, balance = %new_balance, "Outstanding balance decreased");
    Ok(new_balance)
}

/// Raises the customer's outstanding balance by `amount`
pub(crate) async fn increase_outstanding<P>(
    store: &P,
    id: CustomerId,
    amount: Money,
) -> Result<Money, ReceivablesError>
where
    P: ReceivablesPort + ?Sized,
{
    let customer = load_customer(store, id).await?;
    let new_balance = customer.outstanding_balance + amount;
    store.update_customer_outstanding_balance(id, new_balance).await?;
    debug!(customer_id = %id, amount = %amount, balance = %new_balance, "Outstanding balance increased");
    Ok(new_balance)
}
