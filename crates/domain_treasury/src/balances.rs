//! Read-modify-write helpers for company account balances
//!
//! Every mutation re-reads the stored balance right before writing it back.
//! Account balances are signed and never floored.

use tracing::{info, warn};

use core_kernel::{AccountId, Money, PortError};

use crate::account::{CompanyAccount, OverdraftAdvisory};
use crate::error::TreasuryError;
use crate::ports::TreasuryPort;

/// Loads the selected account
///
/// # Errors
///
/// `MissingAccount` if no account was selected or the selected one does
/// not exist.
pub async fn resolve_account<P>(
    port: &P,
    account_id: Option<AccountId>,
    purpose: &str,
) -> Result<CompanyAccount, TreasuryError>
where
    P: TreasuryPort + ?Sized,
{
    let id = account_id
        .ok_or_else(|| TreasuryError::MissingAccount(format!("select an account to {}", purpose)))?;

    port.get_company_account(id).await.map_err(|e| match e {
        PortError::NotFound { .. } => {
            TreasuryError::MissingAccount(format!("account {} does not exist", id))
        }
        other => TreasuryError::Storage(other),
    })
}

/// Computes the overdraft advisory for paying `amount` out of an account
pub async fn overdraft_advisory<P>(
    port: &P,
    account_id: AccountId,
    amount: Money,
) -> Result<Option<OverdraftAdvisory>, TreasuryError>
where
    P: TreasuryPort + ?Sized,
{
    let account = resolve_account(port, Some(account_id), "check the balance of").await?;
    Ok(account.overdraft_advisory(amount))
}

/// Adds cleared funds to an account
pub async fn credit_account<P>(
    port: &P,
    account_id: AccountId,
    amount: Money,
) -> Result<CompanyAccount, TreasuryError>
where
    P: TreasuryPort + ?Sized,
{
    let account = resolve_account(port, Some(account_id), "receive funds into").await?;
    let new_balance = account
        .current_balance
        .checked_add(&amount)
        .map_err(|e| PortError::validation(e.to_string()))?;

    let updated = port.update_company_account_balance(account_id, new_balance).await?;
    info!(account_id = %account_id, amount = %amount, balance = %updated.current_balance, "Account credited");
    Ok(updated)
}

/// Takes funds out of an account, allowing the balance to go negative
///
/// Returns the updated account and, when the balance did not cover the
/// amount, the advisory computed from the pre-debit balance.
pub async fn debit_account<P>(
    port: &P,
    account_id: AccountId,
    amount: Money,
) -> Result<(CompanyAccount, Option<OverdraftAdvisory>), TreasuryError>
where
    P: TreasuryPort + ?Sized,
{
    let account = resolve_account(port, Some(account_id), "pay from").await?;
    let advisory = account.overdraft_advisory(amount);
    let new_balance = account
        .current_balance
        .checked_sub(&amount)
        .map_err(|e| PortError::validation(e.to_string()))?;

    let updated = port.update_company_account_balance(account_id, new_balance).await?;
    if let Some(advisory) = &advisory {
        warn!(
            account_id = %account_id,
            facility = advisory.facility,
            balance = %updated.current_balance,
            "Account overdrawn"
        );
    } else {
        info!(account_id = %account_id, amount = %amount, balance = %updated.current_balance, "Account debited");
    }
    Ok((updated, advisory))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountKind;
    use crate::ports::mock::MockTreasuryPort;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn lkr(v: rust_decimal::Decimal) -> Money {
        Money::new(v, Currency::LKR)
    }

    #[tokio::test]
    async fn test_resolve_without_selection() {
        let port = MockTreasuryPort::new();
        let err = resolve_account(&port, None, "deposit into").await.unwrap_err();
        assert!(matches!(err, TreasuryError::MissingAccount(_)));
    }

    #[tokio::test]
    async fn test_resolve_unknown_account() {
        let port = MockTreasuryPort::new();
        let err = resolve_account(&port, Some(AccountId::new()), "deposit into")
            .await
            .unwrap_err();
        assert!(matches!(err, TreasuryError::MissingAccount(_)));
    }

    #[tokio::test]
    async fn test_debit_can_go_negative() {
        let account = CompanyAccount::new("Current", AccountKind::Bank, lkr(dec!(1000)));
        let id = account.id;
        let port = MockTreasuryPort::with_accounts(vec![account]).await;

        let (updated, advisory) = debit_account(&port, id, lkr(dec!(1500))).await.unwrap();

        assert_eq!(updated.current_balance.amount(), dec!(-500));
        let advisory = advisory.unwrap();
        assert_eq!(advisory.current_balance.amount(), dec!(1000));
        assert_eq!(advisory.new_balance.amount(), dec!(-500));
    }

    #[tokio::test]
    async fn test_credit_adds_to_stored_balance() {
        let account = CompanyAccount::new("Cash", AccountKind::Cash, lkr(dec!(250)));
        let id = account.id;
        let port = MockTreasuryPort::with_accounts(vec![account]).await;

        credit_account(&port, id, lkr(dec!(100))).await.unwrap();
        let updated = credit_account(&port, id, lkr(dec!(50))).await.unwrap();

        assert_eq!(updated.current_balance.amount(), dec!(400));
    }
}
