//! Company cash and bank accounts
//!
//! `current_balance` equals the opening balance plus the net of all cleared
//! deposits and passed outgoing payments. It is signed and never floored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, Money};

/// Kind of company account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Cash in hand / petty cash
    Cash,
    /// Ordinary current or savings account
    Bank,
    /// Bank account with an overdraft facility
    Overdraft,
    /// Loan account drawn down for payments
    Loan,
}

impl AccountKind {
    /// Returns true if a negative balance is an expected state for this kind
    pub fn permits_overdraft(&self) -> bool {
        matches!(self, AccountKind::Overdraft | AccountKind::Loan)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Cash => "cash",
            AccountKind::Bank => "bank",
            AccountKind::Overdraft => "overdraft",
            AccountKind::Loan => "loan",
        }
    }
}

impl std::str::FromStr for AccountKind {
    type Err = core_kernel::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(AccountKind::Cash),
            "bank" => Ok(AccountKind::Bank),
            "overdraft" | "od" => Ok(AccountKind::Overdraft),
            "loan" => Ok(AccountKind::Loan),
            other => Err(core_kernel::CoreError::unknown_value("account kind", other)),
        }
    }
}

/// A company cash or bank account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyAccount {
    pub id: AccountId,
    pub name: String,
    pub kind: AccountKind,
    pub opening_balance: Money,
    pub current_balance: Money,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl CompanyAccount {
    /// Creates an account whose current balance starts at the opening balance
    pub fn new(name: impl Into<String>, kind: AccountKind, opening_balance: Money) -> Self {
        Self {
            id: AccountId::new_v7(),
            name: name.into(),
            kind,
            opening_balance,
            current_balance: opening_balance,
            is_active: true,
            updated_at: Utc::now(),
        }
    }

    /// Returns true if the balance is below zero
    pub fn is_overdrawn(&self) -> bool {
        self.current_balance.is_negative()
    }

    /// Computes the advisory for paying `amount` out of this account
    ///
    /// Returns `None` when the balance covers the amount.
    pub fn overdraft_advisory(&self, amount: Money) -> Option<OverdraftAdvisory> {
        if amount <= self.current_balance {
            return None;
        }

        Some(OverdraftAdvisory {
            account_id: self.id,
            account_name: self.name.clone(),
            account_kind: self.kind,
            current_balance: self.current_balance,
            new_balance: self.current_balance - amount,
            facility: self.kind.permits_overdraft(),
        })
    }
}

/// Warning that a payment would drive a company account negative
///
/// Not an error: the business may run an account into overdraft on purpose.
/// Callers surface it and ask for confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdraftAdvisory {
    pub account_id: AccountId,
    pub account_name: String,
    pub account_kind: AccountKind,
    pub current_balance: Money,
    pub new_balance: Money,
    /// True for overdraft/loan accounts, where a negative balance is expected
    pub facility: bool,
}

impl std::fmt::Display for OverdraftAdvisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Account '{}' balance {} would become {}",
            self.account_name, self.current_balance, self.new_balance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn bank(balance: rust_decimal::Decimal) -> CompanyAccount {
        CompanyAccount::new("Main Bank", AccountKind::Bank, Money::new(balance, Currency::LKR))
    }

    #[test]
    fn test_no_advisory_when_covered() {
        let account = bank(dec!(5000));
        assert!(account.overdraft_advisory(Money::new(dec!(5000), Currency::LKR)).is_none());
    }

    #[test]
    fn test_advisory_reports_new_balance() {
        let account = bank(dec!(1000));
        let advisory = account
            .overdraft_advisory(Money::new(dec!(2500), Currency::LKR))
            .unwrap();

        assert_eq!(advisory.current_balance.amount(), dec!(1000));
        assert_eq!(advisory.new_balance.amount(), dec!(-1500));
        assert!(!advisory.facility);
    }

    #[test]
    fn test_overdraft_kind_is_flagged_as_facility() {
        let account = CompanyAccount::new(
            "OD Account",
            AccountKind::Overdraft,
            Money::zero(Currency::LKR),
        );
        let advisory = account
            .overdraft_advisory(Money::new(dec!(10), Currency::LKR))
            .unwrap();
        assert!(advisory.facility);
    }
}
