//! Payment methods and derived payment status

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{CoreError, Money};

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    /// Bank transfer or deposit
    Bank,
    /// Sale on credit; recorded at billing, never used to settle
    Credit,
    Cheque,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Credit => "credit",
            PaymentMethod::Cheque => "cheque",
        }
    }

    /// Returns true for methods that can settle an invoice or purchase
    pub fn is_settlement_instrument(&self) -> bool {
        !matches!(self, PaymentMethod::Credit)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "bank" | "bank_transfer" => Ok(PaymentMethod::Bank),
            "credit" => Ok(PaymentMethod::Credit),
            "cheque" | "check" => Ok(PaymentMethod::Cheque),
            other => Err(CoreError::unknown_value("payment method", other)),
        }
    }
}

/// Settlement state of an order or purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    /// Derives the status from the counted paid amount and the total
    ///
    /// `paid` when `paid >= total`, `partial` when `0 < paid < total`,
    /// otherwise `unpaid`.
    pub fn from_amounts(paid: Money, total: Money) -> Self {
        if paid >= total {
            PaymentStatus::Paid
        } else if paid.is_positive() {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "partial" => Ok(PaymentStatus::Partial),
            "paid" => Ok(PaymentStatus::Paid),
            other => Err(CoreError::unknown_value("payment status", other)),
        }
    }
}

/// Generates a payment number such as `PAY-1767225600123-3fa9c1`
///
/// Millisecond timestamp plus a random suffix, so that a batch of inserts
/// within the same millisecond still gets distinct numbers.
pub fn generate_payment_number(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, millis, &suffix[..6])
}
