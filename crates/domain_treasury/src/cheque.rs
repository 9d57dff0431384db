//! Cheque lifecycle rules
//!
//! Received cheques may be deposited before they pass or return; issued
//! cheques go straight from pending to a terminal state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{BankId, CoreError};
use crate::error::TreasuryError;

/// Status of a cheque-backed payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChequeStatus {
    /// Received or issued, not yet presented
    Pending,
    /// Handed to a bank for clearance (received cheques only)
    Deposited,
    /// Funds confirmed
    Passed,
    /// Bounced or rejected
    Returned,
}

impl ChequeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChequeStatus::Pending => "pending",
            ChequeStatus::Deposited => "deposited",
            ChequeStatus::Passed => "passed",
            ChequeStatus::Returned => "returned",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ChequeStatus::Passed | ChequeStatus::Returned)
    }
}

impl std::fmt::Display for ChequeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChequeStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ChequeStatus::Pending),
            "deposited" => Ok(ChequeStatus::Deposited),
            "passed" => Ok(ChequeStatus::Passed),
            "returned" => Ok(ChequeStatus::Returned),
            other => Err(CoreError::unknown_value("cheque status", other)),
        }
    }
}

/// Which side of the business holds the cheque
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChequeDirection {
    /// Received from a customer
    Received,
    /// Issued to a supplier
    Issued,
}

impl std::fmt::Display for ChequeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChequeDirection::Received => f.write_str("received"),
            ChequeDirection::Issued => f.write_str("issued"),
        }
    }
}

/// Checks that `from -> to` is an allowed cheque transition
pub fn validate_transition(
    direction: ChequeDirection,
    from: ChequeStatus,
    to: ChequeStatus,
) -> Result<(), TreasuryError> {
    use ChequeStatus::*;

    let allowed = match direction {
        ChequeDirection::Received => matches!(
            (from, to),
            (Pending, Deposited)
                | (Deposited, Passed)
                | (Deposited, Returned)
                | (Pending, Passed)
                | (Pending, Returned)
        ),
        ChequeDirection::Issued => matches!((from, to), (Pending, Passed) | (Pending, Returned)),
    };

    if allowed {
        Ok(())
    } else {
        Err(TreasuryError::InvalidTransition { direction, from, to })
    }
}

/// Returns true if a payment with this cheque status counts toward the
/// settled amount of its invoice or purchase
///
/// Non-cheque payments carry no status and always count.
pub fn counts_toward_balance(status: Option<ChequeStatus>) -> bool {
    status != Some(ChequeStatus::Returned)
}

/// Validated cheque metadata stored on a payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequeDetails {
    pub cheque_number: String,
    pub cheque_date: NaiveDate,
    /// Issuing bank, informational
    pub bank_id: Option<BankId>,
}

/// Cheque metadata as entered by a user, possibly incomplete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequeMeta {
    pub cheque_number: Option<String>,
    pub cheque_date: Option<NaiveDate>,
    pub bank_id: Option<BankId>,
}

impl ChequeMeta {
    /// Validates the entered metadata
    ///
    /// # Errors
    ///
    /// `MissingChequeDetails` listing every absent field. The bank is only
    /// required when `require_bank` is set (received cheques).
    pub fn validate(&self, require_bank: bool) -> Result<ChequeDetails, TreasuryError> {
        let number = self
            .cheque_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let mut missing = Vec::new();
        if number.is_none() {
            missing.push("cheque number");
        }
        if self.cheque_date.is_none() {
            missing.push("cheque date");
        }
        if require_bank && self.bank_id.is_none() {
            missing.push("bank");
        }

        match (number, self.cheque_date) {
            (Some(number), Some(date)) if missing.is_empty() => Ok(ChequeDetails {
                cheque_number: number.to_string(),
                cheque_date: date,
                bank_id: self.bank_id,
            }),
            _ => Err(TreasuryError::MissingChequeDetails(missing.join(", "))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_received_transitions() {
        use ChequeStatus::*;
        let d = ChequeDirection::Received;
        assert!(validate_transition(d, Pending, Deposited).is_ok());
        assert!(validate_transition(d, Deposited, Passed).is_ok());
        assert!(validate_transition(d, Deposited, Returned).is_ok());
        assert!(validate_transition(d, Pending, Passed).is_ok());
        assert!(validate_transition(d, Pending, Returned).is_ok());

        assert!(validate_transition(d, Passed, Returned).is_err());
        assert!(validate_transition(d, Returned, Passed).is_err());
        assert!(validate_transition(d, Deposited, Pending).is_err());
        assert!(validate_transition(d, Pending, Pending).is_err());
    }

    #[test]
    fn test_issued_cheques_skip_deposit() {
        use ChequeStatus::*;
        let d = ChequeDirection::Issued;
        assert!(validate_transition(d, Pending, Passed).is_ok());
        assert!(validate_transition(d, Pending, Returned).is_ok());
        assert!(matches!(
            validate_transition(d, Pending, Deposited),
            Err(TreasuryError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_returned_does_not_count() {
        assert!(counts_toward_balance(None));
        assert!(counts_toward_balance(Some(ChequeStatus::Pending)));
        assert!(counts_toward_balance(Some(ChequeStatus::Deposited)));
        assert!(counts_toward_balance(Some(ChequeStatus::Passed)));
        assert!(!counts_toward_balance(Some(ChequeStatus::Returned)));
    }

    #[test]
    fn test_meta_lists_missing_fields() {
        let meta = ChequeMeta {
            cheque_number: Some("  ".to_string()),
            cheque_date: None,
            bank_id: None,
        };
        match meta.validate(true) {
            Err(TreasuryError::MissingChequeDetails(fields)) => {
                assert_eq!(fields, "cheque number, cheque date, bank");
            }
            other => panic!("Expected MissingChequeDetails, got {:?}", other),
        }
    }

    #[test]
    fn test_meta_bank_optional_for_issued() {
        let meta = ChequeMeta {
            cheque_number: Some("004512".to_string()),
            cheque_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            bank_id: None,
        };
        let details = meta.validate(false).unwrap();
        assert_eq!(details.cheque_number, "004512");
        assert!(meta.validate(true).is_err());
    }

    #[test]
    fn test_status_parse_roundtrip() {
        for status in [
            ChequeStatus::Pending,
            ChequeStatus::Deposited,
            ChequeStatus::Passed,
            ChequeStatus::Returned,
        ] {
            assert_eq!(status.as_str().parse::<ChequeStatus>().unwrap(), status);
        }
        assert!("bounced".parse::<ChequeStatus>().is_err());
    }
}
