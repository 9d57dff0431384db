//! Caller capability for privileged operations
//!
//! The role is passed explicitly into each operation and checked once at
//! its entry; nothing here looks up a session.

use serde::{Deserialize, Serialize};

use core_kernel::CoreError;
use crate::error::TreasuryError;

/// Role of the user invoking an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerRole {
    Admin,
    Staff,
}

impl CallerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallerRole::Admin => "admin",
            CallerRole::Staff => "staff",
        }
    }

    /// Fails with `InsufficientRole` unless the caller is an admin
    pub fn require_admin(&self, operation: &str) -> Result<(), TreasuryError> {
        match self {
            CallerRole::Admin => Ok(()),
            CallerRole::Staff => Err(TreasuryError::InsufficientRole {
                operation: operation.to_string(),
                role: *self,
            }),
        }
    }
}

impl std::fmt::Display for CallerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CallerRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(CallerRole::Admin),
            "staff" => Ok(CallerRole::Staff),
            other => Err(CoreError::unknown_value("caller role", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_cannot_run_admin_operations() {
        let err = CallerRole::Staff.require_admin("cancel order").unwrap_err();
        assert!(err.to_string().contains("cancel order"));
        assert!(CallerRole::Admin.require_admin("cancel order").is_ok());
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Admin".parse::<CallerRole>().unwrap(), CallerRole::Admin);
        assert!("owner".parse::<CallerRole>().is_err());
    }
}
