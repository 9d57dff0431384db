//! API error handling
//!
//! Domain errors carry a stable `kind()` code. The code becomes the
//! `error` field of the response body and picks the status:
//!
//! | kind                                              | status |
//! |---------------------------------------------------|--------|
//! | `*_not_found`                                     | 404    |
//! | `insufficient_role`                               | 403    |
//! | `invalid_transition`, `overdraft_not_confirmed`   | 409    |
//! | `storage_error`                                   | 500    |
//! | any other business rule                           | 422    |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::error;

use core_kernel::CoreError;
use domain_payables::PayablesError;
use domain_receivables::ReceivablesError;

use crate::dto::supplier::AdvisoryResponse;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    NotFound { kind: &'static str, message: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{message}")]
    Forbidden { kind: &'static str, message: String },

    #[error("{message}")]
    Conflict {
        kind: &'static str,
        message: String,
        details: Option<Value>,
    },

    #[error("{message}")]
    Validation { kind: &'static str, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    /// Classifies a domain error by its kind code
    fn from_kind(kind: &'static str, message: String, details: Option<Value>) -> Self {
        match kind {
            "storage_error" => ApiError::Storage(message),
            "insufficient_role" => ApiError::Forbidden { kind, message },
            "invalid_transition" | "overdraft_not_confirmed" => ApiError::Conflict { kind, message, details },
            k if k.ends_with("_not_found") => ApiError::NotFound { kind, message },
            _ => ApiError::Validation { kind, message },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `error` code of the response body
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound { kind, .. }
            | ApiError::Forbidden { kind, .. }
            | ApiError::Conflict { kind, .. }
            | ApiError::Validation { kind, .. } => *kind,
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Storage(_) => "storage_error",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_type = self.code().to_string();

        let (message, details) = match self {
            ApiError::Storage(msg) | ApiError::Internal(msg) => {
                error!(error = %msg, "Request failed");
                ("The ledger store is unavailable, nothing was applied".to_string(), None)
            }
            ApiError::Conflict { message, details, .. } => (message, details),
            other => (other.to_string(), None),
        };

        let body = ErrorResponse {
            error: error_type,
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ReceivablesError> for ApiError {
    fn from(err: ReceivablesError) -> Self {
        ApiError::from_kind(err.kind(), err.to_string(), None)
    }
}

impl From<PayablesError> for ApiError {
    fn from(err: PayablesError) -> Self {
        let details = match &err {
            PayablesError::OverdraftNotConfirmed { advisory } => {
                serde_json::to_value(AdvisoryResponse::from(advisory.as_ref())).ok()
            }
            _ => None,
        };
        ApiError::from_kind(err.kind(), err.to_string(), details)
    }
}

/// Unparseable enum values and identifiers in a request
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::PortError;
    use domain_treasury::{CallerRole, ChequeDirection, ChequeStatus, TreasuryError};

    #[test]
    fn test_not_found_kinds_map_to_404() {
        let err: ApiError = ReceivablesError::OrderNotFound("ORD-1".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "order_not_found");

        let err: ApiError = PayablesError::PaymentNotFound("SPAY-1".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_role_and_transition_statuses() {
        let err: ApiError = ReceivablesError::from(TreasuryError::InsufficientRole {
            operation: "cancel an order".into(),
            role: CallerRole::Staff,
        })
        .into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let err: ApiError = ReceivablesError::from(TreasuryError::InvalidTransition {
            direction: ChequeDirection::Received,
            from: ChequeStatus::Passed,
            to: ChequeStatus::Returned,
        })
        .into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "invalid_transition");
    }

    #[test]
    fn test_business_rules_map_to_422() {
        let err: ApiError = ReceivablesError::NoItemsProvided.into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "no_items_provided");

        let err: ApiError = ReceivablesError::InvalidAction("refund".into()).into();
        assert_eq!(err.code(), "invalid_action");
    }

    #[test]
    fn test_storage_maps_to_500() {
        let err: ApiError = ReceivablesError::Storage(PortError::connection("pool closed")).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "storage_error");
    }
}
