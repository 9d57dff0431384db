//! Caller identification
//!
//! The role arrives in the `X-Caller-Role` header and is passed into every
//! domain operation as an explicit capability. Authenticating the caller is
//! left to whatever sits in front of this API.

use axum::http::HeaderMap;
use domain_treasury::CallerRole;

use crate::error::ApiError;

pub const CALLER_ROLE_HEADER: &str = "x-caller-role";

/// Role of the current request, stored in request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub role: CallerRole,
}

/// Reads the caller role from request headers
///
/// # Errors
///
/// `ApiError::Unauthorized` if the header is missing or names no known role
pub fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, ApiError> {
    let value = headers
        .get(CALLER_ROLE_HEADER)
        .ok_or_else(|| ApiError::Unauthorized(format!("{} header is required", CALLER_ROLE_HEADER)))?;

    let role = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized("caller role is not valid text".to_string()))?
        .parse::<CallerRole>()
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    Ok(Caller { role })
}
