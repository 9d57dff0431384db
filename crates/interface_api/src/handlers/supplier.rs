//! Supplier payment handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::{AccountId, Money, SupplierPaymentId};
use domain_treasury::ChequeStatus;

use crate::{auth::Caller, error::ApiError, AppState};
use crate::dto::supplier::*;

/// Records a payment to a supplier
///
/// Answers 409 `overdraft_not_confirmed` with the advisory in `details`
/// when the account would go negative; resubmit with
/// `overdraft_confirmed: true` to proceed.
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<SupplierPaymentBody>,
) -> Result<(StatusCode, Json<SupplierPaymentOutcomeResponse>), ApiError> {
    let request = body.into_domain(state.currency)?;
    let outcome = state.payables.record_supplier_payment(request, caller.role).await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Moves an issued cheque to a new status (admin only)
pub async fn update_cheque_status(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(request): Json<SupplierChequeStatusRequest>,
) -> Result<Json<SupplierChequeTransitionResponse>, ApiError> {
    let status: ChequeStatus = request.status.parse()?;

    let transition = state
        .payables
        .transition_supplier_cheque(SupplierPaymentId::from_uuid(id), status, caller.role)
        .await?;
    Ok(Json(transition.into()))
}

/// Previews whether paying `amount` from an account would overdraw it
pub async fn overdraft_advisory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AdvisoryQuery>,
) -> Result<Json<OverdraftPreviewResponse>, ApiError> {
    let amount = Money::new(query.amount, state.currency);
    let advisory = state
        .payables
        .overdraft_advisory(AccountId::from_uuid(id), amount)
        .await?;

    Ok(Json(OverdraftPreviewResponse {
        account_id: id,
        amount: query.amount,
        advisory: advisory.as_ref().map(AdvisoryResponse::from),
    }))
}
