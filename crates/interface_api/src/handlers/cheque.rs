//! Customer cheque handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use core_kernel::{AccountId, PaymentId};
use domain_treasury::ChequeStatus;

use crate::{error::ApiError, AppState};
use crate::dto::settlement::{ChequeStatusRequest, ChequeTransitionResponse};

/// Moves a received cheque to a new status
pub async fn update_cheque_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChequeStatusRequest>,
) -> Result<Json<ChequeTransitionResponse>, ApiError> {
    let status: ChequeStatus = request.status.parse()?;

    let transition = state
        .cheques
        .transition(
            PaymentId::from_uuid(id),
            status,
            request.deposit_account_id.map(AccountId::from_uuid),
        )
        .await?;
    Ok(Json(transition.into()))
}
