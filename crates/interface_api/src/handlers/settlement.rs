//! Settlement handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use core_kernel::CustomerId;

use crate::{error::ApiError, AppState};
use crate::dto::settlement::*;

/// Settles selected invoices from one payment instrument
///
/// Returns 201 with per-invoice failures listed in the body; rows that
/// failed to insert do not undo the ones that succeeded.
pub async fn create_settlement(
    State(state): State<AppState>,
    Json(request): Json<SettlementRequest>,
) -> Result<(StatusCode, Json<SettlementResponse>), ApiError> {
    let customer_id = CustomerId::from_uuid(request.customer_id);
    let (instrument, selections) = request.into_domain(state.currency)?;

    let result = state.settlements.allocate(customer_id, instrument, selections).await?;
    Ok((StatusCode::CREATED, Json(result.into())))
}

/// Lists a customer's invoices with a balance left to settle
pub async fn list_outstanding_invoices(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<OutstandingInvoiceResponse>>, ApiError> {
    let invoices = state
        .settlements
        .list_outstanding_invoices(CustomerId::from_uuid(id))
        .await?;
    Ok(Json(invoices.into_iter().map(Into::into).collect()))
}
