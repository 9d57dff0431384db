//! Order adjustment handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::OrderId;
use domain_receivables::ReturnLine;

use crate::{auth::Caller, error::ApiError, AppState};
use crate::dto::adjustment::*;

/// Cancels an order or returns some of its items
pub async fn adjust_order(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(request): Json<AdjustmentRequest>,
) -> Result<Json<AdjustmentResponse>, ApiError> {
    let lines: Vec<ReturnLine> = request.items.iter().map(ReturnLine::from).collect();

    let outcome = state
        .returns
        .process(OrderId::from_uuid(id), &request.action, &lines, caller.role)
        .await?;
    Ok(Json(outcome.into()))
}
