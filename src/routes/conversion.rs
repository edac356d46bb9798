//! Conversion routes

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::{DataResponse, MutationResponse};
use crate::app::AppState;
use crate::auth::RequireActor;
use crate::domain::{ConversionRequest, Notice};
use crate::error::ApiResult;

/// POST /leads/:lead_id/convert
///
/// An empty body converts without a deal.
pub async fn convert_lead(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
    actor: RequireActor,
    req: Option<Json<ConversionRequest>>,
) -> ApiResult<impl IntoResponse> {
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let outcome = state.engine.conversions.convert(actor.user_id, lead_id, &req)?;

    let message = if outcome.deal_id.is_some() {
        "Lead converted to account, contact and deal"
    } else {
        "Lead converted to account and contact"
    };

    Ok(MutationResponse::new(outcome, Notice::done(message)))
}

/// GET /leads/:lead_id/conversion
pub async fn get_conversion(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let record = state.engine.conversions.conversion_for(lead_id)?;
    Ok(DataResponse::new(record))
}
