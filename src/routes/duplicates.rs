//! Deduplication routes

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::response::{DataResponse, MutationResponse};
use crate::app::AppState;
use crate::auth::RequireActor;
use crate::domain::{CriteriaSet, Notice};
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct DedupRequest {
    #[serde(default)]
    pub criteria: CriteriaSet,
}

/// POST /leads/duplicates
///
/// Preview duplicate groups without deleting anything.
pub async fn find_duplicates(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DedupRequest>,
) -> ApiResult<impl IntoResponse> {
    let groups = state.engine.duplicates.find_duplicates(&req.criteria)?;
    Ok(DataResponse::new(groups))
}

/// POST /leads/duplicates/merge
pub async fn merge_duplicates(
    State(state): State<Arc<AppState>>,
    _actor: RequireActor,
    Json(req): Json<DedupRequest>,
) -> ApiResult<impl IntoResponse> {
    let summary = state.engine.duplicates.deduplicate(&req.criteria)?;

    let mut message = format!(
        "{} duplicates found, {} removed",
        summary.duplicates_found, summary.deleted
    );
    if summary.protected > 0 {
        message.push_str(&format!(", {} converted kept", summary.protected));
    }

    Ok(MutationResponse::new(summary, Notice::done(message)))
}
