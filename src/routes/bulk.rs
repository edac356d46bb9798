//! Bulk routes
//!
//! Mass operations, tagging and campaign membership.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::response::MutationResponse;
use crate::app::AppState;
use crate::auth::RequireActor;
use crate::domain::BulkOperation;
use crate::error::{ApiError, ApiResult};
use crate::services::CancelToken;

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub ids: Vec<Uuid>,
    pub operation: BulkOperation,
}

#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub ids: Vec<Uuid>,
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub remove: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CampaignRequest {
    pub ids: Vec<Uuid>,
    pub campaign_id: String,
}

/// Cancels the batch if the request future is dropped mid-flight.
struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// POST /leads/bulk
///
/// Runs on the blocking pool in chunks; a client that disconnects stops the
/// batch at the next chunk boundary.
pub async fn bulk_apply(
    State(state): State<Arc<AppState>>,
    actor: RequireActor,
    Json(req): Json<BulkRequest>,
) -> ApiResult<impl IntoResponse> {
    let cancel = CancelToken::new();
    let _guard = CancelOnDrop(cancel.clone());
    let engine = state.engine.clone();
    let actor_id = actor.user_id;

    let result = tokio::task::spawn_blocking(move || {
        engine.bulk_apply(actor_id, &req.ids, &req.operation, &cancel)
    })
    .await
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("bulk task failed: {e}")))??;

    let notice = result.notice();
    Ok(MutationResponse::new(result, notice))
}

/// POST /leads/tags
pub async fn manage_tags(
    State(state): State<Arc<AppState>>,
    _actor: RequireActor,
    Json(req): Json<TagRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state.engine.tags.manage_tags(&req.ids, &req.add, &req.remove);
    let notice = result.notice();

    Ok(MutationResponse::new(result, notice))
}

/// POST /leads/campaigns
pub async fn add_to_campaign(
    State(state): State<Arc<AppState>>,
    _actor: RequireActor,
    Json(req): Json<CampaignRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state
        .engine
        .campaigns
        .add_to_campaign(&req.ids, &req.campaign_id)?;
    let notice = result.notice();

    Ok(MutationResponse::new(result, notice))
}
