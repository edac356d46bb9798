//! Account, contact and deal routes
//!
//! Read-only: these records are only ever written by a conversion.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::pagination::{Paginated, PaginationParams};
use crate::api::response::DataResponse;
use crate::app::AppState;
use crate::error::ApiResult;

/// GET /accounts
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    Ok(Paginated::slice(state.engine.store.accounts.all(), &pagination))
}

/// GET /accounts/:account_id
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let account = state.engine.store.accounts.get(account_id)?;
    Ok(DataResponse::new(account))
}

/// GET /contacts
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    Ok(Paginated::slice(state.engine.store.contacts.all(), &pagination))
}

/// GET /deals
pub async fn list_deals(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    Ok(Paginated::slice(state.engine.store.deals.all(), &pagination))
}
