//! Lead routes
//!
//! Worklists, single-record edits and CSV export.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::pagination::{Paginated, PaginationParams};
use crate::api::response::{Created, DataResponse, MutationResponse};
use crate::app::AppState;
use crate::auth::RequireActor;
use crate::domain::{CustomFilters, DateRange, Lead, LeadStatus, LeadUpdate, NewLead, Notice, ViewName};
use crate::error::ApiResult;
use crate::services::LeadExport;

/// Worklist query: a named view, custom filters, search and paging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadListQuery {
    pub view: Option<ViewName>,
    pub search: Option<String>,
    pub status: Option<LeadStatus>,
    pub source: Option<String>,
    pub industry: Option<String>,
    pub date_range: Option<DateRange>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl LeadListQuery {
    fn filters(&self) -> CustomFilters {
        CustomFilters {
            status: self.status,
            source: self.source.clone(),
            industry: self.industry.clone(),
            date_range: self.date_range,
        }
    }

    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }

    fn evaluate(&self, state: &AppState) -> Vec<Lead> {
        state.engine.views.evaluate(
            self.view.unwrap_or_default(),
            &self.filters(),
            self.search.as_deref().unwrap_or_default(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct LockRequest {
    pub locked: bool,
}

/// GET /leads
///
/// Evaluate a worklist view.
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeadListQuery>,
) -> ApiResult<impl IntoResponse> {
    let leads = query.evaluate(&state);
    Ok(Paginated::slice(leads, &query.pagination()))
}

/// POST /leads
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    actor: RequireActor,
    Json(req): Json<NewLead>,
) -> ApiResult<impl IntoResponse> {
    let lead = state.engine.leads.create(actor.user_id, req)?;
    let notice = Notice::done(format!("Lead {} created", lead.full_name()));

    Ok(Created(MutationResponse::new(lead, notice)))
}

/// GET /leads/:lead_id
///
/// Opening a lead marks it read.
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let lead = state.engine.leads.view(lead_id)?;
    Ok(DataResponse::new(lead))
}

/// PATCH /leads/:lead_id
pub async fn update_lead(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
    _actor: RequireActor,
    Json(req): Json<LeadUpdate>,
) -> ApiResult<impl IntoResponse> {
    let lead = state.engine.leads.update(lead_id, &req)?;
    let notice = Notice::done(format!("Lead {} updated", lead.full_name()));

    Ok(MutationResponse::new(lead, notice))
}

/// DELETE /leads/:lead_id
pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
    _actor: RequireActor,
) -> ApiResult<impl IntoResponse> {
    state.engine.leads.delete(lead_id)?;
    Ok(MutationResponse::new(lead_id, Notice::done("Lead deleted")))
}

/// POST /leads/:lead_id/lock
pub async fn lock_lead(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
    _actor: RequireActor,
    Json(req): Json<LockRequest>,
) -> ApiResult<impl IntoResponse> {
    let lead = state.engine.leads.set_locked(lead_id, req.locked)?;
    let message = if lead.is_locked { "Lead locked" } else { "Lead unlocked" };

    Ok(MutationResponse::new(lead, Notice::done(message)))
}

/// GET /leads/export
///
/// The same worklist as `GET /leads`, unpaginated, as CSV.
pub async fn export_leads(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeadListQuery>,
) -> ApiResult<impl IntoResponse> {
    let leads = query.evaluate(&state);
    let body = LeadExport::project(&leads).render(quote_csv_field);

    tracing::info!(rows = leads.len(), "Leads exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"leads.csv\""),
        ],
        body,
    ))
}

/// RFC 4180 quoting: wrap when the field holds a delimiter, quote or line break.
fn quote_csv_field(field: &str) -> String {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
