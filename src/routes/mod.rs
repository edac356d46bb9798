pub mod accounts;
pub mod bulk;
pub mod conversion;
pub mod duplicates;
pub mod health;
pub mod leads;

use axum::{routing::get, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Leads
        .route("/leads", get(leads::list_leads).post(leads::create_lead))
        .route("/leads/export", get(leads::export_leads))
        .route(
            "/leads/:lead_id",
            get(leads::get_lead)
                .patch(leads::update_lead)
                .delete(leads::delete_lead),
        )
        .route("/leads/:lead_id/lock", post(leads::lock_lead))
        // Conversion
        .route("/leads/:lead_id/convert", post(conversion::convert_lead))
        .route("/leads/:lead_id/conversion", get(conversion::get_conversion))
        // Bulk
        .route("/leads/bulk", post(bulk::bulk_apply))
        .route("/leads/tags", post(bulk::manage_tags))
        .route("/leads/campaigns", post(bulk::add_to_campaign))
        // Deduplication
        .route("/leads/duplicates", post(duplicates::find_duplicates))
        .route("/leads/duplicates/merge", post(duplicates::merge_duplicates))
        // Conversion outputs
        .route("/accounts", get(accounts::list_accounts))
        .route("/accounts/:account_id", get(accounts::get_account))
        .route("/contacts", get(accounts::list_contacts))
        .route("/deals", get(accounts::list_deals))
}
