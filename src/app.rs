use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::auth::X_ACTOR_ID;
use crate::config::Settings;
use crate::engine::Engine;
use crate::routes;

/// Header name for request ID
pub const X_REQUEST_ID: &str = "x-request-id";

/// Largest accepted request body. A full bulk batch of ids fits well inside.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
    pub settings: Settings,
}

impl AppState {
    pub fn new(engine: Engine, settings: Settings) -> Arc<Self> {
        Arc::new(Self { engine, settings })
    }
}

/// Build the complete application with all middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(&state.settings);

    // DEBUG spans keep INFO output to the engine's own events
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    let request_id = HeaderName::from_static(X_REQUEST_ID);

    Router::new()
        .merge(routes::api_router())
        // Middleware stack (applied bottom-up)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(trace_layer)
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors_allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    // Long preflight cache in dev to cut OPTIONS noise
    let max_age = if settings.env.is_dev() {
        Duration::from_secs(86400)
    } else {
        Duration::from_secs(3600)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(X_REQUEST_ID),
            HeaderName::from_static(X_ACTOR_ID),
        ]))
        .expose_headers([HeaderName::from_static(X_REQUEST_ID)])
        .allow_credentials(true)
        .max_age(max_age)
}
