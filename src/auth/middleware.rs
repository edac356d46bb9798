use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::{ActorContext, X_ACTOR_ID};
use crate::error::ErrorResponse;

/// Extractor that requires an actor id.
/// Use this in every mutating route handler.
///
/// Example:
/// ```ignore
/// async fn protected_route(actor: RequireActor) -> impl IntoResponse {
///     format!("Hello, user {}", actor.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireActor(pub ActorContext);

impl std::ops::Deref for RequireActor {
    type Target = ActorContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingActor,
    InvalidActor,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match &self {
            AuthError::MissingActor => "Missing x-actor-id header",
            AuthError::InvalidActor => "Invalid x-actor-id header",
        };

        let body = ErrorResponse {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
        };

        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireActor
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(X_ACTOR_ID)
            .ok_or(AuthError::MissingActor)?
            .to_str()
            .map_err(|_| AuthError::InvalidActor)?;

        let context = ActorContext::from_header(header).map_err(|e| {
            tracing::warn!(error = %e, "Rejected actor header");
            AuthError::InvalidActor
        })?;

        Ok(RequireActor(context))
    }
}
