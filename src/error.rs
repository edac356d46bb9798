//! Unified API error handling
//!
//! Engine errors map onto HTTP statuses here; handlers just use `?`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::EngineError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Engine(err) => match err {
                EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
                EngineError::Validation(_) | EngineError::NoCriteriaSelected => {
                    StatusCode::BAD_REQUEST
                }
                EngineError::LeadLocked(_) | EngineError::AlreadyConverted(_) => {
                    StatusCode::CONFLICT
                }
                EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Engine(err) => err.code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            // Don't leak storage details
            Self::Engine(EngineError::Storage(_)) | Self::Internal(_) => {
                "An internal error occurred".to_string()
            }
            Self::Engine(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, "Internal server error");
            }
            Self::Engine(EngineError::Storage(e)) => {
                tracing::error!(error = %e, "Storage error");
            }
            _ => {
                tracing::warn!(error = %self, "API error");
            }
        }

        let status = self.status_code();
        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
