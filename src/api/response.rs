//! Standard API response types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::Notice;

/// Response for single data item
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for DataResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Result of a mutating call: the payload plus the toast to show for it.
#[derive(Debug, Serialize)]
pub struct MutationResponse<T: Serialize> {
    pub data: T,
    pub notice: Notice,
}

impl<T: Serialize> MutationResponse<T> {
    pub fn new(data: T, notice: Notice) -> Self {
        Self { data, notice }
    }
}

impl<T: Serialize> IntoResponse for MutationResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Helper for creating responses with status codes
pub struct Created<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}
