//! HTTP error responses for the JSON API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::domain::error::EodtraderError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<EodtraderError> for ApiError {
    fn from(err: EodtraderError) -> Self {
        let status = match &err {
            EodtraderError::ConfigParse { .. }
            | EodtraderError::ConfigMissing { .. }
            | EodtraderError::ConfigInvalid { .. } => StatusCode::BAD_REQUEST,
            EodtraderError::InsufficientHistory { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            EodtraderError::Provider { .. }
            | EodtraderError::Payload { .. }
            | EodtraderError::Cache { .. }
            | EodtraderError::Engine { .. }
            | EodtraderError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}
