use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::dates::RangeError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    MalformedPayload(String),

    #[error("{0}")]
    InvalidRange(#[from] RangeError),

    #[error("Unknown store: {0}")]
    UnknownStore(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedPayload(_) | ApiError::InvalidRange(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownStore(_) | ApiError::UnknownUser(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{:#}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
