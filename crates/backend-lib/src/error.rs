// crates/backend-lib/src/error.rs

//! Central error type + axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use coderoom_common::{ClientId, RoomId};
use thiserror::Error;

use crate::validation::ValidationError;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    /// The transport grouping knows a room for a connection that the
    /// membership table does not. Contained to that room's teardown.
    #[error("stale membership: connection {connection_id} has no roster entry in room {room_id}")]
    StaleMembership {
        connection_id: ClientId,
        room_id: RoomId,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::StaleMembership { .. } => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::StaleMembership { .. } => "ROOM_001",
            AppError::Validation(_) => "VAL_001",
            AppError::Json(_) => "JSON_001",
            AppError::Io(_) => "IO_001",
            AppError::Internal(_) => "INT_001",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}
