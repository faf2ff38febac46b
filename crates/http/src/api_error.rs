//! Typed API error for HTTP handlers.
//!
//! Converts service errors into HTTP responses with a JSON body and status
//! code. Handlers return `Result<_, ApiError>`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use seadex_rss_service::ServiceError;

/// API error with HTTP status code and human-readable message.
///
/// Serializes as `{"error": "message"}`. `Internal` logs the real error
/// server-side and sends a fixed message to the client.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request, invalid input from caller.
    BadRequest(String),
    /// 404 Not Found, no snapshots for the requested id.
    NotFound(String),
    /// 500 Internal Server Error. Details logged, not exposed.
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            },
        };
        let body = serde_json::json!({"error": message});
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NoSnapshots { id, outcome } if outcome.is_failure() => {
                Self::NotFound(format!(
                    "No data available for Anilist ID {id}. The entry might not exist or \
                     there might be an issue with the SeaDex API."
                ))
            },
            ServiceError::NoSnapshots { id, .. } => {
                Self::NotFound(format!("No snapshots available for Anilist ID {id}."))
            },
            ServiceError::Storage(_) => Self::Internal(err.into()),
        }
    }
}
