use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use service::{
    errors::ServiceError,
    storage::{StoreError, UnknownStoreKind},
};
use thiserror::Error;
use tracing::{error, warn};

/// Error envelope: `{ "status": "error", "error": <title>, "message": <detail> }`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable", Some(detail.into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let message = self.detail.unwrap_or_else(|| self.title.to_string());
        let body = json!({ "status": "error", "error": self.title, "message": message });
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match &e {
            ServiceError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg.clone())),
            ServiceError::Model(_) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.to_string())),
            ServiceError::Store(StoreError::Conflict { .. }) => {
                Self::new(StatusCode::CONFLICT, "Conflict", Some(e.to_string()))
            }
            ServiceError::Store(s) if s.is_critical() => {
                Self::new(StatusCode::BAD_REQUEST, "Invalid Document", Some(e.to_string()))
            }
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, "Not Found", Some(msg.clone())),
            ServiceError::Conflict(msg) => Self::new(StatusCode::CONFLICT, "Conflict", Some(msg.clone())),
            ServiceError::Unavailable(_) | ServiceError::Store(_) => {
                warn!(error = %e, "storage unavailable");
                Self::unavailable("storage temporarily unavailable")
            }
            ServiceError::Db(_) => {
                error!(error = %e, "request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string()))
            }
        }
    }
}

impl From<UnknownStoreKind> for JsonApiError {
    fn from(e: UnknownStoreKind) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
