use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use marquee_core::CatalogError;
use marquee_store::StoreError;

use crate::cache::FetchError;
use crate::catalog::CatalogServiceError;

#[derive(Debug)]
pub enum ApiError {
    /// Record no encontrado
    NotFound { id: String },

    /// Parametros invalidos
    BadRequest(String),

    /// Conflicto (record duplicado)
    Conflict(String),

    /// Upstream demasiado lento
    Timeout(String),

    /// Error interno
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound { id } => (
                StatusCode::NOT_FOUND,
                "Not Found",
                format!("Movie not found: {}", id),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", msg),
            ApiError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, "Gateway Timeout", msg),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                msg,
            ),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation { .. } | CatalogError::InvalidId { .. } => {
                ApiError::BadRequest(err.to_string())
            },
            CatalogError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::RecordNotFound(id) => ApiError::NotFound { id: id.clone() },
            StoreError::DuplicateRecord(_) => ApiError::Conflict(err.to_string()),
            StoreError::Timeout { .. } => ApiError::Timeout(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Store(store_err) => match store_err.as_ref() {
                StoreError::RecordNotFound(id) => ApiError::NotFound { id: id.clone() },
                other => ApiError::Internal(other.to_string()),
            },
            FetchError::Timeout { .. } => ApiError::Timeout(err.to_string()),
            FetchError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<CatalogServiceError> for ApiError {
    fn from(err: CatalogServiceError) -> Self {
        match err {
            CatalogServiceError::Validation(e) => e.into(),
            CatalogServiceError::Fetch(e) => e.into(),
            CatalogServiceError::Store(e) => e.into(),
        }
    }
}
