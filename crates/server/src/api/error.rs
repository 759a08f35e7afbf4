//! Mapping from domain errors to HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use binder_core::{
    AuditError, CatalogError, ExportError, ImportError, OwnershipError, PreferenceError,
    StatsError, WishlistError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error on its way out of a handler.
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

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Logs the detail and hides it from the caller.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!(error = %detail, "Request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Unwrap a JSON body, turning every rejection (bad syntax, wrong types,
/// missing content type) into a 400.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(what) => ApiError::not_found(format!("Not found: {what}")),
            CatalogError::StoreUnavailable(_) => ApiError::internal(e),
        }
    }
}

impl From<OwnershipError> for ApiError {
    fn from(e: OwnershipError) -> Self {
        match e {
            OwnershipError::NotFound(what) => ApiError::not_found(format!("Not found: {what}")),
            OwnershipError::Validation(msg) => ApiError::bad_request(msg),
            OwnershipError::StoreUnavailable(_) => ApiError::internal(e),
        }
    }
}

impl From<StatsError> for ApiError {
    fn from(e: StatsError) -> Self {
        match e {
            StatsError::Validation(msg) => ApiError::bad_request(msg),
        }
    }
}

impl From<WishlistError> for ApiError {
    fn from(e: WishlistError) -> Self {
        match e {
            WishlistError::NotFound(what) => ApiError::not_found(format!("Not found: {what}")),
            WishlistError::AlreadyListed(_) | WishlistError::AlreadyOwned(_) => {
                ApiError::new(StatusCode::CONFLICT, e.to_string())
            }
            WishlistError::StoreUnavailable(_) => ApiError::internal(e),
        }
    }
}

impl From<PreferenceError> for ApiError {
    fn from(e: PreferenceError) -> Self {
        match e {
            PreferenceError::Validation(msg) => ApiError::bad_request(msg),
            PreferenceError::StoreUnavailable(_) => ApiError::internal(e),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(e: ImportError) -> Self {
        match e {
            ImportError::DataDirNotFound(_) => ApiError::bad_request(e.to_string()),
            ImportError::Io { .. } | ImportError::Parse { .. } => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            ImportError::Catalog(inner) => inner.into(),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        ApiError::internal(e)
    }
}

impl From<AuditError> for ApiError {
    fn from(e: AuditError) -> Self {
        ApiError::internal(e)
    }
}
