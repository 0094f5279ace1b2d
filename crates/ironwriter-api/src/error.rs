//! IronWriter — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ironwriter_core::error::DomainError;
use ironwriter_oracle::OracleError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The oracle book could not be loaded.
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    /// The saved session could not be restored.
    #[error("session error: {0}")]
    Session(#[from] DomainError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub enum ApiError {
    /// A failed domain operation.
    Domain(DomainError),
    /// A session document that was refused by import.
    RejectedDocument(DomainError),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Domain(DomainError::MomentNotFound(_)) => {
                (StatusCode::NOT_FOUND, "moment_not_found")
            }
            Self::Domain(DomainError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            Self::Domain(DomainError::UnsupportedSchema { .. })
            | Self::RejectedDocument(DomainError::UnsupportedSchema { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unsupported_schema")
            }
            Self::Domain(DomainError::Infrastructure(_))
            | Self::RejectedDocument(DomainError::Infrastructure(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
            Self::RejectedDocument(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_document"),
        }
    }

    fn domain_error(&self) -> &DomainError {
        match self {
            Self::Domain(err) | Self::RejectedDocument(err) => err,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let body = ErrorBody {
            error: error_code,
            message: self.domain_error().to_string(),
        };

        (status, Json(body)).into_response()
    }
}
