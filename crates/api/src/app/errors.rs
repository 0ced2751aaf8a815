use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use careops_auth::{AuthzError, CredentialError, TokenError};
use careops_core::DomainError;
use careops_infra::StoreError;

/// Every failure a handler can return.
///
/// Rendered as `{"error": code, "message": msg}`. Server-side causes are
/// logged where they are converted; callers only see a safe message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    /// Progress requested for a form without fields.
    #[error("{0}")]
    InvalidProgress(String),

    #[error("{0}")]
    Server(String),
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized("could not validate credentials")
    }

    pub fn not_found(kind: &str) -> Self {
        Self::NotFound(format!("{kind} not found"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidProgress(_) => StatusCode::BAD_REQUEST,
            ApiError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Validation(_) => "validation_error",
            ApiError::InvalidProgress(_) => "invalid_progress",
            ApiError::Server(_) => "server_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut resp = json_error(self.status(), self.code(), self.to_string());
        if matches!(self, ApiError::Unauthorized(_)) {
            resp.headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        resp
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthorized => ApiError::unauthorized(),
            AuthzError::Forbidden(_) => ApiError::Forbidden(err.to_string()),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::InvalidId(_) => ApiError::NotFound("resource not found".to_string()),
            DomainError::NotFound(what) => ApiError::not_found(what),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::DivisionByZero(_) => ApiError::InvalidProgress(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(detail) => {
                tracing::debug!(%detail, "unique constraint violated");
                ApiError::Conflict("a record with the same unique value already exists".to_string())
            }
            other => {
                error!(error = %other, "store operation failed");
                ApiError::Server("store operation failed".to_string())
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        error!(error = %err, "token signing failed");
        ApiError::Server("could not issue access token".to_string())
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        error!(error = %err, "password hashing failed");
        ApiError::Server("could not process credentials".to_string())
    }
}
