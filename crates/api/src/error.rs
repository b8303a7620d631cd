use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reetr_backend::BackendApiError;
use reetr_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`BackendApiError`] for calls to
/// the content backend. Implements [`IntoResponse`] to produce consistent
/// `{ "error", "code" }` JSON responses; validation failures also carry the
/// full `violations` list.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `reetr_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed call to the content backend.
    #[error(transparent)]
    Backend(#[from] BackendApiError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Backend(err) => classify_backend_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(violations) = self.violations() {
            body["violations"] = json!(violations);
        }

        (status, axum::Json(body)).into_response()
    }
}

impl AppError {
    fn violations(&self) -> Option<&[String]> {
        match self {
            AppError::Core(CoreError::Validation(messages))
            | AppError::Backend(BackendApiError::Invalid(CoreError::Validation(messages))) => {
                Some(messages.as_slice())
            }
            _ => None,
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Structural(msg) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "STRUCTURAL_ERROR",
            msg.clone(),
        ),
        CoreError::Validation(messages) => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            messages.join("; "),
        ),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Classify a backend failure.
///
/// - Local pre-flight rejections map like core errors.
/// - Backend 4xx responses are forwarded with their status and body.
/// - Anything else (5xx, transport failures) maps to 502.
fn classify_backend_error(err: &BackendApiError) -> (StatusCode, &'static str, String) {
    match err {
        BackendApiError::Invalid(core) => classify_core_error(core),
        BackendApiError::ApiError { status, body } => {
            match StatusCode::from_u16(*status) {
                Ok(status) if status.is_client_error() => {
                    (status, "BACKEND_REJECTED", body.clone())
                }
                _ => {
                    tracing::error!(status, %body, "Backend error");
                    bad_gateway()
                }
            }
        }
        BackendApiError::Request(req_err) => {
            tracing::error!(error = %req_err, "Backend request failed");
            bad_gateway()
        }
    }
}

fn bad_gateway() -> (StatusCode, &'static str, String) {
    (
        StatusCode::BAD_GATEWAY,
        "BAD_GATEWAY",
        "The content backend is unavailable".to_string(),
    )
}
