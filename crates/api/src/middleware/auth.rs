//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use reetr_core::admin::AdminStatus;
use reetr_core::error::CoreError;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Caller extracted from a JWT Bearer token in the `Authorization` header.
///
/// The raw token is kept so it can be forwarded to the content backend.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Identity-provider user id (from `claims.sub`). Drafts are owned by it.
    pub subject: String,
    /// The bearer token as received.
    pub access_token: String,
    /// Admin status derived from the token's claims.
    pub admin: AdminStatus,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|err| {
            tracing::debug!(error = %err, "Rejected bearer token");
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let admin = claims.admin_status(&state.config.admin_claim_namespace);

        Ok(AuthUser {
            subject: claims.sub,
            access_token: token.to_string(),
            admin,
        })
    }
}
