//! Handlers for assessments stored at the content backend.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use reetr_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/assessments
pub async fn list_assessments(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let assessments = state.backend.list_assessments(&user.access_token).await?;
    Ok(Json(DataResponse { data: assessments }))
}

/// POST /api/v1/assessments/{id}/edit
///
/// Fetch a stored assessment and open a draft on it. Submitting that draft
/// updates the stored record.
pub async fn edit_assessment(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(assessment_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = state
        .backend
        .get_assessment(&user.access_token, assessment_id)
        .await?;
    let view = state
        .drafts
        .open(&user.subject, Some(record.id), record.assessment)
        .await?;

    tracing::info!(
        user = %user.subject,
        assessment_id,
        draft_id = %view.id,
        "Draft opened from stored assessment",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// DELETE /api/v1/assessments/{id}
pub async fn delete_assessment(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(assessment_id): Path<DbId>,
) -> AppResult<StatusCode> {
    state
        .backend
        .delete_assessment(&user.access_token, assessment_id)
        .await?;
    tracing::info!(user = %user.subject, assessment_id, "Assessment deleted");
    Ok(StatusCode::NO_CONTENT)
}
