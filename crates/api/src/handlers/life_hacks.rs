//! Handlers for life hacks.
//!
//! Forms are validated locally; invalid input is answered with 400 and the
//! full list of violations without contacting the backend.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use reetr_core::life_hack::{group_by_category, LifeHackInput};
use reetr_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/life-hacks
///
/// All life hacks keyed by category; uncategorized records are grouped
/// under `uncategorized`.
pub async fn list_life_hacks(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let hacks = state.backend.list_life_hacks(&user.access_token).await?;
    Ok(Json(DataResponse {
        data: group_by_category(hacks),
    }))
}

/// POST /api/v1/life-hacks
pub async fn create_life_hack(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<LifeHackInput>,
) -> AppResult<impl IntoResponse> {
    let created = state
        .backend
        .create_life_hack(&user.access_token, &input)
        .await?;

    tracing::info!(user = %user.subject, life_hack_id = created.id, "Life hack created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// PATCH /api/v1/life-hacks/{id}
pub async fn update_life_hack(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(life_hack_id): Path<DbId>,
    Json(input): Json<LifeHackInput>,
) -> AppResult<impl IntoResponse> {
    let updated = state
        .backend
        .update_life_hack(&user.access_token, life_hack_id, &input)
        .await?;

    tracing::info!(user = %user.subject, life_hack_id, "Life hack updated");

    Ok(Json(DataResponse { data: updated }))
}
