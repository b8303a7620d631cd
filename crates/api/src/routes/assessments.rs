//! Route definitions for stored assessments.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::assessments;
use crate::state::AppState;

/// Assessment routes mounted at `/assessments`.
///
/// ```text
/// GET    /            -> list_assessments
/// DELETE /{id}        -> delete_assessment
/// POST   /{id}/edit   -> edit_assessment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assessments::list_assessments))
        .route("/{id}", delete(assessments::delete_assessment))
        .route("/{id}/edit", post(assessments::edit_assessment))
}
