//! Route definitions for life hacks.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::life_hacks;
use crate::state::AppState;

/// Life hack routes mounted at `/life-hacks`.
///
/// ```text
/// GET   /       -> list_life_hacks (grouped by category)
/// POST  /       -> create_life_hack
/// PATCH /{id}   -> update_life_hack
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(life_hacks::list_life_hacks).post(life_hacks::create_life_hack),
        )
        .route("/{id}", patch(life_hacks::update_life_hack))
}
