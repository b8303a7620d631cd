use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    open_drafts: usize,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        open_drafts: state.drafts.count().await,
    })
}

/// Public health check mounted at the root.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
