pub mod assessments;
pub mod drafts;
pub mod health;
pub mod life_hacks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree. Every route requires admin claims.
///
/// ```text
/// /drafts                                          open draft (POST)
/// /drafts/{id}                                     get, update header, discard
/// /drafts/{id}/validate                            validation report (POST)
/// /drafts/{id}/submit                              renumber, validate, save (POST)
/// /drafts/{id}/stages                              add stage (POST)
/// /drafts/{id}/stages/{si}                         retitle, remove
/// /drafts/{id}/stages/{si}/dependency-targets      eligible targets (GET)
/// /drafts/{id}/stages/{si}/questions               add question (POST)
/// /drafts/{id}/stages/{si}/questions/{qi}          update field, remove
/// /drafts/{id}/stages/{si}/questions/{qi}/options  add option (POST)
/// .../options/{oi}                                 set text, remove
/// .../dependency                                   set or enable, clear
/// .../dependency/stage                             change target stage (PUT)
/// .../dependency/question                          change target question (PUT)
/// .../dependency/values                            toggle accepted value (POST)
///
/// /assessments                                     list (GET)
/// /assessments/{id}                                delete
/// /assessments/{id}/edit                           open draft from record (POST)
///
/// /life-hacks                                      list grouped, create
/// /life-hacks/{id}                                 update (PATCH)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/drafts", drafts::router())
        .nest("/assessments", assessments::router())
        .nest("/life-hacks", life_hacks::router())
}
