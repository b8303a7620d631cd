//! Route definitions for assessment drafts.

use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::handlers::drafts;
use crate::state::AppState;

/// Draft routes mounted at `/drafts`. Stage, question and option segments
/// are zero-based positions.
///
/// ```text
/// POST   /                                              -> open_draft
/// GET    /{id}                                          -> get_draft
/// PATCH  /{id}                                          -> update_header
/// DELETE /{id}                                          -> discard_draft
/// POST   /{id}/validate                                 -> validate_draft
/// POST   /{id}/submit                                   -> submit_draft
/// POST   /{id}/stages                                   -> add_stage
/// PATCH  /{id}/stages/{si}                              -> update_stage
/// DELETE /{id}/stages/{si}                              -> remove_stage
/// GET    /{id}/stages/{si}/dependency-targets           -> dependency_targets
/// POST   /{id}/stages/{si}/questions                    -> add_question
/// PATCH  /{id}/stages/{si}/questions/{qi}               -> update_question
/// DELETE /{id}/stages/{si}/questions/{qi}               -> remove_question
/// POST   /{id}/stages/{si}/questions/{qi}/options       -> add_option
/// PUT    /{id}/stages/{si}/questions/{qi}/options/{oi}  -> update_option
/// DELETE /{id}/stages/{si}/questions/{qi}/options/{oi}  -> remove_option
/// PUT    /{id}/stages/{si}/questions/{qi}/dependency    -> set_dependency
/// DELETE /{id}/stages/{si}/questions/{qi}/dependency    -> clear_dependency
/// PUT    .../dependency/stage                           -> set_dependency_stage
/// PUT    .../dependency/question                        -> set_dependency_question
/// POST   .../dependency/values                          -> toggle_dependency_value
/// ```
pub fn router() -> Router<AppState> {
    let question = "/{id}/stages/{si}/questions/{qi}";
    Router::new()
        .route("/", post(drafts::open_draft))
        .route(
            "/{id}",
            get(drafts::get_draft)
                .patch(drafts::update_header)
                .delete(drafts::discard_draft),
        )
        .route("/{id}/validate", post(drafts::validate_draft))
        .route("/{id}/submit", post(drafts::submit_draft))
        .route("/{id}/stages", post(drafts::add_stage))
        .route(
            "/{id}/stages/{si}",
            patch(drafts::update_stage).delete(drafts::remove_stage),
        )
        .route(
            "/{id}/stages/{si}/dependency-targets",
            get(drafts::dependency_targets),
        )
        .route("/{id}/stages/{si}/questions", post(drafts::add_question))
        .route(
            question,
            patch(drafts::update_question).delete(drafts::remove_question),
        )
        .route(&format!("{question}/options"), post(drafts::add_option))
        .route(
            &format!("{question}/options/{{oi}}"),
            put(drafts::update_option).delete(drafts::remove_option),
        )
        .route(
            &format!("{question}/dependency"),
            put(drafts::set_dependency).delete(drafts::clear_dependency),
        )
        .route(
            &format!("{question}/dependency/stage"),
            put(drafts::set_dependency_stage),
        )
        .route(
            &format!("{question}/dependency/question"),
            put(drafts::set_dependency_question),
        )
        .route(
            &format!("{question}/dependency/values"),
            post(drafts::toggle_dependency_value),
        )
}
