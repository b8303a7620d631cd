//! Handlers for assessment drafts.
//!
//! Each mutation maps onto one core editing operation, runs atomically
//! against the caller's draft, and answers with the updated draft view.
//! Core errors pass through unchanged: out-of-range positions and locked
//! options are structural errors (422), bad dependency values are
//! validation errors (400).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use reetr_core::assessment::editor::QuestionUpdate;
use reetr_core::assessment::validation::validate_assessment;
use reetr_core::assessment::{Assessment, AssessmentRecord, InputType};
use reetr_core::error::CoreError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::drafts::{Draft, DraftView};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn view_response(view: DraftView) -> Json<DataResponse<DraftView>> {
    Json(DataResponse { data: view })
}

// ---------------------------------------------------------------------------
// Draft lifecycle
// ---------------------------------------------------------------------------

/// Request body for opening a draft.
#[derive(Debug, Default, Deserialize)]
pub struct OpenDraftRequest {
    /// Starting document; a new empty assessment when omitted.
    #[serde(default)]
    pub assessment: Option<Assessment>,
}

/// POST /api/v1/drafts
pub async fn open_draft(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<OpenDraftRequest>,
) -> AppResult<impl IntoResponse> {
    let assessment = input.assessment.unwrap_or_default();
    let view = state.drafts.open(&user.subject, None, assessment).await?;

    tracing::info!(user = %user.subject, draft_id = %view.id, "Draft opened");

    Ok((StatusCode::CREATED, view_response(view)))
}

/// GET /api/v1/drafts/{id}
pub async fn get_draft(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let view = state.drafts.get(&user.subject, id).await?;
    Ok(view_response(view))
}

/// Partial update of the assessment header and call to action.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateHeaderRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_time: Option<u32>,
    pub button_text: Option<String>,
    pub web_route: Option<String>,
    pub native_route: Option<String>,
}

/// PATCH /api/v1/drafts/{id}
pub async fn update_header(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateHeaderRequest>,
) -> AppResult<impl IntoResponse> {
    let (_, view) = state
        .drafts
        .apply(&user.subject, id, |assessment| {
            if let Some(title) = input.title {
                assessment.title = title;
            }
            if let Some(description) = input.description {
                assessment.description = description;
            }
            if let Some(minutes) = input.estimated_time {
                assessment.estimated_time = minutes;
            }
            let cta = &mut assessment.assessment_cta;
            if let Some(text) = input.button_text {
                cta.button_text = text;
            }
            if let Some(route) = input.web_route {
                cta.web_route = route;
            }
            if let Some(route) = input.native_route {
                cta.native_route = route;
            }
            Ok(())
        })
        .await?;
    Ok(view_response(view))
}

/// DELETE /api/v1/drafts/{id}
pub async fn discard_draft(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.drafts.discard(&user.subject, id).await?;
    tracing::info!(user = %user.subject, draft_id = %id, "Draft discarded");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/drafts/{id}/validate
///
/// Report every rule violation of the draft as it would be submitted
/// (renumbered). The draft itself is not modified.
pub async fn validate_draft(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let report = state
        .drafts
        .inspect(&user.subject, id, |assessment| {
            let mut normalized = assessment.clone();
            normalized.renumber();
            Ok(validate_assessment(&normalized))
        })
        .await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/drafts/{id}/submit
///
/// Claim the draft, renumber and validate it, then create the assessment at
/// the backend (or update it when the draft was opened from a stored
/// record). Any failure hands the draft back unchanged.
pub async fn submit_draft(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let draft = state.drafts.take_for_submit(&user.subject, id).await?;

    match send_draft(&state, &user.access_token, &draft).await {
        Ok((status, record)) => {
            tracing::info!(
                user = %user.subject,
                draft_id = %id,
                assessment_id = record.id,
                "Assessment submitted",
            );
            Ok((status, Json(DataResponse { data: record })))
        }
        Err(err) => {
            tracing::warn!(draft_id = %id, error = %err, "Submit failed, draft kept");
            state.drafts.restore(draft).await;
            Err(err)
        }
    }
}

async fn send_draft(
    state: &AppState,
    token: &str,
    draft: &Draft,
) -> AppResult<(StatusCode, AssessmentRecord)> {
    let mut assessment = draft.assessment.clone();
    assessment.prepare_for_submission()?;

    match draft.source_id {
        Some(assessment_id) => {
            let record = state
                .backend
                .update_assessment(token, assessment_id, &assessment)
                .await?;
            Ok((StatusCode::OK, record))
        }
        None => {
            let record = state.backend.create_assessment(token, &assessment).await?;
            Ok((StatusCode::CREATED, record))
        }
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// POST /api/v1/drafts/{id}/stages
pub async fn add_stage(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let (_, view) = state
        .drafts
        .apply(&user.subject, id, |assessment| Ok(assessment.add_stage()))
        .await?;
    Ok((StatusCode::CREATED, view_response(view)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStageRequest {
    pub title: String,
}

/// PATCH /api/v1/drafts/{id}/stages/{si}
pub async fn update_stage(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path((id, stage_index)): Path<(Uuid, usize)>,
    Json(input): Json<UpdateStageRequest>,
) -> AppResult<impl IntoResponse> {
    let (_, view) = state
        .drafts
        .apply(&user.subject, id, |assessment| {
            assessment.update_stage_title(stage_index, input.title)
        })
        .await?;
    Ok(view_response(view))
}

/// DELETE /api/v1/drafts/{id}/stages/{si}
pub async fn remove_stage(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path((id, stage_index)): Path<(Uuid, usize)>,
) -> AppResult<impl IntoResponse> {
    let (_, view) = state
        .drafts
        .apply(&user.subject, id, |assessment| {
            assessment.remove_stage(stage_index)
        })
        .await?;
    Ok(view_response(view))
}

/// A question that questions of a later stage may depend on.
#[derive(Debug, Serialize)]
pub struct DependencyTargetView {
    pub stage_id: u32,
    pub stage_title: String,
    pub question_id: u32,
    pub question_text: String,
    pub input_type: InputType,
    pub options: Vec<String>,
}

/// GET /api/v1/drafts/{id}/stages/{si}/dependency-targets
pub async fn dependency_targets(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path((id, stage_index)): Path<(Uuid, usize)>,
) -> AppResult<impl IntoResponse> {
    let targets = state
        .drafts
        .inspect(&user.subject, id, |assessment| {
            if stage_index >= assessment.stages.len() {
                return Err(CoreError::Structural(format!(
                    "Stage index {stage_index} is out of range"
                )));
            }
            Ok(assessment
                .eligible_dependency_targets(stage_index)
                .map(|target| DependencyTargetView {
                    stage_id: target.stage_id,
                    stage_title: target.stage_title.to_string(),
                    question_id: target.question.id,
                    question_text: target.question.text.clone(),
                    input_type: target.question.input_type(),
                    options: target.question.options().map(<[String]>::to_vec).unwrap_or_default(),
                })
                .collect::<Vec<_>>())
        })
        .await?;
    Ok(Json(DataResponse { data: targets }))
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// POST /api/v1/drafts/{id}/stages/{si}/questions
pub async fn add_question(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path((id, stage_index)): Path<(Uuid, usize)>,
) -> AppResult<impl IntoResponse> {
    let (_, view) = state
        .drafts
        .apply(&user.subject, id, |assessment| {
            assessment.add_question(stage_index)
        })
        .await?;
    Ok((StatusCode::CREATED, view_response(view)))
}

/// PATCH /api/v1/drafts/{id}/stages/{si}/questions/{qi}
///
/// Body: `{"field": "<name>", "value": <value>}`.
pub async fn update_question(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path((id, stage_index, question_index)): Path<(Uuid, usize, usize)>,
    Json(update): Json<QuestionUpdate>,
) -> AppResult<impl IntoResponse> {
    let (_, view) = state
        .drafts
        .apply(&user.subject, id, |assessment| {
            assessment.update_question(stage_index, question_index, update)
        })
        .await?;
    Ok(view_response(view))
}

/// DELETE /api/v1/drafts/{id}/stages/{si}/questions/{qi}
pub async fn remove_question(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path((id, stage_index, question_index)): Path<(Uuid, usize, usize)>,
) -> AppResult<impl IntoResponse> {
    let (_, view) = state
        .drafts
        .apply(&user.subject, id, |assessment| {
            assessment.remove_question(stage_index, question_index)
        })
        .await?;
    Ok(view_response(view))
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// POST /api/v1/drafts/{id}/stages/{si}/questions/{qi}/options
pub async fn add_option(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path((id, stage_index, question_index)): Path<(Uuid, usize, usize)>,
) -> AppResult<impl IntoResponse> {
    let (_, view) = state
        .drafts
        .apply(&user.subject, id, |assessment| {
            assessment.add_option(stage_index, question_index)
        })
        .await?;
    Ok((StatusCode::CREATED, view_response(view)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateOptionRequest {
    pub value: String,
}

/// PUT /api/v1/drafts/{id}/stages/{si}/questions/{qi}/options/{oi}
pub async fn update_option(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path((id, stage_index, question_index, option_index)): Path<(Uuid, usize, usize, usize)>,
    Json(input): Json<UpdateOptionRequest>,
) -> AppResult<impl IntoResponse> {
    let (_, view) = state
        .drafts
        .apply(&user.subject, id, |assessment| {
            assessment.update_option(stage_index, question_index, option_index, input.value)
        })
        .await?;
    Ok(view_response(view))
}

/// DELETE /api/v1/drafts/{id}/stages/{si}/questions/{qi}/options/{oi}
pub async fn remove_option(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path((id, stage_index, question_index, option_index)): Path<(Uuid, usize, usize, usize)>,
) -> AppResult<impl IntoResponse> {
    let (_, view) = state
        .drafts
        .apply(&user.subject, id, |assessment| {
            assessment.remove_option(stage_index, question_index, option_index)
        })
        .await?;
    Ok(view_response(view))
}

// ---------------------------------------------------------------------------
// Conditional logic
// ---------------------------------------------------------------------------

/// Target of a dependency. With both ids omitted the dependency is enabled
/// with the default target (first question of the first stage).
#[derive(Debug, Default, Deserialize)]
pub struct SetDependencyRequest {
    pub stage_id: Option<u32>,
    pub question_id: Option<u32>,
}

/// PUT /api/v1/drafts/{id}/stages/{si}/questions/{qi}/dependency
pub async fn set_dependency(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path((id, stage_index, question_index)): Path<(Uuid, usize, usize)>,
    Json(input): Json<SetDependencyRequest>,
) -> AppResult<impl IntoResponse> {
    let target = match (input.stage_id, input.question_id) {
        (None, None) => None,
        (Some(stage_id), Some(question_id)) => Some((stage_id, question_id)),
        _ => {
            return Err(AppError::BadRequest(
                "stage_id and question_id must be given together".into(),
            ))
        }
    };

    let (_, view) = state
        .drafts
        .apply(&user.subject, id, |assessment| match target {
            Some((stage_id, question_id)) => {
                assessment.set_dependency(stage_index, question_index, stage_id, question_id)
            }
            None => assessment.enable_dependency(stage_index, question_index),
        })
        .await?;
    Ok(view_response(view))
}

/// DELETE /api/v1/drafts/{id}/stages/{si}/questions/{qi}/dependency
pub async fn clear_dependency(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path((id, stage_index, question_index)): Path<(Uuid, usize, usize)>,
) -> AppResult<impl IntoResponse> {
    let (_, view) = state
        .drafts
        .apply(&user.subject, id, |assessment| {
            assessment.clear_dependency(stage_index, question_index)
        })
        .await?;
    Ok(view_response(view))
}

#[derive(Debug, Deserialize)]
pub struct SetDependencyStageRequest {
    pub stage_id: u32,
}

/// PUT /api/v1/drafts/{id}/stages/{si}/questions/{qi}/dependency/stage
///
/// Changing the target stage resets the target question to that stage's
/// first question and clears the accepted values.
pub async fn set_dependency_stage(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path((id, stage_index, question_index)): Path<(Uuid, usize, usize)>,
    Json(input): Json<SetDependencyStageRequest>,
) -> AppResult<impl IntoResponse> {
    let (_, view) = state
        .drafts
        .apply(&user.subject, id, |assessment| {
            assessment.set_dependency_stage(stage_index, question_index, input.stage_id)
        })
        .await?;
    Ok(view_response(view))
}

#[derive(Debug, Deserialize)]
pub struct SetDependencyQuestionRequest {
    pub question_id: u32,
}

/// PUT /api/v1/drafts/{id}/stages/{si}/questions/{qi}/dependency/question
pub async fn set_dependency_question(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path((id, stage_index, question_index)): Path<(Uuid, usize, usize)>,
    Json(input): Json<SetDependencyQuestionRequest>,
) -> AppResult<impl IntoResponse> {
    let (_, view) = state
        .drafts
        .apply(&user.subject, id, |assessment| {
            assessment.set_dependency_question(stage_index, question_index, input.question_id)
        })
        .await?;
    Ok(view_response(view))
}

#[derive(Debug, Deserialize)]
pub struct ToggleValueRequest {
    pub value: String,
    pub include: bool,
}

/// POST /api/v1/drafts/{id}/stages/{si}/questions/{qi}/dependency/values
pub async fn toggle_dependency_value(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path((id, stage_index, question_index)): Path<(Uuid, usize, usize)>,
    Json(input): Json<ToggleValueRequest>,
) -> AppResult<impl IntoResponse> {
    let (_, view) = state
        .drafts
        .apply(&user.subject, id, |assessment| {
            assessment.toggle_show_when_value(
                stage_index,
                question_index,
                &input.value,
                input.include,
            )
        })
        .await?;
    Ok(view_response(view))
}
