//! Whole-tree validation run before an assessment is submitted.
//!
//! Rules never short-circuit: every violation is collected, in evaluation
//! order, so the caller can show all problems at once.

use serde::{Deserialize, Serialize};

use super::cta::{is_valid_native_route, is_valid_web_route, NATIVE_ROUTES, WEB_ROUTES};
use super::editor::question_label;
use super::model::{Assessment, Question, QuestionInput, Stage, MIN_OPTIONS};
use crate::error::CoreError;

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Path of the offending field, e.g. `stages[0].questions[1].options`.
    pub field: String,
    pub message: String,
}

/// Aggregated result of validating one assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.message.clone()).collect()
    }
}

#[derive(Default)]
struct Collector {
    violations: Vec<Violation>,
}

impl Collector {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation {
            field: field.into(),
            message: message.into(),
        });
    }

    fn finish(self) -> ValidationReport {
        ValidationReport {
            is_valid: self.violations.is_empty(),
            violations: self.violations,
        }
    }
}

/// Evaluate every rule against the assessment.
pub fn validate_assessment(assessment: &Assessment) -> ValidationReport {
    let mut out = Collector::default();

    validate_header(assessment, &mut out);
    for (stage_index, stage) in assessment.stages.iter().enumerate() {
        validate_stage(stage_index, stage, &mut out);
    }
    for (stage_index, stage) in assessment.stages.iter().enumerate() {
        for (question_index, question) in stage.questions.iter().enumerate() {
            validate_question(assessment, stage_index, question_index, question, &mut out);
        }
    }

    out.finish()
}

fn validate_header(assessment: &Assessment, out: &mut Collector) {
    if is_blank(&assessment.title) {
        out.push("title", "Assessment title is required");
    }
    if is_blank(&assessment.description) {
        out.push("description", "Assessment description is required");
    }
    if assessment.estimated_time == 0 {
        out.push(
            "estimatedTime",
            "Estimated time must be at least one minute",
        );
    }

    let cta = &assessment.assessment_cta;
    if is_blank(&cta.button_text) {
        out.push("assessmentCTA.buttonText", "CTA button text is required");
    }
    if is_blank(&cta.web_route) {
        out.push("assessmentCTA.webRoute", "CTA web route is required");
    } else if !is_valid_web_route(&cta.web_route) {
        out.push(
            "assessmentCTA.webRoute",
            format!(
                "CTA web route '{}' must be one of: {}",
                cta.web_route,
                WEB_ROUTES.join(", ")
            ),
        );
    }
    if is_blank(&cta.native_route) {
        out.push("assessmentCTA.nativeRoute", "CTA native route is required");
    } else if !is_valid_native_route(&cta.native_route) {
        out.push(
            "assessmentCTA.nativeRoute",
            format!(
                "CTA native route '{}' must be one of: {}",
                cta.native_route,
                NATIVE_ROUTES.join(", ")
            ),
        );
    }

    if assessment.stages.is_empty() {
        out.push("stages", "Assessment must have at least one stage");
    }
}

fn validate_stage(stage_index: usize, stage: &Stage, out: &mut Collector) {
    if is_blank(&stage.title) {
        out.push(
            format!("stages[{stage_index}].title"),
            format!("Stage {} must have a title", stage_index + 1),
        );
    }
    if stage.questions.is_empty() {
        out.push(
            format!("stages[{stage_index}].questions"),
            format!("Stage {} must have at least one question", stage_index + 1),
        );
    }
}

fn validate_question(
    assessment: &Assessment,
    stage_index: usize,
    question_index: usize,
    question: &Question,
    out: &mut Collector,
) {
    let path = format!("stages[{stage_index}].questions[{question_index}]");
    let label = question_label(stage_index, question_index);

    if is_blank(&question.text) {
        out.push(
            format!("{path}.questionText"),
            format!("{label} must have question text"),
        );
    }

    if let Some(options) = question.options() {
        if options.len() < MIN_OPTIONS {
            out.push(
                format!("{path}.options"),
                format!("{label} must have at least {MIN_OPTIONS} options"),
            );
        } else if options.iter().any(|option| is_blank(option)) {
            out.push(
                format!("{path}.options"),
                format!("{label} must have valid options"),
            );
        }
    }

    match &question.input {
        QuestionInput::Slider {
            slider_min,
            slider_max,
            ..
        } if slider_min >= slider_max => {
            out.push(
                format!("{path}.sliderMax"),
                format!("{label} slider maximum must be greater than its minimum"),
            );
        }
        QuestionInput::Multiselect {
            options,
            max_selections: Some(max),
        } if *max == 0 || *max as usize > options.len() => {
            out.push(
                format!("{path}.maxSelections"),
                format!(
                    "{label} max selections must be between 1 and {}",
                    options.len()
                ),
            );
        }
        _ => {}
    }

    if let Some(logic) = &question.conditional_logic {
        // Dangling references act as no dependency.
        let Some(target) = assessment.resolve_dependency_target(logic) else {
            return;
        };
        let target_index = assessment
            .stages
            .iter()
            .position(|stage| stage.id == logic.depends_on_stage_id);
        if target_index.map_or(true, |index| index >= stage_index) {
            out.push(
                format!("{path}.conditionalLogic"),
                format!("{label} can only depend on questions in earlier stages"),
            );
        }
        let options = target.options().unwrap_or_default();
        let unknown: Vec<&str> = logic
            .show_when_value_in
            .iter()
            .filter(|value| !options.contains(*value))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            out.push(
                format!("{path}.conditionalLogic.showWhenValueIn"),
                format!(
                    "{label} shows on values that are not options of its target: {}",
                    unknown.join(", ")
                ),
            );
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl Assessment {
    /// Validate the whole tree, failing with every violation message.
    pub fn validate(&self) -> Result<(), CoreError> {
        let report = validate_assessment(self);
        if report.is_valid {
            Ok(())
        } else {
            Err(CoreError::Validation(report.messages()))
        }
    }

    /// Renumber, then validate. Run this immediately before handing the
    /// document to the backend.
    pub fn prepare_for_submission(&mut self) -> Result<(), CoreError> {
        self.renumber();
        self.validate()
    }
}
