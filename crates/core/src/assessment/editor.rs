//! Structural mutations on the stage/question tree.
//!
//! Every operation checks its preconditions before touching the tree, so a
//! rejected call leaves the assessment exactly as it was. Removals finish
//! with [`Assessment::renumber`], which keeps ids dense and re-points (or
//! clears) conditional logic that referenced the old ids.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::model::{
    Assessment, InputType, Question, QuestionInput, SliderLabels, Stage, MIN_OPTIONS,
};
use crate::error::CoreError;

/// A single-field update applied by [`Assessment::update_question`].
///
/// Serialized as `{"field": "<name>", "value": <value>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum QuestionUpdate {
    QuestionText(String),
    InputType(InputType),
    Required(bool),
    FinalQuestion(bool),
    SliderMin(i32),
    SliderMax(i32),
    SliderLabels(SliderLabels),
    Placeholder(Option<String>),
    MaxSelections(Option<u32>),
}

impl QuestionUpdate {
    fn field_name(&self) -> &'static str {
        match self {
            Self::QuestionText(_) => "questionText",
            Self::InputType(_) => "inputType",
            Self::Required(_) => "required",
            Self::FinalQuestion(_) => "finalQuestion",
            Self::SliderMin(_) => "sliderMin",
            Self::SliderMax(_) => "sliderMax",
            Self::SliderLabels(_) => "sliderLabels",
            Self::Placeholder(_) => "placeholder",
            Self::MaxSelections(_) => "maxSelections",
        }
    }
}

// ---------------------------------------------------------------------------
// Index helpers
// ---------------------------------------------------------------------------

impl Assessment {
    pub(crate) fn stage_at(&self, stage_index: usize) -> Result<&Stage, CoreError> {
        self.stages.get(stage_index).ok_or_else(|| {
            CoreError::Structural(format!("Stage index {stage_index} is out of range"))
        })
    }

    pub(crate) fn stage_at_mut(&mut self, stage_index: usize) -> Result<&mut Stage, CoreError> {
        self.stages.get_mut(stage_index).ok_or_else(|| {
            CoreError::Structural(format!("Stage index {stage_index} is out of range"))
        })
    }

    pub(crate) fn question_at(
        &self,
        stage_index: usize,
        question_index: usize,
    ) -> Result<&Question, CoreError> {
        self.stage_at(stage_index)?
            .questions
            .get(question_index)
            .ok_or_else(|| out_of_range_question(stage_index, question_index))
    }

    pub(crate) fn question_at_mut(
        &mut self,
        stage_index: usize,
        question_index: usize,
    ) -> Result<&mut Question, CoreError> {
        self.stage_at_mut(stage_index)?
            .questions
            .get_mut(question_index)
            .ok_or_else(|| out_of_range_question(stage_index, question_index))
    }
}

fn out_of_range_question(stage_index: usize, question_index: usize) -> CoreError {
    CoreError::Structural(format!(
        "Question index {question_index} is out of range in stage {}",
        stage_index + 1
    ))
}

/// 1-based label used in user-facing messages.
pub(crate) fn question_label(stage_index: usize, question_index: usize) -> String {
    format!("Stage {}, Question {}", stage_index + 1, question_index + 1)
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

impl Assessment {
    /// Append a new stage with one default question. Returns its id.
    pub fn add_stage(&mut self) -> u32 {
        let id = self.stages.len() as u32 + 1;
        self.stages.push(Stage::new(id));
        id
    }

    /// Remove the stage at `stage_index` and renumber the tree.
    ///
    /// Conditional logic that pointed into the removed stage is cleared.
    pub fn remove_stage(&mut self, stage_index: usize) -> Result<Stage, CoreError> {
        self.stage_at(stage_index)?;
        if self.stages.len() <= 1 {
            return Err(CoreError::structural(
                "Assessment must have at least one stage",
            ));
        }
        let removed = self.stages.remove(stage_index);
        self.renumber();
        Ok(removed)
    }

    pub fn update_stage_title(
        &mut self,
        stage_index: usize,
        title: impl Into<String>,
    ) -> Result<(), CoreError> {
        self.stage_at_mut(stage_index)?.title = title.into();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

impl Assessment {
    /// Append a default question to a stage. Returns its id.
    pub fn add_question(&mut self, stage_index: usize) -> Result<u32, CoreError> {
        let stage = self.stage_at_mut(stage_index)?;
        let id = stage.questions.len() as u32 + 1;
        stage.questions.push(Question::new(id));
        Ok(id)
    }

    /// Remove a question and renumber its siblings.
    ///
    /// Conditional logic that pointed at the removed question is cleared;
    /// logic pointing at a shifted sibling follows it to its new id.
    pub fn remove_question(
        &mut self,
        stage_index: usize,
        question_index: usize,
    ) -> Result<Question, CoreError> {
        self.question_at(stage_index, question_index)?;
        let stage = self.stage_at_mut(stage_index)?;
        if stage.questions.len() <= 1 {
            return Err(CoreError::structural(
                "Stage must have at least one question",
            ));
        }
        let removed = stage.questions.remove(question_index);
        self.renumber();
        Ok(removed)
    }

    /// Set one field of a question.
    ///
    /// Switching `inputType` replaces all type-specific fields with the new
    /// type's defaults and is rejected while other questions depend on this
    /// one. Setting a field that does not belong to the current input type
    /// is rejected.
    pub fn update_question(
        &mut self,
        stage_index: usize,
        question_index: usize,
        update: QuestionUpdate,
    ) -> Result<(), CoreError> {
        let current_type = self.question_at(stage_index, question_index)?.input_type();

        if let QuestionUpdate::InputType(new_type) = update {
            if new_type == current_type {
                return Ok(());
            }
            self.ensure_options_unlocked(stage_index, question_index)?;
        }

        let field = update.field_name();
        let question = self.question_at_mut(stage_index, question_index)?;
        let not_applicable = || {
            CoreError::Structural(format!(
                "{field} does not apply to {} questions",
                current_type.as_str()
            ))
        };

        match update {
            QuestionUpdate::QuestionText(text) => question.text = text,
            QuestionUpdate::InputType(new_type) => {
                question.input = QuestionInput::default_for(new_type);
            }
            QuestionUpdate::Required(required) => question.required = required,
            QuestionUpdate::FinalQuestion(final_question) => {
                question.final_question = final_question;
            }
            QuestionUpdate::SliderMin(value) => match &mut question.input {
                QuestionInput::Slider { slider_min, .. } => *slider_min = value,
                _ => return Err(not_applicable()),
            },
            QuestionUpdate::SliderMax(value) => match &mut question.input {
                QuestionInput::Slider { slider_max, .. } => *slider_max = value,
                _ => return Err(not_applicable()),
            },
            QuestionUpdate::SliderLabels(labels) => match &mut question.input {
                QuestionInput::Slider { slider_labels, .. } => *slider_labels = labels,
                _ => return Err(not_applicable()),
            },
            QuestionUpdate::Placeholder(value) => match &mut question.input {
                QuestionInput::Text { placeholder } | QuestionInput::Textarea { placeholder } => {
                    *placeholder = value;
                }
                _ => return Err(not_applicable()),
            },
            QuestionUpdate::MaxSelections(value) => match &mut question.input {
                QuestionInput::Multiselect { max_selections, .. } => *max_selections = value,
                _ => return Err(not_applicable()),
            },
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

impl Assessment {
    /// Append an empty option. Returns its index.
    pub fn add_option(
        &mut self,
        stage_index: usize,
        question_index: usize,
    ) -> Result<usize, CoreError> {
        self.ensure_options_unlocked(stage_index, question_index)?;
        let options = self.options_mut(stage_index, question_index)?;
        options.push(String::new());
        Ok(options.len() - 1)
    }

    /// Remove an option, keeping at least [`MIN_OPTIONS`].
    pub fn remove_option(
        &mut self,
        stage_index: usize,
        question_index: usize,
        option_index: usize,
    ) -> Result<String, CoreError> {
        self.ensure_options_unlocked(stage_index, question_index)?;
        let options = self.options_mut(stage_index, question_index)?;
        if option_index >= options.len() {
            return Err(CoreError::Structural(format!(
                "Option index {option_index} is out of range"
            )));
        }
        if options.len() <= MIN_OPTIONS {
            return Err(CoreError::Structural(format!(
                "Radio and multiselect questions must have at least {MIN_OPTIONS} options"
            )));
        }
        Ok(options.remove(option_index))
    }

    pub fn update_option(
        &mut self,
        stage_index: usize,
        question_index: usize,
        option_index: usize,
        value: impl Into<String>,
    ) -> Result<(), CoreError> {
        self.ensure_options_unlocked(stage_index, question_index)?;
        let options = self.options_mut(stage_index, question_index)?;
        let slot = options.get_mut(option_index).ok_or_else(|| {
            CoreError::Structural(format!("Option index {option_index} is out of range"))
        })?;
        *slot = value.into();
        Ok(())
    }

    fn options_mut(
        &mut self,
        stage_index: usize,
        question_index: usize,
    ) -> Result<&mut Vec<String>, CoreError> {
        let question = self.question_at_mut(stage_index, question_index)?;
        let input_type = question.input_type();
        question.input.options_mut().ok_or_else(|| {
            CoreError::Structural(format!(
                "{} questions do not have options",
                input_type.as_str()
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// Renumbering
// ---------------------------------------------------------------------------

impl Assessment {
    /// Bring a tree received from outside (a client or a stored record) to
    /// the shape every mutation expects: at least one stage, at least one
    /// question per stage, dense ids.
    ///
    /// Rejects empty trees and empty stages; otherwise renumbers.
    pub fn normalize(&mut self) -> Result<(), CoreError> {
        if self.stages.is_empty() {
            return Err(CoreError::structural(
                "Assessment must have at least one stage",
            ));
        }
        if let Some(stage_index) = self.stages.iter().position(|s| s.questions.is_empty()) {
            return Err(CoreError::Structural(format!(
                "Stage {} must have at least one question",
                stage_index + 1
            )));
        }
        self.renumber();
        Ok(())
    }

    /// Reassign stage ids to `1..N` and question ids to `1..M` per stage.
    ///
    /// Conditional logic is re-pointed from old ids to the new ids of the
    /// same stage/question; logic whose target no longer exists is cleared.
    /// On an already-dense tree without dangling logic this is a no-op.
    pub fn renumber(&mut self) {
        let mut stage_ids: HashMap<u32, u32> = HashMap::new();
        let mut question_ids: HashMap<(u32, u32), u32> = HashMap::new();

        for (stage_index, stage) in self.stages.iter().enumerate() {
            stage_ids.entry(stage.id).or_insert(stage_index as u32 + 1);
            for (question_index, question) in stage.questions.iter().enumerate() {
                question_ids
                    .entry((stage.id, question.id))
                    .or_insert(question_index as u32 + 1);
            }
        }

        for (stage_index, stage) in self.stages.iter_mut().enumerate() {
            stage.id = stage_index as u32 + 1;
            for (question_index, question) in stage.questions.iter_mut().enumerate() {
                question.id = question_index as u32 + 1;
            }
        }

        for question in self.stages.iter_mut().flat_map(|s| s.questions.iter_mut()) {
            let Some(logic) = question.conditional_logic.as_mut() else {
                continue;
            };
            let old_target = (logic.depends_on_stage_id, logic.depends_on_question_id);
            match (
                stage_ids.get(&old_target.0),
                question_ids.get(&old_target),
            ) {
                (Some(&stage_id), Some(&question_id)) => {
                    logic.depends_on_stage_id = stage_id;
                    logic.depends_on_question_id = question_id;
                }
                _ => question.conditional_logic = None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::model::ConditionalLogic;
    use assert_matches::assert_matches;

    fn assert_dense(assessment: &Assessment) {
        for (si, stage) in assessment.stages.iter().enumerate() {
            assert_eq!(stage.id, si as u32 + 1);
            for (qi, question) in stage.questions.iter().enumerate() {
                assert_eq!(question.id, qi as u32 + 1);
            }
        }
    }

    fn radio(options: &[&str]) -> QuestionInput {
        QuestionInput::Radio {
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    #[test]
    fn add_stage_appends_sequential_ids() {
        let mut assessment = Assessment::new();
        assert_eq!(assessment.add_stage(), 2);
        assert_eq!(assessment.add_stage(), 3);
        let ids: Vec<u32> = assessment.stages.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(assessment.stages[2].questions.len(), 1);
    }

    #[test]
    fn remove_only_stage_fails() {
        let mut assessment = Assessment::new();
        let result = assessment.remove_stage(0);
        assert_matches!(result, Err(CoreError::Structural(_)));
        assert_eq!(assessment.stages.len(), 1);
    }

    #[test]
    fn remove_middle_stage_renumbers_and_clears_dangling_logic() {
        let mut assessment = Assessment::new();
        assessment.stages[0].questions[0].input = radio(&["A", "B"]);
        assessment.add_stage();
        assessment.add_stage();
        assessment.add_stage();
        // Stage 4 depends on stage 3 (which becomes stage 2) and stage 2
        // (which is removed).
        assessment.add_question(3).unwrap();
        assessment.stages[3].questions[0].conditional_logic = Some(ConditionalLogic::new(3, 1));
        assessment.stages[3].questions[1].conditional_logic = Some(ConditionalLogic::new(2, 1));

        assessment.remove_stage(1).unwrap();

        assert_eq!(assessment.stages.len(), 3);
        assert_dense(&assessment);
        let last = &assessment.stages[2];
        assert_eq!(
            last.questions[0].conditional_logic,
            Some(ConditionalLogic::new(2, 1))
        );
        assert_eq!(last.questions[1].conditional_logic, None);
    }

    #[test]
    fn remove_only_question_fails() {
        let mut assessment = Assessment::new();
        assert_matches!(
            assessment.remove_question(0, 0),
            Err(CoreError::Structural(_))
        );
    }

    #[test]
    fn remove_question_renumbers_and_follows_shifted_target() {
        let mut assessment = Assessment::new();
        assessment.add_question(0).unwrap();
        assessment.add_question(0).unwrap();
        assessment.add_stage();
        assessment.add_question(1).unwrap();
        assessment.stages[1].questions[0].conditional_logic = Some(ConditionalLogic::new(1, 3));
        assessment.stages[1].questions[1].conditional_logic = Some(ConditionalLogic::new(1, 1));

        assessment.remove_question(0, 0).unwrap();

        assert_dense(&assessment);
        assert_eq!(assessment.stages[0].questions.len(), 2);
        assert_eq!(
            assessment.stages[1].questions[0].conditional_logic,
            Some(ConditionalLogic::new(1, 2))
        );
        assert_eq!(assessment.stages[1].questions[1].conditional_logic, None);
    }

    #[test]
    fn numbering_stays_dense_across_mixed_operations() {
        let mut assessment = Assessment::new();
        assessment.add_stage();
        assert_dense(&assessment);
        assessment.add_question(1).unwrap();
        assert_dense(&assessment);
        assessment.add_stage();
        assert_dense(&assessment);
        assessment.remove_question(1, 0).unwrap();
        assert_dense(&assessment);
        assessment.remove_stage(0).unwrap();
        assert_dense(&assessment);
        assessment.add_question(0).unwrap();
        assessment.add_question(0).unwrap();
        assessment.remove_question(0, 1).unwrap();
        assert_dense(&assessment);
    }

    #[test]
    fn renumber_is_idempotent() {
        let mut assessment = Assessment::new();
        assessment.add_stage();
        assessment.stages[0].id = 5;
        assessment.stages[1].questions[0].id = 9;
        assessment.stages[1].questions[0].conditional_logic = Some(ConditionalLogic::new(5, 1));

        assessment.renumber();
        let once = assessment.clone();
        assessment.renumber();

        assert_eq!(assessment, once);
        assert_dense(&assessment);
        assert_eq!(
            assessment.stages[1].questions[0].conditional_logic,
            Some(ConditionalLogic::new(1, 1))
        );
    }

    #[test]
    fn normalize_makes_sparse_ids_dense() {
        let mut assessment = Assessment::new();
        assessment.add_stage();
        assessment.stages[1].id = 3;
        assessment.stages[1].questions[0].conditional_logic = Some(ConditionalLogic::new(1, 1));

        assessment.normalize().unwrap();
        assert_eq!(assessment.add_stage(), 3);

        assert_dense(&assessment);
        assert_eq!(
            assessment.stages[1].questions[0].conditional_logic,
            Some(ConditionalLogic::new(1, 1))
        );
    }

    #[test]
    fn normalize_rejects_empty_trees() {
        let mut assessment = Assessment::new();
        assessment.stages.clear();
        assert_matches!(assessment.normalize(), Err(CoreError::Structural(_)));

        let mut assessment = Assessment::new();
        assessment.add_stage();
        assessment.stages[1].questions.clear();
        assert_matches!(
            assessment.normalize(),
            Err(CoreError::Structural(msg)) if msg == "Stage 2 must have at least one question"
        );
    }

    #[test]
    fn renumber_on_dense_tree_is_noop() {
        let mut assessment = Assessment::new();
        assessment.add_stage();
        assessment.add_question(1).unwrap();
        let before = assessment.clone();
        assessment.renumber();
        assert_eq!(assessment, before);
    }

    #[test]
    fn switching_radio_to_slider_sets_slider_defaults() {
        let mut assessment = Assessment::new();
        assessment.stages[0].questions[0].input = radio(&["A", "B"]);

        assessment
            .update_question(0, 0, QuestionUpdate::InputType(InputType::Slider))
            .unwrap();

        let question = &assessment.stages[0].questions[0];
        assert_eq!(question.options(), None);
        assert_eq!(
            question.input,
            QuestionInput::Slider {
                slider_min: 0,
                slider_max: 10,
                slider_labels: SliderLabels::default(),
            }
        );
    }

    #[test]
    fn switching_to_multiselect_resets_options() {
        let mut assessment = Assessment::new();
        assessment.stages[0].questions[0].input = radio(&["A", "B", "C"]);
        assessment
            .update_question(0, 0, QuestionUpdate::InputType(InputType::Multiselect))
            .unwrap();
        assert_eq!(
            assessment.stages[0].questions[0].input,
            QuestionInput::Multiselect {
                options: vec![String::new(), String::new()],
                max_selections: None,
            }
        );
    }

    #[test]
    fn switching_to_same_type_keeps_options() {
        let mut assessment = Assessment::new();
        assessment.stages[0].questions[0].input = radio(&["A", "B", "C"]);
        assessment
            .update_question(0, 0, QuestionUpdate::InputType(InputType::Radio))
            .unwrap();
        assert_eq!(assessment.stages[0].questions[0].input, radio(&["A", "B", "C"]));
    }

    #[test]
    fn field_for_other_input_type_is_rejected() {
        let mut assessment = Assessment::new();
        let result = assessment.update_question(0, 0, QuestionUpdate::SliderMax(20));
        assert_matches!(result, Err(CoreError::Structural(msg)) if msg.contains("sliderMax"));
    }

    #[test]
    fn update_text_and_flags() {
        let mut assessment = Assessment::new();
        assessment
            .update_question(0, 0, QuestionUpdate::QuestionText("Ready?".into()))
            .unwrap();
        assessment
            .update_question(0, 0, QuestionUpdate::Required(false))
            .unwrap();
        assessment
            .update_question(0, 0, QuestionUpdate::FinalQuestion(true))
            .unwrap();
        let question = &assessment.stages[0].questions[0];
        assert_eq!(question.text, "Ready?");
        assert!(!question.required);
        assert!(question.final_question);
    }

    #[test]
    fn remove_option_keeps_minimum() {
        let mut assessment = Assessment::new();
        assessment.stages[0].questions[0].input = radio(&["A", "B", "C"]);
        assert_eq!(assessment.remove_option(0, 0, 1).unwrap(), "B");
        assert_matches!(
            assessment.remove_option(0, 0, 0),
            Err(CoreError::Structural(_))
        );
        assert_eq!(
            assessment.stages[0].questions[0].options().unwrap().len(),
            2
        );
    }

    #[test]
    fn option_ops_on_text_question_fail() {
        let mut assessment = Assessment::new();
        assessment
            .update_question(0, 0, QuestionUpdate::InputType(InputType::Text))
            .unwrap();
        assert_matches!(assessment.add_option(0, 0), Err(CoreError::Structural(_)));
    }

    #[test]
    fn add_and_update_option() {
        let mut assessment = Assessment::new();
        let index = assessment.add_option(0, 0).unwrap();
        assert_eq!(index, 2);
        assessment.update_option(0, 0, index, "Maybe").unwrap();
        assert_eq!(
            assessment.stages[0].questions[0].options().unwrap()[2],
            "Maybe"
        );
    }

    #[test]
    fn out_of_range_indices_are_structural_errors() {
        let mut assessment = Assessment::new();
        assert_matches!(assessment.add_question(4), Err(CoreError::Structural(_)));
        assert_matches!(
            assessment.update_option(0, 0, 9, "x"),
            Err(CoreError::Structural(_))
        );
        assert_matches!(assessment.remove_stage(3), Err(CoreError::Structural(_)));
    }

    #[test]
    fn update_question_payload_shape() {
        let update: QuestionUpdate =
            serde_json::from_value(serde_json::json!({"field": "inputType", "value": "slider"}))
                .unwrap();
        assert_eq!(update, QuestionUpdate::InputType(InputType::Slider));
    }
}
