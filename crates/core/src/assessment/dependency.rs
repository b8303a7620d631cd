//! Conditional-logic resolution.
//!
//! A question may only depend on a question in a strictly earlier stage.
//! While anything depends on a question, that question's options are
//! frozen: `showWhenValueIn` stores option values by content, so editing or
//! removing an option would silently invalidate it.
//!
//! "Is this depended upon" is answered by scanning the tree; trees are small
//! and the scan always reflects the latest mutation.

use std::collections::BTreeSet;

use serde::Serialize;

use super::editor::question_label;
use super::model::{Assessment, ConditionalLogic, Question};
use crate::error::CoreError;

/// A question that a later question may depend on.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyTarget<'a> {
    pub stage_id: u32,
    pub stage_title: &'a str,
    pub question: &'a Question,
}

/// Address of a question by its ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct QuestionRef {
    pub stage_id: u32,
    pub question_id: u32,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

impl Assessment {
    /// Questions that a question in `stage_index` may depend on: every
    /// question of every earlier stage, in display order.
    pub fn eligible_dependency_targets(
        &self,
        stage_index: usize,
    ) -> impl Iterator<Item = DependencyTarget<'_>> + '_ {
        self.stages.iter().take(stage_index).flat_map(|stage| {
            stage.questions.iter().map(move |question| DependencyTarget {
                stage_id: stage.id,
                stage_title: &stage.title,
                question,
            })
        })
    }

    /// Questions whose conditional logic targets the given question.
    pub fn dependents_of(
        &self,
        stage_id: u32,
        question_id: u32,
    ) -> impl Iterator<Item = QuestionRef> + '_ {
        self.stages.iter().flat_map(move |stage| {
            stage
                .questions
                .iter()
                .filter(move |question| {
                    question
                        .conditional_logic
                        .as_ref()
                        .is_some_and(|logic| logic.targets(stage_id, question_id))
                })
                .map(move |question| QuestionRef {
                    stage_id: stage.id,
                    question_id: question.id,
                })
        })
    }

    pub fn is_depended_upon(&self, stage_id: u32, question_id: u32) -> bool {
        self.dependents_of(stage_id, question_id).next().is_some()
    }

    /// Every question currently targeted by some conditional logic.
    /// Dangling references lock nothing.
    pub fn locked_questions(&self) -> BTreeSet<QuestionRef> {
        self.stages
            .iter()
            .flat_map(|stage| stage.questions.iter())
            .filter_map(|question| question.conditional_logic.as_ref())
            .filter(|logic| self.resolve_dependency_target(logic).is_some())
            .map(|logic| QuestionRef {
                stage_id: logic.depends_on_stage_id,
                question_id: logic.depends_on_question_id,
            })
            .collect()
    }

    /// The question a piece of logic points at, or `None` when the
    /// reference is dangling. Dangling logic behaves as no dependency.
    pub fn resolve_dependency_target(&self, logic: &ConditionalLogic) -> Option<&Question> {
        self.stages
            .iter()
            .find(|stage| stage.id == logic.depends_on_stage_id)?
            .questions
            .iter()
            .find(|question| question.id == logic.depends_on_question_id)
    }

    fn stage_index_of(&self, stage_id: u32) -> Option<usize> {
        self.stages.iter().position(|stage| stage.id == stage_id)
    }

    /// Reject option edits on a question that other questions depend on.
    pub(crate) fn ensure_options_unlocked(
        &self,
        stage_index: usize,
        question_index: usize,
    ) -> Result<(), CoreError> {
        let stage_id = self.stage_at(stage_index)?.id;
        let question_id = self.question_at(stage_index, question_index)?.id;
        if self.is_depended_upon(stage_id, question_id) {
            return Err(CoreError::Structural(format!(
                "{} options are locked because other questions depend on it",
                question_label(stage_index, question_index)
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

impl Assessment {
    /// Turn on conditional logic with the default target: the first
    /// question of the first stage.
    pub fn enable_dependency(
        &mut self,
        stage_index: usize,
        question_index: usize,
    ) -> Result<(), CoreError> {
        let (stage_id, question_id) = {
            let first = self.stage_at(0)?;
            let question_id = first.questions.first().map_or(1, |q| q.id);
            (first.id, question_id)
        };
        self.set_dependency(stage_index, question_index, stage_id, question_id)
    }

    /// Point a question's visibility at an earlier question, resetting the
    /// accepted values.
    pub fn set_dependency(
        &mut self,
        stage_index: usize,
        question_index: usize,
        target_stage_id: u32,
        target_question_id: u32,
    ) -> Result<(), CoreError> {
        self.check_target_stage(stage_index, question_index, target_stage_id)?;
        let target_exists = self
            .resolve_dependency_target(&ConditionalLogic::new(target_stage_id, target_question_id))
            .is_some();
        if !target_exists {
            return Err(CoreError::Structural(format!(
                "Stage {target_stage_id} has no question {target_question_id}"
            )));
        }
        self.question_at_mut(stage_index, question_index)?
            .conditional_logic = Some(ConditionalLogic::new(target_stage_id, target_question_id));
        Ok(())
    }

    /// Change the target stage. The target question resets to that stage's
    /// first question and the accepted values are cleared.
    pub fn set_dependency_stage(
        &mut self,
        stage_index: usize,
        question_index: usize,
        target_stage_id: u32,
    ) -> Result<(), CoreError> {
        self.check_target_stage(stage_index, question_index, target_stage_id)?;
        let first_question_id = self
            .stages
            .iter()
            .find(|stage| stage.id == target_stage_id)
            .and_then(|stage| stage.questions.first())
            .map(|question| question.id)
            .ok_or_else(|| {
                CoreError::Structural(format!("Stage {target_stage_id} has no questions"))
            })?;
        self.set_dependency(stage_index, question_index, target_stage_id, first_question_id)
    }

    /// Change the target question within the current target stage, clearing
    /// the accepted values.
    pub fn set_dependency_question(
        &mut self,
        stage_index: usize,
        question_index: usize,
        target_question_id: u32,
    ) -> Result<(), CoreError> {
        let target_stage_id = self
            .question_at(stage_index, question_index)?
            .conditional_logic
            .as_ref()
            .map(|logic| logic.depends_on_stage_id)
            .ok_or_else(|| no_logic(stage_index, question_index))?;
        self.set_dependency(stage_index, question_index, target_stage_id, target_question_id)
    }

    /// Add (`include = true`) or remove a value from `showWhenValueIn`.
    ///
    /// The value must be one of the target question's current options.
    pub fn toggle_show_when_value(
        &mut self,
        stage_index: usize,
        question_index: usize,
        value: &str,
        include: bool,
    ) -> Result<(), CoreError> {
        let logic = self
            .question_at(stage_index, question_index)?
            .conditional_logic
            .as_ref()
            .ok_or_else(|| no_logic(stage_index, question_index))?;
        let target = self.resolve_dependency_target(logic).ok_or_else(|| {
            CoreError::validation(format!(
                "{} depends on a question that no longer exists",
                question_label(stage_index, question_index)
            ))
        })?;
        let is_option = target
            .options()
            .is_some_and(|options| options.iter().any(|option| option == value));
        if !is_option {
            return Err(CoreError::validation(format!(
                "'{value}' is not an option of the question this depends on"
            )));
        }

        let values = &mut self
            .question_at_mut(stage_index, question_index)?
            .conditional_logic
            .as_mut()
            .ok_or_else(|| no_logic(stage_index, question_index))?
            .show_when_value_in;
        if include {
            if !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
        } else {
            values.retain(|v| v != value);
        }
        Ok(())
    }

    /// Remove a question's conditional logic. Returns the removed logic.
    pub fn clear_dependency(
        &mut self,
        stage_index: usize,
        question_index: usize,
    ) -> Result<Option<ConditionalLogic>, CoreError> {
        Ok(self
            .question_at_mut(stage_index, question_index)?
            .conditional_logic
            .take())
    }

    /// Enforce that `target_stage_id` names a stage strictly before the
    /// dependent question's stage.
    fn check_target_stage(
        &self,
        stage_index: usize,
        question_index: usize,
        target_stage_id: u32,
    ) -> Result<(), CoreError> {
        self.question_at(stage_index, question_index)?;
        let label = question_label(stage_index, question_index);
        let target_index = self.stage_index_of(target_stage_id).ok_or_else(|| {
            CoreError::Structural(format!("Stage {target_stage_id} does not exist"))
        })?;
        if target_index >= stage_index {
            return Err(CoreError::Structural(format!(
                "{label} can only depend on questions in earlier stages"
            )));
        }
        Ok(())
    }
}

fn no_logic(stage_index: usize, question_index: usize) -> CoreError {
    CoreError::Structural(format!(
        "{} has no conditional logic",
        question_label(stage_index, question_index)
    ))
}
