//! Assessment editing model.
//!
//! An [`Assessment`](model::Assessment) is a tree of stages and questions
//! edited by one session at a time:
//!
//! - [`editor`] -- structural mutations with dense renumbering.
//! - [`dependency`] -- backward-only conditional logic and option locking.
//! - [`validation`] -- whole-tree checks run before submission.

pub mod cta;
pub mod dependency;
pub mod editor;
pub mod model;
pub mod validation;

pub use model::{
    Assessment, AssessmentCta, AssessmentRecord, ConditionalLogic, InputType, Question,
    QuestionInput, SliderLabels, Stage,
};
