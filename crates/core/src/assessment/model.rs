//! Assessment document types.
//!
//! The serialized shape is the camelCase document accepted by the backend
//! API. The question's `inputType` is a closed tagged variant: each variant
//! carries only the fields that are meaningful for it.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Default estimated completion time for a new assessment, in minutes.
pub const DEFAULT_ESTIMATED_TIME: u32 = 15;

/// Default slider bounds applied when a question switches to a slider.
pub const DEFAULT_SLIDER_MIN: i32 = 0;
pub const DEFAULT_SLIDER_MAX: i32 = 10;

/// Minimum number of options for radio and multiselect questions.
pub const MIN_OPTIONS: usize = 2;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Discriminant of [`QuestionInput`], used when switching a question's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Radio,
    Slider,
    Text,
    Textarea,
    Multiselect,
}

impl InputType {
    /// Stable string representation matching the wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Radio => "radio",
            Self::Slider => "slider",
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Multiselect => "multiselect",
        }
    }

    /// Whether questions of this type carry a list of options.
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Radio | Self::Multiselect)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderLabels {
    #[serde(default)]
    pub min_label: String,
    #[serde(default)]
    pub max_label: String,
}

/// Type-specific part of a question, tagged by `inputType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "inputType", rename_all = "lowercase")]
pub enum QuestionInput {
    Radio {
        #[serde(default)]
        options: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Slider {
        #[serde(default = "default_slider_min")]
        slider_min: i32,
        #[serde(default = "default_slider_max")]
        slider_max: i32,
        #[serde(default)]
        slider_labels: SliderLabels,
    },
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Textarea {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Multiselect {
        #[serde(default)]
        options: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_selections: Option<u32>,
    },
}

fn default_slider_min() -> i32 {
    DEFAULT_SLIDER_MIN
}

fn default_slider_max() -> i32 {
    DEFAULT_SLIDER_MAX
}

impl QuestionInput {
    /// The freshly-reset input for a given type: two empty options for
    /// radio/multiselect, default bounds and empty labels for sliders.
    pub fn default_for(input_type: InputType) -> Self {
        match input_type {
            InputType::Radio => Self::Radio {
                options: empty_options(),
            },
            InputType::Slider => Self::Slider {
                slider_min: DEFAULT_SLIDER_MIN,
                slider_max: DEFAULT_SLIDER_MAX,
                slider_labels: SliderLabels::default(),
            },
            InputType::Text => Self::Text { placeholder: None },
            InputType::Textarea => Self::Textarea { placeholder: None },
            InputType::Multiselect => Self::Multiselect {
                options: empty_options(),
                max_selections: None,
            },
        }
    }

    pub fn input_type(&self) -> InputType {
        match self {
            Self::Radio { .. } => InputType::Radio,
            Self::Slider { .. } => InputType::Slider,
            Self::Text { .. } => InputType::Text,
            Self::Textarea { .. } => InputType::Textarea,
            Self::Multiselect { .. } => InputType::Multiselect,
        }
    }

    /// Options of a radio or multiselect question; `None` for other types.
    pub fn options(&self) -> Option<&[String]> {
        match self {
            Self::Radio { options } | Self::Multiselect { options, .. } => Some(options),
            _ => None,
        }
    }

    pub fn options_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            Self::Radio { options } | Self::Multiselect { options, .. } => Some(options),
            _ => None,
        }
    }
}

fn empty_options() -> Vec<String> {
    vec![String::new(); MIN_OPTIONS]
}

// ---------------------------------------------------------------------------
// Tree entities
// ---------------------------------------------------------------------------

/// Makes a question visible only when an earlier question was answered with
/// one of `show_when_value_in`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalLogic {
    pub depends_on_stage_id: u32,
    pub depends_on_question_id: u32,
    #[serde(default)]
    pub show_when_value_in: Vec<String>,
}

impl ConditionalLogic {
    pub fn new(stage_id: u32, question_id: u32) -> Self {
        Self {
            depends_on_stage_id: stage_id,
            depends_on_question_id: question_id,
            show_when_value_in: Vec::new(),
        }
    }

    pub fn targets(&self, stage_id: u32, question_id: u32) -> bool {
        self.depends_on_stage_id == stage_id && self.depends_on_question_id == question_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    #[serde(rename = "questionText", default)]
    pub text: String,
    #[serde(flatten)]
    pub input: QuestionInput,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub final_question: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_logic: Option<ConditionalLogic>,
}

fn default_required() -> bool {
    true
}

impl Question {
    /// A blank required radio question with two empty options.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            text: String::new(),
            input: QuestionInput::default_for(InputType::Radio),
            required: true,
            final_question: false,
            conditional_logic: None,
        }
    }

    pub fn input_type(&self) -> InputType {
        self.input.input_type()
    }

    pub fn options(&self) -> Option<&[String]> {
        self.input.options()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Stage {
    /// An untitled stage holding one default question.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            title: String::new(),
            questions: vec![Question::new(1)],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentCta {
    #[serde(default)]
    pub button_text: String,
    #[serde(default)]
    pub web_route: String,
    #[serde(default)]
    pub native_route: String,
}

/// The aggregate root edited by one session and submitted to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_estimated_time")]
    pub estimated_time: u32,
    #[serde(default)]
    pub stages: Vec<Stage>,
    #[serde(rename = "assessmentCTA", default)]
    pub assessment_cta: AssessmentCta,
}

fn default_estimated_time() -> u32 {
    DEFAULT_ESTIMATED_TIME
}

impl Assessment {
    /// A new, empty assessment: one untitled stage with one default question.
    pub fn new() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            estimated_time: DEFAULT_ESTIMATED_TIME,
            stages: vec![Stage::new(1)],
            assessment_cta: AssessmentCta::default(),
        }
    }
}

impl Default for Assessment {
    fn default() -> Self {
        Self::new()
    }
}

/// A persisted assessment as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: DbId,
    #[serde(flatten)]
    pub assessment: Assessment,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_assessment_has_one_default_stage() {
        let assessment = Assessment::new();
        assert_eq!(assessment.stages.len(), 1);
        assert_eq!(assessment.stages[0].id, 1);
        let question = &assessment.stages[0].questions[0];
        assert_eq!(question.id, 1);
        assert_eq!(question.input_type(), InputType::Radio);
        assert_eq!(question.options(), Some(&["".to_string(), "".to_string()][..]));
        assert!(question.required);
    }

    #[test]
    fn serializes_flat_wire_shape() {
        let mut question = Question::new(1);
        question.text = "How are you?".into();
        question.input = QuestionInput::Radio {
            options: vec!["Good".into(), "Bad".into()],
        };
        let value = serde_json::to_value(&question).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 1,
                "questionText": "How are you?",
                "inputType": "radio",
                "options": ["Good", "Bad"],
                "required": true,
            })
        );
    }

    #[test]
    fn slider_serializes_camel_case_fields() {
        let mut question = Question::new(2);
        question.input = QuestionInput::default_for(InputType::Slider);
        let value = serde_json::to_value(&question).unwrap();
        assert_eq!(value["inputType"], "slider");
        assert_eq!(value["sliderMin"], 0);
        assert_eq!(value["sliderMax"], 10);
        assert_eq!(value["sliderLabels"], json!({"minLabel": "", "maxLabel": ""}));
        assert!(value.get("options").is_none());
    }

    #[test]
    fn deserializes_backend_record_without_cta() {
        let record: AssessmentRecord = serde_json::from_value(json!({
            "id": 7,
            "title": "Discovery Assessment",
            "description": "Understand your situation",
            "estimatedTime": 15,
            "stages": [{
                "id": 1,
                "title": "Family Context",
                "questions": [{
                    "id": 1,
                    "questionText": "Do you have any children?",
                    "inputType": "multiselect",
                    "options": ["Yes", "No"],
                    "maxSelections": 1,
                    "required": false,
                    "conditionalLogic": {
                        "dependsOnStageId": 1,
                        "dependsOnQuestionId": 1,
                        "showWhenValueIn": ["Yes"]
                    }
                }]
            }]
        }))
        .unwrap();

        assert_eq!(record.id, 7);
        assert_eq!(record.assessment.assessment_cta, AssessmentCta::default());
        let question = &record.assessment.stages[0].questions[0];
        assert_eq!(
            question.input,
            QuestionInput::Multiselect {
                options: vec!["Yes".into(), "No".into()],
                max_selections: Some(1),
            }
        );
        assert!(!question.required);
        assert_eq!(
            question.conditional_logic.as_ref().unwrap().show_when_value_in,
            vec!["Yes".to_string()]
        );
    }

    #[test]
    fn cta_uses_uppercase_key() {
        let value = serde_json::to_value(Assessment::new()).unwrap();
        assert!(value.get("assessmentCTA").is_some());
        assert_eq!(value["estimatedTime"], 15);
    }
}
