//! Life hacks: short recurring practices grouped by category.
//!
//! [`LifeHack`] is the record as stored by the backend. [`LifeHackInput`] is
//! the editable form; it is validated with `validator` and converted to the
//! backend payload, where the default time is sent as `HH:00:00`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CoreError;
use crate::types::DbId;

/// Group key for records without a category.
pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifeHackCategory {
    Faith,
    Fitness,
    Family,
    #[serde(rename = "marriage/significant-other")]
    MarriageSignificantOther,
    Career,
    Mental,
    Community,
}

impl LifeHackCategory {
    pub const ALL: [Self; 7] = [
        Self::Faith,
        Self::Fitness,
        Self::Family,
        Self::MarriageSignificantOther,
        Self::Career,
        Self::Mental,
        Self::Community,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Faith => "faith",
            Self::Fitness => "fitness",
            Self::Family => "family",
            Self::MarriageSignificantOther => "marriage/significant-other",
            Self::Career => "career",
            Self::Mental => "mental",
            Self::Community => "community",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    #[default]
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// A life hack as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeHack {
    pub id: DbId,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<LifeHackCategory>,
    #[serde(default)]
    pub is_daily: bool,
    #[serde(default)]
    pub adjustable_time: bool,
    #[serde(default)]
    pub adjustable_day: bool,
    #[serde(default)]
    pub default_day: Option<Day>,
    /// Wall-clock time, `HH:MM:SS`.
    #[serde(default)]
    pub default_time: Option<String>,
    #[serde(default)]
    pub guided_prompts: Vec<String>,
}

/// Editable life hack as submitted by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LifeHackInput {
    #[serde(rename = "type")]
    #[validate(custom(function = "not_blank", message = "Type is required"))]
    pub kind: String,
    #[validate(custom(function = "not_blank", message = "Description is required"))]
    pub description: String,
    pub category: LifeHackCategory,
    #[serde(default)]
    pub is_daily: bool,
    #[serde(default)]
    pub adjustable_time: bool,
    #[serde(default)]
    pub adjustable_day: bool,
    #[serde(default)]
    pub default_day: Day,
    /// Hour of day, 0-23.
    #[serde(default)]
    #[validate(range(max = 23, message = "Default time must be an hour between 0 and 23"))]
    pub default_hour: u8,
    #[serde(default)]
    #[validate(custom(
        function = "prompts_not_blank",
        message = "Please fill in all guided prompts or remove empty ones"
    ))]
    pub guided_prompts: Vec<String>,
}

/// Body sent to `POST /v1/life-hacks/` and `PATCH /v1/life-hacks/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeHackPayload {
    pub category: LifeHackCategory,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub adjustable_time: bool,
    pub adjustable_day: bool,
    pub is_daily: bool,
    pub default_day: Day,
    pub default_time: String,
    pub guided_prompts: Vec<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn prompts_not_blank(prompts: &[String]) -> Result<(), ValidationError> {
    if prompts.iter().any(|prompt| prompt.trim().is_empty()) {
        return Err(ValidationError::new("blank_prompt"));
    }
    Ok(())
}

/// Report order of field errors; `ValidationErrors` is unordered.
const FIELD_ORDER: [&str; 4] = ["kind", "description", "defaulthour", "guidedprompts"];

fn field_rank(field: &str) -> usize {
    // Keys may surface in serde's spelling (`type`, `guidedPrompts`).
    let field = match field {
        "type" => "kind".to_string(),
        other => other.replace('_', "").to_ascii_lowercase(),
    };
    FIELD_ORDER
        .iter()
        .position(|name| *name == field)
        .unwrap_or(FIELD_ORDER.len())
}

fn error_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| field_rank(field));
    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(|err| match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("{field} is invalid"),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

impl LifeHackInput {
    /// Run field validation, collecting every failure.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|errors| CoreError::Validation(error_messages(&errors)))
    }

    /// Validate and build the backend payload.
    pub fn to_payload(&self) -> Result<LifeHackPayload, CoreError> {
        self.check()?;
        Ok(LifeHackPayload {
            category: self.category,
            kind: self.kind.trim().to_string(),
            description: self.description.trim().to_string(),
            adjustable_time: self.adjustable_time,
            adjustable_day: self.adjustable_day,
            is_daily: self.is_daily,
            default_day: self.default_day,
            default_time: format!("{:02}:00:00", self.default_hour),
            guided_prompts: self.guided_prompts.clone(),
        })
    }

    /// Editable form of a stored record. Missing fields fall back to the
    /// form defaults; the hour is taken from the leading `HH` of the time.
    pub fn from_record(record: &LifeHack) -> Self {
        let default_hour = record
            .default_time
            .as_deref()
            .and_then(|time| time.split(':').next())
            .and_then(|hour| hour.trim().parse::<u8>().ok())
            .unwrap_or(0);
        Self {
            kind: record.kind.clone(),
            description: record.description.clone(),
            category: record.category.unwrap_or(LifeHackCategory::Faith),
            is_daily: record.is_daily,
            adjustable_time: record.adjustable_time,
            adjustable_day: record.adjustable_day,
            default_day: record.default_day.unwrap_or_default(),
            default_hour,
            guided_prompts: record.guided_prompts.clone(),
        }
    }
}

/// Group records by category key, preserving backend order within a group.
/// Records without a category land under [`UNCATEGORIZED`].
pub fn group_by_category(hacks: Vec<LifeHack>) -> BTreeMap<&'static str, Vec<LifeHack>> {
    let mut groups: BTreeMap<&'static str, Vec<LifeHack>> = BTreeMap::new();
    for hack in hacks {
        let key = hack.category.map_or(UNCATEGORIZED, |c| c.as_str());
        groups.entry(key).or_default().push(hack);
    }
    groups
}
