pub mod assessments;
pub mod drafts;
pub mod life_hacks;
