//! Profile aggregate: the record collected by the wizard, its field-level
//! validators, and the full-schema parser used at submission.

pub mod model;
pub mod schema;

pub use model::{
    EducationEntry, ExperienceEntry, LanguageEntry, ProfileData, Proficiency, SkillEntry,
    SkillLevel,
};
pub use schema::{
    Field, FieldErrors, parse_fields, parse_profile, validate_field, validate_profile,
};
