//! Typed per-step update payloads.
//!
//! A [`StepUpdate`] can only carry fields its step governs, so merging one
//! step's edits cannot reach another step's data. Every field is optional:
//! absent means "leave untouched".

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::profile::{
    EducationEntry, ExperienceEntry, Field, FieldErrors, LanguageEntry, ProfileData, SkillEntry,
    parse_fields,
};

use super::state::{STEP_ORDER, WizardStep};
use super::steps::schema_for;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// An empty string clears the link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsLanguagesUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<SkillEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<LanguageEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEducationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiences: Option<Vec<ExperienceEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<EducationEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterestsHobbiesUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hobbies: Option<Vec<String>>,
}

/// A partial update scoped to one step, tagged by step id on the wire:
/// `{"step": "personal", "firstName": "Jane"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepUpdate {
    Personal(PersonalUpdate),
    SkillsLanguages(SkillsLanguagesUpdate),
    WorkExperience(ExperienceEducationUpdate),
    InterestsHobbies(InterestsHobbiesUpdate),
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *target = v;
    }
}

fn set_link(target: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value {
        *target = if v.is_empty() { None } else { Some(v) };
    }
}

/// Empty end dates mean "present".
fn normalize_end_date(end_date: &mut Option<String>) {
    if end_date.as_deref().is_some_and(str::is_empty) {
        *end_date = None;
    }
}

/// `value` when the payload named `field`.
fn named<T>(present: &[Field], field: Field, value: T) -> Option<T> {
    present.contains(&field).then_some(value)
}

/// Decode a raw step payload, reporting every problem by field path
/// (`step`, `skills.0.level`, `experiences.1.company`).
///
/// Only the fields the tagged step governs are read; anything else in the
/// object is ignored. A link sent as `""` comes back as `Some("")` so that
/// applying the update clears it.
pub fn parse_step_update(value: &Value) -> Result<StepUpdate, FieldErrors> {
    let mut errors = FieldErrors::new();
    let Value::Object(obj) = value else {
        errors.add("", "Expected object");
        return Err(errors);
    };

    let step = match obj.get("step") {
        None | Some(Value::Null) => {
            errors.add("step", "Required");
            return Err(errors);
        }
        Some(Value::String(id)) => WizardStep::from_id(id),
        Some(_) => None,
    };
    let Some(step) = step else {
        let ids: Vec<&str> = STEP_ORDER.iter().map(|s| s.id()).collect();
        errors.add(
            "step",
            format!("Invalid option: expected one of {}", ids.join("|")),
        );
        return Err(errors);
    };

    let (data, present) = parse_fields(obj, schema_for(step).fields)?;
    let p = present.as_slice();
    Ok(match step {
        WizardStep::Personal => StepUpdate::Personal(PersonalUpdate {
            first_name: named(p, Field::FirstName, data.first_name),
            last_name: named(p, Field::LastName, data.last_name),
            email: named(p, Field::Email, data.email),
            phone: named(p, Field::Phone, data.phone),
            street: named(p, Field::Street, data.street),
            city: named(p, Field::City, data.city),
            state: named(p, Field::State, data.state),
            postal_code: named(p, Field::PostalCode, data.postal_code),
            country: named(p, Field::Country, data.country),
            website: named(p, Field::Website, data.website.unwrap_or_default()),
            facebook: named(p, Field::Facebook, data.facebook.unwrap_or_default()),
            instagram: named(p, Field::Instagram, data.instagram.unwrap_or_default()),
            linkedin: named(p, Field::Linkedin, data.linkedin.unwrap_or_default()),
        }),
        WizardStep::SkillsLanguages => StepUpdate::SkillsLanguages(SkillsLanguagesUpdate {
            skills: named(p, Field::Skills, data.skills),
            languages: named(p, Field::Languages, data.languages),
        }),
        WizardStep::WorkExperience => StepUpdate::WorkExperience(ExperienceEducationUpdate {
            experiences: named(p, Field::Experiences, data.experiences),
            education: named(p, Field::Education, data.education),
        }),
        WizardStep::InterestsHobbies => StepUpdate::InterestsHobbies(InterestsHobbiesUpdate {
            interests: named(p, Field::Interests, data.interests),
            hobbies: named(p, Field::Hobbies, data.hobbies),
        }),
    })
}

impl StepUpdate {
    /// The step this update belongs to.
    pub fn step(&self) -> WizardStep {
        match self {
            Self::Personal(_) => WizardStep::Personal,
            Self::SkillsLanguages(_) => WizardStep::SkillsLanguages,
            Self::WorkExperience(_) => WizardStep::WorkExperience,
            Self::InterestsHobbies(_) => WizardStep::InterestsHobbies,
        }
    }

    /// Fields this update actually names.
    pub fn touched_fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        let mut mark = |present: bool, field: Field| {
            if present {
                fields.push(field);
            }
        };
        match self {
            Self::Personal(u) => {
                mark(u.first_name.is_some(), Field::FirstName);
                mark(u.last_name.is_some(), Field::LastName);
                mark(u.email.is_some(), Field::Email);
                mark(u.phone.is_some(), Field::Phone);
                mark(u.street.is_some(), Field::Street);
                mark(u.city.is_some(), Field::City);
                mark(u.state.is_some(), Field::State);
                mark(u.postal_code.is_some(), Field::PostalCode);
                mark(u.country.is_some(), Field::Country);
                mark(u.website.is_some(), Field::Website);
                mark(u.facebook.is_some(), Field::Facebook);
                mark(u.instagram.is_some(), Field::Instagram);
                mark(u.linkedin.is_some(), Field::Linkedin);
            }
            Self::SkillsLanguages(u) => {
                mark(u.skills.is_some(), Field::Skills);
                mark(u.languages.is_some(), Field::Languages);
            }
            Self::WorkExperience(u) => {
                mark(u.experiences.is_some(), Field::Experiences);
                mark(u.education.is_some(), Field::Education);
            }
            Self::InterestsHobbies(u) => {
                mark(u.interests.is_some(), Field::Interests);
                mark(u.hobbies.is_some(), Field::Hobbies);
            }
        }
        fields
    }

    /// Overwrite the named fields of `data`; everything else is untouched.
    pub fn apply_to(self, data: &mut ProfileData) {
        match self {
            Self::Personal(u) => {
                set(&mut data.first_name, u.first_name);
                set(&mut data.last_name, u.last_name);
                set(&mut data.email, u.email);
                set(&mut data.phone, u.phone);
                set(&mut data.street, u.street);
                set(&mut data.city, u.city);
                set(&mut data.state, u.state);
                set(&mut data.postal_code, u.postal_code);
                set(&mut data.country, u.country);
                set_link(&mut data.website, u.website);
                set_link(&mut data.facebook, u.facebook);
                set_link(&mut data.instagram, u.instagram);
                set_link(&mut data.linkedin, u.linkedin);
            }
            Self::SkillsLanguages(u) => {
                set(&mut data.skills, u.skills);
                set(&mut data.languages, u.languages);
            }
            Self::WorkExperience(u) => {
                if let Some(mut experiences) = u.experiences {
                    for exp in &mut experiences {
                        normalize_end_date(&mut exp.end_date);
                    }
                    data.experiences = experiences;
                }
                if let Some(mut education) = u.education {
                    for edu in &mut education {
                        normalize_end_date(&mut edu.end_date);
                    }
                    data.education = education;
                }
            }
            Self::InterestsHobbies(u) => {
                set(&mut data.interests, u.interests);
                set(&mut data.hobbies, u.hobbies);
            }
        }
    }

    /// The step-local draft: `base` with this update overlaid.
    pub fn draft_over(&self, base: &ProfileData) -> ProfileData {
        let mut draft = base.clone();
        self.clone().apply_to(&mut draft);
        draft
    }
}
