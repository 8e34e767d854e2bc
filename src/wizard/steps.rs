//! Step schemas: which aggregate fields each step governs and the rules
//! that gate leaving it.
//!
//! Each schema is a plain table: the governed fields run through the same
//! [`validate_field`] rules as the full aggregate, plus optional cardinality
//! minimums. A step never reads fields outside its own set.

use crate::profile::{Field, FieldErrors, ProfileData, validate_field};

use super::state::WizardStep;

/// A "needs at least N entries" refinement on a collection field.
#[derive(Debug, Clone, Copy)]
pub struct MinCount {
    pub field: Field,
    pub min: usize,
    pub message: &'static str,
}

#[derive(Debug)]
pub struct StepSchema {
    pub step: WizardStep,
    pub fields: &'static [Field],
    pub minimums: &'static [MinCount],
}

pub static PERSONAL: StepSchema = StepSchema {
    step: WizardStep::Personal,
    fields: &[
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::Phone,
        Field::Street,
        Field::City,
        Field::State,
        Field::PostalCode,
        Field::Country,
        Field::Website,
        Field::Facebook,
        Field::Instagram,
        Field::Linkedin,
    ],
    minimums: &[],
};

pub static SKILLS_LANGUAGES: StepSchema = StepSchema {
    step: WizardStep::SkillsLanguages,
    fields: &[Field::Skills, Field::Languages],
    minimums: &[
        MinCount {
            field: Field::Skills,
            min: 3,
            message: "Please add at least three skills.",
        },
        MinCount {
            field: Field::Languages,
            min: 1,
            message: "Please add at least one language.",
        },
    ],
};

pub static WORK_EXPERIENCE: StepSchema = StepSchema {
    step: WizardStep::WorkExperience,
    fields: &[Field::Experiences, Field::Education],
    minimums: &[],
};

pub static INTERESTS_HOBBIES: StepSchema = StepSchema {
    step: WizardStep::InterestsHobbies,
    fields: &[Field::Interests, Field::Hobbies],
    minimums: &[],
};

/// The schema that gates `step`.
pub fn schema_for(step: WizardStep) -> &'static StepSchema {
    match step {
        WizardStep::Personal => &PERSONAL,
        WizardStep::SkillsLanguages => &SKILLS_LANGUAGES,
        WizardStep::WorkExperience => &WORK_EXPERIENCE,
        WizardStep::InterestsHobbies => &INTERESTS_HOBBIES,
    }
}

impl StepSchema {
    pub fn governs(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    /// Validate the step's fields of `draft`, collecting every message.
    ///
    /// Pure: the same draft always yields the same result.
    pub fn validate(&self, draft: &ProfileData) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for &field in self.fields {
            validate_field(field, draft, &mut errors);
        }
        for rule in self.minimums {
            let len = rule.field.len_in(draft).unwrap_or(0);
            if len < rule.min {
                errors.add(rule.field.name(), rule.message);
            }
        }
        errors.into_result(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{
        EducationEntry, ExperienceEntry, LanguageEntry, Proficiency, SkillEntry, SkillLevel,
        validate_profile,
    };
    use crate::profile::schema::{MAX_EDUCATION, MAX_EXPERIENCES, MAX_SKILLS};
    use crate::wizard::state::STEP_ORDER;

    fn skill(name: &str) -> SkillEntry {
        SkillEntry {
            name: name.into(),
            level: SkillLevel::Intermediate,
        }
    }

    fn english() -> LanguageEntry {
        LanguageEntry {
            name: "English".into(),
            proficiency: Proficiency::Native,
        }
    }

    fn personal() -> ProfileData {
        ProfileData {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
            phone: "+15551234567".into(),
            ..Default::default()
        }
    }

    #[test]
    fn steps_cover_every_field_exactly_once() {
        for field in Field::ALL {
            let owners = STEP_ORDER
                .iter()
                .filter(|s| schema_for(**s).governs(field))
                .count();
            assert_eq!(owners, 1, "{field} should belong to exactly one step");
        }
    }

    #[test]
    fn personal_step_passes_with_contact_only() {
        assert!(PERSONAL.validate(&personal()).is_ok());
    }

    #[test]
    fn personal_step_ignores_other_steps_fields() {
        let mut draft = personal();
        // Invalid for the aggregate, but owned by another step.
        draft.skills = vec![skill("")];
        draft.interests = vec![String::new()];
        assert!(PERSONAL.validate(&draft).is_ok());
    }

    #[test]
    fn skills_step_requires_minimums() {
        let draft = ProfileData {
            skills: vec![skill("Go"), skill("Rust")],
            ..Default::default()
        };
        let errors = SKILLS_LANGUAGES.validate(&draft).unwrap_err();
        assert_eq!(errors.messages("skills"), ["Please add at least three skills."]);
        assert_eq!(errors.messages("languages"), ["Please add at least one language."]);
    }

    #[test]
    fn skills_step_passes_at_minimums() {
        let draft = ProfileData {
            skills: vec![skill("Go"), skill("Rust"), skill("SQL")],
            languages: vec![english()],
            ..Default::default()
        };
        assert!(SKILLS_LANGUAGES.validate(&draft).is_ok());
    }

    #[test]
    fn experience_step_allows_empty_lists() {
        assert!(WORK_EXPERIENCE.validate(&ProfileData::empty()).is_ok());
    }

    #[test]
    fn experience_step_reports_entry_paths() {
        let draft = ProfileData {
            experiences: vec![ExperienceEntry {
                company: "Acme".into(),
                title: String::new(),
                location: "Remote".into(),
                start_date: "2020-01-01".into(),
                end_date: None,
                current: None,
                description: None,
            }],
            education: vec![EducationEntry {
                school: "MIT".into(),
                degree: "BSc".into(),
                field: "CS".into(),
                start_date: String::new(),
                end_date: None,
            }],
            ..Default::default()
        };
        let errors = WORK_EXPERIENCE.validate(&draft).unwrap_err();
        assert!(errors.contains("experiences.0.title"));
        assert!(errors.contains("education.0.startDate"));
    }

    #[test]
    fn interests_step_rejects_blank_entries() {
        let draft = ProfileData {
            hobbies: vec!["chess".into(), "  ".into()],
            ..Default::default()
        };
        let errors = INTERESTS_HOBBIES.validate(&draft).unwrap_err();
        assert!(errors.contains("hobbies.1"));
    }

    #[test]
    fn steps_are_never_laxer_than_aggregate() {
        let mut bad = personal();
        bad.email = "nope".into();
        bad.website = Some("not a url".into());
        bad.skills = vec![skill(""), skill("Rust"), skill("SQL")];
        bad.languages = vec![english()];
        bad.hobbies = vec![String::new()];
        bad.education = vec![EducationEntry {
            school: String::new(),
            degree: "BSc".into(),
            field: "CS".into(),
            start_date: "2012".into(),
            end_date: None,
        }];

        let full = validate_profile(&bad).unwrap_err();
        for step in STEP_ORDER {
            let schema = schema_for(*step);
            let step_errors = schema.validate(&bad).err().unwrap_or_default();
            for path in full.paths() {
                let top = path.split('.').next().unwrap_or_default();
                if Field::from_name(top).is_some_and(|f| schema.governs(f)) {
                    assert!(
                        step_errors.contains(path),
                        "{step} accepted {path} which the aggregate rejects"
                    );
                }
            }
        }
    }

    #[test]
    fn step_maximums_match_aggregate() {
        let mut crowded = personal();
        crowded.skills = vec![skill("Go"); MAX_SKILLS + 1];
        crowded.languages = vec![english()];
        crowded.experiences = vec![
            ExperienceEntry {
                company: "Acme".into(),
                title: "Engineer".into(),
                location: "Remote".into(),
                start_date: "2020-01-01".into(),
                end_date: None,
                current: Some(true),
                description: None,
            };
            MAX_EXPERIENCES + 1
        ];
        crowded.education = vec![
            EducationEntry {
                school: "MIT".into(),
                degree: "BSc".into(),
                field: "CS".into(),
                start_date: "2012-09-01".into(),
                end_date: None,
            };
            MAX_EDUCATION + 1
        ];

        let errors = SKILLS_LANGUAGES.validate(&crowded).unwrap_err();
        assert_eq!(errors.messages("skills"), ["Must contain at most 50 items"]);
        assert!(!errors.contains("languages"));

        let errors = WORK_EXPERIENCE.validate(&crowded).unwrap_err();
        assert_eq!(errors.messages("experiences"), ["Must contain at most 30 items"]);
        assert_eq!(errors.messages("education"), ["Must contain at most 20 items"]);

        let full = validate_profile(&crowded).unwrap_err();
        for path in ["skills", "experiences", "education"] {
            assert_eq!(full.messages(path), errors_for(path, &crowded));
        }
    }

    fn errors_for(path: &str, draft: &ProfileData) -> Vec<String> {
        let field = Field::from_name(path).unwrap();
        let step = STEP_ORDER
            .iter()
            .find(|s| schema_for(**s).governs(field))
            .unwrap();
        let errors = schema_for(*step).validate(draft).unwrap_err();
        errors.messages(path).to_vec()
    }

    #[test]
    fn validation_is_repeatable() {
        let draft = ProfileData {
            skills: vec![skill("")],
            ..Default::default()
        };
        let first = SKILLS_LANGUAGES.validate(&draft);
        let second = SKILLS_LANGUAGES.validate(&draft);
        assert_eq!(first, second);
    }
}
