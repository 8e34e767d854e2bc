//! Wizard steps: the fixed, ordered screens of the intake flow.

use serde::{Deserialize, Serialize};

/// The steps of the intake wizard.
///
/// Progresses linearly: Personal → SkillsLanguages → WorkExperience →
/// InterestsHobbies. Submission is not a step; it is only available from
/// the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Personal,
    SkillsLanguages,
    WorkExperience,
    InterestsHobbies,
}

/// Step order. Indices into this slice are the wizard's step indices.
pub const STEP_ORDER: &[WizardStep] = &[
    WizardStep::Personal,
    WizardStep::SkillsLanguages,
    WizardStep::WorkExperience,
    WizardStep::InterestsHobbies,
];

impl WizardStep {
    /// Stable identifier used on the wire.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::SkillsLanguages => "skills_languages",
            Self::WorkExperience => "work_experience",
            Self::InterestsHobbies => "interests_hobbies",
        }
    }

    /// Look up a step by its wire identifier.
    pub fn from_id(id: &str) -> Option<WizardStep> {
        STEP_ORDER.iter().copied().find(|s| s.id() == id)
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interests_closes_the_sequence() {
        assert_eq!(STEP_ORDER.first(), Some(&WizardStep::Personal));
        assert_eq!(STEP_ORDER.last(), Some(&WizardStep::InterestsHobbies));
    }

    #[test]
    fn display_matches_serde() {
        for step in STEP_ORDER {
            let json = serde_json::to_string(step).unwrap();
            assert_eq!(format!("\"{step}\""), json);
        }
    }

    #[test]
    fn from_id_round_trips() {
        for step in STEP_ORDER {
            assert_eq!(WizardStep::from_id(step.id()), Some(*step));
        }
        assert_eq!(WizardStep::from_id("review"), None);
    }
}
