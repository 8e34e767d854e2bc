//! Profile aggregate data model.

use serde::{Deserialize, Serialize};

/// Self-assessed skill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub const ALL: [SkillLevel; 4] = [
        Self::Beginner,
        Self::Intermediate,
        Self::Advanced,
        Self::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }
}

impl std::str::FromStr for SkillLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|l| l.as_str() == s).ok_or(())
    }
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spoken-language proficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    Basic,
    Conversational,
    Fluent,
    Native,
}

impl Proficiency {
    pub const ALL: [Proficiency; 4] = [
        Self::Basic,
        Self::Conversational,
        Self::Fluent,
        Self::Native,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Conversational => "conversational",
            Self::Fluent => "fluent",
            Self::Native => "native",
        }
    }
}

impl std::str::FromStr for Proficiency {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|p| p.as_str() == s).ok_or(())
    }
}

impl std::fmt::Display for Proficiency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    pub level: SkillLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub name: String,
    pub proficiency: Proficiency,
}

/// One work-history entry. An absent `end_date` means "present".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub company: String,
    pub title: String,
    pub location: String,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One education entry. An absent `end_date` means "in progress".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub school: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// The profile under construction.
///
/// Always a total value: scalars default to the empty string and
/// collections to empty, so a partially filled profile has the same shape
/// as a complete one. Whether it is complete is decided by
/// [`super::schema::validate_profile`], not by the type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,

    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,

    pub skills: Vec<SkillEntry>,
    pub languages: Vec<LanguageEntry>,
    pub interests: Vec<String>,
    pub hobbies: Vec<String>,
    pub experiences: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
}

impl ProfileData {
    /// The empty profile every wizard starts from.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Render a plain-text summary of everything captured, for the
    /// confirmation message.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "Thank you for your submission, {}!",
            self.first_name
        )];
        parts.push("We have received your form. Here's a summary of your details:".to_string());

        parts.push(String::new());
        parts.push("Contact".to_string());
        parts.push(format!("- Name: {} {}", self.first_name, self.last_name));
        parts.push(format!("- Email: {}", self.email));
        parts.push(format!("- Phone: {}", self.phone));

        let address: Vec<&str> = [
            self.street.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.postal_code.as_str(),
            self.country.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect();
        if !address.is_empty() {
            parts.push(format!("- Address: {}", address.join(", ")));
        }

        let links = [
            ("Website", &self.website),
            ("Facebook", &self.facebook),
            ("Instagram", &self.instagram),
            ("LinkedIn", &self.linkedin),
        ];
        for (label, link) in links {
            if let Some(url) = link {
                parts.push(format!("- {label}: {url}"));
            }
        }

        if !self.skills.is_empty() {
            parts.push(String::new());
            parts.push("Skills".to_string());
            for skill in &self.skills {
                parts.push(format!("- {} ({})", skill.name, skill.level));
            }
        }

        if !self.languages.is_empty() {
            parts.push(String::new());
            parts.push("Languages".to_string());
            for lang in &self.languages {
                parts.push(format!("- {} ({})", lang.name, lang.proficiency));
            }
        }

        if !self.experiences.is_empty() {
            parts.push(String::new());
            parts.push("Work experience".to_string());
            for exp in &self.experiences {
                let end = exp.end_date.as_deref().unwrap_or("present");
                parts.push(format!(
                    "- {} at {}, {} ({} - {})",
                    exp.title, exp.company, exp.location, exp.start_date, end
                ));
                if let Some(ref description) = exp.description {
                    parts.push(format!("  {description}"));
                }
            }
        }

        if !self.education.is_empty() {
            parts.push(String::new());
            parts.push("Education".to_string());
            for edu in &self.education {
                let end = edu.end_date.as_deref().unwrap_or("present");
                parts.push(format!(
                    "- {} in {}, {} ({} - {})",
                    edu.degree, edu.field, edu.school, edu.start_date, end
                ));
            }
        }

        if !self.interests.is_empty() {
            parts.push(String::new());
            parts.push(format!("Interests: {}", self.interests.join(", ")));
        }
        if !self.hobbies.is_empty() {
            parts.push(String::new());
            parts.push(format!("Hobbies: {}", self.hobbies.join(", ")));
        }

        parts.push(String::new());
        parts.push("We will be in touch shortly.".to_string());
        parts.join("\n")
    }
}
