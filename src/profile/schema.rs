//! Aggregate schema: field-level validators and the full-profile parser.
//!
//! Validation never fails as a fault: every problem is recorded in a
//! [`FieldErrors`] keyed by dotted field path (`skills.0.level`), so a form
//! can show one message per field. The same per-field validators back the
//! step schemas in `crate::wizard::steps`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::model::{
    EducationEntry, ExperienceEntry, LanguageEntry, ProfileData, Proficiency, SkillEntry,
    SkillLevel,
};

pub const MAX_SKILLS: usize = 50;
pub const MAX_LANGUAGES: usize = 20;
pub const MAX_INTERESTS: usize = 30;
pub const MAX_HOBBIES: usize = 30;
pub const MAX_EXPERIENCES: usize = 30;
pub const MAX_EDUCATION: usize = 20;

const MSG_REQUIRED: &str = "Required";
const MSG_EMPTY: &str = "Must not be empty";
const MSG_EXPECTED_STRING: &str = "Expected string";
const MSG_EXPECTED_ARRAY: &str = "Expected array";
const MSG_EXPECTED_OBJECT: &str = "Expected object";
const MSG_EXPECTED_BOOL: &str = "Expected boolean";
const MSG_EMAIL: &str = "Invalid email address";
const MSG_PHONE: &str = "Invalid Number!";
const MSG_URL: &str = "Invalid URL";

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+]?[\s0-9]+)?([0-9]{3}|[(]?[0-9]+[)])?([-]?[\s]?[0-9])+$")
        .expect("phone pattern is valid")
});

// ── Errors ──────────────────────────────────────────────────────────

/// Per-field validation messages keyed by dotted path.
///
/// Serializes as a plain `{path: [message, ...]}` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.entry(path.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct paths with at least one message.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn messages(&self, path: &str) -> &[String] {
        self.0.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Take messages from `other` only for paths that have none yet.
    fn absorb_new_paths(&mut self, other: FieldErrors) {
        for (path, messages) in other.0 {
            self.0.entry(path).or_insert(messages);
        }
    }

    /// `Ok(value)` when no errors were recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(path, msgs)| format!("{path}: {}", msgs.join("; ")))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

// ── Fields ──────────────────────────────────────────────────────────

/// Every top-level field of the profile aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Street,
    City,
    State,
    PostalCode,
    Country,
    Website,
    Facebook,
    Instagram,
    Linkedin,
    Skills,
    Languages,
    Interests,
    Hobbies,
    Experiences,
    Education,
}

impl Field {
    pub const ALL: [Field; 19] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Phone,
        Self::Street,
        Self::City,
        Self::State,
        Self::PostalCode,
        Self::Country,
        Self::Website,
        Self::Facebook,
        Self::Instagram,
        Self::Linkedin,
        Self::Skills,
        Self::Languages,
        Self::Interests,
        Self::Hobbies,
        Self::Experiences,
        Self::Education,
    ];

    /// JSON name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Street => "street",
            Self::City => "city",
            Self::State => "state",
            Self::PostalCode => "postalCode",
            Self::Country => "country",
            Self::Website => "website",
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::Linkedin => "linkedin",
            Self::Skills => "skills",
            Self::Languages => "languages",
            Self::Interests => "interests",
            Self::Hobbies => "hobbies",
            Self::Experiences => "experiences",
            Self::Education => "education",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Number of entries currently held by a collection field, `None` for
    /// scalar fields.
    pub fn len_in(&self, data: &ProfileData) -> Option<usize> {
        match self {
            Self::Skills => Some(data.skills.len()),
            Self::Languages => Some(data.languages.len()),
            Self::Interests => Some(data.interests.len()),
            Self::Hobbies => Some(data.hobbies.len()),
            Self::Experiences => Some(data.experiences.len()),
            Self::Education => Some(data.education.len()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Shared validators ───────────────────────────────────────────────

fn non_empty(path: &str, value: &str, errors: &mut FieldErrors) {
    if value.trim().is_empty() {
        errors.add(path, MSG_EMPTY);
    }
}

/// A deliverable mailbox: the domain must be a dotted host name, not a
/// single label or an IP literal.
fn valid_email(value: &str) -> bool {
    value.parse::<lettre::Address>().is_ok_and(|addr| {
        let domain = addr.domain();
        !domain.starts_with('[')
            && domain.contains('.')
            && domain.split('.').all(|label| !label.is_empty())
    })
}

fn valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

fn valid_url(value: &str) -> bool {
    url::Url::parse(value).is_ok_and(|u| u.has_host())
}

fn optional_url(path: &str, value: Option<&str>, errors: &mut FieldErrors) {
    if let Some(v) = value {
        if !valid_url(v) {
            errors.add(path, MSG_URL);
        }
    }
}

fn max_items(path: &str, len: usize, max: usize, errors: &mut FieldErrors) {
    if len > max {
        errors.add(path, format!("Must contain at most {max} items"));
    }
}

fn validate_skill(index: usize, skill: &SkillEntry, errors: &mut FieldErrors) {
    non_empty(&format!("skills.{index}.name"), &skill.name, errors);
}

fn validate_language(index: usize, lang: &LanguageEntry, errors: &mut FieldErrors) {
    non_empty(&format!("languages.{index}.name"), &lang.name, errors);
}

fn validate_tag(field: Field, index: usize, tag: &str, errors: &mut FieldErrors) {
    non_empty(&format!("{field}.{index}"), tag, errors);
}

fn validate_experience(index: usize, exp: &ExperienceEntry, errors: &mut FieldErrors) {
    let p = |name: &str| format!("experiences.{index}.{name}");
    non_empty(&p("company"), &exp.company, errors);
    non_empty(&p("title"), &exp.title, errors);
    non_empty(&p("location"), &exp.location, errors);
    non_empty(&p("startDate"), &exp.start_date, errors);
}

fn validate_education(index: usize, edu: &EducationEntry, errors: &mut FieldErrors) {
    let p = |name: &str| format!("education.{index}.{name}");
    non_empty(&p("school"), &edu.school, errors);
    non_empty(&p("degree"), &edu.degree, errors);
    non_empty(&p("field"), &edu.field, errors);
    non_empty(&p("startDate"), &edu.start_date, errors);
}

/// Upper bound on a collection field, `None` for scalars.
pub fn max_len(field: Field) -> Option<usize> {
    match field {
        Field::Skills => Some(MAX_SKILLS),
        Field::Languages => Some(MAX_LANGUAGES),
        Field::Interests => Some(MAX_INTERESTS),
        Field::Hobbies => Some(MAX_HOBBIES),
        Field::Experiences => Some(MAX_EXPERIENCES),
        Field::Education => Some(MAX_EDUCATION),
        _ => None,
    }
}

/// Scalar rules, kept apart from collections so the parser can run them
/// on fields that extracted cleanly.
fn validate_scalar(field: Field, data: &ProfileData, errors: &mut FieldErrors) {
    let path = field.name();
    match field {
        Field::FirstName => non_empty(path, &data.first_name, errors),
        Field::LastName => non_empty(path, &data.last_name, errors),
        Field::Email => {
            if data.email.trim().is_empty() {
                errors.add(path, MSG_EMPTY);
            } else if !valid_email(&data.email) {
                errors.add(path, MSG_EMAIL);
            }
        }
        Field::Phone => {
            if data.phone.trim().is_empty() {
                errors.add(path, MSG_EMPTY);
            } else if !valid_phone(&data.phone) {
                errors.add(path, MSG_PHONE);
            }
        }
        // Free-form until the user fills them in.
        Field::Street | Field::City | Field::State | Field::PostalCode | Field::Country => {}
        Field::Website => optional_url(path, data.website.as_deref(), errors),
        Field::Facebook => optional_url(path, data.facebook.as_deref(), errors),
        Field::Instagram => optional_url(path, data.instagram.as_deref(), errors),
        Field::Linkedin => optional_url(path, data.linkedin.as_deref(), errors),
        Field::Skills
        | Field::Languages
        | Field::Interests
        | Field::Hobbies
        | Field::Experiences
        | Field::Education => {}
    }
}

/// Validate one field of the aggregate, appending any messages to `errors`.
///
/// This is the single rule set shared by the aggregate schema and every
/// step schema.
pub fn validate_field(field: Field, data: &ProfileData, errors: &mut FieldErrors) {
    if let (Some(len), Some(max)) = (field.len_in(data), max_len(field)) {
        max_items(field.name(), len, max, errors);
    }
    match field {
        Field::Skills => {
            for (i, s) in data.skills.iter().enumerate() {
                validate_skill(i, s, errors);
            }
        }
        Field::Languages => {
            for (i, l) in data.languages.iter().enumerate() {
                validate_language(i, l, errors);
            }
        }
        Field::Interests => {
            for (i, t) in data.interests.iter().enumerate() {
                validate_tag(field, i, t, errors);
            }
        }
        Field::Hobbies => {
            for (i, t) in data.hobbies.iter().enumerate() {
                validate_tag(field, i, t, errors);
            }
        }
        Field::Experiences => {
            for (i, e) in data.experiences.iter().enumerate() {
                validate_experience(i, e, errors);
            }
        }
        Field::Education => {
            for (i, e) in data.education.iter().enumerate() {
                validate_education(i, e, errors);
            }
        }
        _ => validate_scalar(field, data, errors),
    }
}

/// Validate a typed profile against the full aggregate schema, collecting
/// every violation.
pub fn validate_profile(data: &ProfileData) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    for field in Field::ALL {
        validate_field(field, data, &mut errors);
    }
    errors.into_result(())
}

// ── Parser ──────────────────────────────────────────────────────────

/// Extraction context: reads raw JSON into typed values, recording type
/// errors by path.
struct Extract<'a> {
    obj: &'a Map<String, Value>,
    prefix: String,
    errors: &'a mut FieldErrors,
}

impl<'a> Extract<'a> {
    fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.prefix)
        }
    }

    /// A string that must be present (it may still be empty).
    fn string(&mut self, key: &str) -> Option<String> {
        match self.obj.get(key) {
            None | Some(Value::Null) => {
                let path = self.path(key);
                self.errors.add(path, MSG_REQUIRED);
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                let path = self.path(key);
                self.errors.add(path, MSG_EXPECTED_STRING);
                None
            }
        }
    }

    /// An optional string; an empty string counts as absent.
    fn optional_string(&mut self, key: &str) -> Result<Option<String>, ()> {
        match self.obj.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => {
                let path = self.path(key);
                self.errors.add(path, MSG_EXPECTED_STRING);
                Err(())
            }
        }
    }

    fn optional_bool(&mut self, key: &str) -> Result<Option<bool>, ()> {
        match self.obj.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => {
                let path = self.path(key);
                self.errors.add(path, MSG_EXPECTED_BOOL);
                Err(())
            }
        }
    }

    fn one_of<T: std::str::FromStr + Copy + std::fmt::Display>(
        &mut self,
        key: &str,
        options: &[T],
    ) -> Option<T> {
        let raw = self.string(key)?;
        match raw.parse::<T>() {
            Ok(v) => Some(v),
            Err(_) => {
                let expected: Vec<String> = options.iter().map(|o| o.to_string()).collect();
                let path = self.path(key);
                self.errors.add(
                    path,
                    format!("Invalid option: expected one of {}", expected.join("|")),
                );
                None
            }
        }
    }

    /// A collection; absent means empty.
    fn array(&mut self, key: &str) -> Option<&'a [Value]> {
        let obj: &'a Map<String, Value> = self.obj;
        match obj.get(key) {
            None | Some(Value::Null) => Some(&[]),
            Some(Value::Array(items)) => Some(items.as_slice()),
            Some(_) => {
                let path = self.path(key);
                self.errors.add(path, MSG_EXPECTED_ARRAY);
                None
            }
        }
    }
}

fn entry_object<'v>(
    value: &'v Value,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<&'v Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => {
            errors.add(path, MSG_EXPECTED_OBJECT);
            None
        }
    }
}

fn parse_skill(value: &Value, path: String, errors: &mut FieldErrors) -> Option<SkillEntry> {
    let obj = entry_object(value, &path, errors)?;
    let mut ex = Extract {
        obj,
        prefix: path,
        errors,
    };
    let name = ex.string("name");
    let level = ex.one_of("level", &SkillLevel::ALL);
    Some(SkillEntry {
        name: name?,
        level: level?,
    })
}

fn parse_language(value: &Value, path: String, errors: &mut FieldErrors) -> Option<LanguageEntry> {
    let obj = entry_object(value, &path, errors)?;
    let mut ex = Extract {
        obj,
        prefix: path,
        errors,
    };
    let name = ex.string("name");
    let proficiency = ex.one_of("proficiency", &Proficiency::ALL);
    Some(LanguageEntry {
        name: name?,
        proficiency: proficiency?,
    })
}

fn parse_experience(
    value: &Value,
    path: String,
    errors: &mut FieldErrors,
) -> Option<ExperienceEntry> {
    let obj = entry_object(value, &path, errors)?;
    let mut ex = Extract {
        obj,
        prefix: path,
        errors,
    };
    let company = ex.string("company");
    let title = ex.string("title");
    let location = ex.string("location");
    let start_date = ex.string("startDate");
    let end_date = ex.optional_string("endDate");
    let current = ex.optional_bool("current");
    let description = ex.optional_string("description");
    Some(ExperienceEntry {
        company: company?,
        title: title?,
        location: location?,
        start_date: start_date?,
        end_date: end_date.ok()?,
        current: current.ok()?,
        description: description.ok()?,
    })
}

fn parse_education(
    value: &Value,
    path: String,
    errors: &mut FieldErrors,
) -> Option<EducationEntry> {
    let obj = entry_object(value, &path, errors)?;
    let mut ex = Extract {
        obj,
        prefix: path,
        errors,
    };
    let school = ex.string("school");
    let degree = ex.string("degree");
    let field = ex.string("field");
    let start_date = ex.string("startDate");
    let end_date = ex.optional_string("endDate");
    Some(EducationEntry {
        school: school?,
        degree: degree?,
        field: field?,
        start_date: start_date?,
        end_date: end_date.ok()?,
    })
}

fn parse_tag(value: &Value, path: String, errors: &mut FieldErrors) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        _ => {
            errors.add(path, MSG_EXPECTED_STRING);
            None
        }
    }
}

/// Parse a collection, validating each entry that extracted cleanly at its
/// original index so reported paths match the input positions.
fn collection<T>(
    ex: &mut Extract<'_>,
    field: Field,
    parse: impl Fn(&Value, String, &mut FieldErrors) -> Option<T>,
    validate: impl Fn(usize, &T, &mut FieldErrors),
) -> Vec<T> {
    let Some(items) = ex.array(field.name()) else {
        return Vec::new();
    };
    if let Some(max) = max_len(field) {
        max_items(field.name(), items.len(), max, ex.errors);
    }
    each_entry(items, field, parse, validate, ex.errors)
}

fn each_entry<T>(
    items: &[Value],
    field: Field,
    parse: impl Fn(&Value, String, &mut FieldErrors) -> Option<T>,
    validate: impl Fn(usize, &T, &mut FieldErrors),
    errors: &mut FieldErrors,
) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if let Some(entry) = parse(item, format!("{field}.{i}"), errors) {
            validate(i, &entry, errors);
            out.push(entry);
        }
    }
    out
}

/// Parse an arbitrary JSON value into a normalized profile, or report every
/// violation by field path.
///
/// Omitted collections default to empty before bounds are checked. Empty
/// `endDate` and social-link strings normalize to absent. Never panics on
/// malformed input.
pub fn parse_profile(value: &Value) -> Result<ProfileData, FieldErrors> {
    let mut errors = FieldErrors::new();
    let Value::Object(obj) = value else {
        errors.add("", MSG_EXPECTED_OBJECT);
        return Err(errors);
    };

    let mut data = ProfileData::empty();
    let mut clean_scalars = Vec::new();
    {
        let mut ex = Extract {
            obj,
            prefix: String::new(),
            errors: &mut errors,
        };

        let strings: [(Field, &mut String); 9] = [
            (Field::FirstName, &mut data.first_name),
            (Field::LastName, &mut data.last_name),
            (Field::Email, &mut data.email),
            (Field::Phone, &mut data.phone),
            (Field::Street, &mut data.street),
            (Field::City, &mut data.city),
            (Field::State, &mut data.state),
            (Field::PostalCode, &mut data.postal_code),
            (Field::Country, &mut data.country),
        ];
        for (field, slot) in strings {
            if let Some(v) = ex.string(field.name()) {
                *slot = v;
                clean_scalars.push(field);
            }
        }

        let links: [(Field, &mut Option<String>); 4] = [
            (Field::Website, &mut data.website),
            (Field::Facebook, &mut data.facebook),
            (Field::Instagram, &mut data.instagram),
            (Field::Linkedin, &mut data.linkedin),
        ];
        for (field, slot) in links {
            if let Ok(v) = ex.optional_string(field.name()) {
                *slot = v;
                clean_scalars.push(field);
            }
        }

        data.skills = collection(&mut ex, Field::Skills, parse_skill, validate_skill);
        data.languages = collection(&mut ex, Field::Languages, parse_language, validate_language);
        data.interests = collection(&mut ex, Field::Interests, parse_tag, |i, t, e| {
            validate_tag(Field::Interests, i, t, e)
        });
        data.hobbies = collection(&mut ex, Field::Hobbies, parse_tag, |i, t, e| {
            validate_tag(Field::Hobbies, i, t, e)
        });
        data.experiences = collection(
            &mut ex,
            Field::Experiences,
            parse_experience,
            validate_experience,
        );
        data.education = collection(&mut ex, Field::Education, parse_education, validate_education);
    }

    let mut rule_errors = FieldErrors::new();
    for field in clean_scalars {
        validate_scalar(field, &data, &mut rule_errors);
    }
    errors.absorb_new_paths(rule_errors);

    errors.into_result(data)
}

/// Entries typed but unchecked: no bounds, no content rules.
fn draft_entries<T>(
    ex: &mut Extract<'_>,
    field: Field,
    parse: impl Fn(&Value, String, &mut FieldErrors) -> Option<T>,
) -> Vec<T> {
    let Some(items) = ex.array(field.name()) else {
        return Vec::new();
    };
    each_entry(items, field, parse, |_, _, _| {}, ex.errors)
}

/// Extract only `fields` from a partial payload, with the same typing rules
/// and per-entry paths as [`parse_profile`].
///
/// Returns the extracted values over an empty profile plus the fields the
/// payload actually named; absent and `null` keys are skipped. Collection
/// bounds and content rules are left to whoever gates the result.
pub fn parse_fields(
    obj: &Map<String, Value>,
    fields: &[Field],
) -> Result<(ProfileData, Vec<Field>), FieldErrors> {
    let mut errors = FieldErrors::new();
    let mut data = ProfileData::empty();
    let mut named = Vec::new();
    {
        let mut ex = Extract {
            obj,
            prefix: String::new(),
            errors: &mut errors,
        };

        for &field in fields {
            if obj.get(field.name()).is_none_or(Value::is_null) {
                continue;
            }
            named.push(field);
            let key = field.name();
            match field {
                Field::FirstName => set_string(&mut data.first_name, ex.string(key)),
                Field::LastName => set_string(&mut data.last_name, ex.string(key)),
                Field::Email => set_string(&mut data.email, ex.string(key)),
                Field::Phone => set_string(&mut data.phone, ex.string(key)),
                Field::Street => set_string(&mut data.street, ex.string(key)),
                Field::City => set_string(&mut data.city, ex.string(key)),
                Field::State => set_string(&mut data.state, ex.string(key)),
                Field::PostalCode => set_string(&mut data.postal_code, ex.string(key)),
                Field::Country => set_string(&mut data.country, ex.string(key)),
                Field::Website => data.website = ex.optional_string(key).unwrap_or_default(),
                Field::Facebook => data.facebook = ex.optional_string(key).unwrap_or_default(),
                Field::Instagram => data.instagram = ex.optional_string(key).unwrap_or_default(),
                Field::Linkedin => data.linkedin = ex.optional_string(key).unwrap_or_default(),
                Field::Skills => data.skills = draft_entries(&mut ex, field, parse_skill),
                Field::Languages => {
                    data.languages = draft_entries(&mut ex, field, parse_language)
                }
                Field::Interests => {
                    data.interests = draft_entries(&mut ex, field, parse_tag)
                }
                Field::Hobbies => data.hobbies = draft_entries(&mut ex, field, parse_tag),
                Field::Experiences => {
                    data.experiences = draft_entries(&mut ex, field, parse_experience)
                }
                Field::Education => {
                    data.education = draft_entries(&mut ex, field, parse_education)
                }
            }
        }
    }

    errors.into_result((data, named))
}

fn set_string(slot: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *slot = v;
    }
}
