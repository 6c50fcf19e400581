use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Scalar fields
// ────────────────────────────────────────────────────────────────────────────

/// The fixed schema of top-level form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    FullName,
    Email,
    Phone,
    Location,
    Website,
    Summary,
}

impl FieldName {
    pub const ALL: [FieldName; 6] = [
        FieldName::FullName,
        FieldName::Email,
        FieldName::Phone,
        FieldName::Location,
        FieldName::Website,
        FieldName::Summary,
    ];

    /// Fields that count towards completion progress.
    pub const REQUIRED: [FieldName; 4] = [
        FieldName::FullName,
        FieldName::Email,
        FieldName::Phone,
        FieldName::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::FullName => "fullName",
            FieldName::Email => "email",
            FieldName::Phone => "phone",
            FieldName::Location => "location",
            FieldName::Website => "website",
            FieldName::Summary => "summary",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

/// Current values of every scalar field. Missing keys deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormState {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub summary: String,
}

impl FormState {
    pub fn get(&self, name: FieldName) -> &str {
        match name {
            FieldName::FullName => &self.full_name,
            FieldName::Email => &self.email,
            FieldName::Phone => &self.phone,
            FieldName::Location => &self.location,
            FieldName::Website => &self.website,
            FieldName::Summary => &self.summary,
        }
    }

    pub fn set(&mut self, name: FieldName, value: String) {
        let slot = match name {
            FieldName::FullName => &mut self.full_name,
            FieldName::Email => &mut self.email,
            FieldName::Phone => &mut self.phone,
            FieldName::Location => &mut self.location,
            FieldName::Website => &mut self.website,
            FieldName::Summary => &mut self.summary,
        };
        *slot = value;
    }

    /// True when the field holds something other than whitespace.
    pub fn is_filled(&self, name: FieldName) -> bool {
        !self.get(name).trim().is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Repeatable entries
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Education,
    Experience,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Education => "education",
            EntryKind::Experience => "experience",
        }
    }

    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "education" => Some(EntryKind::Education),
            "experience" => Some(EntryKind::Experience),
            _ => None,
        }
    }
}

/// Stable identity of one education or experience entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        EntryId(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Named sub-fields inside an entry group, as they appear on the input surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryField {
    Degree,
    Institution,
    StartYear,
    EndYear,
    Gpa,
    JobTitle,
    Company,
    StartDate,
    EndDate,
    CurrentJob,
    JobDescription,
}

impl EntryField {
    pub fn kind(&self) -> EntryKind {
        match self {
            EntryField::Degree
            | EntryField::Institution
            | EntryField::StartYear
            | EntryField::EndYear
            | EntryField::Gpa => EntryKind::Education,
            EntryField::JobTitle
            | EntryField::Company
            | EntryField::StartDate
            | EntryField::EndDate
            | EntryField::CurrentJob
            | EntryField::JobDescription => EntryKind::Experience,
        }
    }
}

/// A raw input value: text boxes send strings, checkboxes send booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    pub fn into_text(self) -> String {
        match self {
            FieldValue::Text(s) => s,
            FieldValue::Flag(b) => b.to_string(),
        }
    }

    /// Checkbox semantics. Form-encoded checkboxes arrive as "on".
    pub fn as_flag(&self) -> bool {
        match self {
            FieldValue::Flag(b) => *b,
            FieldValue::Text(s) => matches!(s.trim(), "true" | "on" | "1"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationEntry {
    pub id: EntryId,
    pub degree: String,
    pub institution: String,
    pub start_year: String,
    pub end_year: String,
    pub gpa: String,
}

impl EducationEntry {
    pub fn blank() -> Self {
        Self::default()
    }

    /// An education entry shows up in the preview once it names a degree or school.
    pub fn is_present(&self) -> bool {
        !self.degree.trim().is_empty() || !self.institution.trim().is_empty()
    }

    /// Returns false when `field` does not belong to an education entry.
    pub fn set(&mut self, field: EntryField, value: FieldValue) -> bool {
        let slot = match field {
            EntryField::Degree => &mut self.degree,
            EntryField::Institution => &mut self.institution,
            EntryField::StartYear => &mut self.start_year,
            EntryField::EndYear => &mut self.end_year,
            EntryField::Gpa => &mut self.gpa,
            _ => return false,
        };
        *slot = value.into_text();
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub id: EntryId,
    pub job_title: String,
    pub company: String,
    /// `YYYY-MM`, as produced by a month picker.
    pub start_date: String,
    pub end_date: String,
    pub is_current: bool,
    pub description: String,
}

impl ExperienceEntry {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_present(&self) -> bool {
        !self.job_title.trim().is_empty() || !self.company.trim().is_empty()
    }

    /// Returns false when `field` does not belong to an experience entry.
    ///
    /// Ticking "current job" clears the end date, and the end date stays
    /// disabled (writes are dropped) while the flag is set.
    pub fn set(&mut self, field: EntryField, value: FieldValue) -> bool {
        match field {
            EntryField::JobTitle => self.job_title = value.into_text(),
            EntryField::Company => self.company = value.into_text(),
            EntryField::StartDate => self.start_date = value.into_text(),
            EntryField::EndDate => {
                if !self.is_current {
                    self.end_date = value.into_text();
                }
            }
            EntryField::CurrentJob => {
                self.is_current = value.as_flag();
                if self.is_current {
                    self.end_date.clear();
                }
            }
            EntryField::JobDescription => self.description = value.into_text(),
            _ => return false,
        }
        true
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Snapshot blob
// ────────────────────────────────────────────────────────────────────────────

/// Everything the user has typed, in the shape stored under the snapshot key:
/// flat field values next to `skills`, `education` and `experience` arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    #[serde(flatten)]
    pub fields: FormState,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_name_round_trips_through_str() {
        for field in FieldName::ALL {
            assert_eq!(FieldName::parse(field.as_str()), Some(field));
        }
        assert_eq!(FieldName::parse("FullName"), None);
    }

    #[test]
    fn test_location_and_website_are_not_required() {
        assert!(!FieldName::Location.is_required());
        assert!(!FieldName::Website.is_required());
        assert!(FieldName::Summary.is_required());
    }

    #[test]
    fn test_education_presence_ignores_whitespace() {
        let mut entry = EducationEntry::blank();
        assert!(!entry.is_present());
        entry.set(EntryField::Degree, FieldValue::Text("   ".into()));
        assert!(!entry.is_present());
        entry.set(EntryField::Institution, FieldValue::Text("MIT".into()));
        assert!(entry.is_present());
    }

    #[test]
    fn test_education_rejects_experience_fields() {
        let mut entry = EducationEntry::blank();
        assert!(!entry.set(EntryField::JobTitle, FieldValue::Text("Dev".into())));
        assert_eq!(entry, EducationEntry { id: entry.id, ..Default::default() });
    }

    #[test]
    fn test_current_job_clears_and_locks_end_date() {
        let mut entry = ExperienceEntry::blank();
        entry.set(EntryField::EndDate, FieldValue::Text("2022-05".into()));
        entry.set(EntryField::CurrentJob, FieldValue::Flag(true));
        assert!(entry.end_date.is_empty());

        entry.set(EntryField::EndDate, FieldValue::Text("2023-01".into()));
        assert!(entry.end_date.is_empty());

        entry.set(EntryField::CurrentJob, FieldValue::Text("off".into()));
        entry.set(EntryField::EndDate, FieldValue::Text("2023-01".into()));
        assert_eq!(entry.end_date, "2023-01");
    }

    #[test]
    fn test_snapshot_tolerates_missing_keys() {
        let snapshot: FormSnapshot =
            serde_json::from_str(r#"{"fullName":"Jane Doe","skills":["Rust"]}"#).unwrap();
        assert_eq!(snapshot.fields.full_name, "Jane Doe");
        assert!(snapshot.fields.email.is_empty());
        assert_eq!(snapshot.skills, vec!["Rust".to_string()]);
        assert!(snapshot.education.is_empty());
    }

    #[test]
    fn test_snapshot_writes_flat_field_keys() {
        let mut snapshot = FormSnapshot::default();
        snapshot.fields.full_name = "Jane".into();
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["fullName"], "Jane");
        assert!(value["skills"].is_array());
    }
}
