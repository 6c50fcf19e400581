//! View synchronizer. Projects form state into a render-ready `PreviewDocument`.
//!
//! The document is rebuilt from scratch on every change; nothing here caches
//! derived state except the last-seen section visibility, which is only used
//! to report show/hide transitions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::form::skills::SkillList;
use crate::models::form::{EducationEntry, ExperienceEntry, FormState};

const NAME_PLACEHOLDER: &str = "Your Name";
const DEGREE_PLACEHOLDER: &str = "Degree";
const INSTITUTION_PLACEHOLDER: &str = "Institution";
const JOB_TITLE_PLACEHOLDER: &str = "Job Title";
const COMPANY_PLACEHOLDER: &str = "Company";
const PRESENT: &str = "Present";
const UNKNOWN_DATE: &str = "?";

/// Delay before a newly shown section starts its enter transition.
pub const ENTER_DELAY_MS: u64 = 10;
/// Delay before a hidden section is taken out of the layout.
pub const EXIT_DELAY_MS: u64 = 500;

// ────────────────────────────────────────────────────────────────────────────
// View model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Contact,
    Summary,
    Skills,
    Education,
    Experience,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Contact,
        Section::Summary,
        Section::Skills,
        Section::Education,
        Section::Experience,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Contact => "Contact",
            Section::Summary => "Professional Summary",
            Section::Skills => "Skills",
            Section::Education => "Education",
            Section::Experience => "Work Experience",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    Email,
    Phone,
    Location,
    Website,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLine {
    pub kind: ContactKind,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationItem {
    pub degree: String,
    pub institution: String,
    /// `"{start} - {end}"`, only when at least one year is set.
    pub date_range: Option<String>,
    pub gpa: Option<String>,
}

impl EducationItem {
    /// The line under the institution, e.g. `2018 - 2022 | GPA: 3.9`.
    pub fn detail_line(&self) -> String {
        let mut line = self.date_range.clone().unwrap_or_default();
        if let Some(gpa) = &self.gpa {
            line.push_str(&format!(" | GPA: {gpa}"));
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceItem {
    pub job_title: String,
    pub company: String,
    pub date_range: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewDocument {
    pub name: String,
    pub contact: Vec<ContactLine>,
    pub summary: Option<String>,
    pub skills: Option<Vec<String>>,
    pub education: Vec<EducationItem>,
    pub experience: Vec<ExperienceItem>,
}

impl PreviewDocument {
    pub fn build(
        fields: &FormState,
        skills: &SkillList,
        education: &[EducationEntry],
        experience: &[ExperienceEntry],
    ) -> Self {
        let name = non_empty(&fields.full_name).unwrap_or_else(|| NAME_PLACEHOLDER.to_string());

        let contact = [
            (ContactKind::Email, &fields.email),
            (ContactKind::Phone, &fields.phone),
            (ContactKind::Location, &fields.location),
            (ContactKind::Website, &fields.website),
        ]
        .into_iter()
        .filter_map(|(kind, value)| non_empty(value).map(|value| ContactLine { kind, value }))
        .collect();

        let skills = if skills.is_empty() {
            None
        } else {
            Some(skills.to_vec())
        };

        PreviewDocument {
            name,
            contact,
            summary: non_empty(&fields.summary),
            skills,
            education: education
                .iter()
                .filter(|e| e.is_present())
                .map(education_item)
                .collect(),
            experience: experience
                .iter()
                .filter(|e| e.is_present())
                .map(experience_item)
                .collect(),
        }
    }

    pub fn is_visible(&self, section: Section) -> bool {
        match section {
            Section::Contact => !self.contact.is_empty(),
            Section::Summary => self.summary.is_some(),
            Section::Skills => self.skills.is_some(),
            Section::Education => !self.education.is_empty(),
            Section::Experience => !self.experience.is_empty(),
        }
    }

    pub fn visible_sections(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|s| self.is_visible(*s))
            .collect()
    }
}

fn education_item(entry: &EducationEntry) -> EducationItem {
    let start = entry.start_year.trim();
    let end = entry.end_year.trim();
    let date_range = if start.is_empty() && end.is_empty() {
        None
    } else {
        Some(format!(
            "{} - {}",
            or_placeholder(start, UNKNOWN_DATE),
            or_placeholder(end, PRESENT)
        ))
    };

    EducationItem {
        degree: or_placeholder(entry.degree.trim(), DEGREE_PLACEHOLDER),
        institution: or_placeholder(entry.institution.trim(), INSTITUTION_PLACEHOLDER),
        date_range,
        gpa: non_empty(&entry.gpa),
    }
}

fn experience_item(entry: &ExperienceEntry) -> ExperienceItem {
    let start = entry.start_date.trim();
    let end = entry.end_date.trim();
    let date_range = if start.is_empty() && end.is_empty() && !entry.is_current {
        None
    } else {
        let start = if start.is_empty() {
            UNKNOWN_DATE.to_string()
        } else {
            format_month(start)
        };
        let end = if entry.is_current {
            PRESENT.to_string()
        } else if end.is_empty() {
            UNKNOWN_DATE.to_string()
        } else {
            format_month(end)
        };
        Some(format!("{start} - {end}"))
    };

    ExperienceItem {
        job_title: or_placeholder(entry.job_title.trim(), JOB_TITLE_PLACEHOLDER),
        company: or_placeholder(entry.company.trim(), COMPANY_PLACEHOLDER),
        date_range,
        description: non_empty(&entry.description),
    }
}

/// `"2023-04"` → `"Apr 2023"`. Anything that is not a `YYYY-MM` month is
/// returned unchanged.
pub fn format_month(value: &str) -> String {
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|_| value.to_string())
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section transitions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Enter,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTransition {
    pub section: Section,
    pub kind: TransitionKind,
    pub delay_ms: u64,
}

/// Remembers which sections were visible after the last recompute.
/// Everything starts hidden.
#[derive(Debug, Clone, Default)]
pub struct VisibilityTracker {
    visible: Vec<Section>,
}

impl VisibilityTracker {
    /// Records the visibility of `doc` and returns the sections that flipped.
    pub fn observe(&mut self, doc: &PreviewDocument) -> Vec<SectionTransition> {
        let now = doc.visible_sections();
        let transitions = Section::ALL
            .into_iter()
            .filter_map(|section| {
                let was = self.visible.contains(&section);
                let is = now.contains(&section);
                match (was, is) {
                    (false, true) => Some(SectionTransition {
                        section,
                        kind: TransitionKind::Enter,
                        delay_ms: ENTER_DELAY_MS,
                    }),
                    (true, false) => Some(SectionTransition {
                        section,
                        kind: TransitionKind::Exit,
                        delay_ms: EXIT_DELAY_MS,
                    }),
                    _ => None,
                }
            })
            .collect();
        self.visible = now;
        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::form::{EntryField, FieldName, FieldValue};

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    fn blank_doc() -> PreviewDocument {
        PreviewDocument::build(
            &FormState::default(),
            &SkillList::new(),
            &[EducationEntry::blank()],
            &[ExperienceEntry::blank()],
        )
    }

    #[test]
    fn test_blank_form_shows_only_placeholder_name() {
        let doc = blank_doc();
        assert_eq!(doc.name, "Your Name");
        assert!(doc.visible_sections().is_empty());
    }

    #[test]
    fn test_contact_lines_keep_field_order() {
        let mut fields = FormState::default();
        fields.set(FieldName::Website, "example.com".into());
        fields.set(FieldName::Email, "jane@example.com".into());
        let doc = PreviewDocument::build(&fields, &SkillList::new(), &[], &[]);
        let kinds: Vec<_> = doc.contact.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ContactKind::Email, ContactKind::Website]);
    }

    #[test]
    fn test_format_month() {
        assert_eq!(format_month("2023-04"), "Apr 2023");
        assert_eq!(format_month("1999-12"), "Dec 1999");
        assert_eq!(format_month("spring 2020"), "spring 2020");
    }

    #[test]
    fn test_current_job_always_renders_present() {
        let mut entry = ExperienceEntry::blank();
        entry.set(EntryField::JobTitle, text("Dev"));
        entry.set(EntryField::StartDate, text("2021-03"));
        entry.set(EntryField::CurrentJob, FieldValue::Flag(true));
        // A stale end date that slipped in before the flag was honoured.
        entry.end_date = "2022-01".into();

        let doc = PreviewDocument::build(&FormState::default(), &SkillList::new(), &[], &[entry]);
        assert_eq!(doc.experience[0].date_range.as_deref(), Some("Mar 2021 - Present"));
    }

    #[test]
    fn test_current_job_without_start_date() {
        let mut entry = ExperienceEntry::blank();
        entry.set(EntryField::Company, text("Acme"));
        entry.set(EntryField::CurrentJob, FieldValue::Flag(true));
        let doc = PreviewDocument::build(&FormState::default(), &SkillList::new(), &[], &[entry]);
        let item = &doc.experience[0];
        assert_eq!(item.job_title, "Job Title");
        assert_eq!(item.company, "Acme");
        assert_eq!(item.date_range.as_deref(), Some("? - Present"));
    }

    #[test]
    fn test_experience_without_dates_has_no_range() {
        let mut entry = ExperienceEntry::blank();
        entry.set(EntryField::JobTitle, text("Dev"));
        entry.set(EntryField::JobDescription, text("   "));
        let doc = PreviewDocument::build(&FormState::default(), &SkillList::new(), &[], &[entry]);
        assert_eq!(doc.experience[0].date_range, None);
        assert_eq!(doc.experience[0].description, None);
    }

    #[test]
    fn test_education_placeholders_and_detail_line() {
        let mut entry = EducationEntry::blank();
        entry.set(EntryField::Institution, text("State University"));
        entry.set(EntryField::StartYear, text("2018"));
        entry.set(EntryField::Gpa, text("3.9/4.0"));
        let doc = PreviewDocument::build(&FormState::default(), &SkillList::new(), &[entry], &[]);
        let item = &doc.education[0];
        assert_eq!(item.degree, "Degree");
        assert_eq!(item.date_range.as_deref(), Some("2018 - Present"));
        assert_eq!(item.detail_line(), "2018 - Present | GPA: 3.9/4.0");
    }

    #[test]
    fn test_blank_entries_are_skipped_but_order_kept() {
        let mut first = EducationEntry::blank();
        first.set(EntryField::Degree, text("BS"));
        let mut third = EducationEntry::blank();
        third.set(EntryField::Degree, text("MS"));
        let doc = PreviewDocument::build(
            &FormState::default(),
            &SkillList::new(),
            &[first, EducationEntry::blank(), third],
            &[],
        );
        let degrees: Vec<_> = doc.education.iter().map(|e| e.degree.as_str()).collect();
        assert_eq!(degrees, vec!["BS", "MS"]);
    }

    #[test]
    fn test_toggling_summary_flips_only_summary_section() {
        let mut fields = FormState::default();
        fields.set(FieldName::Email, "a@b.co".into());
        let skills = SkillList::from_tags(["Rust"]);
        let before = PreviewDocument::build(&fields, &skills, &[], &[]);

        fields.set(FieldName::Summary, "Engineer.".into());
        let after = PreviewDocument::build(&fields, &skills, &[], &[]);

        for section in Section::ALL {
            let flipped = before.is_visible(section) != after.is_visible(section);
            assert_eq!(flipped, section == Section::Summary, "{section:?}");
        }
    }

    #[test]
    fn test_tracker_reports_enter_then_exit() {
        let mut tracker = VisibilityTracker::default();
        assert!(tracker.observe(&blank_doc()).is_empty());

        let skills = SkillList::from_tags(["Rust"]);
        let with_skills = PreviewDocument::build(&FormState::default(), &skills, &[], &[]);
        assert_eq!(
            tracker.observe(&with_skills),
            vec![SectionTransition {
                section: Section::Skills,
                kind: TransitionKind::Enter,
                delay_ms: ENTER_DELAY_MS,
            }]
        );
        assert!(tracker.observe(&with_skills).is_empty());

        let exits = tracker.observe(&blank_doc());
        assert_eq!(exits.len(), 1);
        assert_eq!(exits[0].kind, TransitionKind::Exit);
        assert_eq!(exits[0].delay_ms, EXIT_DELAY_MS);
    }
}
