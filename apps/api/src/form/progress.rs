use serde::{Deserialize, Serialize};

use crate::form::skills::SkillList;
use crate::models::form::{EducationEntry, ExperienceEntry, FieldName, FormState};

/// Completion of the form, recomputed from scratch on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// 0 – 100
    pub percent: u8,
    pub filled: usize,
    pub total: usize,
    /// Set at exactly 100%. Informational only.
    pub complete: bool,
    pub label: String,
}

/// Denominator: required fields + every skill + every entry container.
/// Numerator: filled required fields + every skill + entries that pass their
/// presence predicate.
pub fn compute_progress(
    fields: &FormState,
    skills: &SkillList,
    education: &[EducationEntry],
    experience: &[ExperienceEntry],
) -> Progress {
    let total = FieldName::REQUIRED.len() + skills.len() + education.len() + experience.len();

    let filled_required = FieldName::REQUIRED
        .iter()
        .filter(|f| fields.is_filled(**f))
        .count();
    let filled_education = education.iter().filter(|e| e.is_present()).count();
    let filled_experience = experience.iter().filter(|e| e.is_present()).count();
    let filled = filled_required + skills.len() + filled_education + filled_experience;

    let ratio = filled as f64 / total.max(1) as f64;
    let percent = (ratio * 100.0).round().clamp(0.0, 100.0) as u8;
    let complete = percent == 100;

    let label = if complete {
        "100% Complete!".to_string()
    } else {
        format!("{percent}% Complete")
    };

    Progress {
        percent,
        filled,
        total,
        complete,
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::form::{EntryField, FieldValue};

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn test_blank_form_is_zero_percent() {
        let progress = compute_progress(
            &FormState::default(),
            &SkillList::new(),
            &[EducationEntry::blank()],
            &[ExperienceEntry::blank()],
        );
        assert_eq!(progress.total, 6);
        assert_eq!(progress.filled, 0);
        assert_eq!(progress.percent, 0);
        assert!(!progress.complete);
        assert_eq!(progress.label, "0% Complete");
    }

    #[test]
    fn test_fully_filled_form_is_complete() {
        let mut fields = FormState::default();
        fields.set(FieldName::FullName, "Jane Doe".into());
        fields.set(FieldName::Email, "j@x.com".into());
        fields.set(FieldName::Phone, "555-1234".into());
        fields.set(FieldName::Summary, "Engineer.".into());
        let skills = SkillList::from_tags(["Go", "Rust"]);
        let mut education = EducationEntry::blank();
        education.set(EntryField::Degree, text("BS"));
        let mut experience = ExperienceEntry::blank();
        experience.set(EntryField::JobTitle, text("Dev"));

        let progress = compute_progress(&fields, &skills, &[education], &[experience]);
        assert_eq!(progress.filled, 8);
        assert_eq!(progress.total, 8);
        assert_eq!(progress.percent, 100);
        assert!(progress.complete);
        assert_eq!(progress.label, "100% Complete!");
    }

    #[test]
    fn test_optional_fields_do_not_count() {
        let mut fields = FormState::default();
        fields.set(FieldName::Location, "Berlin".into());
        fields.set(FieldName::Website, "https://example.com".into());
        let progress = compute_progress(&fields, &SkillList::new(), &[], &[]);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.filled, 0);
    }

    #[test]
    fn test_whitespace_required_field_is_unfilled() {
        let mut fields = FormState::default();
        fields.set(FieldName::FullName, "   ".into());
        let progress = compute_progress(&fields, &SkillList::new(), &[], &[]);
        assert_eq!(progress.filled, 0);
    }

    #[test]
    fn test_percentage_rounds_to_nearest() {
        // 1 of 6 → 16.67 → 17
        let mut fields = FormState::default();
        fields.set(FieldName::Email, "a@b.co".into());
        let progress = compute_progress(
            &fields,
            &SkillList::new(),
            &[EducationEntry::blank()],
            &[ExperienceEntry::blank()],
        );
        assert_eq!(progress.percent, 17);
    }

    #[test]
    fn test_blank_entries_keep_progress_below_hundred() {
        let mut fields = FormState::default();
        for f in FieldName::REQUIRED {
            fields.set(f, "x".into());
        }
        let progress = compute_progress(
            &fields,
            &SkillList::from_tags(["Rust"]),
            &[EducationEntry::blank()],
            &[],
        );
        assert_eq!(progress.filled, 5);
        assert_eq!(progress.total, 6);
        assert!(!progress.complete);
    }

    #[test]
    fn test_no_entries_and_all_fields_is_complete() {
        let mut fields = FormState::default();
        for f in FieldName::REQUIRED {
            fields.set(f, "x".into());
        }
        let progress = compute_progress(&fields, &SkillList::new(), &[], &[]);
        assert_eq!(progress.percent, 100);
    }
}
