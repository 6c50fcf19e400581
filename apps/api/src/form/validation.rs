//! Advisory field checks. Results only drive styling hints; they never block
//! a write, a preview update or an export.

use serde::{Deserialize, Serialize};

use crate::models::form::{FieldName, FormState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    MissingRequired,
    InvalidEmail,
    InvalidPhone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAdvisory {
    pub field: FieldName,
    pub kind: AdvisoryKind,
    pub message: String,
}

/// `local@domain.tld`: no whitespace, exactly one `@`, and a dot inside the
/// domain with something on both sides of it.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// After dropping whitespace, `-`, `(` and `)`: an optional `+`, a non-zero
/// leading digit, and at most 16 digits in total.
pub fn is_valid_phone(phone: &str) -> bool {
    let cleaned: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    let mut chars = digits.chars();
    match chars.next() {
        Some(first) if ('1'..='9').contains(&first) => {}
        _ => return false,
    }
    digits.len() <= 16 && chars.all(|c| c.is_ascii_digit())
}

/// Collects every advisory for the current field values. Format checks only
/// apply to non-empty values.
pub fn check_fields(fields: &FormState) -> Vec<FieldAdvisory> {
    let mut advisories = Vec::new();

    for field in FieldName::ALL.into_iter().filter(FieldName::is_required) {
        if !fields.is_filled(field) {
            advisories.push(FieldAdvisory {
                field,
                kind: AdvisoryKind::MissingRequired,
                message: format!("{} is required", field.as_str()),
            });
        }
    }

    if !fields.email.is_empty() && !is_valid_email(&fields.email) {
        advisories.push(FieldAdvisory {
            field: FieldName::Email,
            kind: AdvisoryKind::InvalidEmail,
            message: "Please enter a valid email address".to_string(),
        });
    }

    if !fields.phone.is_empty() && !is_valid_phone(&fields.phone) {
        advisories.push(FieldAdvisory {
            field: FieldName::Phone,
            kind: AdvisoryKind::InvalidPhone,
            message: "Please enter a valid phone number".to_string(),
        });
    }

    advisories
}
