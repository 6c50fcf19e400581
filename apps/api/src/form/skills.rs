use serde::{Deserialize, Serialize};

/// Why an `add` did not change the list. Surfaced to the UI only, never as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillRejection {
    Empty,
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SkillOutcome {
    Added { skill: String },
    Rejected { reason: SkillRejection },
}

/// Ordered, duplicate-free skill tags. Insertion order is display order;
/// matching is exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillList(Vec<String>);

impl SkillList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from stored tags, dropping blanks and repeats.
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for tag in tags {
            list.add(tag.as_ref());
        }
        list
    }

    pub fn add(&mut self, raw: &str) -> SkillOutcome {
        let skill = raw.trim();
        if skill.is_empty() {
            return SkillOutcome::Rejected {
                reason: SkillRejection::Empty,
            };
        }
        if self.contains(skill) {
            return SkillOutcome::Rejected {
                reason: SkillRejection::Duplicate,
            };
        }
        self.0.push(skill.to_string());
        SkillOutcome::Added {
            skill: skill.to_string(),
        }
    }

    /// Removes the first exact match. Returns whether anything was removed.
    pub fn remove(&mut self, skill: &str) -> bool {
        match self.0.iter().position(|s| s == skill) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.0.iter().any(|s| s == skill)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.as_slice().to_vec()
    }
}
