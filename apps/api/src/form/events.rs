use serde::{Deserialize, Serialize};

use crate::models::form::{EntryField, EntryId, EntryKind, FieldName, FieldValue};

/// One discrete interaction from the input surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormEvent {
    SetField {
        name: FieldName,
        value: String,
    },
    SetEntryField {
        kind: EntryKind,
        id: EntryId,
        field: EntryField,
        value: FieldValue,
    },
    AddSkill {
        text: String,
    },
    /// A keypress inside the skill input; Enter submits the typed text.
    SkillInputKey {
        key: String,
        text: String,
    },
    RemoveSkill {
        skill: String,
    },
    AddEntry {
        kind: EntryKind,
    },
    RemoveEntry {
        kind: EntryKind,
        id: EntryId,
    },
    CancelRemoval {
        kind: EntryKind,
        id: EntryId,
    },
    /// Destructive clear. Only applied when the user confirmed it.
    Reset {
        #[serde(default)]
        confirmed: bool,
    },
    TogglePreview,
    Key(KeyPress),
}

/// A global keydown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    /// Answer to the confirmation prompt, for shortcuts that need one.
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shortcut {
    Export,
    Clear,
}

/// Ctrl or Cmd plus Enter exports; Ctrl or Cmd plus `r` clears.
pub fn shortcut_for(press: &KeyPress) -> Option<Shortcut> {
    if !(press.ctrl || press.meta) {
        return None;
    }
    match press.key.as_str() {
        "Enter" => Some(Shortcut::Export),
        "r" => Some(Shortcut::Clear),
        _ => None,
    }
}
