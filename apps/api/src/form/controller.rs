//! The form session: owns all state, applies events, and tells subscribers
//! about every change.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::form::events::{shortcut_for, FormEvent, Shortcut};
use crate::form::preview::{PreviewDocument, SectionTransition, VisibilityTracker};
use crate::form::progress::{compute_progress, Progress};
use crate::form::repeater::{RemovalTicket, Repeater};
use crate::form::skills::{SkillList, SkillOutcome};
use crate::form::validation::{check_fields, FieldAdvisory};
use crate::models::form::{
    EducationEntry, EntryField, EntryId, EntryKind, ExperienceEntry, FieldName, FieldValue,
    FormSnapshot, FormState,
};

pub const CLEAR_CONFIRMATION: &str =
    "Are you sure you want to clear all form data? This action cannot be undone.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("No {} entry with id {id}", .kind.as_str())]
    UnknownEntry { kind: EntryKind, id: EntryId },

    #[error("Field '{field:?}' does not belong to a {} entry", .kind.as_str())]
    FieldKindMismatch { kind: EntryKind, field: EntryField },
}

/// Everything a view needs after a change.
#[derive(Debug, Clone, Serialize)]
pub struct ViewUpdate {
    pub progress: Progress,
    pub preview: PreviewDocument,
    /// Sections whose visibility flipped with this change.
    pub transitions: Vec<SectionTransition>,
    pub advisories: Vec<FieldAdvisory>,
    pub preview_visible: bool,
}

/// Observer contract: called synchronously after every state mutation.
pub trait ChangeListener: Send {
    fn on_change(&mut self, update: &ViewUpdate);
}

/// Emits a debug line per recompute.
pub struct TraceListener;

impl ChangeListener for TraceListener {
    fn on_change(&mut self, update: &ViewUpdate) {
        debug!(
            "Form changed: {} ({}/{}), {} section transition(s)",
            update.progress.label,
            update.progress.filled,
            update.progress.total,
            update.transitions.len()
        );
    }
}

/// Side effects an event asks the caller to carry out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    Skill(SkillOutcome),
    SkillRemoved { skill: String, removed: bool },
    EntryAdded { kind: EntryKind, id: EntryId },
    RemovalScheduled { ticket: RemovalTicket },
    EntryRemoved { kind: EntryKind, id: EntryId },
    RemovalCancelled { kind: EntryKind, id: EntryId, cancelled: bool },
    Cleared,
    ConfirmationRequired { message: String },
    ExportRequested,
    PreviewToggled { visible: bool },
}

#[derive(Debug, Clone, Serialize)]
pub struct Dispatch {
    pub effect: Option<Effect>,
    pub view: ViewUpdate,
}

pub struct FormController {
    fields: FormState,
    skills: SkillList,
    education: Repeater<EducationEntry>,
    experience: Repeater<ExperienceEntry>,
    preview_visible: bool,
    visibility: VisibilityTracker,
    last_transitions: Vec<SectionTransition>,
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

impl FormController {
    /// A blank form: empty fields, no skills, one blank entry per section,
    /// preview pane hidden.
    pub fn new() -> Self {
        Self {
            fields: FormState::default(),
            skills: SkillList::new(),
            education: Repeater::new(),
            experience: Repeater::new(),
            preview_visible: false,
            visibility: VisibilityTracker::default(),
            last_transitions: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    // ── accessors ───────────────────────────────────────────────────────────

    pub fn fields(&self) -> &FormState {
        &self.fields
    }

    pub fn skills(&self) -> &SkillList {
        &self.skills
    }

    pub fn education(&self) -> &[EducationEntry] {
        self.education.entries()
    }

    pub fn experience(&self) -> &[ExperienceEntry] {
        self.experience.entries()
    }

    pub fn pending_removals(&self) -> Vec<EntryId> {
        let mut ids = self.education.pending_ids();
        ids.extend(self.experience.pending_ids());
        ids
    }

    pub fn progress(&self) -> Progress {
        compute_progress(
            &self.fields,
            &self.skills,
            self.education.entries(),
            self.experience.entries(),
        )
    }

    pub fn preview(&self) -> PreviewDocument {
        PreviewDocument::build(
            &self.fields,
            &self.skills,
            self.education.entries(),
            self.experience.entries(),
        )
    }

    pub fn advisories(&self) -> Vec<FieldAdvisory> {
        check_fields(&self.fields)
    }

    /// The current view without touching transition bookkeeping.
    pub fn view(&self) -> ViewUpdate {
        self.view_with(Vec::new())
    }

    fn view_with(&self, transitions: Vec<SectionTransition>) -> ViewUpdate {
        ViewUpdate {
            progress: self.progress(),
            preview: self.preview(),
            transitions,
            advisories: self.advisories(),
            preview_visible: self.preview_visible,
        }
    }

    /// Recomputes the view and notifies every listener.
    fn changed(&mut self) -> ViewUpdate {
        let preview = self.preview();
        let transitions = self.visibility.observe(&preview);
        let update = ViewUpdate {
            progress: self.progress(),
            preview,
            transitions,
            advisories: self.advisories(),
            preview_visible: self.preview_visible,
        };
        for listener in self.listeners.iter_mut() {
            listener.on_change(&update);
        }
        self.last_transitions = update.transitions.clone();
        update
    }

    // ── state store ─────────────────────────────────────────────────────────

    pub fn set_field(&mut self, name: FieldName, value: String) -> ViewUpdate {
        self.fields.set(name, value);
        self.changed()
    }

    pub fn set_entry_field(
        &mut self,
        kind: EntryKind,
        id: EntryId,
        field: EntryField,
        value: FieldValue,
    ) -> Result<ViewUpdate, FormError> {
        if field.kind() != kind {
            return Err(FormError::FieldKindMismatch { kind, field });
        }
        let applied = match kind {
            EntryKind::Education => self.education.get_mut(id).map(|e| e.set(field, value)),
            EntryKind::Experience => self.experience.get_mut(id).map(|e| e.set(field, value)),
        };
        match applied {
            Some(_) => Ok(self.changed()),
            None => Err(FormError::UnknownEntry { kind, id }),
        }
    }

    /// Clears every field and skill, and leaves one blank entry per section.
    pub fn reset(&mut self) -> ViewUpdate {
        self.fields = FormState::default();
        self.skills.clear();
        self.education.reset();
        self.experience.reset();
        self.changed()
    }

    // ── skills ──────────────────────────────────────────────────────────────

    /// Rejections leave state untouched and do not notify anyone.
    pub fn add_skill(&mut self, text: &str) -> SkillOutcome {
        let outcome = self.skills.add(text);
        if matches!(outcome, SkillOutcome::Added { .. }) {
            self.changed();
        }
        outcome
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let removed = self.skills.remove(skill);
        self.changed();
        removed
    }

    // ── section repeater ────────────────────────────────────────────────────

    pub fn add_entry(&mut self, kind: EntryKind) -> EntryId {
        let id = match kind {
            EntryKind::Education => self.education.add(),
            EntryKind::Experience => self.experience.add(),
        };
        self.changed();
        id
    }

    /// Starts the grace period. The entry stays counted until the returned
    /// ticket is completed.
    pub fn begin_removal(
        &mut self,
        kind: EntryKind,
        id: EntryId,
    ) -> Result<RemovalTicket, FormError> {
        let ticket = match kind {
            EntryKind::Education => self.education.begin_removal(id),
            EntryKind::Experience => self.experience.begin_removal(id),
        };
        ticket.ok_or(FormError::UnknownEntry { kind, id })
    }

    pub fn cancel_removal(&mut self, kind: EntryKind, id: EntryId) -> bool {
        match kind {
            EntryKind::Education => self.education.cancel_removal(id),
            EntryKind::Experience => self.experience.cancel_removal(id),
        }
    }

    /// Applies a scheduled removal. Returns `None` when the ticket went stale.
    pub fn complete_removal(&mut self, ticket: RemovalTicket) -> Option<ViewUpdate> {
        let removed = match ticket.kind {
            EntryKind::Education => self.education.complete_removal(ticket),
            EntryKind::Experience => self.experience.complete_removal(ticket),
        };
        removed.then(|| self.changed())
    }

    /// Skips the grace period. Any outstanding ticket for the entry goes stale.
    pub fn remove_entry_now(
        &mut self,
        kind: EntryKind,
        id: EntryId,
    ) -> Result<ViewUpdate, FormError> {
        let removed = match kind {
            EntryKind::Education => self.education.remove_now(id),
            EntryKind::Experience => self.experience.remove_now(id),
        };
        if removed {
            Ok(self.changed())
        } else {
            Err(FormError::UnknownEntry { kind, id })
        }
    }

    // ── preview pane ────────────────────────────────────────────────────────

    pub fn toggle_preview(&mut self) -> bool {
        self.preview_visible = !self.preview_visible;
        self.preview_visible
    }

    pub fn preview_visible(&self) -> bool {
        self.preview_visible
    }

    // ── snapshots ───────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            fields: self.fields.clone(),
            skills: self.skills.to_vec(),
            education: self.education.entries().to_vec(),
            experience: self.experience.entries().to_vec(),
        }
    }

    /// Repopulates the form from a stored snapshot.
    pub fn restore(&mut self, snapshot: FormSnapshot) -> ViewUpdate {
        self.fields = snapshot.fields;
        self.skills = SkillList::from_tags(&snapshot.skills);
        self.education.replace(snapshot.education);
        self.experience.replace(snapshot.experience);
        self.changed()
    }

    // ── event dispatch ──────────────────────────────────────────────────────

    /// Applies one input event. The returned view carries the section
    /// transitions caused by the event, if it changed anything.
    pub fn dispatch(&mut self, event: FormEvent) -> Result<Dispatch, FormError> {
        self.last_transitions.clear();
        let effect = match event {
            FormEvent::SetField { name, value } => {
                self.set_field(name, value);
                None
            }
            FormEvent::SetEntryField {
                kind,
                id,
                field,
                value,
            } => {
                self.set_entry_field(kind, id, field, value)?;
                None
            }
            FormEvent::AddSkill { text } => Some(Effect::Skill(self.add_skill(&text))),
            FormEvent::SkillInputKey { key, text } => {
                (key == "Enter").then(|| Effect::Skill(self.add_skill(&text)))
            }
            FormEvent::RemoveSkill { skill } => {
                let removed = self.remove_skill(&skill);
                Some(Effect::SkillRemoved { skill, removed })
            }
            FormEvent::AddEntry { kind } => {
                let id = self.add_entry(kind);
                Some(Effect::EntryAdded { kind, id })
            }
            FormEvent::RemoveEntry { kind, id } => {
                let ticket = self.begin_removal(kind, id)?;
                Some(Effect::RemovalScheduled { ticket })
            }
            FormEvent::CancelRemoval { kind, id } => {
                let cancelled = self.cancel_removal(kind, id);
                Some(Effect::RemovalCancelled {
                    kind,
                    id,
                    cancelled,
                })
            }
            FormEvent::Reset { confirmed } => Some(self.clear(confirmed)),
            FormEvent::TogglePreview => Some(Effect::PreviewToggled {
                visible: self.toggle_preview(),
            }),
            FormEvent::Key(press) => match shortcut_for(&press) {
                Some(Shortcut::Export) => Some(Effect::ExportRequested),
                Some(Shortcut::Clear) => Some(self.clear(press.confirmed)),
                None => None,
            },
        };
        let transitions = std::mem::take(&mut self.last_transitions);
        Ok(Dispatch {
            effect,
            view: self.view_with(transitions),
        })
    }

    fn clear(&mut self, confirmed: bool) -> Effect {
        if confirmed {
            self.reset();
            Effect::Cleared
        } else {
            Effect::ConfirmationRequired {
                message: CLEAR_CONFIRMATION.to_string(),
            }
        }
    }
}
