//! Section repeater: variable-length education / experience collections.
//!
//! Removal is two-phase. `begin_removal` marks an entry as leaving and hands
//! back a ticket; the entry keeps counting towards progress and preview until
//! the ticket is completed after the grace delay. Tickets carry a generation
//! number, so a completion that arrives after a reset, a cancel, or a newer
//! removal request for the same entry is ignored.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::form::{EducationEntry, EntryId, EntryKind, ExperienceEntry};

/// Common surface of the two entry types managed by a `Repeater`.
pub trait RepeatedEntry: Clone {
    const KIND: EntryKind;

    fn blank() -> Self;
    fn id(&self) -> EntryId;
}

impl RepeatedEntry for EducationEntry {
    const KIND: EntryKind = EntryKind::Education;

    fn blank() -> Self {
        EducationEntry::blank()
    }

    fn id(&self) -> EntryId {
        self.id
    }
}

impl RepeatedEntry for ExperienceEntry {
    const KIND: EntryKind = EntryKind::Experience;

    fn blank() -> Self {
        ExperienceEntry::blank()
    }

    fn id(&self) -> EntryId {
        self.id
    }
}

/// Handle for a scheduled removal. Completing a stale ticket is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemovalTicket {
    pub kind: EntryKind,
    pub id: EntryId,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct Repeater<T: RepeatedEntry> {
    entries: Vec<T>,
    pending: HashMap<EntryId, u64>,
    next_generation: u64,
}

impl<T: RepeatedEntry> Default for Repeater<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RepeatedEntry> Repeater<T> {
    /// A fresh collection always starts with one blank entry.
    pub fn new() -> Self {
        Self {
            entries: vec![T::blank()],
            pending: HashMap::new(),
            next_generation: 0,
        }
    }

    pub fn add(&mut self) -> EntryId {
        let entry = T::blank();
        let id = entry.id();
        self.entries.push(entry);
        id
    }

    pub fn get(&self, id: EntryId) -> Option<&T> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut T> {
        self.entries.iter_mut().find(|e| e.id() == id)
    }

    /// Starts the grace period for `id`. A repeated request supersedes the
    /// earlier ticket.
    pub fn begin_removal(&mut self, id: EntryId) -> Option<RemovalTicket> {
        self.get(id)?;
        self.next_generation += 1;
        let generation = self.next_generation;
        self.pending.insert(id, generation);
        Some(RemovalTicket {
            kind: T::KIND,
            id,
            generation,
        })
    }

    pub fn cancel_removal(&mut self, id: EntryId) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Detaches the entry if `ticket` is still the live one for it.
    pub fn complete_removal(&mut self, ticket: RemovalTicket) -> bool {
        if ticket.kind != T::KIND || self.pending.get(&ticket.id) != Some(&ticket.generation) {
            return false;
        }
        self.pending.remove(&ticket.id);
        self.remove_now(ticket.id)
    }

    pub fn remove_now(&mut self, id: EntryId) -> bool {
        self.pending.remove(&id);
        let before = self.entries.len();
        self.entries.retain(|e| e.id() != id);
        self.entries.len() != before
    }

    pub fn is_pending(&self, id: EntryId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn pending_ids(&self) -> Vec<EntryId> {
        self.entries
            .iter()
            .map(|e| e.id())
            .filter(|id| self.is_pending(*id))
            .collect()
    }

    /// Back to exactly one blank entry; every outstanding ticket goes stale.
    pub fn reset(&mut self) {
        self.entries = vec![T::blank()];
        self.pending.clear();
    }

    /// Replaces the collection wholesale, e.g. from a restored snapshot.
    pub fn replace(&mut self, entries: Vec<T>) {
        self.entries = entries;
        self.pending.clear();
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::form::{EntryField, FieldValue};

    #[test]
    fn test_new_starts_with_one_blank_entry() {
        let repeater: Repeater<EducationEntry> = Repeater::new();
        assert_eq!(repeater.entries().len(), 1);
        assert!(!repeater.entries()[0].is_present());
    }

    #[test]
    fn test_add_appends_in_order() {
        let mut repeater: Repeater<ExperienceEntry> = Repeater::new();
        let first = repeater.entries()[0].id;
        let second = repeater.add();
        let third = repeater.add();
        let ids: Vec<_> = repeater.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![first, second, third]);
    }

    #[test]
    fn test_entry_stays_counted_until_ticket_completes() {
        let mut repeater: Repeater<EducationEntry> = Repeater::new();
        let id = repeater.entries()[0].id;
        repeater
            .get_mut(id)
            .unwrap()
            .set(EntryField::Degree, FieldValue::Text("BS".into()));

        let ticket = repeater.begin_removal(id).unwrap();
        assert!(repeater.is_pending(id));
        assert!(repeater.get(id).unwrap().is_present());

        assert!(repeater.complete_removal(ticket));
        assert!(repeater.entries().is_empty());
    }

    #[test]
    fn test_begin_removal_unknown_id() {
        let mut repeater: Repeater<EducationEntry> = Repeater::new();
        assert!(repeater.begin_removal(EntryId::new()).is_none());
    }

    #[test]
    fn test_cancelled_ticket_is_stale() {
        let mut repeater: Repeater<EducationEntry> = Repeater::new();
        let id = repeater.entries()[0].id;
        let ticket = repeater.begin_removal(id).unwrap();
        assert!(repeater.cancel_removal(id));
        assert!(!repeater.complete_removal(ticket));
        assert_eq!(repeater.entries().len(), 1);
    }

    #[test]
    fn test_reset_invalidates_outstanding_tickets() {
        let mut repeater: Repeater<ExperienceEntry> = Repeater::new();
        let extra = repeater.add();
        let ticket = repeater.begin_removal(extra).unwrap();
        repeater.reset();
        assert!(!repeater.complete_removal(ticket));
        assert_eq!(repeater.entries().len(), 1);
        assert!(repeater.pending_ids().is_empty());
    }

    #[test]
    fn test_superseded_ticket_is_ignored() {
        let mut repeater: Repeater<EducationEntry> = Repeater::new();
        let id = repeater.entries()[0].id;
        let old = repeater.begin_removal(id).unwrap();
        let new = repeater.begin_removal(id).unwrap();
        assert!(!repeater.complete_removal(old));
        assert_eq!(repeater.entries().len(), 1);
        assert!(repeater.complete_removal(new));
        assert!(repeater.entries().is_empty());
    }

    #[test]
    fn test_ticket_for_other_kind_is_ignored() {
        let mut education: Repeater<EducationEntry> = Repeater::new();
        let id = education.entries()[0].id;
        let mut ticket = education.begin_removal(id).unwrap();
        ticket.kind = EntryKind::Experience;
        assert!(!education.complete_removal(ticket));
    }

    #[test]
    fn test_remove_now_skips_grace_period() {
        let mut repeater: Repeater<EducationEntry> = Repeater::new();
        let id = repeater.add();
        assert!(repeater.remove_now(id));
        assert!(!repeater.remove_now(id));
        assert_eq!(repeater.entries().len(), 1);
    }
}
