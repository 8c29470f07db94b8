use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::core::types::{ParticipantId, SelectionStatus, CHOICE_COUNT};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EntryError {
    #[error("Expected {CHOICE_COUNT} roommate choices, found {0}")]
    WrongCount(usize),

    #[error("Participant {0} cannot choose themselves")]
    SelfReference(ParticipantId),

    #[error("Roommate {0} was chosen more than once")]
    DuplicateChoice(ParticipantId),
}

/// A participant's ranked top-three roommate choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceEntry {
    pub owner: ParticipantId,

    /// Ranked choices, index 0 is rank 1
    pub choices: [ParticipantId; CHOICE_COUNT],
}

impl PreferenceEntry {
    /// Build an entry from a ranked list of choices.
    ///
    /// # Errors
    ///
    /// Returns `EntryError::WrongCount` unless exactly three choices are given,
    /// `EntryError::SelfReference` if the owner chose themselves, or
    /// `EntryError::DuplicateChoice` if a roommate appears twice.
    pub fn new(owner: ParticipantId, choices: Vec<ParticipantId>) -> Result<Self, EntryError> {
        let count = choices.len();
        let choices: [ParticipantId; CHOICE_COUNT] = choices
            .try_into()
            .map_err(|_| EntryError::WrongCount(count))?;

        for (i, choice) in choices.iter().enumerate() {
            if *choice == owner {
                return Err(EntryError::SelfReference(owner));
            }
            if choices[..i].contains(choice) {
                return Err(EntryError::DuplicateChoice(choice.clone()));
            }
        }

        Ok(Self { owner, choices })
    }

    /// Whether `id` is one of the ranked choices
    #[must_use]
    pub fn ranks(&self, id: &ParticipantId) -> bool {
        self.choices.contains(id)
    }

    /// 1-based rank of `id`, if chosen
    #[must_use]
    pub fn rank_of(&self, id: &ParticipantId) -> Option<usize> {
        self.choices.iter().position(|c| c == id).map(|i| i + 1)
    }
}

/// One roommate selection submitted by a participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub entry: PreferenceEntry,

    #[serde(default)]
    pub status: SelectionStatus,

    pub submitted_at: DateTime<Utc>,
}

impl Selection {
    pub fn new(entry: PreferenceEntry, status: SelectionStatus, submitted_at: DateTime<Utc>) -> Self {
        Self {
            entry,
            status,
            submitted_at,
        }
    }

    #[must_use]
    pub fn participant(&self) -> &ParticipantId {
        &self.entry.owner
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.status == SelectionStatus::Verified
    }
}

/// Each participant's current verified selection: the one with the latest
/// `submitted_at`, ties going to the later history position. Participants are
/// ordered by their first verified selection in the history.
#[must_use]
pub fn latest_verified(selections: &[Selection]) -> Vec<&Selection> {
    let mut order: Vec<&ParticipantId> = Vec::new();
    let mut latest: HashMap<&ParticipantId, &Selection> = HashMap::new();

    for selection in selections.iter().filter(|s| s.is_verified()) {
        match latest.get(selection.participant()) {
            Some(current) if current.submitted_at > selection.submitted_at => {}
            Some(_) => {
                latest.insert(selection.participant(), selection);
            }
            None => {
                order.push(selection.participant());
                latest.insert(selection.participant(), selection);
            }
        }
    }

    order.into_iter().filter_map(|id| latest.get(id).copied()).collect()
}

/// The engine's input: ordered participant ids plus their preference entries.
///
/// Iteration order is the order in which each participant first appeared.
/// Re-inserting a participant replaces the entry in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceMapping {
    order: Vec<ParticipantId>,
    entries: HashMap<ParticipantId, PreferenceEntry>,
}

impl PreferenceMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from a selection history using each participant's
    /// current verified selection (see [`latest_verified`]).
    #[must_use]
    pub fn from_selections(selections: &[Selection]) -> Self {
        latest_verified(selections)
            .into_iter()
            .map(|s| s.entry.clone())
            .collect()
    }

    /// Insert or replace the entry for its owner, returning the replaced entry
    pub fn insert(&mut self, entry: PreferenceEntry) -> Option<PreferenceEntry> {
        let owner = entry.owner.clone();
        let previous = self.entries.insert(owner.clone(), entry);
        if previous.is_none() {
            self.order.push(owner);
        }
        previous
    }

    #[must_use]
    pub fn get(&self, id: &ParticipantId) -> Option<&PreferenceEntry> {
        self.entries.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.entries.contains_key(id)
    }

    /// Whether `who` has submitted and ranks `target`
    #[must_use]
    pub fn ranks(&self, who: &ParticipantId, target: &ParticipantId) -> bool {
        self.entries.get(who).is_some_and(|e| e.ranks(target))
    }

    /// Participant ids in iteration order
    #[must_use]
    pub fn participants(&self) -> &[ParticipantId] {
        &self.order
    }

    /// Entries in iteration order
    pub fn iter(&self) -> impl Iterator<Item = &PreferenceEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Copy of this mapping without the given participants as keys.
    /// Their ids may still appear inside other participants' choices.
    #[must_use]
    pub fn without<'a, I>(&self, excluded: I) -> Self
    where
        I: IntoIterator<Item = &'a ParticipantId>,
    {
        let excluded: std::collections::HashSet<&ParticipantId> = excluded.into_iter().collect();
        let mut mapping = Self::new();
        for entry in self.iter().filter(|e| !excluded.contains(&e.owner)) {
            mapping.insert(entry.clone());
        }
        mapping
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl FromIterator<PreferenceEntry> for PreferenceMapping {
    fn from_iter<T: IntoIterator<Item = PreferenceEntry>>(iter: T) -> Self {
        let mut mapping = Self::new();
        for entry in iter {
            mapping.insert(entry);
        }
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ids(names: &[&str]) -> Vec<ParticipantId> {
        names.iter().map(|n| ParticipantId::new(*n)).collect()
    }

    fn entry(owner: &str, choices: &[&str]) -> PreferenceEntry {
        PreferenceEntry::new(ParticipantId::new(owner), ids(choices)).unwrap()
    }

    #[test]
    fn test_entry_rejects_wrong_count() {
        let err = PreferenceEntry::new(ParticipantId::new("a"), ids(&["b", "c"])).unwrap_err();
        assert_eq!(err, EntryError::WrongCount(2));

        let err =
            PreferenceEntry::new(ParticipantId::new("a"), ids(&["b", "c", "d", "e"])).unwrap_err();
        assert_eq!(err, EntryError::WrongCount(4));
    }

    #[test]
    fn test_entry_rejects_self_reference() {
        let err = PreferenceEntry::new(ParticipantId::new("a"), ids(&["b", "a", "c"])).unwrap_err();
        assert_eq!(err, EntryError::SelfReference(ParticipantId::new("a")));
    }

    #[test]
    fn test_entry_rejects_duplicates() {
        let err = PreferenceEntry::new(ParticipantId::new("a"), ids(&["b", "c", "b"])).unwrap_err();
        assert_eq!(err, EntryError::DuplicateChoice(ParticipantId::new("b")));
    }

    #[test]
    fn test_rank_of() {
        let e = entry("a", &["b", "c", "d"]);
        assert_eq!(e.rank_of(&ParticipantId::new("b")), Some(1));
        assert_eq!(e.rank_of(&ParticipantId::new("d")), Some(3));
        assert_eq!(e.rank_of(&ParticipantId::new("z")), None);
    }

    #[test]
    fn test_mapping_keeps_first_insertion_order_on_supersede() {
        let mut mapping = PreferenceMapping::new();
        mapping.insert(entry("a", &["b", "c", "d"]));
        mapping.insert(entry("b", &["a", "c", "d"]));
        let previous = mapping.insert(entry("a", &["d", "c", "b"]));

        assert!(previous.is_some());
        assert_eq!(mapping.participants(), ids(&["a", "b"]).as_slice());
        assert_eq!(
            mapping.get(&ParticipantId::new("a")).unwrap().choices[0],
            ParticipantId::new("d")
        );
    }

    #[test]
    fn test_from_selections_ignores_pending() {
        let now = Utc::now();
        let selections = vec![
            Selection::new(entry("a", &["b", "c", "d"]), SelectionStatus::Verified, now),
            Selection::new(entry("b", &["a", "c", "d"]), SelectionStatus::Pending, now),
            Selection::new(entry("a", &["c", "b", "d"]), SelectionStatus::Verified, now),
        ];

        let mapping = PreferenceMapping::from_selections(&selections);
        assert_eq!(mapping.len(), 1);
        assert!(!mapping.contains(&ParticipantId::new("b")));
        assert_eq!(
            mapping.get(&ParticipantId::new("a")).unwrap().rank_of(&ParticipantId::new("c")),
            Some(1)
        );
    }

    #[test]
    fn test_from_selections_uses_latest_timestamp() {
        let older = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap();
        let selections = vec![
            Selection::new(entry("a", &["c", "b", "d"]), SelectionStatus::Verified, newer),
            Selection::new(entry("b", &["a", "c", "d"]), SelectionStatus::Verified, older),
            Selection::new(entry("a", &["b", "c", "d"]), SelectionStatus::Verified, older),
        ];

        let mapping = PreferenceMapping::from_selections(&selections);
        assert_eq!(mapping.participants(), ids(&["a", "b"]).as_slice());
        assert_eq!(
            mapping.get(&ParticipantId::new("a")).unwrap().choices[0],
            ParticipantId::new("c")
        );
    }

    #[test]
    fn test_latest_verified_tie_goes_to_later_entry() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let selections = vec![
            Selection::new(entry("a", &["b", "c", "d"]), SelectionStatus::Verified, at),
            Selection::new(entry("a", &["d", "c", "b"]), SelectionStatus::Verified, at),
        ];

        let latest = latest_verified(&selections);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].entry.choices[0], ParticipantId::new("d"));
    }

    #[test]
    fn test_without_removes_keys_only() {
        let mapping: PreferenceMapping = vec![
            entry("a", &["b", "c", "d"]),
            entry("b", &["a", "c", "d"]),
            entry("c", &["a", "b", "d"]),
        ]
        .into_iter()
        .collect();

        let excluded = ids(&["b"]);
        let reduced = mapping.without(&excluded);
        assert_eq!(reduced.participants(), ids(&["a", "c"]).as_slice());
        assert!(reduced.ranks(&ParticipantId::new("a"), &ParticipantId::new("b")));
    }
}
