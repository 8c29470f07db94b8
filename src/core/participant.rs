use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::core::types::ParticipantId;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RosterError {
    #[error("Duplicate participant id: {0}")]
    DuplicateId(ParticipantId),
}

/// A person awaiting room placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,

    /// Display name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(id),
            name: name.into(),
            phone: None,
            email: None,
        }
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Ordered collection of participants, indexed by id.
///
/// Serializes as a plain list; the index is rebuilt on load and a list with
/// a repeated id is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Participant>", into = "Vec<Participant>")]
pub struct Roster {
    participants: Vec<Participant>,
    id_to_index: HashMap<ParticipantId, usize>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant, rejecting ids already on the roster
    pub fn add(&mut self, participant: Participant) -> Result<(), RosterError> {
        if self.id_to_index.contains_key(&participant.id) {
            return Err(RosterError::DuplicateId(participant.id));
        }
        self.id_to_index
            .insert(participant.id.clone(), self.participants.len());
        self.participants.push(participant);
        Ok(())
    }

    /// Add a participant or replace the existing record with the same id
    pub fn upsert(&mut self, participant: Participant) {
        if let Some(&idx) = self.id_to_index.get(&participant.id) {
            self.participants[idx] = participant;
        } else {
            self.id_to_index
                .insert(participant.id.clone(), self.participants.len());
            self.participants.push(participant);
        }
    }

    #[must_use]
    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.id_to_index.get(id).map(|&idx| &self.participants[idx])
    }

    #[must_use]
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.id_to_index.contains_key(id)
    }

    /// Display name for an id, falling back to the id itself
    #[must_use]
    pub fn display_name(&self, id: &ParticipantId) -> String {
        self.get(id)
            .map_or_else(|| id.to_string(), |p| p.name.clone())
    }

    /// Participant ids in roster order
    #[must_use]
    pub fn ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

impl TryFrom<Vec<Participant>> for Roster {
    type Error = RosterError;

    fn try_from(participants: Vec<Participant>) -> Result<Self, Self::Error> {
        let mut roster = Self::new();
        for participant in participants {
            roster.add(participant)?;
        }
        Ok(roster)
    }
}

impl From<Roster> for Vec<Participant> {
    fn from(roster: Roster) -> Self {
        roster.participants
    }
}
