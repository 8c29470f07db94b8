use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{ParticipantId, RoomId};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RoomError {
    #[error("Room not found: {0}")]
    NotFound(RoomId),

    #[error("Room {0} is finalized and cannot be changed")]
    Finalized(RoomId),
}

/// Display-name prefix for generated rooms
pub const ROOM_NAME_PREFIX: &str = "Room";

/// Anything that can be viewed as a list of room member lists
pub trait RoomMembers {
    fn member_lists(&self) -> Vec<&[ParticipantId]>;
}

/// The matching engine's transient output: a partition of participants into rooms
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomGrouping {
    pub groups: Vec<Vec<ParticipantId>>,
}

impl RoomGrouping {
    pub fn new(groups: Vec<Vec<ParticipantId>>) -> Self {
        Self { groups }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of placed participants
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }
}

impl RoomMembers for RoomGrouping {
    fn member_lists(&self) -> Vec<&[ParticipantId]> {
        self.groups.iter().map(Vec::as_slice).collect()
    }
}

/// A persisted room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,

    pub name: String,

    /// Finalized rooms are never altered by generation or bulk edits
    #[serde(default)]
    pub finalized: bool,

    pub members: Vec<ParticipantId>,
}

impl Room {
    pub fn new(name: impl Into<String>, members: Vec<ParticipantId>) -> Self {
        Self {
            id: RoomId::generate(),
            name: name.into(),
            finalized: false,
            members,
        }
    }

    #[must_use]
    pub fn finalized(mut self) -> Self {
        self.finalized = true;
        self
    }

    #[must_use]
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.members.contains(id)
    }
}

/// Ordered set of persisted rooms
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomLayout {
    pub rooms: Vec<Room>,
}

impl RoomLayout {
    pub fn new(rooms: Vec<Room>) -> Self {
        Self { rooms }
    }

    #[must_use]
    pub fn get(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == *id)
    }

    pub fn get_mut(&mut self, id: &RoomId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.id == *id)
    }

    /// The room currently holding a participant
    #[must_use]
    pub fn room_of(&self, participant: &ParticipantId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.contains(participant))
    }

    /// Members of all finalized rooms, in layout order
    #[must_use]
    pub fn finalized_members(&self) -> Vec<ParticipantId> {
        self.rooms
            .iter()
            .filter(|r| r.finalized)
            .flat_map(|r| r.members.iter().cloned())
            .collect()
    }

    /// First "Room N" name (N >= 1) not already used in this layout
    #[must_use]
    pub fn next_room_name(&self) -> String {
        (1..)
            .map(|n| format!("{ROOM_NAME_PREFIX} {n}"))
            .find(|name| !self.rooms.iter().any(|r| r.name == *name))
            .unwrap_or_else(|| ROOM_NAME_PREFIX.to_string())
    }

    /// Remove a non-finalized room.
    ///
    /// # Errors
    ///
    /// Returns `RoomError::NotFound` for an unknown id or
    /// `RoomError::Finalized` if the room is locked.
    pub fn delete_room(&mut self, id: &RoomId) -> Result<Room, RoomError> {
        let idx = self
            .rooms
            .iter()
            .position(|r| r.id == *id)
            .ok_or_else(|| RoomError::NotFound(id.clone()))?;
        if self.rooms[idx].finalized {
            return Err(RoomError::Finalized(id.clone()));
        }
        Ok(self.rooms.remove(idx))
    }

    /// Lock or unlock a room.
    ///
    /// # Errors
    ///
    /// Returns `RoomError::NotFound` for an unknown id.
    pub fn set_finalized(&mut self, id: &RoomId, finalized: bool) -> Result<(), RoomError> {
        let room = self
            .get_mut(id)
            .ok_or_else(|| RoomError::NotFound(id.clone()))?;
        room.finalized = finalized;
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl RoomMembers for RoomLayout {
    fn member_lists(&self) -> Vec<&[ParticipantId]> {
        self.rooms.iter().map(|r| r.members.as_slice()).collect()
    }
}
