use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::participant::Roster;
use crate::core::room::{Room, RoomLayout};
use crate::core::types::{ParticipantId, RoomId};
use crate::utils::validation::sanitize_name;

/// Which room an edit targets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum RoomRef {
    /// Create a room (`"new"`, `null`, or absent)
    #[default]
    New,
    /// Replace an existing room
    Existing(RoomId),
}

impl From<Option<String>> for RoomRef {
    fn from(value: Option<String>) -> Self {
        match value {
            None => Self::New,
            Some(s) if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("new") => Self::New,
            Some(s) => Self::Existing(RoomId::new(s.trim())),
        }
    }
}

impl From<RoomRef> for Option<String> {
    fn from(value: RoomRef) -> Self {
        match value {
            RoomRef::New => Some("new".to_string()),
            RoomRef::Existing(id) => Some(id.0),
        }
    }
}

/// One manually edited room, as sent by the arrange view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomEdit {
    #[serde(default)]
    pub room_id: RoomRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub player_ids: Vec<ParticipantId>,
}

impl RoomEdit {
    pub fn existing(id: RoomId, player_ids: Vec<ParticipantId>) -> Self {
        Self {
            room_id: RoomRef::Existing(id),
            name: None,
            player_ids,
        }
    }

    pub fn new_room(player_ids: Vec<ParticipantId>) -> Self {
        Self {
            room_id: RoomRef::New,
            name: None,
            player_ids,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// What a reconciliation changed and what it skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub updated: Vec<RoomId>,
    pub created: Vec<RoomId>,
    pub deleted: Vec<RoomId>,

    /// Edits ignored because their room is finalized
    pub skipped_finalized: Vec<RoomId>,

    /// Edits ignored because their room does not exist
    pub unknown_rooms: Vec<RoomId>,

    /// Member references dropped because the participant is not registered
    pub unknown_participants: Vec<ParticipantId>,

    /// Member references dropped because a finalized room holds the participant
    pub locked_participants: Vec<ParticipantId>,

    /// Rooms left unchanged because none of their edit's members could be placed
    pub unresolved_rooms: Vec<RoomId>,
}

impl ReconcileReport {
    #[must_use]
    pub fn has_skips(&self) -> bool {
        !(self.skipped_finalized.is_empty()
            && self.unknown_rooms.is_empty()
            && self.unknown_participants.is_empty()
            && self.locked_participants.is_empty()
            && self.unresolved_rooms.is_empty())
    }
}

/// The reconciled layout together with its report
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub layout: RoomLayout,
    pub report: ReconcileReport,
}

/// Apply manual room edits to a layout.
///
/// Edits are applied in order, each a full overwrite of one room's membership:
/// - finalized rooms are never touched
/// - an edit with an empty member list deletes its room (or creates nothing)
/// - an edit whose members are all skipped leaves its room unchanged
/// - unknown room ids and unregistered participants are skipped, not fatal
/// - a moved participant leaves whichever other open room held them
///
/// The input layout is not modified; callers commit the returned layout as a
/// whole.
#[must_use]
pub fn reconcile(current: &RoomLayout, edits: &[RoomEdit], roster: &Roster) -> Reconciliation {
    let mut layout = current.clone();
    let mut report = ReconcileReport::default();

    for edit in edits {
        let target = match &edit.room_id {
            RoomRef::Existing(id) => match layout.get(id) {
                None => {
                    warn!("Skipping edit for unknown room {id}");
                    report.unknown_rooms.push(id.clone());
                    continue;
                }
                Some(room) if room.finalized => {
                    warn!("Skipping edit for finalized room {id}");
                    report.skipped_finalized.push(id.clone());
                    continue;
                }
                Some(_) => Some(id.clone()),
            },
            RoomRef::New => None,
        };

        let members = resolve_members(&layout, &edit.player_ids, roster, &mut report);
        let name = edit.name.as_deref().and_then(|n| match sanitize_name(n) {
            Ok(name) => Some(name),
            Err(e) => {
                warn!("Ignoring room name '{n}': {e}");
                None
            }
        });

        if edit.player_ids.is_empty() {
            if let Some(id) = target {
                if layout.delete_room(&id).is_ok() {
                    report.deleted.push(id);
                }
            }
            continue;
        }

        if members.is_empty() {
            if let Some(id) = target {
                warn!("Leaving room {id} unchanged: none of its edit's members can be placed");
                report.unresolved_rooms.push(id);
            }
            continue;
        }

        for room in layout
            .rooms
            .iter_mut()
            .filter(|r| !r.finalized && Some(&r.id) != target.as_ref())
        {
            room.members.retain(|m| !members.contains(m));
        }

        match target {
            Some(id) => {
                if let Some(room) = layout.get_mut(&id) {
                    room.members = members;
                    if let Some(name) = name {
                        room.name = name;
                    }
                    report.updated.push(id);
                }
            }
            None => {
                let name = name.unwrap_or_else(|| layout.next_room_name());
                let room = Room::new(name, members);
                report.created.push(room.id.clone());
                layout.rooms.push(room);
            }
        }
    }

    Reconciliation { layout, report }
}

/// Registered, unlocked, de-duplicated members of an edit, in payload order
fn resolve_members(
    layout: &RoomLayout,
    player_ids: &[ParticipantId],
    roster: &Roster,
    report: &mut ReconcileReport,
) -> Vec<ParticipantId> {
    let mut members: Vec<ParticipantId> = Vec::with_capacity(player_ids.len());

    for id in player_ids {
        if members.contains(id) {
            continue;
        }
        if !roster.contains(id) {
            warn!("Skipping unknown participant {id}");
            report.unknown_participants.push(id.clone());
            continue;
        }
        if layout.room_of(id).is_some_and(|r| r.finalized) {
            warn!("Skipping participant {id}: held by a finalized room");
            report.locked_participants.push(id.clone());
            continue;
        }
        members.push(id.clone());
    }

    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::participant::Participant;

    fn ids(names: &[&str]) -> Vec<ParticipantId> {
        names.iter().map(|n| ParticipantId::new(*n)).collect()
    }

    fn roster(names: &[&str]) -> Roster {
        let mut roster = Roster::new();
        for n in names {
            roster.add(Participant::new(*n, *n)).unwrap();
        }
        roster
    }

    fn members(layout: &RoomLayout, id: &RoomId) -> Vec<ParticipantId> {
        layout.get(id).unwrap().members.clone()
    }

    #[test]
    fn test_room_ref_from_payload_values() {
        let edits: Vec<RoomEdit> = serde_json::from_str(
            r#"[
                {"room_id": "new", "player_ids": ["a"]},
                {"player_ids": ["b"]},
                {"room_id": null, "player_ids": []},
                {"room_id": "abc", "name": "Suite", "player_ids": ["c"]}
            ]"#,
        )
        .unwrap();

        assert_eq!(edits[0].room_id, RoomRef::New);
        assert_eq!(edits[1].room_id, RoomRef::New);
        assert_eq!(edits[2].room_id, RoomRef::New);
        assert_eq!(edits[3].room_id, RoomRef::Existing(RoomId::new("abc")));
        assert_eq!(edits[3].name.as_deref(), Some("Suite"));
    }

    #[test]
    fn test_finalized_room_is_immune() {
        let locked = Room::new("Room 1", ids(&["a", "b", "c"])).finalized();
        let locked_id = locked.id.clone();
        let current = RoomLayout::new(vec![locked]);
        let roster = roster(&["a", "b", "c", "d"]);

        let edits = vec![
            RoomEdit::existing(locked_id.clone(), ids(&["d"])),
            RoomEdit::existing(locked_id.clone(), vec![]),
        ];
        let result = reconcile(&current, &edits, &roster);

        assert_eq!(members(&result.layout, &locked_id), ids(&["a", "b", "c"]));
        assert_eq!(result.report.skipped_finalized, vec![locked_id.clone(), locked_id]);
        assert!(result.report.deleted.is_empty());
    }

    #[test]
    fn test_members_of_finalized_room_cannot_be_moved() {
        let locked = Room::new("Room 1", ids(&["a", "b", "c"])).finalized();
        let current = RoomLayout::new(vec![locked]);
        let roster = roster(&["a", "b", "c", "d"]);

        let result = reconcile(&current, &[RoomEdit::new_room(ids(&["a", "d"]))], &roster);

        assert_eq!(result.layout.len(), 2);
        assert_eq!(result.layout.rooms[1].members, ids(&["d"]));
        assert_eq!(result.report.locked_participants, ids(&["a"]));
        assert_eq!(result.layout.rooms[0].members, ids(&["a", "b", "c"]));
    }

    #[test]
    fn test_membership_is_replaced_wholesale() {
        let room = Room::new("Room 1", ids(&["a", "b", "c"]));
        let id = room.id.clone();
        let current = RoomLayout::new(vec![room]);
        let roster = roster(&["a", "b", "c", "d"]);

        let edit = RoomEdit::existing(id.clone(), ids(&["d", "a"])).with_name("Corner suite");
        let result = reconcile(&current, &[edit], &roster);

        assert_eq!(members(&result.layout, &id), ids(&["d", "a"]));
        assert_eq!(result.layout.get(&id).unwrap().name, "Corner suite");
        assert_eq!(result.report.updated, vec![id]);
        // Input layout is untouched
        assert_eq!(current.rooms[0].members, ids(&["a", "b", "c"]));
    }

    #[test]
    fn test_empty_edit_deletes_existing_room() {
        let room = Room::new("Room 1", ids(&["a"]));
        let id = room.id.clone();
        let current = RoomLayout::new(vec![room]);

        let result = reconcile(&current, &[RoomEdit::existing(id.clone(), vec![])], &roster(&["a"]));
        assert!(result.layout.is_empty());
        assert_eq!(result.report.deleted, vec![id]);
    }

    #[test]
    fn test_edit_naming_only_unknown_ids_keeps_room() {
        let room = Room::new("Room 1", ids(&["b", "c"]));
        let id = room.id.clone();
        let current = RoomLayout::new(vec![room]);

        let result = reconcile(
            &current,
            &[RoomEdit::existing(id.clone(), ids(&["ghost"]))],
            &roster(&["b", "c"]),
        );

        assert_eq!(members(&result.layout, &id), ids(&["b", "c"]));
        assert!(result.report.deleted.is_empty());
        assert!(result.report.updated.is_empty());
        assert_eq!(result.report.unknown_participants, ids(&["ghost"]));
        assert_eq!(result.report.unresolved_rooms, vec![id]);
        assert!(result.report.has_skips());
    }

    #[test]
    fn test_edit_with_only_locked_members_creates_nothing() {
        let locked = Room::new("Room 1", ids(&["a", "b", "c"])).finalized();
        let current = RoomLayout::new(vec![locked]);

        let result = reconcile(&current, &[RoomEdit::new_room(ids(&["a"]))], &roster(&["a", "b", "c"]));

        assert_eq!(result.layout.len(), 1);
        assert!(result.report.created.is_empty());
        assert_eq!(result.report.locked_participants, ids(&["a"]));
    }

    #[test]
    fn test_empty_new_room_is_not_created() {
        let result = reconcile(&RoomLayout::default(), &[RoomEdit::new_room(vec![])], &roster(&[]));
        assert!(result.layout.is_empty());
        assert!(result.report.created.is_empty());
    }

    #[test]
    fn test_unknown_participant_is_skipped_rest_commits() {
        let roster = roster(&["a", "b"]);
        let result = reconcile(
            &RoomLayout::default(),
            &[RoomEdit::new_room(ids(&["a", "ghost", "b", "a"]))],
            &roster,
        );

        assert_eq!(result.layout.rooms[0].members, ids(&["a", "b"]));
        assert_eq!(result.layout.rooms[0].name, "Room 1");
        assert_eq!(result.report.unknown_participants, ids(&["ghost"]));
        assert!(result.report.has_skips());
    }

    #[test]
    fn test_unknown_room_is_skipped() {
        let result = reconcile(
            &RoomLayout::default(),
            &[RoomEdit::existing(RoomId::new("missing"), ids(&["a"]))],
            &roster(&["a"]),
        );
        assert!(result.layout.is_empty());
        assert_eq!(result.report.unknown_rooms, vec![RoomId::new("missing")]);
    }

    #[test]
    fn test_moved_participant_leaves_previous_room() {
        let first = Room::new("Room 1", ids(&["a", "b", "c"]));
        let second = Room::new("Room 2", ids(&["d"]));
        let (first_id, second_id) = (first.id.clone(), second.id.clone());
        let current = RoomLayout::new(vec![first, second]);
        let roster = roster(&["a", "b", "c", "d"]);

        let result = reconcile(
            &current,
            &[RoomEdit::existing(second_id.clone(), ids(&["d", "c"]))],
            &roster,
        );

        assert_eq!(members(&result.layout, &first_id), ids(&["a", "b"]));
        assert_eq!(members(&result.layout, &second_id), ids(&["d", "c"]));
    }

    #[test]
    fn test_reapplying_same_edits_is_idempotent() {
        let room = Room::new("Room 1", ids(&["a", "b", "c"]));
        let id = room.id.clone();
        let current = RoomLayout::new(vec![room]);
        let roster = roster(&["a", "b", "c"]);
        let edits = vec![RoomEdit::existing(id, ids(&["c", "b"]))];

        let once = reconcile(&current, &edits, &roster).layout;
        let twice = reconcile(&once, &edits, &roster).layout;
        assert_eq!(once, twice);
    }
}
