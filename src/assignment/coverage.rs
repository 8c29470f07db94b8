use serde::Serialize;
use std::collections::HashMap;

use crate::core::room::RoomMembers;
use crate::core::types::ParticipantId;

/// Result of checking that every participant is assigned exactly once
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub ok: bool,

    /// Participants in no room, in input order
    pub unassigned: Vec<ParticipantId>,

    /// Participants in more than one room, in input order
    pub duplicated: Vec<ParticipantId>,
}

/// Check that every id in `all_participants` appears in exactly one room.
///
/// Usable for both persisted layouts and transient groupings. Members of the
/// layout that are not in `all_participants` are ignored.
#[must_use]
pub fn validate_full_coverage<L: RoomMembers + ?Sized>(
    all_participants: &[ParticipantId],
    layout: &L,
) -> CoverageReport {
    let mut room_counts: HashMap<&ParticipantId, usize> = HashMap::new();
    for members in layout.member_lists() {
        for member in members {
            *room_counts.entry(member).or_default() += 1;
        }
    }

    let unassigned: Vec<ParticipantId> = all_participants
        .iter()
        .filter(|id| !room_counts.contains_key(id))
        .cloned()
        .collect();

    let duplicated: Vec<ParticipantId> = all_participants
        .iter()
        .filter(|id| room_counts.get(id).is_some_and(|&n| n > 1))
        .cloned()
        .collect();

    CoverageReport {
        ok: unassigned.is_empty() && duplicated.is_empty(),
        unassigned,
        duplicated,
    }
}
