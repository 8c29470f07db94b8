use serde::Serialize;
use tracing::{debug, info};

use crate::assignment::store::Workspace;
use crate::core::preference::PreferenceMapping;
use crate::core::room::{Room, RoomGrouping, RoomLayout};
use crate::core::types::ParticipantId;
use crate::matching::engine::compute_groupings;
use crate::matching::summary::GroupingSummary;

/// Outcome of a generation run: the engine's grouping and the layout it produces
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentPlan {
    pub grouping: RoomGrouping,
    pub summary: GroupingSummary,
    pub layout: RoomLayout,

    /// Participants kept out of the run because a finalized room holds them
    pub locked: Vec<ParticipantId>,

    /// Roster participants without a verified selection; left unplaced
    pub unplaceable: Vec<ParticipantId>,
}

/// Turn a grouping into a layout.
///
/// Finalized rooms are kept unchanged and in place; every other room is
/// dropped. Each group becomes a new open room named with the next free
/// "Room N".
#[must_use]
pub fn materialize(current: &RoomLayout, grouping: &RoomGrouping) -> RoomLayout {
    let mut layout = RoomLayout::new(current.rooms.iter().filter(|r| r.finalized).cloned().collect());
    let kept = layout.len();

    for group in &grouping.groups {
        let name = layout.next_room_name();
        layout.rooms.push(Room::new(name, group.clone()));
    }

    debug!(
        kept,
        dropped = current.len() - kept,
        created = grouping.len(),
        "Materialized grouping"
    );

    layout
}

/// Run the matching engine over a workspace and materialize the result.
///
/// Uses verified selections only. Participants already held by a finalized
/// room are excluded from the run.
#[must_use]
pub fn plan_assignments(workspace: &Workspace) -> AssignmentPlan {
    let locked = workspace.layout.finalized_members();
    let preferences = PreferenceMapping::from_selections(&workspace.selections).without(&locked);

    let grouping = compute_groupings(&preferences);
    let summary = GroupingSummary::analyze(&preferences, &grouping);
    let layout = materialize(&workspace.layout, &grouping);

    let unplaceable: Vec<ParticipantId> = workspace
        .roster
        .iter()
        .map(|p| &p.id)
        .filter(|id| !preferences.contains(id) && !locked.contains(id))
        .cloned()
        .collect();

    info!(
        "Planned {} rooms for {} participants ({} locked, {} without a selection)",
        grouping.len(),
        preferences.len(),
        locked.len(),
        unplaceable.len()
    );

    AssignmentPlan {
        grouping,
        summary,
        layout,
        locked,
        unplaceable,
    }
}
