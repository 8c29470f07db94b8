use serde::Serialize;

use crate::core::preference::PreferenceMapping;
use crate::core::room::RoomGrouping;
use crate::core::types::{ParticipantId, ROOM_SIZE};

/// How well a single participant's choices were honored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub participant: ParticipantId,

    /// 0-based index of the group the participant was placed in
    pub group: usize,

    /// Ranks (1-based) of the participant's choices sharing the group
    pub honored_ranks: Vec<usize>,
}

impl Placement {
    /// The participant's first choice shares the group
    #[must_use]
    pub fn got_first_choice(&self) -> bool {
        self.honored_ranks.contains(&1)
    }
}

/// Aggregate quality report for a room grouping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupingSummary {
    pub room_count: usize,

    /// Groups filled to [`ROOM_SIZE`]
    pub full_rooms: usize,

    /// Groups of one or two
    pub partial_rooms: usize,

    /// Groups in which every member ranks every other member
    pub mutual_triads: usize,

    /// Participants with none of their choices in their group
    pub unmatched: Vec<ParticipantId>,

    pub placements: Vec<Placement>,
}

impl GroupingSummary {
    /// Analyze a grouping against the preferences it was computed from
    #[must_use]
    pub fn analyze(preferences: &PreferenceMapping, grouping: &RoomGrouping) -> Self {
        let mut placements = Vec::new();
        let mut mutual_triads = 0;

        for (group_idx, group) in grouping.groups.iter().enumerate() {
            if is_mutual_group(preferences, group) {
                mutual_triads += 1;
            }

            for member in group {
                let honored_ranks = preferences.get(member).map_or_else(Vec::new, |entry| {
                    let mut ranks: Vec<usize> = group
                        .iter()
                        .filter_map(|other| entry.rank_of(other))
                        .collect();
                    ranks.sort_unstable();
                    ranks
                });

                placements.push(Placement {
                    participant: member.clone(),
                    group: group_idx,
                    honored_ranks,
                });
            }
        }

        let unmatched = placements
            .iter()
            .filter(|p| p.honored_ranks.is_empty())
            .map(|p| p.participant.clone())
            .collect();

        let full_rooms = grouping
            .groups
            .iter()
            .filter(|g| g.len() >= ROOM_SIZE)
            .count();

        Self {
            room_count: grouping.len(),
            full_rooms,
            partial_rooms: grouping.len() - full_rooms,
            mutual_triads,
            unmatched,
            placements,
        }
    }

    /// Fraction of placed participants sharing a room with their first choice
    #[must_use]
    pub fn first_choice_rate(&self) -> f64 {
        if self.placements.is_empty() {
            return 0.0;
        }
        let hits = self
            .placements
            .iter()
            .filter(|p| p.got_first_choice())
            .count();
        #[allow(clippy::cast_precision_loss)] // Participant counts are far below 2^52
        {
            hits as f64 / self.placements.len() as f64
        }
    }
}

fn is_mutual_group(preferences: &PreferenceMapping, group: &[ParticipantId]) -> bool {
    group.len() == ROOM_SIZE
        && group.iter().all(|member| {
            group
                .iter()
                .filter(|other| *other != member)
                .all(|other| preferences.ranks(member, other))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::preference::PreferenceEntry;
    use crate::matching::engine::compute_groupings;

    fn id(name: &str) -> ParticipantId {
        ParticipantId::new(name)
    }

    fn mapping(entries: &[(&str, [&str; 3])]) -> PreferenceMapping {
        entries
            .iter()
            .map(|(owner, choices)| {
                PreferenceEntry::new(id(owner), choices.iter().map(|c| id(c)).collect()).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_summary_of_triad_and_tail() {
        let prefs = mapping(&[
            ("A", ["B", "C", "D"]),
            ("B", ["A", "C", "E"]),
            ("C", ["A", "B", "D"]),
            ("D", ["A", "B", "C"]),
            ("E", ["A", "B", "C"]),
        ]);
        let grouping = compute_groupings(&prefs);
        let summary = GroupingSummary::analyze(&prefs, &grouping);

        assert_eq!(summary.room_count, 2);
        assert_eq!(summary.full_rooms, 1);
        assert_eq!(summary.partial_rooms, 1);
        assert_eq!(summary.mutual_triads, 1);
        assert_eq!(summary.unmatched, vec![id("D"), id("E")]);

        let a = &summary.placements[0];
        assert_eq!(a.participant, id("A"));
        assert_eq!(a.honored_ranks, vec![1, 2]);
        assert!(a.got_first_choice());
    }

    #[test]
    fn test_first_choice_rate_empty() {
        let summary = GroupingSummary::analyze(&PreferenceMapping::new(), &RoomGrouping::default());
        assert_eq!(summary.room_count, 0);
        assert!(summary.first_choice_rate().abs() < f64::EPSILON);
    }
}
