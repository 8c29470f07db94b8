use std::collections::HashSet;

use tracing::debug;

use crate::core::preference::{PreferenceEntry, PreferenceMapping};
use crate::core::room::RoomGrouping;
use crate::core::types::{ParticipantId, ROOM_SIZE};

/// Choice-index pairs examined for a mutual triad, in this exact order
const CHOICE_PAIRS: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];

/// Partition every participant with a preference entry into rooms.
///
/// Convenience wrapper around [`MatchingEngine::compute_groupings`].
#[must_use]
pub fn compute_groupings(preferences: &PreferenceMapping) -> RoomGrouping {
    MatchingEngine::new(preferences).compute_groupings()
}

/// The room matching engine.
///
/// Runs two deterministic passes over the mapping in its iteration order:
/// mutual-triad discovery, then greedy packing of everyone left over.
pub struct MatchingEngine<'a> {
    preferences: &'a PreferenceMapping,
}

impl<'a> MatchingEngine<'a> {
    pub fn new(preferences: &'a PreferenceMapping) -> Self {
        Self { preferences }
    }

    /// Compute the room grouping.
    ///
    /// Every key of the mapping lands in exactly one group. Ranked ids without
    /// an entry of their own are never placed.
    #[must_use]
    pub fn compute_groupings(&self) -> RoomGrouping {
        let preferences = self.preferences;
        let mut assigned: HashSet<&ParticipantId> = HashSet::new();

        let mut groups = self.find_mutual_triads(&mut assigned);
        let triads = groups.len();

        let unassigned: Vec<&ParticipantId> = preferences
            .participants()
            .iter()
            .filter(|id| !assigned.contains(id))
            .collect();
        groups.extend(self.pack_leftovers(unassigned));

        debug!(
            participants = preferences.len(),
            mutual_triads = triads,
            rooms = groups.len(),
            "Computed room groupings"
        );

        RoomGrouping::new(groups)
    }

    /// Pass 1: commit the first mutually-ranking pair found for each participant
    fn find_mutual_triads(
        &self,
        assigned: &mut HashSet<&'a ParticipantId>,
    ) -> Vec<Vec<ParticipantId>> {
        let preferences = self.preferences;
        let mut triads = Vec::new();

        for entry in preferences.iter() {
            if assigned.contains(&entry.owner) {
                continue;
            }

            let pair = CHOICE_PAIRS.iter().find_map(|&(i, j)| {
                let (first, second) = (&entry.choices[i], &entry.choices[j]);
                (!assigned.contains(first)
                    && !assigned.contains(second)
                    && self.is_mutual_triad(entry, first, second))
                .then_some((first, second))
            });

            if let Some((first, second)) = pair {
                debug!("Mutual triad: {}, {}, {}", entry.owner, first, second);
                assigned.insert(&entry.owner);
                assigned.insert(first);
                assigned.insert(second);
                triads.push(vec![entry.owner.clone(), first.clone(), second.clone()]);
            }
        }

        triads
    }

    /// Both choices have submitted, both rank the owner, and they rank each other
    fn is_mutual_triad(
        &self,
        entry: &PreferenceEntry,
        first: &ParticipantId,
        second: &ParticipantId,
    ) -> bool {
        let (Some(first_entry), Some(second_entry)) =
            (self.preferences.get(first), self.preferences.get(second))
        else {
            return false;
        };

        first_entry.ranks(&entry.owner)
            && second_entry.ranks(&entry.owner)
            && second_entry.ranks(first)
            && first_entry.ranks(second)
    }

    /// Pass 2: fill rooms of three from each leader's ranked list, then in order
    fn pack_leftovers(&self, mut unassigned: Vec<&'a ParticipantId>) -> Vec<Vec<ParticipantId>> {
        let mut rooms = Vec::new();

        while !unassigned.is_empty() {
            if unassigned.len() < ROOM_SIZE {
                rooms.push(unassigned.iter().map(|&id| id.clone()).collect());
                break;
            }

            let leader = unassigned[0];
            let mut room: Vec<&ParticipantId> = vec![leader];

            if let Some(entry) = self.preferences.get(leader) {
                for choice in &entry.choices {
                    if room.len() >= ROOM_SIZE {
                        break;
                    }
                    if unassigned.contains(&choice) && !room.contains(&choice) {
                        room.push(choice);
                    }
                }
            }

            for &candidate in &unassigned {
                if room.len() >= ROOM_SIZE {
                    break;
                }
                if !room.contains(&candidate) {
                    room.push(candidate);
                }
            }

            if room.len() < ROOM_SIZE {
                break;
            }

            unassigned.retain(|id| !room.contains(id));
            rooms.push(room.into_iter().cloned().collect());
        }

        rooms
    }
}
