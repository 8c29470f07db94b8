//! Room matching engine and grouping analysis.
//!
//! - [`MatchingEngine`](engine::MatchingEngine): partitions participants into rooms
//! - [`GroupingSummary`](summary::GroupingSummary): how well a grouping honors preferences
//!
//! ## Matching Algorithm
//!
//! The engine is a deterministic two-pass heuristic, not an optimal
//! stable-roommates solver:
//!
//! 1. **Mutual triads**: for each participant in order, the first pair of their
//!    choices (examined as ranks 1+2, 1+3, then 2+3) in which everyone ranks
//!    everyone else is committed as a room.
//! 2. **Greedy packing**: everyone left is packed into rooms of three, led by the
//!    first remaining participant and filled from their ranked choices, then from
//!    whoever remains in order. A tail of one or two forms a final partial room.
//!
//! ## Example
//!
//! ```rust
//! use room_solver::core::preference::{PreferenceEntry, PreferenceMapping};
//! use room_solver::core::types::ParticipantId;
//! use room_solver::matching::engine::compute_groupings;
//!
//! let entry = |owner: &str, choices: [&str; 3]| {
//!     PreferenceEntry::new(
//!         ParticipantId::new(owner),
//!         choices.iter().map(|c| ParticipantId::new(*c)).collect(),
//!     )
//!     .unwrap()
//! };
//!
//! let prefs: PreferenceMapping = vec![
//!     entry("ana", ["ben", "cat", "dan"]),
//!     entry("ben", ["ana", "cat", "dan"]),
//!     entry("cat", ["ana", "ben", "dan"]),
//! ]
//! .into_iter()
//! .collect();
//!
//! let grouping = compute_groupings(&prefs);
//! assert_eq!(grouping.len(), 1);
//! ```

pub mod engine;
pub mod summary;
