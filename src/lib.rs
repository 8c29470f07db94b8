//! # room-solver
//!
//! A library for assigning participants to rooms of three based on the
//! roommates each of them ranked.
//!
//! Every participant names three preferred roommates in order. The matching
//! engine first keeps together any three people who all chose each other,
//! then packs everyone else greedily, following each leader's ranked choices
//! before falling back to whoever is still unplaced.
//!
//! Generated rooms are persisted in a workspace where they can be edited by
//! hand and finalized. Finalized rooms are never touched again by generation
//! or edits.
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use room_solver::assignment::materialize::plan_assignments;
//! use room_solver::{
//!     Participant, ParticipantId, PreferenceEntry, Selection, SelectionStatus, Workspace,
//! };
//!
//! let mut workspace = Workspace::default();
//! for id in ["ana", "ben", "cat", "dan"] {
//!     workspace.roster.add(Participant::new(id, id)).unwrap();
//! }
//!
//! let choices: Vec<ParticipantId> = ["ben", "cat", "dan"].into_iter().map(ParticipantId::new).collect();
//! let entry = PreferenceEntry::new(ParticipantId::new("ana"), choices).unwrap();
//! workspace
//!     .add_selection(Selection::new(entry, SelectionStatus::Verified, Utc::now()))
//!     .unwrap();
//!
//! let plan = plan_assignments(&workspace);
//!
//! // Only ana has submitted, so only ana is placed
//! assert_eq!(plan.grouping.participant_count(), 1);
//! assert_eq!(plan.unplaceable.len(), 3);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Participants, preference entries, and rooms
//! - [`matching`]: The grouping engine and its quality summary
//! - [`assignment`]: Persisted layouts, manual edits, and coverage checks
//! - [`parsing`]: Roster, selection, and room-edit readers
//! - [`export`]: CSV/TSV export of selections
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: JSON API server

pub mod assignment;
pub mod cli;
pub mod core;
pub mod export;
pub mod matching;
pub mod parsing;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use assignment::coverage::{validate_full_coverage, CoverageReport};
pub use assignment::reconcile::{reconcile, RoomEdit};
pub use assignment::store::{RoomStore, Workspace};
pub use core::participant::{Participant, Roster};
pub use core::preference::{PreferenceEntry, PreferenceMapping, Selection};
pub use core::room::{Room, RoomGrouping, RoomLayout};
pub use core::types::*;
pub use matching::engine::{compute_groupings, MatchingEngine};
