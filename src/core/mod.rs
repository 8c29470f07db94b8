//! Core data types for roommate assignment.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Participant`](participant::Participant) and [`Roster`](participant::Roster): the people to place
//! - [`PreferenceEntry`](preference::PreferenceEntry): one participant's ranked top-three choices
//! - [`PreferenceMapping`](preference::PreferenceMapping): the matching engine's ordered input
//! - [`Room`](room::Room), [`RoomLayout`](room::RoomLayout): persisted room assignments
//! - [`RoomGrouping`](room::RoomGrouping): the matching engine's transient output
//! - [`ParticipantId`](types::ParticipantId), [`RoomId`](types::RoomId): identifiers
//!
//! ## Ordering
//!
//! Every collection whose iteration order affects matching keeps an explicit
//! ordered sequence next to its lookup index. Hash-map iteration order is never
//! relied on, so the same input always produces the same rooms.

pub mod participant;
pub mod preference;
pub mod room;
pub mod types;
