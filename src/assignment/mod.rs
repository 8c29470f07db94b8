//! Turning groupings into persisted rooms, and keeping them consistent.
//!
//! - [`materialize`](materialize::materialize): replaces open rooms with a fresh grouping
//! - [`reconcile`](reconcile::reconcile): applies manual room edits
//! - [`validate_full_coverage`](coverage::validate_full_coverage): checks everyone is placed once
//! - [`RoomStore`](store::RoomStore): workspace state with all-or-nothing updates
//!
//! ## Finalized Rooms
//!
//! A room flagged finalized is never altered here: generation keeps it as is,
//! its members are left out of new matching runs, and manual edits that target
//! it (or try to pull its members elsewhere) are skipped and reported.

pub mod coverage;
pub mod materialize;
pub mod reconcile;
pub mod store;
