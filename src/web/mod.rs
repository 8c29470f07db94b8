//! JSON web API over the room workspace.
//!
//! Every mutating endpoint runs as a single store transaction and saves the
//! workspace file before the change becomes visible; a failed save leaves
//! both the file and the in-memory state untouched.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! room-solver serve
//!
//! # Custom port and workspace
//! room-solver --workspace camp.json serve --port 3000
//!
//! # Bind to all interfaces
//! room-solver serve --address 0.0.0.0
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /api/participants` - Registered participants
//! - `GET /api/selections` - Active verified selections
//! - `GET /api/selections/export?format=csv|tsv` - Selections as a download
//! - `GET /api/rooms` - Current rooms with member names
//! - `POST /api/assignments/generate[?dry_run=true]` - Run the matching engine
//! - `GET /api/assignments/validate` - Coverage report
//! - `POST /api/rooms/arrange` - Apply a JSON array of room edits
//! - `POST /api/rooms/{id}/finalize`, `POST /api/rooms/{id}/unfinalize`
//! - `DELETE /api/rooms/{id}` - Delete an open room

pub mod server;
