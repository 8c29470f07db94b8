//! Command-line interface for room-solver.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **import**: Load a roster and roommate selections into the workspace
//! - **assign**: Compute room groupings and write them as rooms
//! - **validate**: Check that every participant is in exactly one room
//! - **arrange**: Apply manual room edits from a JSON file
//! - **room**: List, finalize, unfinalize, or delete rooms
//! - **export**: Dump verified selections as CSV or TSV
//! - **serve**: Start the JSON web API
//!
//! ## Usage
//!
//! ```text
//! # Register participants and their choices
//! room-solver import --players players.csv --selections selections.csv
//!
//! # Preview, then commit, the generated rooms
//! room-solver assign --dry-run
//! room-solver assign
//!
//! # Lock a room, then re-run generation around it
//! room-solver room finalize 2b0c3e0e-...
//! room-solver assign
//!
//! # JSON output for scripting
//! room-solver validate --format json
//!
//! # Start the API
//! room-solver serve --port 8080
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::assignment::store::Workspace;

pub mod arrange;
pub mod assign;
pub mod export;
pub mod import;
pub mod room;
pub mod validate;

/// Default workspace file
pub const DEFAULT_WORKSPACE: &str = "room-solver.json";

#[derive(Parser)]
#[command(name = "room-solver")]
#[command(version)]
#[command(about = "Assign participants to rooms of three from mutual roommate preferences")]
#[command(
    long_about = "room-solver groups participants into rooms of three based on the three roommates each of them ranked.\n\nMutually-preferring triads are kept together first; everyone else is packed greedily following their ranked choices. Rooms can then be edited by hand and finalized so later runs leave them alone."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Workspace file holding participants, selections, and rooms
    #[arg(short, long, global = true, default_value = DEFAULT_WORKSPACE)]
    pub workspace: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import participants and roommate selections
    Import(import::ImportArgs),

    /// Generate room assignments from the selections
    Assign(assign::AssignArgs),

    /// Check that every participant is assigned exactly once
    Validate,

    /// Apply manual room edits
    Arrange(arrange::ArrangeArgs),

    /// Manage individual rooms
    Room(room::RoomArgs),

    /// Export verified selections
    Export(export::ExportArgs),

    /// Start the web server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Load the workspace, failing with a hint if it has not been created yet
pub(crate) fn load_workspace(path: &Path) -> anyhow::Result<Workspace> {
    if !path.exists() {
        anyhow::bail!(
            "Workspace '{}' not found. Run 'room-solver import' first.",
            path.display()
        );
    }
    Ok(Workspace::load_from_file(path)?)
}
