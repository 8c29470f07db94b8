//! Room command - inspect and lock individual rooms.

use std::path::Path;

use clap::{Args, Subcommand};

use crate::assignment::store::Workspace;
use crate::cli::{load_workspace, OutputFormat};
use crate::core::types::RoomId;

#[derive(Args)]
pub struct RoomArgs {
    #[command(subcommand)]
    pub command: RoomCommand,
}

#[derive(Subcommand)]
pub enum RoomCommand {
    /// List rooms and their members
    List,

    /// Lock a room so generation and edits leave it alone
    Finalize {
        /// Room id
        id: String,
    },

    /// Unlock a finalized room
    Unfinalize {
        /// Room id
        id: String,
    },

    /// Delete an open room; its members become unassigned
    Delete {
        /// Room id
        id: String,
    },
}

/// Execute room subcommand
///
/// # Errors
///
/// Returns an error if the workspace cannot be loaded or saved, or if the
/// room does not exist or is finalized (for delete).
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: RoomArgs, workspace_path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let mut workspace = load_workspace(workspace_path)?;

    let message = match args.command {
        RoomCommand::List => {
            print_rooms(&workspace, format)?;
            return Ok(());
        }
        RoomCommand::Finalize { id } => {
            let id = RoomId::new(id);
            workspace.layout.set_finalized(&id, true)?;
            format!("Finalized room {id}")
        }
        RoomCommand::Unfinalize { id } => {
            let id = RoomId::new(id);
            workspace.layout.set_finalized(&id, false)?;
            format!("Unfinalized room {id}")
        }
        RoomCommand::Delete { id } => {
            let room = workspace.layout.delete_room(&RoomId::new(id))?;
            format!("Deleted {} ({})", room.name, room.id)
        }
    };

    workspace.save_to_file(workspace_path)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "message": message });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text | OutputFormat::Tsv => println!("{message}"),
    }

    Ok(())
}

fn print_rooms(workspace: &Workspace, format: OutputFormat) -> anyhow::Result<()> {
    let roster = &workspace.roster;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&workspace.layout)?);
        }
        OutputFormat::Tsv => {
            println!("room_id\troom\tfinalized\tmembers");
            for room in &workspace.layout.rooms {
                let members: Vec<&str> = room.members.iter().map(|m| m.as_str()).collect();
                println!(
                    "{}\t{}\t{}\t{}",
                    room.id,
                    room.name,
                    room.finalized,
                    members.join(",")
                );
            }
        }
        OutputFormat::Text => {
            if workspace.layout.is_empty() {
                println!("No rooms. Run 'room-solver assign' to generate them.");
            }
            for room in &workspace.layout.rooms {
                let names: Vec<String> =
                    room.members.iter().map(|m| roster.display_name(m)).collect();
                let marker = if room.finalized { " [finalized]" } else { "" };
                println!("{} ({}){}: {}", room.name, room.id, marker, names.join(", "));
            }
        }
    }

    Ok(())
}
