//! Arrange command - apply hand-made room edits.
//!
//! The edits file is a JSON array of `{"room_id", "name", "player_ids"}`
//! objects. Each edit overwrites one room's membership; `"room_id": "new"`
//! creates a room, and an empty `player_ids` deletes one. An edit whose
//! members are all skipped leaves its room as it was.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use crate::assignment::reconcile::{reconcile, ReconcileReport};
use crate::cli::{load_workspace, OutputFormat};
use crate::parsing::edits::parse_edits_file;

/// Arguments for the arrange command
#[derive(Args)]
pub struct ArrangeArgs {
    /// JSON file with room edits
    #[arg(required = true)]
    pub edits: PathBuf,

    /// Refuse to save if any edit or participant was skipped
    #[arg(long)]
    pub strict: bool,
}

/// Execute arrange subcommand
///
/// # Errors
///
/// Returns an error if the workspace or edits cannot be read, if `--strict`
/// is set and anything was skipped, or if the workspace cannot be saved.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(
    args: ArrangeArgs,
    workspace_path: &Path,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let mut workspace = load_workspace(workspace_path)?;
    let edits = parse_edits_file(&args.edits)
        .with_context(|| format!("Failed to read edits '{}'", args.edits.display()))?;

    if verbose {
        eprintln!("Applying {} room edits", edits.len());
    }

    let result = reconcile(&workspace.layout, &edits, &workspace.roster);

    if args.strict && result.report.has_skips() {
        print_report(&result.report, format)?;
        anyhow::bail!("Some edits were skipped; workspace not modified (--strict)");
    }

    workspace.layout = result.layout;
    workspace.save_to_file(workspace_path)?;

    print_report(&result.report, format)?;
    Ok(())
}

fn print_report(report: &ReconcileReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Tsv => {
            println!("action\tid");
            let rows = [
                ("updated", strings(&report.updated)),
                ("created", strings(&report.created)),
                ("deleted", strings(&report.deleted)),
                ("skipped_finalized", strings(&report.skipped_finalized)),
                ("unknown_room", strings(&report.unknown_rooms)),
                ("unknown_participant", strings(&report.unknown_participants)),
                ("locked_participant", strings(&report.locked_participants)),
                ("unresolved_room", strings(&report.unresolved_rooms)),
            ];
            for (action, ids) in rows {
                for id in ids {
                    println!("{action}\t{id}");
                }
            }
        }
        OutputFormat::Text => {
            println!(
                "Rooms: {} updated, {} created, {} deleted",
                report.updated.len(),
                report.created.len(),
                report.deleted.len()
            );
            if !report.skipped_finalized.is_empty() {
                println!("Skipped finalized rooms: {}", join(&report.skipped_finalized));
            }
            if !report.unknown_rooms.is_empty() {
                println!("Skipped unknown rooms: {}", join(&report.unknown_rooms));
            }
            if !report.unknown_participants.is_empty() {
                println!(
                    "Skipped unknown participants: {}",
                    join(&report.unknown_participants)
                );
            }
            if !report.locked_participants.is_empty() {
                println!(
                    "Skipped participants in finalized rooms: {}",
                    join(&report.locked_participants)
                );
            }
            if !report.unresolved_rooms.is_empty() {
                println!(
                    "Left unchanged (no placeable members): {}",
                    join(&report.unresolved_rooms)
                );
            }
        }
    }
    Ok(())
}

fn strings<T: ToString>(items: &[T]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn join<T: ToString>(items: &[T]) -> String {
    strings(items).join(", ")
}
