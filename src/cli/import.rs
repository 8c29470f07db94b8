use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::Args;

use crate::assignment::store::Workspace;
use crate::cli::OutputFormat;
use crate::parsing::roster::parse_roster_file;
use crate::parsing::selections::parse_selections_file;
use crate::utils::validation::check_participant_limit;

#[derive(Args)]
pub struct ImportArgs {
    /// Roster file (CSV or TSV): id, name, [phone], [email]
    #[arg(long)]
    pub players: Option<PathBuf>,

    /// Selections file (CSV or TSV):
    /// participant, choice_1, choice_2, choice_3, [status], [submitted_at]
    #[arg(long)]
    pub selections: Option<PathBuf>,

    /// Replace the stored selection history instead of appending to it
    #[arg(long)]
    pub replace_selections: bool,
}

/// Execute import subcommand
///
/// # Errors
///
/// Returns an error if an input file cannot be parsed, a selection refers to
/// an unregistered participant, or the workspace cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(
    args: ImportArgs,
    workspace_path: &Path,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    if args.players.is_none() && args.selections.is_none() {
        anyhow::bail!("Nothing to import: pass --players and/or --selections");
    }

    let mut workspace = Workspace::load_or_default(workspace_path)?;
    let mut players_added = 0;
    let mut selections_added = 0;

    if let Some(path) = &args.players {
        let roster = parse_roster_file(path)
            .with_context(|| format!("Failed to parse roster '{}'", path.display()))?;

        for participant in roster.iter() {
            if !workspace.roster.contains(&participant.id) {
                if let Some(msg) = check_participant_limit(workspace.roster.len()) {
                    anyhow::bail!(msg);
                }
                players_added += 1;
            }
            workspace.roster.upsert(participant.clone());
        }

        if verbose {
            eprintln!("Read {} participants from {}", roster.len(), path.display());
        }
    }

    if let Some(path) = &args.selections {
        let selections = parse_selections_file(path, Utc::now())
            .with_context(|| format!("Failed to parse selections '{}'", path.display()))?;

        if args.replace_selections {
            workspace.selections.clear();
        }

        for selection in selections {
            let participant = selection.participant().clone();
            workspace
                .add_selection(selection)
                .with_context(|| format!("Rejected selection of {participant}"))?;
            selections_added += 1;
        }
    }

    workspace.save_to_file(workspace_path)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "workspace": workspace_path.display().to_string(),
                "participants_added": players_added,
                "participants_total": workspace.roster.len(),
                "selections_added": selections_added,
                "active_selections": workspace.active_selections().len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("participants_added\tparticipants_total\tselections_added\tactive_selections");
            println!(
                "{players_added}\t{}\t{selections_added}\t{}",
                workspace.roster.len(),
                workspace.active_selections().len()
            );
        }
        OutputFormat::Text => {
            println!(
                "Imported {players_added} new participants ({} total) and {selections_added} selections into {}",
                workspace.roster.len(),
                workspace_path.display()
            );
        }
    }

    Ok(())
}
