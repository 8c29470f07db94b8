//! Assign command - run the matching engine and write the resulting rooms.
//!
//! Finalized rooms survive every run untouched; all other rooms are replaced
//! by the new grouping.

use std::path::Path;

use clap::Args;

use crate::assignment::materialize::{plan_assignments, AssignmentPlan};
use crate::assignment::store::Workspace;
use crate::cli::{load_workspace, OutputFormat};

/// Arguments for the assign command
#[derive(Args)]
pub struct AssignArgs {
    /// Show the rooms that would be created without saving them
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute assign subcommand
///
/// # Errors
///
/// Returns an error if the workspace cannot be loaded or saved.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(
    args: AssignArgs,
    workspace_path: &Path,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let mut workspace = load_workspace(workspace_path)?;
    let plan = plan_assignments(&workspace);

    if verbose {
        eprintln!(
            "Grouped {} participants ({} locked in finalized rooms, {} without a verified selection)",
            plan.grouping.participant_count(),
            plan.locked.len(),
            plan.unplaceable.len()
        );
    }

    if !args.dry_run {
        workspace.layout = plan.layout.clone();
        workspace.save_to_file(workspace_path)?;
    }

    match format {
        OutputFormat::Json => print_json(&plan, args.dry_run)?,
        OutputFormat::Tsv => print_tsv(&plan, &workspace),
        OutputFormat::Text => print_text(&plan, &workspace, args.dry_run),
    }

    Ok(())
}

fn print_text(plan: &AssignmentPlan, workspace: &Workspace, dry_run: bool) {
    let roster = &workspace.roster;

    for room in &plan.layout.rooms {
        let names: Vec<String> = room.members.iter().map(|m| roster.display_name(m)).collect();
        let marker = if room.finalized { " [finalized]" } else { "" };
        println!("{}{}: {}", room.name, marker, names.join(", "));
    }

    let summary = &plan.summary;
    println!();
    println!(
        "{} rooms generated ({} full, {} partial, {} mutual triads)",
        summary.room_count, summary.full_rooms, summary.partial_rooms, summary.mutual_triads
    );
    println!(
        "First choice honored for {:.0}% of placed participants",
        summary.first_choice_rate() * 100.0
    );

    if !summary.unmatched.is_empty() {
        let names: Vec<String> = summary
            .unmatched
            .iter()
            .map(|m| roster.display_name(m))
            .collect();
        println!("No choice honored: {}", names.join(", "));
    }

    if !plan.unplaceable.is_empty() {
        let names: Vec<String> = plan
            .unplaceable
            .iter()
            .map(|m| roster.display_name(m))
            .collect();
        println!("Not placed (no verified selection): {}", names.join(", "));
    }

    if dry_run {
        println!("\nDry run: workspace not modified");
    }
}

fn print_json(plan: &AssignmentPlan, dry_run: bool) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "dry_run": dry_run,
        "rooms": plan.layout.rooms,
        "summary": {
            "room_count": plan.summary.room_count,
            "full_rooms": plan.summary.full_rooms,
            "partial_rooms": plan.summary.partial_rooms,
            "mutual_triads": plan.summary.mutual_triads,
            "first_choice_rate": plan.summary.first_choice_rate(),
            "unmatched": plan.summary.unmatched,
        },
        "locked": plan.locked,
        "unplaceable": plan.unplaceable,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(plan: &AssignmentPlan, workspace: &Workspace) {
    println!("room_id\troom\tfinalized\tparticipant_id\tparticipant");
    for room in &plan.layout.rooms {
        for member in &room.members {
            println!(
                "{}\t{}\t{}\t{}\t{}",
                room.id,
                room.name,
                room.finalized,
                member,
                workspace.roster.display_name(member)
            );
        }
    }
}
