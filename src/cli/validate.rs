use std::path::Path;

use crate::cli::{load_workspace, OutputFormat};

/// Execute validate subcommand
///
/// # Errors
///
/// Returns an error if the workspace cannot be loaded, or if any participant
/// is unassigned or assigned more than once.
pub fn run(workspace_path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let workspace = load_workspace(workspace_path)?;
    let report = workspace.coverage();
    let roster = &workspace.roster;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Tsv => {
            println!("participant_id\tparticipant\tproblem");
            for id in &report.unassigned {
                println!("{id}\t{}\tunassigned", roster.display_name(id));
            }
            for id in &report.duplicated {
                println!("{id}\t{}\tduplicated", roster.display_name(id));
            }
        }
        OutputFormat::Text => {
            if report.ok {
                println!(
                    "All {} participants are assigned to exactly one room",
                    roster.len()
                );
            }
            for id in &report.unassigned {
                println!("Unassigned: {}", roster.display_name(id));
            }
            for id in &report.duplicated {
                println!("In more than one room: {}", roster.display_name(id));
            }
        }
    }

    if !report.ok {
        anyhow::bail!(
            "Coverage check failed: {} unassigned, {} duplicated",
            report.unassigned.len(),
            report.duplicated.len()
        );
    }

    Ok(())
}
