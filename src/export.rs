//! Tabular export of verified roommate selections.

use serde::Serialize;
use std::io::Write;

use crate::assignment::store::Workspace;

/// One exported selection row
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    participant_id: &'a str,
    participant: String,
    choice_1: String,
    choice_2: String,
    choice_3: String,
    status: String,
    submitted_at: String,
}

/// Write each participant's active verified selection as CSV or TSV.
///
/// Choices are written as display names; ids fall back to themselves when a
/// participant is not on the roster.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_selections<W: Write>(
    workspace: &Workspace,
    writer: W,
    delimiter: u8,
) -> Result<usize, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    let roster = &workspace.roster;
    let selections = workspace.active_selections();

    for selection in &selections {
        let [first, second, third] = &selection.entry.choices;
        wtr.serialize(ExportRow {
            participant_id: selection.participant().as_str(),
            participant: roster.display_name(selection.participant()),
            choice_1: roster.display_name(first),
            choice_2: roster.display_name(second),
            choice_3: roster.display_name(third),
            status: selection.status.to_string(),
            submitted_at: selection.submitted_at.to_rfc3339(),
        })?;
    }

    wtr.flush()?;
    Ok(selections.len())
}

/// Render the export into a string
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn selections_to_string(workspace: &Workspace, delimiter: u8) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    write_selections(workspace, &mut buf, delimiter)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
