//! Parsers for the files administrators feed into the solver.
//!
//! This module provides parsers for:
//!
//! - **Rosters**: CSV/TSV participant lists (`id, name, [phone], [email]`)
//! - **Selections**: CSV/TSV roommate choices
//!   (`participant, choice_1, choice_2, choice_3, [status], [submitted_at]`)
//! - **Room edits**: JSON arrays of manual room arrangements
//!
//! Tabular inputs may start with a header row and may contain `#` comment
//! lines and blank lines, which are skipped.
//!
//! ## Example
//!
//! ```rust
//! use room_solver::parsing::roster::parse_roster_text;
//!
//! let roster = parse_roster_text("id,name\nana,Ana Lopez\nben,Ben Ode\n", b',').unwrap();
//! assert_eq!(roster.len(), 2);
//! ```

use std::path::Path;
use thiserror::Error;

use crate::core::participant::RosterError;
use crate::core::preference::EntryError;
use crate::utils::validation::MAX_PARTICIPANTS;

pub mod edits;
pub mod roster;
pub mod selections;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Line {line}: {source}")]
    InvalidEntry { line: u64, source: EntryError },

    #[error("Line {line}: {source}")]
    DuplicateParticipant { line: u64, source: RosterError },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Too many rows: {0} exceeds maximum allowed ({MAX_PARTICIPANTS})")]
    TooManyRows(usize),
}

/// Field delimiter implied by a file extension: tab for `.tsv`/`.txt`, comma otherwise
#[must_use]
pub fn delimiter_for_path(path: &Path) -> u8 {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match ext.as_deref() {
        Some("tsv" | "txt") => b'\t',
        _ => b',',
    }
}

/// A non-empty, non-comment row with its 1-based line number
pub(crate) struct Row {
    pub line: u64,
    pub fields: Vec<String>,
}

/// Read delimited rows, skipping comments, blank lines, and a header row whose
/// first field matches one of `header_names` (case-insensitive).
pub(crate) fn read_rows(
    text: &str,
    delimiter: u8,
    header_names: &[&str],
) -> Result<Vec<Row>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut first_data_line = true;

    for result in reader.records() {
        let record = result.map_err(|e| ParseError::InvalidFormat(e.to_string()))?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        // Check if first non-empty/non-comment line is a header
        if first_data_line {
            first_data_line = false;
            let first = record.get(0).map(str::to_lowercase).unwrap_or_default();
            if header_names.contains(&first.as_str()) {
                continue;
            }
        }

        if rows.len() >= MAX_PARTICIPANTS {
            return Err(ParseError::TooManyRows(rows.len() + 1));
        }

        rows.push(Row {
            line: record.position().map_or(0, csv::Position::line),
            fields: record.iter().map(str::to_string).collect(),
        });
    }

    Ok(rows)
}
