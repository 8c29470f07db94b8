use std::path::Path;

use crate::core::participant::{Participant, Roster};
use crate::parsing::{delimiter_for_path, read_rows, ParseError};
use crate::utils::validation::sanitize_name;

const HEADER_NAMES: [&str; 3] = ["id", "player", "participant"];

/// Parse a roster file; the delimiter follows the file extension
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_roster_file(path: &Path) -> Result<Roster, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_roster_text(&content, delimiter_for_path(path))
}

/// Parse roster text with columns: id, name, [phone], [email]
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a line has fewer than 2 fields or an
/// empty id or name, or no participants are found,
/// `ParseError::DuplicateParticipant` if an id repeats, or
/// `ParseError::TooManyRows` if the limit is exceeded.
pub fn parse_roster_text(text: &str, delimiter: u8) -> Result<Roster, ParseError> {
    let mut roster = Roster::new();

    for row in read_rows(text, delimiter, &HEADER_NAMES)? {
        let line = row.line;
        let fields = row.fields;

        if fields.len() < 2 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line} has fewer than 2 fields"
            )));
        }

        if fields[0].is_empty() {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line} has an empty participant id"
            )));
        }

        let name = sanitize_name(&fields[1])
            .map_err(|e| ParseError::InvalidFormat(format!("Line {line}: {e}")))?;

        let mut participant = Participant::new(fields[0].clone(), name);
        if let Some(phone) = fields.get(2).filter(|s| !s.is_empty()) {
            participant = participant.with_phone(phone.clone());
        }
        if let Some(email) = fields.get(3).filter(|s| !s.is_empty()) {
            participant = participant.with_email(email.clone());
        }

        roster
            .add(participant)
            .map_err(|source| ParseError::DuplicateParticipant { line, source })?;
    }

    if roster.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No participants found in file".to_string(),
        ));
    }

    Ok(roster)
}
