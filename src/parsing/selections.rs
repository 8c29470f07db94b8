use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::warn;

use crate::core::preference::{PreferenceEntry, Selection};
use crate::core::types::{ParticipantId, SelectionStatus, CHOICE_COUNT};
use crate::parsing::{delimiter_for_path, read_rows, ParseError};

const HEADER_NAMES: [&str; 3] = ["participant", "player", "id"];

/// Parse a selections file; the delimiter follows the file extension.
///
/// Rows without a timestamp are stamped with `default_time`.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_selections_file(
    path: &Path,
    default_time: DateTime<Utc>,
) -> Result<Vec<Selection>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_selections_text(&content, delimiter_for_path(path), default_time)
}

/// Parse selections text with columns:
/// participant, choice_1, choice_2, choice_3, [status], [submitted_at]
///
/// Status defaults to verified; `submitted_at` is RFC 3339.
///
/// # Errors
///
/// Returns `ParseError::InvalidEntry` for a row with the wrong number of
/// choices, a self-reference, or a repeated choice; `ParseError::InvalidFormat`
/// for an unknown status or unparseable timestamp.
pub fn parse_selections_text(
    text: &str,
    delimiter: u8,
    default_time: DateTime<Utc>,
) -> Result<Vec<Selection>, ParseError> {
    let mut selections = Vec::new();

    for row in read_rows(text, delimiter, &HEADER_NAMES)? {
        let line = row.line;
        let mut fields = row.fields.into_iter();

        let owner = fields.next().unwrap_or_default();
        if owner.is_empty() {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line} has an empty participant id"
            )));
        }

        let rest: Vec<String> = fields.collect();
        let choice_count = rest
            .iter()
            .take(CHOICE_COUNT)
            .take_while(|f| !f.is_empty())
            .count();
        let choices: Vec<ParticipantId> = rest[..choice_count]
            .iter()
            .map(|c| ParticipantId::new(c.clone()))
            .collect();

        let entry = PreferenceEntry::new(ParticipantId::new(owner), choices)
            .map_err(|source| ParseError::InvalidEntry { line, source })?;

        let status = match rest.get(CHOICE_COUNT).filter(|s| !s.is_empty()) {
            Some(s) => SelectionStatus::parse(s).ok_or_else(|| {
                ParseError::InvalidFormat(format!("Invalid status on line {line}: '{s}'"))
            })?,
            None => SelectionStatus::default(),
        };

        let submitted_at = match rest.get(CHOICE_COUNT + 1).filter(|s| !s.is_empty()) {
            Some(s) => DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|_| {
                    ParseError::InvalidFormat(format!("Invalid timestamp on line {line}: '{s}'"))
                })?,
            None => default_time,
        };

        if rest.len() > CHOICE_COUNT + 2 {
            warn!("Ignoring extra columns on line {line}");
        }

        selections.push(Selection::new(entry, status, submitted_at));
    }

    Ok(selections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::preference::EntryError;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_parse_selections_with_status_and_time() {
        let csv = "participant,choice_1,choice_2,choice_3,status,submitted_at\n\
                   ana,ben,cat,dan,verified,2024-05-01T10:00:00Z\n\
                   ben,ana,cat,dan,pending,\n\
                   cat,ana,ben,dan\n";

        let default_time = now();
        let selections = parse_selections_text(csv, b',', default_time).unwrap();
        assert_eq!(selections.len(), 3);

        assert_eq!(selections[0].participant(), &ParticipantId::new("ana"));
        assert_eq!(selections[0].submitted_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
        assert_eq!(selections[1].status, SelectionStatus::Pending);
        assert_eq!(selections[1].submitted_at, default_time);
        assert_eq!(selections[2].status, SelectionStatus::Verified);
        assert_eq!(
            selections[2].entry.choices[2],
            ParticipantId::new("dan")
        );
    }

    #[test]
    fn test_parse_selections_rejects_short_entry() {
        let err = parse_selections_text("ana\tben\tcat\n", b'\t', now()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidEntry {
                source: EntryError::WrongCount(2),
                ..
            }
        ));
    }

    #[test]
    fn test_parse_selections_rejects_self_reference() {
        let err = parse_selections_text("ana,ben,ana,cat\n", b',', now()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidEntry {
                source: EntryError::SelfReference(_),
                ..
            }
        ));
    }

    #[test]
    fn test_parse_selections_rejects_duplicate_choice() {
        let err = parse_selections_text("ana,ben,cat,ben\n", b',', now()).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_parse_selections_rejects_bad_status() {
        let err = parse_selections_text("ana,ben,cat,dan,maybe\n", b',', now()).unwrap_err();
        assert!(err.to_string().contains("Invalid status"));
    }
}
