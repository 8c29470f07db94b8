use std::path::Path;

use crate::assignment::reconcile::RoomEdit;
use crate::parsing::ParseError;
use crate::utils::validation::MAX_ROOM_EDITS;

/// Parse a JSON file of room edits
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_edits_file(path: &Path) -> Result<Vec<RoomEdit>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_edits_text(&content)
}

/// Parse room edits from JSON text
///
/// # Errors
///
/// Returns `ParseError::Json` for malformed JSON, or the errors of
/// [`parse_edits_value`].
pub fn parse_edits_text(text: &str) -> Result<Vec<RoomEdit>, ParseError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    parse_edits_value(value)
}

/// Convert an already-decoded JSON payload into room edits.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the payload is not an array, an
/// element is not a well-formed edit, or the batch is too large.
pub fn parse_edits_value(value: serde_json::Value) -> Result<Vec<RoomEdit>, ParseError> {
    let serde_json::Value::Array(items) = value else {
        return Err(ParseError::InvalidFormat(
            "Room edits must be a JSON array".to_string(),
        ));
    };

    if items.len() > MAX_ROOM_EDITS {
        return Err(ParseError::TooManyRows(items.len()));
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item)
                .map_err(|e| ParseError::InvalidFormat(format!("Room edit {}: {e}", i + 1)))
        })
        .collect()
}
