//! Centralized validation and helper functions.

use crate::core::participant::Roster;
use crate::core::preference::PreferenceEntry;
use crate::core::types::ParticipantId;

/// Maximum number of participants allowed in one workspace (DOS protection)
pub const MAX_PARTICIPANTS: usize = 10_000;

/// Maximum length of a participant or room display name
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum number of room edits accepted in one batch
pub const MAX_ROOM_EDITS: usize = MAX_PARTICIPANTS;

/// Check if adding another participant would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new participant.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_participant_limit(count: usize) -> Option<String> {
    if count >= MAX_PARTICIPANTS {
        Some(format!(
            "Too many participants: adding another would exceed maximum of {MAX_PARTICIPANTS}"
        ))
    } else {
        None
    }
}

/// Validation error types for submitted data
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown participant: {0}")]
    UnknownParticipant(ParticipantId),

    #[error("Unknown roommate choice {choice} for participant {owner}")]
    UnknownChoice {
        owner: ParticipantId,
        choice: ParticipantId,
    },

    #[error("Name is empty")]
    EmptyName,

    #[error("Name too long: exceeds {MAX_NAME_LENGTH} characters")]
    NameTooLong,
}

/// Validate a preference entry against the roster.
///
/// The entry's own shape (count, self-reference, duplicates) is checked when
/// it is built; this checks that every id refers to a registered participant.
///
/// # Errors
///
/// Returns `ValidationError::UnknownParticipant` if the owner is not on the
/// roster, or `ValidationError::UnknownChoice` for the first unknown choice.
pub fn validate_entry(entry: &PreferenceEntry, roster: &Roster) -> Result<(), ValidationError> {
    if !roster.contains(&entry.owner) {
        return Err(ValidationError::UnknownParticipant(entry.owner.clone()));
    }

    if let Some(choice) = entry.choices.iter().find(|c| !roster.contains(c)) {
        return Err(ValidationError::UnknownChoice {
            owner: entry.owner.clone(),
            choice: choice.clone(),
        });
    }

    Ok(())
}

/// Trim a display name and reject empty, oversized, or control-character input.
///
/// # Errors
///
/// Returns `ValidationError::EmptyName` if nothing printable remains, or
/// `ValidationError::NameTooLong` if the name exceeds the limit.
pub fn sanitize_name(name: &str) -> Result<String, ValidationError> {
    let sanitized: String = name.chars().filter(|c| !c.is_control()).collect();
    let sanitized = sanitized.trim();

    if sanitized.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if sanitized.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }

    Ok(sanitized.to_string())
}
