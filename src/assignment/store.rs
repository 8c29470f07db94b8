use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{info, warn};

use crate::assignment::coverage::{validate_full_coverage, CoverageReport};
use crate::core::participant::Roster;
use crate::core::preference::{latest_verified, Selection};
use crate::core::room::RoomLayout;
use crate::utils::validation::{validate_entry, ValidationError};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read workspace: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse workspace: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to persist workspace: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Workspace lock poisoned")]
    Poisoned,
}

/// Workspace file version for compatibility checking
pub const WORKSPACE_VERSION: &str = "1.0.0";

fn default_version() -> String {
    WORKSPACE_VERSION.to_string()
}

/// Everything the assignment process persists: who is taking part, what they
/// asked for, and where they currently sleep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub roster: Roster,

    /// Submission history, oldest first
    #[serde(default)]
    pub selections: Vec<Selection>,

    #[serde(default)]
    pub layout: RoomLayout,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            version: default_version(),
            roster: Roster::new(),
            selections: Vec::new(),
            layout: RoomLayout::default(),
        }
    }
}

impl Workspace {
    /// Load a workspace from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load a workspace file, or start empty if it does not exist yet
    pub fn load_or_default(path: &Path) -> Result<Self, StoreError> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse a workspace from JSON
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let workspace: Self = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if workspace.version != WORKSPACE_VERSION {
            warn!(
                "Workspace version mismatch (expected {}, found {})",
                WORKSPACE_VERSION, workspace.version
            );
        }

        Ok(workspace)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the workspace atomically: a temp file in the same directory is
    /// renamed over the target, so readers see the old or the new file, never
    /// a partial one.
    pub fn save_to_file(&self, path: &Path) -> Result<(), StoreError> {
        let json = self.to_json()?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path)?;
        Ok(())
    }

    /// Record a selection after checking it against the roster.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the owner or any choice is not registered.
    pub fn add_selection(&mut self, selection: Selection) -> Result<(), ValidationError> {
        validate_entry(&selection.entry, &self.roster)?;
        self.selections.push(selection);
        Ok(())
    }

    /// The current verified selection of each participant, ordered by when
    /// the participant first submitted one
    #[must_use]
    pub fn active_selections(&self) -> Vec<&Selection> {
        latest_verified(&self.selections)
    }

    /// Check that every registered participant is in exactly one room
    #[must_use]
    pub fn coverage(&self) -> CoverageReport {
        validate_full_coverage(&self.roster.ids(), &self.layout)
    }
}

/// Shared workspace with all-or-nothing updates.
///
/// Readers get consistent snapshots; writers run against a copy that replaces
/// the live state only when the whole update succeeds.
#[derive(Debug, Default)]
pub struct RoomStore {
    state: RwLock<Workspace>,
}

impl RoomStore {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            state: RwLock::new(workspace),
        }
    }

    /// Run a read-only closure against the current state
    pub fn read<T>(&self, f: impl FnOnce(&Workspace) -> T) -> Result<T, StoreError> {
        let guard = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&guard))
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> Result<Workspace, StoreError> {
        self.read(Workspace::clone)
    }

    /// Apply `f` to a copy of the workspace and commit the copy only if `f`
    /// returns `Ok`. Concurrent writers are serialized; the last one wins.
    pub fn transaction<T, E>(
        &self,
        f: impl FnOnce(&mut Workspace) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self.state.write().map_err(|_| StoreError::Poisoned)?;
        let mut draft = guard.clone();
        let value = f(&mut draft)?;
        *guard = draft;
        info!("Committed workspace transaction");
        Ok(value)
    }
}
