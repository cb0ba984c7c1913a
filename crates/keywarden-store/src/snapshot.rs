// ABOUTME: Single-level undo/redo via whole-file copies of the live database.
// ABOUTME: At most one slot file (undo or redo) exists next to the database at any time.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur during snapshot slot operations.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,
}

/// What the controller can do next, signaled by slot-file presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoState {
    Clean,
    Undoable,
    Redoable,
}

/// The live database path plus its undo and redo slot files.
///
/// All operations are plain file copies; the caller must checkpoint and
/// close its database connection before `undo`/`redo` and reopen after.
#[derive(Debug)]
pub struct SnapshotSlots {
    live: PathBuf,
    undo: PathBuf,
    redo: PathBuf,
}

impl SnapshotSlots {
    pub fn new(live: &Path) -> Self {
        let slot = |suffix: &str| {
            let mut name = live.as_os_str().to_os_string();
            name.push(suffix);
            PathBuf::from(name)
        };
        Self {
            undo: slot(".undo"),
            redo: slot(".redo"),
            live: live.to_path_buf(),
        }
    }

    pub fn state(&self) -> UndoState {
        if self.undo.exists() {
            UndoState::Undoable
        } else if self.redo.exists() {
            UndoState::Redoable
        } else {
            UndoState::Clean
        }
    }

    /// Capture the pre-mutation state: copy live into the undo slot and
    /// discard any redo slot. Called before every mutating operation.
    pub fn record(&self) -> Result<(), SnapshotError> {
        fs::copy(&self.live, &self.undo)?;
        if self.redo.exists() {
            fs::remove_file(&self.redo)?;
        }
        tracing::debug!(slot = %self.undo.display(), "recorded undo snapshot");
        Ok(())
    }

    /// Swap the undo slot into place, leaving the replaced live file in
    /// the redo slot.
    pub fn undo(&self) -> Result<(), SnapshotError> {
        if !self.undo.exists() {
            return Err(SnapshotError::NothingToUndo);
        }
        fs::copy(&self.live, &self.redo)?;
        fs::copy(&self.undo, &self.live)?;
        fs::remove_file(&self.undo)?;
        tracing::debug!("restored undo snapshot");
        Ok(())
    }

    /// Swap the redo slot back into place, re-arming undo.
    pub fn redo(&self) -> Result<(), SnapshotError> {
        if !self.redo.exists() {
            return Err(SnapshotError::NothingToRedo);
        }
        fs::copy(&self.live, &self.undo)?;
        fs::copy(&self.redo, &self.live)?;
        fs::remove_file(&self.redo)?;
        tracing::debug!("restored redo snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn slots_with_live(contents: &str) -> (TempDir, SnapshotSlots) {
        let dir = TempDir::new().unwrap();
        let live = dir.path().join("inv.db");
        fs::write(&live, contents).unwrap();
        let slots = SnapshotSlots::new(&live);
        (dir, slots)
    }

    fn live_contents(slots: &SnapshotSlots) -> String {
        fs::read_to_string(&slots.live).unwrap()
    }

    #[test]
    fn starts_clean() {
        let (_dir, slots) = slots_with_live("v1");
        assert_eq!(slots.state(), UndoState::Clean);
        assert!(matches!(slots.undo(), Err(SnapshotError::NothingToUndo)));
        assert!(matches!(slots.redo(), Err(SnapshotError::NothingToRedo)));
    }

    #[test]
    fn record_then_undo_restores_prior_contents() {
        let (_dir, slots) = slots_with_live("v1");

        slots.record().unwrap();
        fs::write(&slots.live, "v2").unwrap();
        assert_eq!(slots.state(), UndoState::Undoable);

        slots.undo().unwrap();
        assert_eq!(live_contents(&slots), "v1");
        assert_eq!(slots.state(), UndoState::Redoable);
    }

    #[test]
    fn redo_restores_the_undone_contents() {
        let (_dir, slots) = slots_with_live("v1");

        slots.record().unwrap();
        fs::write(&slots.live, "v2").unwrap();
        slots.undo().unwrap();

        slots.redo().unwrap();
        assert_eq!(live_contents(&slots), "v2");
        assert_eq!(slots.state(), UndoState::Undoable);
    }

    #[test]
    fn new_record_discards_redo() {
        let (_dir, slots) = slots_with_live("v1");

        slots.record().unwrap();
        fs::write(&slots.live, "v2").unwrap();
        slots.undo().unwrap();
        assert_eq!(slots.state(), UndoState::Redoable);

        slots.record().unwrap();
        assert_eq!(slots.state(), UndoState::Undoable);
        assert!(matches!(slots.redo(), Err(SnapshotError::NothingToRedo)));
    }
}
