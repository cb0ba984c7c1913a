// ABOUTME: Timestamped backup copies of the live database file.
// ABOUTME: Checkpoints the WAL first so a single file copy captures the full state.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::inventory::InventoryStore;

impl InventoryStore {
    /// Copy the live database into `dir` as
    /// `backup_db_YYYYmmdd_HHMMSS.db`, creating the directory if
    /// needed. Returns the path of the copy.
    pub fn backup(&self, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf, StoreError> {
        self.checkpoint()?;
        fs::create_dir_all(dir)?;

        let target = dir.join(format!("backup_db_{}.db", now.format("%Y%m%d_%H%M%S")));
        fs::copy(self.db_path(), &target)?;

        tracing::info!(target = %target.display(), "backed up database");
        Ok(target)
    }
}
