// SPDX-FileCopyrightText: 2026 Sahayak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temp-directory store fixtures.

use std::sync::Arc;

use tempfile::TempDir;

use sahayak_core::SahayakError;
use sahayak_storage::LocalStore;

/// A [`LocalStore`] backed by a throwaway temp directory. The directory
/// lives as long as the harness, so the store can be reopened to exercise
/// durability.
pub struct StoreHarness {
    dir: TempDir,
    pub store: Arc<LocalStore>,
}

impl StoreHarness {
    pub async fn new() -> Result<Self, SahayakError> {
        let dir = tempfile::tempdir()
            .map_err(|e| SahayakError::Internal(format!("tempdir: {e}")))?;
        let store = Arc::new(LocalStore::open(&Self::db_path(&dir)).await?);
        Ok(Self { dir, store })
    }

    /// Close the current handle and open a fresh one over the same file.
    pub async fn reopen(&mut self) -> Result<(), SahayakError> {
        self.store.close().await?;
        self.store = Arc::new(LocalStore::open(&Self::db_path(&self.dir)).await?);
        Ok(())
    }

    fn db_path(dir: &TempDir) -> String {
        dir.path().join("sahayak.db").to_string_lossy().into_owned()
    }
}
