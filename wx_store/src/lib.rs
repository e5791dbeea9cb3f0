/*
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! Grid Store Adapter (§4.6): the on-disk daily file format plus the two process-lifetime
//! caches that make repeated point queries cheap. Blocking I/O is pushed onto
//! `tokio::task::spawn_blocking` to keep positioned reads off the async executor.

pub mod cache;
pub mod errors;
pub mod ndfile;

pub use cache::{FileHandleCache, IndexCache};
pub use errors::{Result, WxStoreError};
pub use ndfile::{DecodedGrid, NdFile, NdFileHeader};

use std::path::PathBuf;
use chrono::{DateTime, Utc};

/// root-rooted collection of daily files, one `{root}/{model}/{parameter_id}_{day}.nd` per
/// (model, parameter, day).
pub struct GridStore {
    root: PathBuf,
    pub index_cache: IndexCache,
    pub file_cache: FileHandleCache,
}

impl GridStore {
    pub fn new (root: impl Into<PathBuf>) -> Self {
        GridStore { root: root.into(), index_cache: IndexCache::new(), file_cache: FileHandleCache::new() }
    }

    pub fn path_for (&self, model_name: &str, parameter_id: u32, day_since_epoch: i64) -> PathBuf {
        NdFile::path_for(&self.root, model_name, parameter_id, day_since_epoch)
    }

    /// `open(path) -> FileHandle | NotFound` from §4.6.
    pub fn open (&self, model_name: &str, parameter_id: u32, day_since_epoch: i64) -> Result<NdFile> {
        let path = self.path_for(model_name, parameter_id, day_since_epoch);
        let file = NdFile::at(path.clone());
        if !file.exists() {
            return Err(WxStoreError::NotFound(parameter_id, day_since_epoch));
        }
        Ok(file)
    }

    /// `append(grid)`: idempotent per `(path, reference_time)` — overwrites the slot, which is
    /// how a fresh run supersedes an older one. Invalidates the cached handle since appends can
    /// grow or newly create the file.
    pub fn append (
        &self, model_name: &str, parameter_id: u32, day_since_epoch: i64, reference_time: DateTime<Utc>,
        grid: &DecodedGrid, time_interval_minutes: u16,
    ) -> Result<()> {
        let path = self.path_for(model_name, parameter_id, day_since_epoch);
        NdFile::at(path.clone()).append(parameter_id, day_since_epoch, reference_time, grid, time_interval_minutes)?;
        self.file_cache.invalidate(&path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn open_reports_not_found_before_any_append() {
        let dir = tempfile::tempdir().unwrap();
        let store = GridStore::new(dir.path());
        let err = store.open("icon", 0, 19000).unwrap_err();
        assert!(matches!(err, WxStoreError::NotFound(0, 19000)));
    }

    #[test]
    fn append_then_open_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = GridStore::new(dir.path());
        let grid = DecodedGrid { nx: 1, ny: 1, lat0: 0.0, lng0: 0.0, dx: 1.0, dy: 1.0, data: vec![12.34] };
        let t = Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap();

        store.append("icon", 0, 19000, t, &grid, 60).unwrap();
        let file = store.open("icon", 0, 19000).unwrap();
        assert_eq!(file.read_point(0, 0).unwrap()[0], Some(12.34));
    }
}
