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

//! process-lifetime caches shared by every query task (§5): read-heavy, low-contention, backed
//! by `dashmap` rather than a single mutex-guarded `HashMap`.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use crate::errors::Result;

/// `(lat_idx, lng_idx)` keyed by a packed `(floor(lat/dx) << 32) | (floor(lng/dy) & 0xFFFFFFFF)`.
/// Grid indices are pure arithmetic over a file's header, so this only ever saves recomputation,
/// never correctness.
#[derive(Default)]
pub struct IndexCache {
    entries: DashMap<i64, (u32, u32)>,
}

pub fn pack_key (lat: f64, lng: f64, dx: f64, dy: f64) -> i64 {
    let lat_bits = (lat / dx).floor() as i64;
    let lng_bits = (lng / dy).floor() as i64 & 0xFFFF_FFFF;
    (lat_bits << 32) | lng_bits
}

impl IndexCache {
    pub fn new() -> Self { Self::default() }

    pub fn get_or_insert_with (&self, key: i64, compute: impl FnOnce() -> (u32, u32)) -> (u32, u32) {
        if let Some(v) = self.entries.get(&key) {
            return *v;
        }
        let v = compute();
        self.entries.insert(key, v);
        v
    }
}

/// open file handles keyed by canonicalized path, reused across query tasks.
#[derive(Default)]
pub struct FileHandleCache {
    handles: DashMap<PathBuf, Arc<Mutex<File>>>,
}

impl FileHandleCache {
    pub fn new() -> Self { Self::default() }

    pub fn get_or_open (&self, path: &Path) -> Result<Arc<Mutex<File>>> {
        if let Some(handle) = self.handles.get(path) {
            return Ok(handle.clone());
        }
        let file = OpenOptions::new().read(true).open(path)?;
        let handle = Arc::new(Mutex::new(file));
        self.handles.insert(path.to_path_buf(), handle.clone());
        Ok(handle)
    }

    pub fn invalidate (&self, path: &Path) {
        self.handles.remove(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_key_is_stable_for_the_same_cell() {
        let a = pack_key(50.123, 10.456, 0.0625, 0.0625);
        let b = pack_key(50.130, 10.460, 0.0625, 0.0625);
        assert_eq!(a, b);
    }

    #[test]
    fn index_cache_computes_once() {
        let cache = IndexCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            cache.get_or_insert_with(42, || { calls += 1; (1, 2) });
        }
        assert_eq!(calls, 1);
    }
}
