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

use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::io_error;

/// check if dir pathname exists and is writable, try to create dir otherwise
pub fn ensure_writable_dir (path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        let md = fs::metadata(path)?;
        if md.permissions().readonly() {
            Err(io_error!(ErrorKind::PermissionDenied, "output_dir {:?} not writable", path))
        } else {
            Ok(())
        }
    } else {
        fs::create_dir_all(path)
    }
}

pub fn file_contents<P: AsRef<Path>> (path: &P) -> io::Result<Vec<u8>> {
    use std::io::Read;
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    let mut contents = Vec::with_capacity(len as usize);
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

pub fn file_length<P: AsRef<Path>> (path: &P) -> Option<u64> {
    fs::metadata(path).ok().map(|meta| meta.len())
}

/// remove files in `dir` whose modification time is older than `max_age`. Used to clear
/// scratch/temp directories (download temp files, stale regrid outputs) between runs.
pub fn remove_old_files<T> (dir: &T, max_age: Duration) -> io::Result<usize> where T: AsRef<Path> {
    let dir: &Path = dir.as_ref();
    if !dir.is_dir() {
        return Err(io_error!(ErrorKind::NotFound, "dir {:?}", dir));
    }

    let now = SystemTime::now();
    let mut n_removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            if let Ok(meta) = fs::metadata(&path) {
                if let Ok(last_mod) = meta.modified() {
                    if let Ok(age) = now.duration_since(last_mod) {
                        if age > max_age && fs::remove_file(&path).is_ok() {
                            n_removed += 1;
                        }
                    }
                }
            }
        }
    }
    Ok(n_removed)
}

pub fn unique_temp_path (dir: impl AsRef<Path>, prefix: &str, suffix: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos()).unwrap_or(0);
    dir.as_ref().join(format!("{prefix}-{nanos}{suffix}"))
}
