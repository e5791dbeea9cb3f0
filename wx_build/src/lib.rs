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

//! build-time and runtime plumbing shared by the `wx_*` binaries: locating/loading RON
//! config files (with an embedded-resource fallback for stripped release builds) and a
//! small `BinContext` so config/resource lookup knows which binary it's running as.

pub mod errors;
pub mod configs;

pub use errors::{WxBuildError, Result};
pub use configs::generate_config_data;

use std::{env, path::PathBuf, sync::OnceLock};
use brotli::{CompressorWriter, Decompressor};
use std::io::{Read, Write};

#[derive(Debug, Clone)]
pub struct BinContext {
    pub bin_name: String,
}

pub static BIN_CONTEXT: OnceLock<BinContext> = OnceLock::new();

/// set once at the top of `main()`; subsequent config/resource lookups use `CARGO_BIN_NAME`-style context.
#[macro_export]
macro_rules! set_bin_context {
    () => {
        $crate::BIN_CONTEXT.set( $crate::BinContext { bin_name: env!("CARGO_PKG_NAME").to_string() } ).ok();
    }
}

pub fn is_env_enabled (var: &str) -> bool {
    match env::var(var) {
        Ok(v) => matches!(v.as_str(), "1" | "true" | "on"),
        Err(_) => false,
    }
}

/// filesystem lookup: `$WX_CONFIG_DIR/{filename}`, else `./configs/{filename}`, else `./{bin_name}/configs/{filename}`.
pub fn find_config_file (bin_name: &str, filename: &str) -> Option<PathBuf> {
    if let Ok(dir) = env::var("WX_CONFIG_DIR") {
        let p = PathBuf::from(dir).join(filename);
        if p.is_file() { return Some(p); }
    }
    let p = PathBuf::from("configs").join(filename);
    if p.is_file() { return Some(p); }

    let p = PathBuf::from(bin_name).join("configs").join(filename);
    if p.is_file() { return Some(p); }

    None
}

pub fn file_contents_as_bytes (path: &PathBuf) -> std::io::Result<Vec<u8>> {
    let mut f = std::fs::File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(buf)
}

pub fn compress_vec (v: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(v.len() / 4);
    let mut writer = CompressorWriter::new(&mut out, v.len(), 9, 22);
    writer.write_all(v)?;
    writer.flush()?;
    drop(writer);
    Ok(out)
}

pub fn decompress_vec (v: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut reader = Decompressor::new(v, 4096);
    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok(out)
}

/// embedded config resource: a brotli-compressed RON blob baked into the binary by a build
/// script, used when no filesystem config directory is present (stripped release deployment).
pub struct EmbeddedConfigEntry {
    pub src: &'static [u8],
}
