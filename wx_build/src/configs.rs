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

use std::{env, fmt::Write as FmtWrite, fs, path::PathBuf};

/// build-script function that embeds every `*.ron` file under the calling crate's `configs/`
/// directory into `$OUT_DIR/config_data`: a closure literal, `include!`d by
/// [`define_load_config!`]'s `EMBEDDED_CONFIGS` map, that inserts one
/// [`crate::EmbeddedConfigEntry`] per file under its filename. A crate with no `configs/`
/// directory gets an empty (but still valid) closure.
pub fn generate_config_data () -> std::io::Result<()> {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set by cargo");
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set by cargo");
    let configs_dir = PathBuf::from(manifest_dir).join("configs");
    let out_file = PathBuf::from(out_dir).join("config_data");

    let mut body = String::with_capacity(4096);
    write!(&mut body, "|map: &mut std::collections::HashMap<&'static str, wx_build::EmbeddedConfigEntry>| {{\n").unwrap();

    if configs_dir.is_dir() {
        for (i, entry) in fs::read_dir(&configs_dir)?.enumerate() {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("ron") {
                continue;
            }
            let filename = path.file_name().unwrap().to_string_lossy().into_owned();
            let raw = fs::read(&path)?;
            let compressed = crate::compress_vec(&raw)?;

            println!("cargo:rerun-if-changed={}", path.display());
            write!(&mut body, "    static _D{i}_: &[u8] = &{:?};\n", compressed).unwrap();
            write!(&mut body, "    map.insert({:?}, wx_build::EmbeddedConfigEntry {{ src: _D{i}_ }});\n", filename).unwrap();
        }
    }
    write!(&mut body, "}}\n").unwrap();

    fs::write(&out_file, body)?;
    println!("cargo:rerun-if-changed={}", configs_dir.display());
    Ok(())
}

/// `define_load_config!{}` expands into a crate-local `load_config::<C>(filename)` function:
/// filesystem lookup first (so a source checkout or unpacked deployment can override configs
/// without a rebuild), falling back to a brotli-compressed RON blob baked in by `build.rs`
/// when the `embedded_resources` feature is enabled. Config users just call `load_config(..)`.
#[macro_export]
macro_rules! define_load_config {
    () => {
        mod configs {
            use lazy_static::lazy_static;
            use std::collections::HashMap;

            lazy_static! {
                static ref EMBEDDED_CONFIGS: HashMap<&'static str, wx_build::EmbeddedConfigEntry> = {
                    let mut map: HashMap<&'static str, wx_build::EmbeddedConfigEntry> = HashMap::new();
                    #[cfg(feature = "embedded_resources")]
                    include!(concat!(env!("OUT_DIR"), "/config_data"))(&mut map);
                    map
                };
            }

            pub fn load_config<C> (filename: &str) -> wx_build::Result<C> where C: for<'a> serde::Deserialize<'a> {
                let bin_name = wx_build::BIN_CONTEXT.get().map(|c| c.bin_name.as_str()).unwrap_or(env!("CARGO_PKG_NAME"));

                if !wx_build::is_env_enabled("WX_EMBEDDED_ONLY") {
                    if let Some(path) = wx_build::find_config_file(bin_name, filename) {
                        let data = wx_build::file_contents_as_bytes(&path)?;
                        return Ok(ron::de::from_bytes(data.as_slice())?);
                    }
                }

                if let Some(entry) = EMBEDDED_CONFIGS.get(filename) {
                    let data = wx_build::decompress_vec(entry.src)?;
                    return Ok(ron::de::from_bytes(data.as_slice())?);
                }

                Err(wx_build::WxBuildError::ResourceNotFoundError(filename.to_string()))
            }
        }
        pub use configs::*;
    }
}
