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
#![allow(unused)]

//! Ingestion binary crate: the Scheduler/Memory Governor plus the one-shot CLI path wiring the
//! Fetcher, Step Aligner and Grid Store Adapter together (§4.1, §4.2, §4.6, §5, §10.1): a
//! `load_config()` + single `run_*` entry point called from `main()`, generalized to multiple
//! model providers and parameters.

pub mod errors;
pub mod scheduler;

pub use errors::{Result, WxIngestError};

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use wx_catalog::Parameter;
use wx_fetch::{FetchOptions, WeightPaths};
use wx_model::{ModelDescriptor, ModelRegistry};
use wx_store::GridStore;

wx_build::define_load_config!{}

/// `cdo`-based regrid toolchain for the icosahedral DWD models (§4.1.1).
#[derive(Debug, Clone, Deserialize)]
pub struct RegridConfig {
    pub cdo_path: String,
    pub description_file: PathBuf,
    pub weights_file: PathBuf,
}

/// top-level `wx_ingest.ron` config: where the daily grid store lives, download scratch space,
/// retry budget, the fast-mode memory threshold, and the optional regrid toolchain.
#[derive(Debug, Clone, Deserialize)]
pub struct WxIngestConfig {
    pub store_root: PathBuf,
    pub tmp_dir: PathBuf,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_gib_per_parameter")]
    pub gib_per_parameter: f64,
    pub regrid: Option<RegridConfig>,
}

fn default_max_retries() -> usize { 5 }
fn default_gib_per_parameter() -> f64 { 2.5 }

/// ingest one model run for `params` into `store`, fetching at `fast` concurrency (§4.1 → §4.2 →
/// §4.6). Aligned grids are persisted hourly (`time_interval_minutes = 60`); a parameter absent
/// from the raw bundle (download exhausted its retries) is logged and simply produces no files.
pub async fn run_ingest (
    model: &'static ModelDescriptor, params: &[&'static Parameter], store: &GridStore,
    cfg: &WxIngestConfig, client: &Client, fast: bool,
) -> Result<()> {
    wx_common::fs::ensure_writable_dir(&cfg.tmp_dir)?;
    wx_common::fs::ensure_writable_dir(&cfg.store_root)?;

    let weights = cfg.regrid.as_ref().map( |r| WeightPaths {
        description_file: r.description_file.as_path(),
        weights_file: r.weights_file.as_path(),
        cdo_path: r.cdo_path.as_str(),
    });

    let opts = FetchOptions { client, max_retries: cfg.max_retries, tmp_dir: &cfg.tmp_dir, weights };
    let param_names: Vec<&str> = params.iter().map( |p| p.name).collect();

    let (mut bundle, run, _max_step) = wx_fetch::fetch(model, Utc::now(), &param_names, fast, &opts).await?;

    for param in params {
        let Some(raw) = bundle.remove(param.name) else {
            warn!("no raw steps for parameter {} (model {})", param.name, model.name);
            continue;
        };

        let aligned = wx_align::align(param, &raw, run, model.breakpoint_step);
        if aligned.is_empty() {
            warn!("alignment produced no grids for parameter {} (model {})", param.name, model.name);
            continue;
        }

        for grid in &aligned {
            let day = wx_common::datetime::day_since_epoch(&grid.reference_time);
            let decoded = wx_store::DecodedGrid {
                nx: grid.nx, ny: grid.ny, lat0: grid.lat0, lng0: grid.lng0, dx: grid.dx, dy: grid.dy,
                data: grid.data.clone(),
            };
            store.append(model.name, param.id, day, grid.reference_time, &decoded, 60)?;
        }

        info!("persisted {} grids for parameter {} (model {})", aligned.len(), param.name, model.name);
    }

    Ok(())
}

/// run ingestion for every requested model name, each independently (§5: models are not
/// interdependent at ingestion time - only the per-parameter fan-out within a model is governed).
pub async fn run_ingest_for_models (
    registry: &ModelRegistry, model_names: &[String], params: &[&'static Parameter],
    store: &GridStore, cfg: &WxIngestConfig, client: &Client, fast: bool,
) -> Result<()> {
    for name in model_names {
        let model = registry.get(name).ok_or_else( || WxIngestError::UnknownModel(name.clone()))?;
        run_ingest(model, params, store, cfg, client, fast).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_model_name_is_rejected() {
        let registry = ModelRegistry::new();
        assert!(registry.get("nonexistent-model").is_none());
    }
}
