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

//! Fetcher: downloads one model run's raw forecast steps for a set of parameters, per §4.1.
//! Dispatches to the DWD or NOAA provider by model name, truncates the run time to the model's
//! cadence, clamps the requested horizon to what the run hour actually publishes, and runs
//! either one task per parameter ("fast" mode) or a single serial pass, the choice being made
//! once up front by the caller's memory governor.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{info, warn};

use wx_model::ModelDescriptor;

pub mod dwd;
pub mod errors;
pub mod gfs;
pub mod regrid;
pub mod template;

pub use errors::{Result, WxFetchError};
pub use dwd::WeightPaths;

/// forecast steps (hours since the run time) mapped to their raw, decompressed GRIB2 payload.
pub type StepMap = HashMap<u32, Vec<u8>>;

/// one model run's raw download, one entry per requested parameter.
pub type RawStepBundle = HashMap<String, StepMap>;

/// knobs that don't vary per call: network client, retry budget, scratch directory, and the
/// optional ICON regrid toolchain (weight files + `cdo` binary).
pub struct FetchOptions<'a> {
    pub client: &'a Client,
    pub max_retries: usize,
    pub tmp_dir: &'a Path,
    pub weights: Option<WeightPaths<'a>>,
}

/// download every requested parameter for one model run, truncated to the model's cadence and
/// clamped to the run hour's published horizon (§4.1 steps 1-3). `fast` spawns one task per
/// parameter; otherwise parameters are fetched one at a time.
pub async fn fetch (
    model: &ModelDescriptor, requested_run: DateTime<Utc>, params: &[&str], fast: bool, opts: &FetchOptions<'_>,
) -> Result<(RawStepBundle, DateTime<Utc>, u32)> {
    let run = wx_common::datetime::truncate_run_time(requested_run, model.delivery_offset_minutes, model.cadence_hours);
    let max_step = model.max_step_for_hour(run.hour())
        .ok_or_else( || WxFetchError::UnsupportedModel(format!("{} has no schedule for run hour {:02}", model.name, run.hour())))?;

    info!("fetching {} run {} up to step {max_step} for {} parameters (fast={fast})", model.name, run, params.len());

    let bundle = if fast {
        fetch_fast(model, run, params, max_step, opts).await
    } else {
        fetch_serial(model, run, params, max_step, opts).await
    };

    Ok((bundle, run, max_step))
}

async fn fetch_one (model: &ModelDescriptor, run: DateTime<Utc>, max_step: u32, param: &str, opts: &FetchOptions<'_>) -> StepMap {
    match model.name {
        "gfs" => gfs::fetch_param(opts.client, model, run, max_step, model.breakpoint_step, param, opts.max_retries).await,
        _ => dwd::fetch_param(opts.client, model, run, max_step, model.breakpoint_step, param, opts.weights.as_ref(), opts.tmp_dir, opts.max_retries).await,
    }
}

async fn fetch_serial (model: &ModelDescriptor, run: DateTime<Utc>, params: &[&str], max_step: u32, opts: &FetchOptions<'_>) -> RawStepBundle {
    let mut bundle = RawStepBundle::new();
    for param in params {
        let steps = fetch_one(model, run, max_step, param, opts).await;
        if steps.is_empty() {
            warn!("no steps downloaded for parameter {param}");
        }
        bundle.insert(param.to_string(), steps);
    }
    bundle
}

async fn fetch_fast (model: &ModelDescriptor, run: DateTime<Utc>, params: &[&str], max_step: u32, opts: &FetchOptions<'_>) -> RawStepBundle {
    let futures = params.iter().map( |param| async move {
        let steps = fetch_one(model, run, max_step, param, opts).await;
        (param.to_string(), steps)
    });
    let results = futures::future::join_all(futures).await;

    let mut bundle = RawStepBundle::new();
    for (param, steps) in results {
        if steps.is_empty() {
            warn!("no steps downloaded for parameter {param}");
        }
        bundle.insert(param, steps);
    }
    bundle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_step_lookup_matches_model_schedule() {
        let icon = wx_model::MODELS.iter().find( |m| m.name == "icon").unwrap();
        assert_eq!(icon.max_step_for_hour(0), Some(180));
        assert_eq!(icon.max_step_for_hour(6), Some(120));
        assert_eq!(icon.max_step_for_hour(5), None);
    }
}
