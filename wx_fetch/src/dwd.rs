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

//! DWD ICON family provider, grounded in `models/dwd/downloader.go`: bzip2-compressed GRIB2
//! over plain HTTP, with an optional `cdo` regrid step for the icosahedral models.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_compression::tokio::bufread::BzDecoder;
use chrono::{DateTime, Datelike, Timelike, Utc};
use reqwest::Client;
use tokio::io::{AsyncReadExt, BufReader};
use tracing::warn;

use wx_model::{GridKind, ModelDescriptor};
use wx_common::net::get_with_retry;
use wx_common::fs::unique_temp_path;

use crate::errors::{Result, WxFetchError};
use crate::regrid::regrid_grib;
use crate::template::format_template;
use crate::StepMap;

fn grid_str (kind: GridKind) -> &'static str {
    match kind {
        GridKind::Icosahedral => "icosahedral",
        GridKind::RegularLatLon => "regular-lat-lon",
    }
}

fn step_url (model: &ModelDescriptor, run: DateTime<Utc>, step: u32, param: &str) -> String {
    let hour = format!("{:02}", run.hour());
    let date8 = format!("{:04}{:02}{:02}", run.year(), run.month(), run.day());
    let step3 = format!("{step:03}");
    let grid = grid_str(model.grid_kind);

    format_template(model.url_template, &[
        model.name, &hour, param, model.name, model.area, grid, &date8, &hour, &step3, param,
    ])
}

async fn bunzip2 (compressed: Vec<u8>) -> std::io::Result<Vec<u8>> {
    let reader = BufReader::new(std::io::Cursor::new(compressed));
    let mut decoder = BzDecoder::new(reader);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).await?;
    Ok(out)
}

pub struct WeightPaths<'a> {
    pub description_file: &'a Path,
    pub weights_file: &'a Path,
    pub cdo_path: &'a str,
}

/// download + decompress one forecast step, regridding it when requested and the model's
/// native grid is icosahedral. A regrid failure falls back to the un-regridded bytes (§7).
pub async fn download_step (
    client: &Client, model: &ModelDescriptor, run: DateTime<Utc>, step: u32, param: &str,
    weights: Option<&WeightPaths<'_>>, tmp_dir: &Path, max_retries: usize,
) -> Result<Vec<u8>> {
    let url = step_url(model, run, step, param);
    let compressed = get_with_retry(client, &url, Duration::from_secs(300), max_retries).await
        .map_err( |e| WxFetchError::UpstreamUnavailable(format!("{url}: {e}")))?;
    let grib_bytes = bunzip2(compressed).await?;

    if let Some(weights) = weights {
        if model.grid_kind == GridKind::Icosahedral {
            let in_path = unique_temp_path(tmp_dir, "dwd-in", ".grib2");
            let out_path = unique_temp_path(tmp_dir, "dwd-regrid", ".grib2");
            std::fs::write(&in_path, &grib_bytes)?;

            let regridded = regrid_grib(weights.cdo_path, weights.description_file, weights.weights_file, &in_path, &out_path).await
                .and_then( |()| std::fs::read(&out_path).map_err(WxFetchError::from));

            let _ = std::fs::remove_file(&in_path);
            let _ = std::fs::remove_file(&out_path);

            return match regridded {
                Ok(bytes) => Ok(bytes),
                Err(e) => {
                    warn!("regrid failed for {url}: {e}, falling back to un-regridded file");
                    Ok(grib_bytes)
                }
            };
        }
    }

    Ok(grib_bytes)
}

/// fetch every step for one parameter, per §4.1 step 3: 1-hourly up to `breakpoint`, then
/// 3-hourly to `max_step`. The first step whose retries are exhausted aborts the remaining
/// steps for this parameter but keeps whatever was already downloaded.
pub async fn fetch_param (
    client: &Client, model: &ModelDescriptor, run: DateTime<Utc>, max_step: u32, breakpoint: u32, param: &str,
    weights: Option<&WeightPaths<'_>>, tmp_dir: &Path, max_retries: usize,
) -> StepMap {
    let mut steps = StepMap::new();
    let first_phase_end = max_step.min(breakpoint);

    for step in 0..first_phase_end {
        match download_step(client, model, run, step, param, weights, tmp_dir, max_retries).await {
            Ok(bytes) => { steps.insert(step, bytes); }
            Err(e) => { warn!("param {param} step {step} permanently failed: {e}"); return steps; }
        }
    }

    let mut step = breakpoint;
    while step <= max_step {
        match download_step(client, model, run, step, param, weights, tmp_dir, max_retries).await {
            Ok(bytes) => { steps.insert(step, bytes); }
            Err(e) => { warn!("param {param} step {step} permanently failed: {e}"); return steps; }
        }
        step += 3;
    }

    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn step_url_matches_icon_template() {
        let model = &wx_model::MODELS[0]; // icon
        let run = Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap();
        let url = step_url(model, run, 78, "t_2m");
        assert_eq!(url, "https://opendata.dwd.de/weather/nwp/icon/grib/00/t_2m/icon_global_icosahedral_single-level_2026030500_078_T_2M.grib2.bz2");
    }
}
