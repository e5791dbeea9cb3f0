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

//! NOAA GFS provider, grounded in `models/noaa/downlaoder.go`: no bzip2/regrid step, instead a
//! companion `.idx` text file of colon-separated records is parsed to find the byte range of
//! the requested field/level, fetched with an HTTP `Range` request.

use std::time::Duration;

use chrono::{DateTime, Datelike, Timelike, Utc};
use reqwest::Client;
use tracing::warn;

use wx_model::ModelDescriptor;
use wx_common::net::{get_text, get_range_with_retry_opt};

use crate::errors::{Result, WxFetchError};
use crate::template::format_template;
use crate::StepMap;

/// subset of the catalog this provider knows how to translate into GFS GRIB field codes
/// (the original source hard-codes a single `temperature -> TMP` entry; this is the natural
/// generalization to the rest of the catalog's instantaneous surface fields).
const FIELD_BY_PARAM: &[(&str, &str)] = &[
    ("temperature", "TMP"),
    ("clouds", "TCDC"),
    ("relative_humidity", "RH"),
    ("surface_pressure", "PRES"),
    ("surface_pressure_msl", "PRMSL"),
    ("dewpoint", "DPT"),
    ("snow_depth", "SNOD"),
    ("precipitation", "APCP"),
    ("wind_u", "UGRD"),
    ("wind_v", "VGRD"),
    ("cape", "CAPE"),
];

const LEVEL: &str = "surface";
const RESOLUTION: &str = "0p25";

pub fn gfs_field (param: &str) -> Option<&'static str> {
    FIELD_BY_PARAM.iter().find( |(p, _)| *p == param).map( |(_, f)| *f)
}

fn step_url (model: &ModelDescriptor, run: DateTime<Utc>, step: u32) -> String {
    let date8 = format!("{:04}{:02}{:02}", run.year(), run.month(), run.day());
    let hour = format!("{:02}", run.hour());
    let step3 = format!("{step:03}");

    format_template(model.url_template, &[&date8, &hour, &hour, RESOLUTION, &step3])
}

struct IdxRecord {
    field: String,
    level: String,
    start: u64,
}

fn parse_idx (text: &str) -> Vec<IdxRecord> {
    text.lines().filter_map( |line| {
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() < 5 { return None; }
        let start: u64 = parts[1].parse().ok()?;
        Some(IdxRecord { field: parts[3].to_string(), level: parts[4].to_string(), start })
    }).collect()
}

/// byte_start from the matching record, byte_end from the next record's byte_start - 1 (or
/// an open range for the final record).
fn byte_range (records: &[IdxRecord], field: &str, level: &str) -> Option<(u64, Option<u64>)> {
    let idx = records.iter().position( |r| r.field == field && r.level == level)?;
    let start = records[idx].start;
    let end = records.get(idx + 1).map( |next| next.start.saturating_sub(1));
    Some((start, end))
}

async fn download_field (client: &Client, url: &str, field: &str, max_retries: usize) -> Result<Vec<u8>> {
    let idx_url = format!("{url}.idx");
    let idx_text = get_text(client, &idx_url, Duration::from_secs(60)).await
        .map_err( |e| WxFetchError::UpstreamUnavailable(format!("{idx_url}: {e}")))?;
    let records = parse_idx(&idx_text);

    let (start, end) = byte_range(&records, field, LEVEL)
        .ok_or_else( || WxFetchError::UpstreamUnavailable(format!("field {field} not in {idx_url}")))?;

    get_range_with_retry_opt(client, url, start, end, Duration::from_secs(300), max_retries).await
        .map_err( |e| WxFetchError::UpstreamUnavailable(format!("{url}: {e}")))
}

pub async fn fetch_param (
    client: &Client, model: &ModelDescriptor, run: DateTime<Utc>, max_step: u32, breakpoint: u32, param: &str, max_retries: usize,
) -> StepMap {
    let mut steps = StepMap::new();

    let field = match gfs_field(param) {
        Some(f) => f,
        None => { warn!("no GFS field mapping for parameter {param}"); return steps; }
    };

    let first_phase_end = max_step.min(breakpoint);
    for step in 0..first_phase_end {
        let url = step_url(model, run, step);
        match download_field(client, &url, field, max_retries).await {
            Ok(bytes) => { steps.insert(step, bytes); }
            Err(e) => { warn!("param {param} step {step} permanently failed: {e}"); return steps; }
        }
    }

    let mut step = breakpoint;
    while step <= max_step {
        let url = step_url(model, run, step);
        match download_field(client, &url, field, max_retries).await {
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

    #[test]
    fn idx_parsing_derives_byte_ranges() {
        let text = "1:0:d=2026030500:TMP:surface:anl:\n2:512:d=2026030500:PRES:surface:anl:\n3:1200:d=2026030500:DPT:surface:anl:\n";
        let records = parse_idx(text);
        assert_eq!(records.len(), 3);
        let (start, end) = byte_range(&records, "PRES", "surface").unwrap();
        assert_eq!(start, 512);
        assert_eq!(end, Some(1199));

        let (start, end) = byte_range(&records, "DPT", "surface").unwrap();
        assert_eq!(start, 1200);
        assert_eq!(end, None);
    }

    #[test]
    fn step_url_matches_gfs_template() {
        use chrono::TimeZone;
        let model = wx_model::MODELS.iter().find( |m| m.name == "gfs").unwrap();
        let run = Utc.with_ymd_and_hms(2026, 3, 5, 6, 0, 0).unwrap();
        let url = step_url(model, run, 12);
        assert_eq!(url, "https://noaa-gfs-bdp-pds.s3.amazonaws.com/gfs.20260305/06/atmos/gfs.t06z.pgrb2.0p25.f012");
    }
}
