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

//! Step Aligner (§4.2): expands a sparse raw step map into a dense hourly sequence, filling gaps
//! by interpolation per the parameter's method, then converts ACCUMULATED parameters into
//! per-hour deltas. Raw bytes are decoded (and dropped) one step at a time, never all at once —
//! memory pressure from holding every step's GRIB payload is the dominant operational constraint.

pub mod errors;
pub use errors::{Result, WxAlignError};

use std::collections::HashMap;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tracing::warn;

use wx_catalog::{Interpolation, Parameter, StepType};
use wx_store::ndfile::{process_grib, DecodedGrid};

/// one decoded, time-stamped grid ready for the Grid Store Adapter.
#[derive(Clone)]
pub struct AlignedGrid {
    pub reference_time: DateTime<Utc>,
    pub nx: u32,
    pub ny: u32,
    pub lat0: f64,
    pub lng0: f64,
    pub dx: f64,
    pub dy: f64,
    pub data: Vec<f64>,
}

impl AlignedGrid {
    fn from_decoded (decoded: &DecodedGrid, reference_time: DateTime<Utc>, data: Vec<f64>) -> Self {
        AlignedGrid { reference_time, nx: decoded.nx, ny: decoded.ny, lat0: decoded.lat0, lng0: decoded.lng0, dx: decoded.dx, dy: decoded.dy, data }
    }
}

struct DecodeCache<'a> {
    raw: &'a HashMap<u32, Vec<u8>>,
    decoded: HashMap<u32, DecodedGrid>,
}

impl<'a> DecodeCache<'a> {
    fn new (raw: &'a HashMap<u32, Vec<u8>>) -> Self { DecodeCache { raw, decoded: HashMap::new() } }

    /// decode `step` on first use and cache it; returns `None` if `step` isn't in the raw bundle
    /// at all, or if GDAL fails to decode it (logged, treated the same as absent — §7 `AlignmentGap`).
    fn get (&mut self, step: u32) -> Option<&DecodedGrid> {
        if !self.decoded.contains_key(&step) {
            let bytes = self.raw.get(&step)?;
            match process_grib(bytes) {
                Ok(grid) => { self.decoded.insert(step, grid); }
                Err(e) => { warn!("failed to decode step {step}: {e}"); return None; }
            }
        }
        self.decoded.get(&step)
    }
}

/// dense-hourly interpolation pass (§4.2, first half): produces one `Some(grid)` per step that
/// could be produced, `None` for steps skipped by the edge-case rules.
fn densify (param: &Parameter, raw: &HashMap<u32, Vec<u8>>, run: DateTime<Utc>, new_length: u32) -> Vec<Option<AlignedGrid>> {
    let mut cache = DecodeCache::new(raw);
    let mut out = Vec::with_capacity(new_length as usize + 1);

    for s in 0..=new_length {
        if raw.contains_key(&s) {
            let grid = match cache.get(s) {
                Some(g) => g.clone(),
                None => { out.push(None); continue; }
            };
            let reference_time = run + ChronoDuration::hours(s as i64);
            out.push(Some(AlignedGrid::from_decoded(&grid, reference_time, grid.data.clone())));
            continue;
        }

        let prev_step = (s / 3) * 3;
        let next_step = prev_step + 3;

        if next_step > new_length {
            out.push(None);
            continue;
        }

        let prev = cache.get(prev_step).cloned();
        let next = cache.get(next_step).cloned();

        match (prev, next) {
            (Some(prev), Some(next)) => {
                let prev_time = run + ChronoDuration::hours(prev_step as i64);
                let next_time = run + ChronoDuration::hours(next_step as i64);
                let reference_time = prev_time + (next_time - prev_time) * (s - prev_step) as i32 / 3;
                let data = interpolate_grids(&prev, &next, s - prev_step, param.interp);
                out.push(Some(AlignedGrid::from_decoded(&prev, reference_time, data)));
            }
            _ => out.push(None),
        }
    }

    out
}

/// element-wise `data[j] := prev[j] + (s - prev)·(next[j] - prev[j])/3` for LINEAR; verbatim copy
/// of `prev.data` for COPY.
fn interpolate_grids (prev: &DecodedGrid, next: &DecodedGrid, offset: u32, interp: Interpolation) -> Vec<f64> {
    match interp {
        Interpolation::Copy => prev.data.clone(),
        Interpolation::Linear => {
            let frac = offset as f64 / 3.0;
            prev.data.iter().zip(next.data.iter()).map( |(p, n)| p + frac * (n - p)).collect()
        }
    }
}

/// roll the ACCUMULATED cumulative-field convention into per-hour deltas. `previous` tracks the
/// pre-subtraction cumulative input, not the emitted delta (§9) — it is updated to the current
/// grid's own data after each emission, never to the delta itself.
fn accumulate_deltas (produced: Vec<Option<AlignedGrid>>) -> Vec<AlignedGrid> {
    let mut previous: Option<Vec<f64>> = None;
    let mut out = Vec::new();

    for maybe_grid in produced {
        let Some(grid) = maybe_grid else { continue };

        match previous.take() {
            None => { previous = Some(grid.data.clone()); }
            Some(prev_data) => {
                let delta: Vec<f64> = grid.data.iter().zip(prev_data.iter()).map( |(c, p)| c - p).collect();
                out.push(AlignedGrid { data: delta, ..grid.clone() });
                previous = Some(grid.data.clone());
            }
        }
    }

    out
}

/// `align(parameter, raw_step_map, run, breakpoint) -> sequence<AlignedGrid>` (§4.2). Never
/// returns `Err` for a gap — `AlignmentGap` is logged and the step silently dropped; the grids
/// that could be produced are still returned in ascending `reference_time` order.
pub fn align (param: &Parameter, raw: &HashMap<u32, Vec<u8>>, run: DateTime<Utc>, breakpoint: u32) -> Vec<AlignedGrid> {
    let Some(&new_length) = raw.keys().max() else { return Vec::new(); };
    let _ = breakpoint; // the breakpoint only distinguishes the 1-hourly/3-hourly phases; `new_length` is just the last step actually present.

    let produced = densify(param, raw, run, new_length);

    match param.step_type {
        StepType::Instant => produced.into_iter().flatten().collect(),
        StepType::Accumulated => accumulate_deltas(produced),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wx_catalog::{Interpolation, StepType};

    fn fixed_grid (value: f64) -> DecodedGrid {
        DecodedGrid { nx: 1, ny: 1, lat0: 0.0, lng0: 0.0, dx: 1.0, dy: 1.0, data: vec![value] }
    }

    #[test]
    fn interpolate_grids_is_linear_between_bracketing_steps() {
        let prev = fixed_grid(10.0);
        let next = fixed_grid(40.0);
        let data = interpolate_grids(&prev, &next, 1, Interpolation::Linear);
        assert!((data[0] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn copy_interpolation_ignores_next() {
        let prev = fixed_grid(5.0);
        let next = fixed_grid(99.0);
        let data = interpolate_grids(&prev, &next, 2, Interpolation::Copy);
        assert_eq!(data[0], 5.0);
    }

    #[test]
    fn accumulate_deltas_skips_the_initializer_step() {
        use chrono::{TimeZone, Utc};
        let run = Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap();
        let g0 = AlignedGrid::from_decoded(&fixed_grid(1.0), run, vec![1.0]);
        let g1 = AlignedGrid::from_decoded(&fixed_grid(3.0), run + ChronoDuration::hours(1), vec![3.0]);
        let g2 = AlignedGrid::from_decoded(&fixed_grid(4.5), run + ChronoDuration::hours(2), vec![4.5]);

        let out = accumulate_deltas(vec![Some(g0), Some(g1), Some(g2)]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].data[0], 2.0);
        assert_eq!(out[1].data[0], 1.5);
    }
}
