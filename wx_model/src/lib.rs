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

//! declared forecast models, their coverage boxes and parent-fallback edges, and the
//! lat/lng -> model resolution used by the Query Engine (§4.3).

pub mod errors;
pub use errors::{WxModelError, Result};

use std::collections::HashMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GridKind {
    Icosahedral,
    RegularLatLon,
}

/// invariant: lat_min <= lat_max and lng_min <= lng_max.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CoverageBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl CoverageBox {
    pub const WORLD: CoverageBox = CoverageBox { lat_min: -90.0, lat_max: 90.0, lng_min: -180.0, lng_max: 180.0 };

    pub const fn new (lat_min: f64, lat_max: f64, lng_min: f64, lng_max: f64) -> Self {
        CoverageBox { lat_min, lat_max, lng_min, lng_max }
    }

    #[inline]
    pub fn contains (&self, lat: f64, lng: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lng >= self.lng_min && lng <= self.lng_max
    }
}

/// immutable, process-wide model declaration. `parent` is resolved by name rather than an
/// owning reference so the hierarchy stays an acyclic arena, not a reference graph (§9).
#[derive(Debug, Clone, Serialize)]
pub struct ModelDescriptor {
    pub name: &'static str,
    pub cadence_hours: i64,
    pub delivery_offset_minutes: i64,
    pub url_template: &'static str,
    pub grid_kind: GridKind,
    pub area: &'static str,
    pub max_step_by_run_hour: &'static [(u32, u32)],
    pub breakpoint_step: u32,
    pub coverage: CoverageBox,
    pub parent: Option<&'static str>,
}

impl ModelDescriptor {
    pub fn max_step_for_hour (&self, run_hour: u32) -> Option<u32> {
        self.max_step_by_run_hour.iter().find( |(h, _)| *h == run_hour).map( |(_, s)| *s)
    }
}

use GridKind::*;

/// DWD ICON family + NOAA GFS, grounded in `models/dwd/downloader.go` and
/// `models/noaa/downlaoder.go`. Declared icon-first (parents before children); `ModelRegistry`
/// separately orders these finest-first for point resolution.
pub static MODELS: &[ModelDescriptor] = &[
    ModelDescriptor {
        name: "icon",
        cadence_hours: 6,
        delivery_offset_minutes: 240,
        url_template: "https://opendata.dwd.de/weather/nwp/%sL/grib/%s/%sL/%sL_%s_%s_single-level_%s%s_%s_%sU.grib2.bz2",
        grid_kind: Icosahedral,
        area: "global",
        max_step_by_run_hour: &[(0, 180), (6, 120), (12, 180), (18, 120)],
        breakpoint_step: 78,
        coverage: CoverageBox::WORLD,
        parent: None,
    },
    ModelDescriptor {
        name: "icon-eu",
        cadence_hours: 3,
        delivery_offset_minutes: 240,
        url_template: "https://opendata.dwd.de/weather/nwp/%sL/grib/%s/%sL/%sL_%s_%s_single-level_%s%s_%s_%sU.grib2.bz2",
        grid_kind: RegularLatLon,
        area: "europe",
        max_step_by_run_hour: &[(0, 120), (3, 30), (6, 120), (9, 30), (12, 120), (15, 30), (18, 120), (21, 30)],
        breakpoint_step: 78,
        coverage: CoverageBox::new(29.5, 70.5, -23.5, 62.5),
        parent: Some("icon"),
    },
    ModelDescriptor {
        name: "icon-d2",
        cadence_hours: 12,
        delivery_offset_minutes: 540,
        url_template: "https://opendata.dwd.de/weather/nwp/%sL/grib/%s/%sL/%sL_%s_%s_single-level_%s%s_%s_2d_%sL.grib2.bz2",
        grid_kind: Icosahedral,
        area: "germany",
        max_step_by_run_hour: &[(0, 180), (6, 120), (12, 180), (18, 120)],
        breakpoint_step: 24,
        coverage: CoverageBox::new(43.18, 58.08, -3.94, 20.34),
        parent: Some("icon-eu"),
    },
    ModelDescriptor {
        name: "gfs",
        cadence_hours: 6,
        delivery_offset_minutes: 360,
        url_template: "https://noaa-gfs-bdp-pds.s3.amazonaws.com/gfs.%s/%s/atmos/gfs.t%sz.pgrb2.%s.f%s",
        grid_kind: RegularLatLon,
        area: "global",
        max_step_by_run_hour: &[(0, 384), (6, 384), (12, 384), (18, 384)],
        breakpoint_step: 120,
        coverage: CoverageBox::WORLD,
        parent: None,
    },
];

/// process-lifetime registry over `MODELS`. Holds both a by-name index and the finest-first
/// resolution order (`icon-d2`, `icon-eu`, `icon`, `gfs`), consistent with declaring finer
/// regional models ahead of the worldwide roots they nest inside.
pub struct ModelRegistry {
    by_name: HashMap<&'static str, &'static ModelDescriptor>,
    resolution_order: Vec<&'static ModelDescriptor>,
}

impl ModelRegistry {
    pub fn new() -> Self { Self::from_models(MODELS) }

    pub fn from_models (models: &'static [ModelDescriptor]) -> Self {
        let by_name: HashMap<_, _> = models.iter().map( |m| (m.name, m)).collect();

        let mut resolution_order: Vec<&'static ModelDescriptor> = models.iter().collect();
        resolution_order.sort_by_key( |m| std::cmp::Reverse(depth(&by_name, m)));

        ModelRegistry { by_name, resolution_order }
    }

    pub fn get (&self, name: &str) -> Option<&'static ModelDescriptor> {
        self.by_name.get(name).copied()
    }

    pub fn parent_of (&self, model: &ModelDescriptor) -> Option<&'static ModelDescriptor> {
        model.parent.and_then( |name| self.get(name))
    }

    /// the worldwide model ultimately reached by walking `parent` links; used as the last resort.
    pub fn root_of (&self, model: &'static ModelDescriptor) -> &'static ModelDescriptor {
        let mut m = model;
        while let Some(p) = self.parent_of(m) { m = p; }
        m
    }

    /// resolve (lat, lng, preferred) -> (model, resolved_name), per §4.3.
    pub fn resolve (&self, lat: f64, lng: f64, preferred: Option<&str>) -> (&'static ModelDescriptor, &'static str) {
        if let Some(name) = preferred {
            if name != "auto" {
                if let Some(m) = self.get(name) {
                    if m.coverage.contains(lat, lng) {
                        return (m, m.name);
                    }
                    let mut cur = m;
                    while let Some(parent) = self.parent_of(cur) {
                        if parent.coverage.contains(lat, lng) {
                            return (parent, parent.name);
                        }
                        cur = parent;
                    }
                    // preferred model's whole ancestry chain doesn't cover the point: fall through to its root.
                    let root = self.root_of(m);
                    return (root, root.name);
                }
            }
        }

        for m in &self.resolution_order {
            if m.coverage.contains(lat, lng) {
                return (m, m.name);
            }
        }

        // final fallback: the first declared root (worldwide) model.
        let root = self.resolution_order.iter().rev().next().copied().unwrap_or(&MODELS[0]);
        (root, root.name)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self { Self::new() }
}

fn depth (by_name: &HashMap<&'static str, &'static ModelDescriptor>, m: &ModelDescriptor) -> u32 {
    let mut d = 0;
    let mut cur = m;
    while let Some(parent) = cur.parent.and_then( |n| by_name.get(n)) {
        d += 1;
        cur = parent;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_regional_model_inside_coverage() {
        let reg = ModelRegistry::new();
        let (m, name) = reg.resolve(50.0, 10.0, Some("icon-d2"));
        assert_eq!(name, "icon-d2");
        assert_eq!(m.name, "icon-d2");
    }

    #[test]
    fn resolve_falls_back_through_parent_chain() {
        let reg = ModelRegistry::new();
        let (_, name) = reg.resolve(0.0, 0.0, Some("icon-d2"));
        assert_eq!(name, "icon");
    }

    #[test]
    fn resolve_auto_picks_finest_covering_model() {
        let reg = ModelRegistry::new();
        let (_, name) = reg.resolve(50.0, 10.0, Some("auto"));
        assert_eq!(name, "icon-d2");

        let (_, name) = reg.resolve(40.0, -100.0, None);
        // outside Europe entirely: icon (worldwide) beats gfs by declaration-order tie-break
        assert_eq!(name, "icon");
    }

    #[test]
    fn coverage_box_respects_bounds() {
        let b = CoverageBox::new(29.5, 70.5, -23.5, 62.5);
        assert!(b.contains(50.0, 10.0));
        assert!(!b.contains(0.0, 0.0));
    }
}
