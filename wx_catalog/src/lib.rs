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

//! static registry of meteorological parameters. Names are the keys operators and upstream
//! providers use; ids are the persistence key baked into daily grid file names (§6).

pub mod errors;
pub use errors::{Result, WxCatalogError};

use std::fmt;

use serde::Serialize;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum Interpolation {
    Linear,
    Copy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum StepType {
    Instant,
    Accumulated,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Parameter {
    pub id: u32,
    pub name: &'static str,
    pub unit: &'static str,
    pub interp: Interpolation,
    pub step_type: StepType,
}

impl fmt::Display for Parameter {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}(#{})", self.name, self.id) }
}

impl PartialEq for Parameter {
    fn eq (&self, other: &Self) -> bool { self.id == other.id }
}
impl Eq for Parameter {}

use Interpolation::*;
use StepType::*;

/// the full catalog, in declaration order. Ids and units are reproduced bit-exact from the
/// upstream parameter table; this is process-wide constant data, never mutated at runtime.
pub static CATALOG: &[Parameter] = &[
    Parameter { id: 0,       name: "temperature",          unit: "°F",      interp: Linear, step_type: Instant },
    Parameter { id: 67072,   name: "clouds",               unit: "%",       interp: Linear, step_type: Instant },
    Parameter { id: 1643264, name: "condition",            unit: "",        interp: Copy,   step_type: Instant },
    Parameter { id: 395008,  name: "cape",                 unit: "J/kg",    interp: Linear, step_type: Instant },
    Parameter { id: 131584,  name: "wind_u",                unit: "m/s",     interp: Linear, step_type: Instant },
    Parameter { id: 197120,  name: "wind_v",                unit: "m/s",     interp: Linear, step_type: Instant },
    Parameter { id: 65792,   name: "relative_humidity",    unit: "%",       interp: Linear, step_type: Instant },
    Parameter { id: 768,     name: "surface_pressure",     unit: "Pa",      interp: Linear, step_type: Instant },
    Parameter { id: 393216,  name: "dewpoint",             unit: "°F",      interp: Linear, step_type: Instant },
    Parameter { id: 721152,  name: "snow_depth",           unit: "m",       interp: Linear, step_type: Instant },
    Parameter { id: 66304,   name: "surface_pressure_msl", unit: "Pa",      interp: Linear, step_type: Instant },
    Parameter { id: 3408128, name: "precipitation",        unit: "kg m^-2", interp: Linear, step_type: Accumulated },
];

pub fn by_name (name: &str) -> Option<&'static Parameter> {
    CATALOG.iter().find( |p| p.name == name)
}

pub fn by_id (id: u32) -> Option<&'static Parameter> {
    CATALOG.iter().find( |p| p.id == id)
}

pub fn all() -> &'static [Parameter] { CATALOG }

/// default parameter set used when a request does not specify one (the CLI's `--params` default).
pub fn default_names() -> Vec<&'static str> {
    CATALOG.iter().map( |p| p.name).collect()
}

/// resolve a comma-separated parameter list into catalog entries, deduplicating while preserving
/// first-seen order and silently dropping unknown/blank names. Empty/all-unknown input is an error.
pub fn resolve_params (csv: &str) -> Result<Vec<&'static Parameter>> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();

    for raw in csv.split(',') {
        let name = raw.trim();
        if name.is_empty() || !seen.insert(name) { continue; }
        if let Some(p) = by_name(name) { out.push(p); }
    }

    if out.is_empty() {
        Err(WxCatalogError::NoValidParameters(csv.to_string()))
    } else {
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name_and_id_agree() {
        let p = by_name("precipitation").unwrap();
        assert_eq!(p.id, 3408128);
        assert_eq!(by_id(3408128).unwrap().name, "precipitation");
        assert_eq!(p.step_type, StepType::Accumulated);
    }

    #[test]
    fn resolve_params_dedups_and_preserves_order() {
        let params = resolve_params("clouds,temperature,clouds, ,bogus").unwrap();
        let names: Vec<&str> = params.iter().map( |p| p.name).collect();
        assert_eq!(names, vec!["clouds", "temperature"]);
    }

    #[test]
    fn resolve_params_rejects_all_unknown() {
        assert!(resolve_params("bogus,,").is_err());
    }
}
