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

//! Query Engine (§4.4): walks the model hierarchy per parameter per day, caches opened file
//! metadata and lat/lng -> grid-index translations, materializes hourly arrays, computes daily
//! min/max, and reports which models contributed. One task per parameter, run in parallel; days
//! within a parameter are serial since they share the per-parameter accumulator (§5).

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use wx_catalog::Parameter;
use wx_model::{ModelDescriptor, ModelRegistry};
use wx_store::cache::pack_key;
use wx_store::ndfile::NdFile;
use wx_store::GridStore;

/// one parameter's materialized result: hourly samples across the whole horizon plus per-day
/// min/max, and the set of model names that actually supplied at least one day.
pub struct ParamSeries {
    pub hourly: Vec<f64>,
    pub daily_min: Vec<f64>,
    pub daily_max: Vec<f64>,
    pub used_models: HashSet<String>,
}

/// `get_values(model, params, start_time, forecast_days, lat, lng) -> (daily, hourly, used_models)`.
pub struct QueryResult {
    pub hourly: HashMap<String, Vec<f64>>,
    pub daily: HashMap<String, Vec<f64>>,
    pub used_models: HashMap<String, HashSet<String>>,
}

/// walk `model -> model.parent -> ...` returning the first ancestor (possibly `model` itself)
/// whose daily file for `(parameter_id, day)` exists on disk. `None` only when the root itself
/// has no file - the §7 `NoData` case, handled here by silently skipping the day.
fn open_with_fallback_path<'a> (
    store: &GridStore, registry: &'a ModelRegistry, model: &'a ModelDescriptor, parameter_id: u32, day: i64,
) -> Option<(PathBuf, &'a ModelDescriptor)> {
    let mut cur = model;
    loop {
        let path = store.path_for(cur.name, parameter_id, day);
        if path.is_file() {
            return Some((path, cur));
        }
        match registry.parent_of(cur) {
            Some(parent) => cur = parent,
            None => {
                debug!("no data for parameter {parameter_id} day {day} anywhere in {}'s ancestry", model.name);
                return None;
            }
        }
    }
}

/// open (or reuse) the file handle, resolve the index for `(lat, lng)` and read the full day's
/// packed samples for that grid cell. Blocking file I/O - called from `spawn_blocking`.
fn read_day (
    store: &GridStore, registry: &ModelRegistry, model: &'static ModelDescriptor, parameter_id: u32, day: i64, lat: f64, lng: f64,
) -> Option<(Vec<Option<f64>>, &'static str, wx_store::NdFileHeader)> {
    let (path, supplying) = open_with_fallback_path(store, registry, model, parameter_id, day)?;
    let handle = store.file_cache.get_or_open(&path).ok()?;
    let mut file = handle.lock().unwrap();
    let header = NdFile::header_from(&mut file).ok()?;

    let key = pack_key(lat, lng, header.dx, header.dy);
    let (lat_idx, lng_idx) = store.index_cache.get_or_insert_with(key, || NdFile::get_index(&header, lat, lng));

    let values = NdFile::read_point_from(&mut file, lat_idx, lng_idx, &path).ok()?;
    Some((values, supplying.name, header))
}

/// per-parameter algorithm (§4.4): `steps_per_day` is established from the first day that
/// actually resolves to a file (not necessarily day 0 - a model run may simply be missing its
/// first day while later days are present); if no day resolves at all, the series defaults to
/// 24 hourly slots of zeros, matching a day that was entirely skipped.
async fn query_parameter (
    store: Arc<GridStore>, registry: Arc<ModelRegistry>, model: &'static ModelDescriptor, param: &'static Parameter,
    start_day: i64, forecast_days: u32, lat: f64, lng: f64,
) -> ParamSeries {
    let n_days = forecast_days as usize + 1;
    let mut daily_min = vec![0.0f64; n_days];
    let mut daily_max = vec![0.0f64; n_days];
    let mut used_models = HashSet::new();

    let mut steps_per_day: Option<usize> = None;
    let mut hourly: Vec<f64> = Vec::new();

    for d in 0..n_days {
        let day = start_day + d as i64;
        let (store, registry) = (store.clone(), registry.clone());

        let result = tokio::task::spawn_blocking(move || {
            read_day(&store, &registry, model, param.id, day, lat, lng)
        }).await.unwrap_or(None);

        let Some((values, supplying, header)) = result else { continue };

        let steps = *steps_per_day.get_or_insert_with( || {
            let steps = header.records_per_day();
            hourly = vec![0.0f64; steps * n_days];
            steps
        });

        used_models.insert(supplying.to_string());

        let mut day_min = f64::INFINITY;
        let mut day_max = f64::NEG_INFINITY;

        for (j, raw) in values.iter().take(steps).enumerate() {
            if let Some(v) = raw {
                hourly[d * steps + j] = *v;
                if *v < day_min { day_min = *v; }
                if *v > day_max { day_max = *v; }
            }
        }

        if day_min.is_finite() {
            daily_min[d] = day_min;
            daily_max[d] = day_max;
        }
    }

    if hourly.is_empty() {
        hourly = vec![0.0f64; 24 * n_days];
    }

    ParamSeries { hourly, daily_min, daily_max, used_models }
}

/// `get_values` (§4.4): one task per parameter, run in parallel.
pub async fn get_values (
    store: Arc<GridStore>, registry: Arc<ModelRegistry>, model: &'static ModelDescriptor, params: &[&'static Parameter],
    start_time: DateTime<Utc>, forecast_days: u32, lat: f64, lng: f64,
) -> QueryResult {
    let start_day = wx_common::datetime::day_since_epoch(&start_time);

    let tasks = params.iter().map( |&param| {
        let store = store.clone();
        let registry = registry.clone();
        async move {
            let series = query_parameter(store, registry, model, param, start_day, forecast_days, lat, lng).await;
            (param.name, series)
        }
    });

    let results = futures::future::join_all(tasks).await;

    let mut hourly = HashMap::new();
    let mut daily = HashMap::new();
    let mut used_models = HashMap::new();

    for (name, series) in results {
        hourly.insert(name.to_string(), series.hourly);
        daily.insert(format!("{name}_min"), series.daily_min);
        daily.insert(format!("{name}_max"), series.daily_max);
        used_models.insert(name.to_string(), series.used_models);
    }

    QueryResult { hourly, daily, used_models }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wx_store::ndfile::DecodedGrid;

    fn sample_grid (value: f64) -> DecodedGrid {
        DecodedGrid { nx: 2, ny: 2, lat0: 49.0, lng0: 9.0, dx: 1.0, dy: 1.0, data: vec![value, value, value, value] }
    }

    #[tokio::test]
    async fn get_values_reports_expected_lengths_and_used_model() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(GridStore::new(dir.path()));
        let registry = Arc::new(ModelRegistry::new());
        let model = registry.get("icon").unwrap();
        let param = wx_catalog::by_name("temperature").unwrap();

        let start = Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap();
        let day0 = wx_common::datetime::day_since_epoch(&start);

        for h in 0..24 {
            let t = start + chrono::Duration::hours(h);
            store.append("icon", param.id, day0, t, &sample_grid(10.0 + h as f64), 60).unwrap();
        }
        // day 1: a couple of hours only, rest stay missing (sentinel)
        for h in [0i64, 1] {
            let t = start + chrono::Duration::days(1) + chrono::Duration::hours(h);
            store.append("icon", param.id, day0 + 1, t, &sample_grid(5.0), 60).unwrap();
        }

        let result = get_values(store, registry, model, &[param], start, 1, 50.0, 10.0).await;

        assert_eq!(result.hourly["temperature"].len(), 48);
        assert_eq!(result.daily["temperature_min"].len(), 2);
        assert_eq!(result.daily["temperature_max"].len(), 2);
        assert_eq!(result.used_models["temperature"], HashSet::from(["icon".to_string()]));
        assert!((result.daily["temperature_min"][0] - 10.0).abs() < 1e-9);
        assert!((result.daily["temperature_max"][0] - 33.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn get_values_falls_back_to_parent_when_child_has_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(GridStore::new(dir.path()));
        let registry = Arc::new(ModelRegistry::new());
        let icon_d2 = registry.get("icon-d2").unwrap();
        let param = wx_catalog::by_name("temperature").unwrap();

        let start = Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap();
        let day0 = wx_common::datetime::day_since_epoch(&start);

        // only the root ("icon") has data - icon-d2 and icon-eu are both missing their file.
        for h in 0..24 {
            let t = start + chrono::Duration::hours(h);
            store.append("icon", param.id, day0, t, &sample_grid(1.0), 60).unwrap();
        }

        let result = get_values(store, registry, icon_d2, &[param], start, 0, 50.0, 10.0).await;
        assert_eq!(result.used_models["temperature"], HashSet::from(["icon".to_string()]));
    }

    #[tokio::test]
    async fn get_values_skips_a_day_with_no_data_anywhere() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(GridStore::new(dir.path()));
        let registry = Arc::new(ModelRegistry::new());
        let model = registry.get("icon").unwrap();
        let param = wx_catalog::by_name("temperature").unwrap();

        let start = Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap();
        // no files appended at all.
        let result = get_values(store, registry, model, &[param], start, 2, 50.0, 10.0).await;

        assert_eq!(result.hourly["temperature"].len(), 24 * 3);
        assert!(result.used_models["temperature"].is_empty());
        assert_eq!(result.daily["temperature_min"], vec![0.0, 0.0, 0.0]);
    }
}
