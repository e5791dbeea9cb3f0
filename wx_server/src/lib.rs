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

//! Server binary crate: `axum` HTTP and `tonic` gRPC adapters (§6, §10.1) over the Query Engine.
//! Both adapters share `compute_forecast`, so the two transports can never drift out of sync on
//! validation, model resolution or response shape.

pub mod errors;
pub mod grpc;
pub mod http;

pub use errors::{Result, WxServerError};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use wx_model::ModelRegistry;
use wx_store::GridStore;

wx_build::define_load_config!{}

/// top-level `wx_server.ron` config: where the daily grid store lives and the default catalog
/// subset served when a request omits `parameters`.
#[derive(Debug, Clone, Deserialize)]
pub struct WxServerConfig {
    pub store_root: PathBuf,
}

/// state shared by both adapters: the registry is process-wide constant data, the store owns the
/// two read-heavy caches queries actually contend on (§3, §5).
pub struct AppState {
    pub store: Arc<GridStore>,
    pub registry: Arc<ModelRegistry>,
}

impl AppState {
    pub fn new (cfg: &WxServerConfig) -> Self {
        AppState { store: Arc::new(GridStore::new(&cfg.store_root)), registry: Arc::new(ModelRegistry::new()) }
    }
}

/// transport-agnostic request shape (§6 Query RPC).
#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub parameters: Vec<String>,
    pub model: String,
    pub forecast_days: u32,
    pub minutely15: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastResponse {
    pub calculation_time_us: u64,
    pub latitude: f64,
    pub longitude: f64,
    pub utc_offset_ms: i64,
    pub timezone_name: String,
    pub start_time_ms: i64,
    pub used_models: HashMap<String, Vec<String>>,
    pub daily: HashMap<String, Vec<f64>>,
    pub hourly: HashMap<String, Vec<f64>>,
    pub minutely15: HashMap<String, Vec<f64>>,
}

fn validate (req: &ForecastRequest) -> Result<()> {
    if !(-90.0..=90.0).contains(&req.latitude) {
        return Err(WxServerError::InvalidRequest(format!("latitude {} out of range", req.latitude)));
    }
    if !(-180.0..=180.0).contains(&req.longitude) {
        return Err(WxServerError::InvalidRequest(format!("longitude {} out of range", req.longitude)));
    }
    if req.forecast_days > 365 {
        return Err(WxServerError::InvalidRequest(format!("forecast_days {} out of range", req.forecast_days)));
    }
    Ok(())
}

/// the one Query Engine call both adapters delegate to (§6). Timezone lookup is an external
/// collaborator out of scope for this spec; the server reports UTC until one is wired in.
pub async fn compute_forecast (state: &AppState, req: &ForecastRequest) -> Result<ForecastResponse> {
    validate(req)?;
    let started = Instant::now();

    let params: Vec<&'static wx_catalog::Parameter> = if req.parameters.is_empty() {
        wx_catalog::all().iter().collect()
    } else {
        req.parameters.iter().filter_map( |name| wx_catalog::by_name(name)).collect()
    };
    if params.is_empty() {
        return Err(WxServerError::InvalidRequest("no valid parameters requested".to_string()));
    }

    let preferred = if req.model.is_empty() { None } else { Some(req.model.as_str()) };
    let (model, _resolved_name) = state.registry.resolve(req.latitude, req.longitude, preferred);

    let start_time = Utc::now();
    let result = wx_query::get_values(
        state.store.clone(), state.registry.clone(), model, &params, start_time, req.forecast_days, req.latitude, req.longitude,
    ).await;

    let minutely15 = if req.minutely15 {
        wx_query::to_15min(&result.hourly).await
    } else {
        HashMap::new()
    };

    let used_models = result.used_models.into_iter()
        .map( |(name, models)| {
            let mut models: Vec<String> = models.into_iter().collect();
            models.sort();
            (name, models)
        })
        .collect();

    Ok(ForecastResponse {
        calculation_time_us: started.elapsed().as_micros() as u64,
        latitude: req.latitude,
        longitude: req.longitude,
        utc_offset_ms: 0,
        timezone_name: "UTC".to_string(),
        start_time_ms: start_time.timestamp_millis(),
        used_models,
        daily: result.daily,
        hourly: result.hourly,
        minutely15,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> ForecastRequest {
        ForecastRequest { latitude: 50.0, longitude: 10.0, parameters: vec!["temperature".to_string()], model: "auto".to_string(), forecast_days: 1, minutely15: false }
    }

    #[test]
    fn validate_rejects_out_of_range_latitude() {
        let mut req = valid_request();
        req.latitude = 120.0;
        assert!(matches!(validate(&req), Err(WxServerError::InvalidRequest(_))));
    }

    #[test]
    fn validate_rejects_out_of_range_forecast_days() {
        let mut req = valid_request();
        req.forecast_days = 400;
        assert!(matches!(validate(&req), Err(WxServerError::InvalidRequest(_))));
    }

    #[test]
    fn validate_accepts_a_well_formed_request() {
        assert!(validate(&valid_request()).is_ok());
    }

    #[tokio::test]
    async fn compute_forecast_rejects_unknown_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState { store: Arc::new(GridStore::new(dir.path())), registry: Arc::new(ModelRegistry::new()) };
        let mut req = valid_request();
        req.parameters = vec!["not-a-real-parameter".to_string()];

        let err = compute_forecast(&state, &req).await.unwrap_err();
        assert!(matches!(err, WxServerError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn compute_forecast_returns_a_response_with_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState { store: Arc::new(GridStore::new(dir.path())), registry: Arc::new(ModelRegistry::new()) };
        let resp = compute_forecast(&state, &valid_request()).await.unwrap();

        assert_eq!(resp.timezone_name, "UTC");
        assert!(resp.hourly.contains_key("temperature"));
        assert!(resp.used_models["temperature"].is_empty());
    }
}
