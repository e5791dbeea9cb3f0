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

//! `GET /forecast` JSON adapter (§6): query-string request, one call into
//! [`crate::compute_forecast`], JSON response.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::{compute_forecast, AppState, ForecastRequest, ForecastResponse, WxServerError};

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub parameters: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub forecast_days: u32,
    #[serde(default)]
    pub minutely15: bool,
}

fn default_model() -> String { "auto".to_string() }

impl From<ForecastQuery> for ForecastRequest {
    fn from (q: ForecastQuery) -> Self {
        let parameters = q.parameters.split(',').map(str::trim).filter( |s| !s.is_empty()).map(str::to_string).collect();
        ForecastRequest { latitude: q.lat, longitude: q.lng, parameters, model: q.model, forecast_days: q.forecast_days, minutely15: q.minutely15 }
    }
}

async fn get_forecast (State(state): State<Arc<AppState>>, Query(q): Query<ForecastQuery>) -> Result<Json<ForecastResponse>, WxServerError> {
    let req = ForecastRequest::from(q);
    let resp = compute_forecast(&state, &req).await?;
    Ok(Json(resp))
}

pub fn router (state: Arc<AppState>) -> Router {
    Router::new()
        .route("/forecast", get(get_forecast))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
