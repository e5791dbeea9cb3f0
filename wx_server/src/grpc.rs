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

//! `Forecast/GetForecast` gRPC adapter (§6): same request/response shape as the HTTP adapter,
//! generated from `proto/forecast.proto` by `build.rs`, one call into [`crate::compute_forecast`].

use std::collections::HashMap;
use std::sync::Arc;

use tonic::{Request, Response, Status};

use crate::{compute_forecast, AppState, ForecastRequest, ForecastResponse};

pub mod proto {
    tonic::include_proto!("wx.forecast");
}

pub use proto::forecast_server::{Forecast, ForecastServer};
pub use proto::{DoubleList, ForecastRequest as ProtoRequest, ForecastResponse as ProtoResponse, StringList};

pub struct GrpcForecastService {
    pub state: Arc<AppState>,
}

impl From<ProtoRequest> for ForecastRequest {
    fn from (r: ProtoRequest) -> Self {
        ForecastRequest { latitude: r.latitude, longitude: r.longitude, parameters: r.parameters, model: r.model, forecast_days: r.forecast_days, minutely15: r.minutely15 }
    }
}

fn to_string_map (map: HashMap<String, Vec<String>>) -> HashMap<String, StringList> {
    map.into_iter().map( |(k, v)| (k, StringList { values: v })).collect()
}

fn to_double_map (map: HashMap<String, Vec<f64>>) -> HashMap<String, DoubleList> {
    map.into_iter().map( |(k, v)| (k, DoubleList { values: v })).collect()
}

impl From<ForecastResponse> for ProtoResponse {
    fn from (r: ForecastResponse) -> Self {
        ProtoResponse {
            calculation_time_us: r.calculation_time_us,
            latitude: r.latitude,
            longitude: r.longitude,
            utc_offset_ms: r.utc_offset_ms,
            timezone_name: r.timezone_name,
            start_time_ms: r.start_time_ms,
            used_models: to_string_map(r.used_models),
            daily: to_double_map(r.daily),
            hourly: to_double_map(r.hourly),
            minutely15: to_double_map(r.minutely15),
        }
    }
}

impl Forecast for GrpcForecastService {
    async fn get_forecast (&self, request: Request<ProtoRequest>) -> Result<Response<ProtoResponse>, Status> {
        let req: ForecastRequest = request.into_inner().into();
        let resp = compute_forecast(&self.state, &req).await?;
        Ok(Response::new(resp.into()))
    }
}
