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

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WxServerError>;

/// §7: invalid lat/lng/forecast_days is a client error; everything else is a generic server error.
#[derive(Error, Debug)]
pub enum WxServerError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("config error {0}")]
    ConfigError(#[from] wx_build::WxBuildError),

    #[error("operation failed {0}")]
    OpFailed(String),
}

pub fn op_failed (msg: impl ToString) -> WxServerError { WxServerError::OpFailed(msg.to_string()) }

impl IntoResponse for WxServerError {
    fn into_response (self) -> Response {
        let status = match self {
            WxServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

impl From<WxServerError> for tonic::Status {
    fn from (err: WxServerError) -> Self {
        match err {
            WxServerError::InvalidRequest(msg) => tonic::Status::invalid_argument(msg),
            other => tonic::Status::internal(other.to_string()),
        }
    }
}
