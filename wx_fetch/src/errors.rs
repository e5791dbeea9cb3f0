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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WxFetchError>;

#[derive(Error, Debug)]
pub enum WxFetchError {
    #[error("IO error {0}")]
    IOError(#[from] std::io::Error),

    #[error("network error {0}")]
    NetError(#[from] wx_common::net::WxNetError),

    /// upstream exhausted its retry budget for a step; the Fetcher drops that step and continues.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// regrid subprocess failed or was not found; the un-regridded file is used instead.
    #[error("regrid failed: {0}")]
    RegridFailed(String),

    #[error("unsupported model {0}")]
    UnsupportedModel(String),

    /// a generic error
    #[error("operation failed {0}")]
    OpFailed(String),
}

pub fn op_failed (msg: impl ToString) -> WxFetchError { WxFetchError::OpFailed(msg.to_string()) }
pub fn upstream_unavailable (msg: impl ToString) -> WxFetchError { WxFetchError::UpstreamUnavailable(msg.to_string()) }
