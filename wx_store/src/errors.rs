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

pub type Result<T> = std::result::Result<T, WxStoreError>;

#[derive(Error, Debug)]
pub enum WxStoreError {
    #[error("IO error {0}")]
    IOError(#[from] std::io::Error),

    #[error("GRIB decode failed: {0}")]
    GribDecodeFailed(String),

    /// the query side treats a corrupt file the same way as NoData.
    #[error("corrupt grid file {0}")]
    CorruptGrid(String),

    #[error("no daily file for parameter {0} day {1}")]
    NotFound(u32, i64),

    #[error("operation failed {0}")]
    OpFailed(String),
}

pub fn op_failed (msg: impl ToString) -> WxStoreError { WxStoreError::OpFailed(msg.to_string()) }
pub fn grib_decode_failed (msg: impl ToString) -> WxStoreError { WxStoreError::GribDecodeFailed(msg.to_string()) }
