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

pub type Result<T> = std::result::Result<T, WxQueryError>;

#[derive(Error, Debug)]
pub enum WxQueryError {
    #[error("store error {0}")]
    StoreError(#[from] wx_store::WxStoreError),

    /// no model in the parent chain (including the root) has a daily file for this parameter/day.
    /// never surfaced from `get_values()` itself - the affected day is silently skipped (§7).
    #[error("no data for parameter {0} day {1}")]
    NoData(u32, i64),

    #[error("operation failed {0}")]
    OpFailed(String),
}

pub fn op_failed (msg: impl ToString) -> WxQueryError { WxQueryError::OpFailed(msg.to_string()) }
