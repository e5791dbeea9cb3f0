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

pub type Result<T> = std::result::Result<T, WxAlignError>;

#[derive(Error, Debug)]
pub enum WxAlignError {
    #[error("grid decode failed: {0}")]
    StoreError(#[from] wx_store::WxStoreError),

    /// a step could not be produced (missing `prev`/`next` bracket); never surfaced from
    /// `align()` itself — the affected step is simply skipped and logged (§7).
    #[error("alignment gap at step {0}")]
    AlignmentGap(u32),

    #[error("operation failed {0}")]
    OpFailed(String),
}

pub fn op_failed (msg: impl ToString) -> WxAlignError { WxAlignError::OpFailed(msg.to_string()) }
