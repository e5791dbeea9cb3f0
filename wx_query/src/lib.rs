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

//! Query Engine + Downsampling Helper (§4.4, §4.5): the point-query serving half of the
//! pipeline. Ingestion (Fetcher/Aligner/Store) lives in `wx_fetch`/`wx_align`/`wx_store`; this
//! crate only reads what they produced.

pub mod downsample;
pub mod engine;
pub mod errors;

pub use downsample::{to_15min, to_15min_series};
pub use engine::{get_values, ParamSeries, QueryResult};
pub use errors::{Result, WxQueryError};
