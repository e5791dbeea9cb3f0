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

//! network helpers shared by the upstream providers: bounded-retry GET and byte-range GET.

use reqwest::{header::{HeaderMap, HeaderValue, RANGE}, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum WxNetError {
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("non-success response {0} for {1}")]
    BadStatus(StatusCode, String),

    #[error("exhausted {0} retries for {1}")]
    RetriesExhausted(usize, String),
}

pub type Result<T> = std::result::Result<T, WxNetError>;

/// GET `url`, retrying up to `max_retries` times on transport error or non-200 status.
/// Mirrors the upstream fetcher's retry discipline: any failure short of the retry budget
/// is swallowed and the request is simply repeated.
pub async fn get_with_retry (client: &Client, url: &str, timeout: Duration, max_retries: usize) -> Result<Vec<u8>> {
    let mut last_err = None;
    for attempt in 0..=max_retries {
        match client.get(url).timeout(timeout).send().await {
            Ok(resp) if resp.status() == StatusCode::OK => {
                return Ok(resp.bytes().await?.to_vec());
            }
            Ok(resp) => {
                let status = resp.status();
                info!("GET {url} returned {status}, retry {attempt}/{max_retries}");
                last_err = Some(WxNetError::BadStatus(status, url.to_string()));
            }
            Err(e) => {
                info!("GET {url} failed: {e}, retry {attempt}/{max_retries}");
                last_err = Some(WxNetError::HttpError(e));
            }
        }
    }
    Err(last_err.unwrap_or_else(|| WxNetError::RetriesExhausted(max_retries, url.to_string())))
}

/// byte-range GET (`Range: bytes=start-end`), retrying on transport error or a status other
/// than 206 Partial Content. Used by the GFS provider to pull individual `.idx`-addressed fields.
pub async fn get_range_with_retry (client: &Client, url: &str, start: u64, end: u64, timeout: Duration, max_retries: usize) -> Result<Vec<u8>> {
    get_range_with_retry_opt(client, url, start, Some(end), timeout, max_retries).await
}

/// same as [`get_range_with_retry`] but `end = None` issues an open-ended range (`bytes=start-`),
/// used for the last field in a GFS `.idx` table where there is no following record to bound it.
pub async fn get_range_with_retry_opt (client: &Client, url: &str, start: u64, end: Option<u64>, timeout: Duration, max_retries: usize) -> Result<Vec<u8>> {
    let range = match end {
        Some(end) => format!("bytes={start}-{end}"),
        None => format!("bytes={start}-"),
    };
    let mut headers = HeaderMap::new();
    headers.insert(RANGE, HeaderValue::from_str(&range).unwrap());

    let mut last_err = None;
    for attempt in 0..=max_retries {
        match client.get(url).headers(headers.clone()).timeout(timeout).send().await {
            Ok(resp) if resp.status() == StatusCode::PARTIAL_CONTENT => {
                return Ok(resp.bytes().await?.to_vec());
            }
            Ok(resp) => {
                let status = resp.status();
                info!("range GET {url} returned {status}, retry {attempt}/{max_retries}");
                last_err = Some(WxNetError::BadStatus(status, url.to_string()));
            }
            Err(e) => {
                info!("range GET {url} failed: {e}, retry {attempt}/{max_retries}");
                last_err = Some(WxNetError::HttpError(e));
            }
        }
    }
    Err(last_err.unwrap_or_else(|| WxNetError::RetriesExhausted(max_retries, url.to_string())))
}

/// plain GET without retry, used for `.idx` sidecar files where a miss just means "no field table".
pub async fn get_text (client: &Client, url: &str, timeout: Duration) -> Result<String> {
    let resp = client.get(url).timeout(timeout).send().await?;
    if resp.status() != StatusCode::OK {
        return Err(WxNetError::BadStatus(resp.status(), url.to_string()));
    }
    Ok(resp.text().await?)
}
