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

//! Scheduler / Memory Governor (§5): decides once, at ingestion start, whether to run "fast"
//! (one task per parameter) or "serial" ingestion, based on free system memory. The decision is
//! made exactly once per ingestion run and threaded through as a plain `bool`, never re-derived
//! per call.

use sysinfo::System;
use tracing::warn;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// bytes of free memory required to run `n_params` parameters in fast mode.
fn required_bytes (n_params: usize, gib_per_parameter: f64) -> u64 {
    (gib_per_parameter * n_params as f64 * GIB) as u64
}

/// `requested_fast` is the caller's ask (the `--fast` flag); the governor only ever downgrades
/// it to serial, never upgrades a serial request to fast. Returns the mode actually used.
pub fn decide_mode (requested_fast: bool, n_params: usize, gib_per_parameter: f64, free_bytes: u64) -> bool {
    if !requested_fast {
        return false;
    }

    let required = required_bytes(n_params, gib_per_parameter);
    if free_bytes < required {
        warn!(
            "free memory {:.2} GiB below {:.2} GiB required for {n_params} parameters in fast mode, forcing serial",
            free_bytes as f64 / GIB, required as f64 / GIB,
        );
        false
    } else {
        true
    }
}

/// `free_memory()` samples the OS-reported free memory once (§5: "computes `free_memory` once
/// at ingestion start").
pub fn free_memory() -> u64 {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.free_memory()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_request_never_becomes_fast() {
        assert!(!decide_mode(false, 1, 2.5, u64::MAX));
    }

    #[test]
    fn fast_request_downgrades_when_memory_is_short() {
        let n_params = 12;
        let required = required_bytes(n_params, 2.5);
        assert!(!decide_mode(true, n_params, 2.5, required - 1));
    }

    #[test]
    fn fast_request_stays_fast_when_memory_suffices() {
        let n_params = 12;
        let required = required_bytes(n_params, 2.5);
        assert!(decide_mode(true, n_params, 2.5, required));
    }
}
