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

//! Downsampling Helper (§4.5): derives 15-minute series from hourly series using the parameter's
//! interpolation method. Executed in parallel across parameters (one task each), mirroring the
//! Query Engine's own per-parameter fan-out.

use std::collections::HashMap;

use wx_catalog::Interpolation;

fn round2 (x: f64) -> f64 { (x * 100.0).round() / 100.0 }

/// `to_15min(hourly) -> minutely15` for a single parameter's hourly sequence: for N samples the
/// result has `(N-1)*4` entries. LINEAR emits `a, a+d, a+2d, a+3d` between consecutive samples
/// `a, b` with `d = (b-a)/4`; COPY emits four copies of `a`. Every emitted value is rounded to
/// two decimals, including the first of each group (matches the upstream `math.Round(x*100)/100`
/// applied uniformly).
pub fn to_15min_series (name: &str, hourly: &[f64]) -> Vec<f64> {
    let Some(param) = wx_catalog::by_name(name) else { return Vec::new(); };
    if hourly.len() < 2 { return Vec::new(); }

    let mut out = Vec::with_capacity((hourly.len() - 1) * 4);
    for w in hourly.windows(2) {
        let (a, b) = (w[0], w[1]);
        match param.interp {
            Interpolation::Copy => {
                for _ in 0..4 { out.push(round2(a)); }
            }
            Interpolation::Linear => {
                let d = (b - a) / 4.0;
                for k in 0..4 { out.push(round2(a + d * k as f64)); }
            }
        }
    }
    out
}

/// run [`to_15min_series`] across every parameter in `hourly`, one task per parameter (§5).
pub async fn to_15min (hourly: &HashMap<String, Vec<f64>>) -> HashMap<String, Vec<f64>> {
    let tasks = hourly.iter().map( |(name, values)| {
        let name = name.clone();
        let values = values.clone();
        async move {
            let series = to_15min_series(&name, &values);
            (name, series)
        }
    });

    futures::future::join_all(tasks).await.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_15min_law_matches_s6() {
        let out = to_15min_series("temperature", &[0.0, 4.0, 8.0]);
        assert_eq!(out, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn copy_15min_repeats_the_left_sample() {
        let out = to_15min_series("condition", &[0.0, 4.0, 8.0]);
        assert_eq!(out, vec![0.0, 0.0, 0.0, 0.0, 4.0, 4.0, 4.0, 4.0]);
    }

    #[test]
    fn length_law_holds_for_arbitrary_n() {
        let hourly: Vec<f64> = (0..10).map( |i| i as f64).collect();
        let out = to_15min_series("temperature", &hourly);
        assert_eq!(out.len(), 4 * (hourly.len() - 1));
    }

    #[tokio::test]
    async fn to_15min_runs_across_all_parameters() {
        let mut hourly = HashMap::new();
        hourly.insert("temperature".to_string(), vec![0.0, 4.0]);
        hourly.insert("condition".to_string(), vec![1.0, 1.0]);

        let out = to_15min(&hourly).await;
        assert_eq!(out["temperature"], vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(out["condition"], vec![1.0, 1.0, 1.0, 1.0]);
    }
}
