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

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Timelike, Utc};
use std::time::Duration;

#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }
#[inline] pub fn minutes (n: u64)->Duration { Duration::from_secs(n * 60) }
#[inline] pub fn hours (n: u64)->Duration { Duration::from_secs(n * 3600) }
#[inline] pub fn days (n: u64)->Duration { Duration::from_secs(n * 86400) }

#[inline]
pub fn utc_now()->DateTime<Utc> { Utc::now() }

/// day-since-epoch: `⌊(t_utc − 1970-01-01T00:00Z) / 24h⌋`, monotone nondecreasing in t.
pub fn day_since_epoch (dt: &DateTime<Utc>) -> i64 {
    dt.timestamp().div_euclid(86400)
}

pub fn datetime_from_day_since_epoch (day: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(day * 86400, 0).expect("day_since_epoch out of range")
}

/// truncate `now - delivery_offset` down to the nearest multiple of `cadence_hours`.
/// satisfies property: `run_time` is a multiple of `cadence_hours` and
/// `0 <= now - delivery_offset - run_time < cadence_hours`.
pub fn truncate_run_time (now: DateTime<Utc>, delivery_offset_minutes: i64, cadence_hours: i64) -> DateTime<Utc> {
    let shifted = now - ChronoDuration::minutes(delivery_offset_minutes);
    let cadence_secs = cadence_hours * 3600;
    let ts = shifted.timestamp().div_euclid(cadence_secs) * cadence_secs;
    DateTime::<Utc>::from_timestamp(ts, 0).expect("truncated timestamp out of range")
}

pub fn full_hour<Tz: TimeZone> (dt: &DateTime<Tz>) -> DateTime<Tz> {
    dt.clone().with_minute(0).unwrap().with_second(0).unwrap().with_nanosecond(0).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_since_epoch_is_monotone() {
        let t0 = Utc.with_ymd_and_hms(1970,1,1,0,0,0).unwrap();
        let t1 = Utc.with_ymd_and_hms(1970,1,1,23,59,59).unwrap();
        let t2 = Utc.with_ymd_and_hms(1970,1,2,0,0,0).unwrap();
        assert_eq!(day_since_epoch(&t0), 0);
        assert_eq!(day_since_epoch(&t1), 0);
        assert_eq!(day_since_epoch(&t2), 1);
    }

    #[test]
    fn run_time_truncation_is_a_multiple_of_cadence() {
        let now = Utc.with_ymd_and_hms(2026, 3, 5, 9, 47, 0).unwrap();
        let run_time = truncate_run_time(now, 240, 6);
        assert_eq!(run_time.hour() % 6, 0);
        let offset = now - ChronoDuration::minutes(240);
        let delta = offset - run_time;
        assert!(delta.num_seconds() >= 0 && delta.num_seconds() < 6*3600);
    }
}
