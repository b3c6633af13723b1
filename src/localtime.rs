//! UTC to local civil hour conversion.
//!
//! The target region's clock is UTC+2, or UTC+3 while daylight saving is in
//! effect. The rule is applied explicitly (last Sunday of March through last
//! Sunday of October, at day granularity on the timestamp's UTC calendar
//! date) so results never depend on the host's timezone database.
//!
//! The same timestamp string recurs across many sensor records in one
//! window, so the resolver memoizes both the per-date DST flag and the final
//! per-string hour in bounded LRU caches. Entries are pure functions of
//! their keys; racing recomputation is harmless.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use lru::LruCache;

const DST_CACHE_CAP: usize = 64;
const HOUR_CACHE_CAP: usize = 4096;

pub struct HourResolver {
    dst_by_date: Mutex<LruCache<NaiveDate, bool>>,
    hour_by_stamp: Mutex<LruCache<String, u32>>,
}

impl Default for HourResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl HourResolver {
    pub fn new() -> Self {
        Self::with_capacity(DST_CACHE_CAP, HOUR_CACHE_CAP)
    }

    /// Builds a resolver with explicit cache bounds. Capacities below one
    /// are clamped to one.
    pub fn with_capacity(dst_entries: usize, hour_entries: usize) -> Self {
        let dst = NonZeroUsize::new(dst_entries.max(1)).unwrap();
        let hours = NonZeroUsize::new(hour_entries.max(1)).unwrap();
        Self {
            dst_by_date: Mutex::new(LruCache::new(dst)),
            hour_by_stamp: Mutex::new(LruCache::new(hours)),
        }
    }

    /// Drops every memoized entry. Intended for test isolation.
    pub fn reset(&self) {
        self.dst_by_date.lock().unwrap().clear();
        self.hour_by_stamp.lock().unwrap().clear();
    }

    /// Resolves an ISO-8601 UTC timestamp to the local hour of day (0–23).
    ///
    /// Returns `None` for a timestamp that does not parse; callers treat
    /// that as a per-record condition, not a failure.
    pub fn local_hour(&self, stamp: &str) -> Option<u32> {
        if let Some(hour) = self.hour_by_stamp.lock().unwrap().get(stamp) {
            return Some(*hour);
        }

        let utc = DateTime::parse_from_rfc3339(stamp)
            .ok()?
            .with_timezone(&Utc);
        let offset = if self.dst_in_effect(utc.date_naive()) {
            3
        } else {
            2
        };
        let hour = (utc.hour() + offset) % 24;

        self.hour_by_stamp
            .lock()
            .unwrap()
            .put(stamp.to_string(), hour);
        Some(hour)
    }

    /// Whether daylight saving is in effect on the given UTC calendar date.
    pub fn dst_in_effect(&self, date: NaiveDate) -> bool {
        if let Some(flag) = self.dst_by_date.lock().unwrap().get(&date) {
            return *flag;
        }
        let flag = compute_dst(date);
        self.dst_by_date.lock().unwrap().put(date, flag);
        flag
    }
}

fn compute_dst(date: NaiveDate) -> bool {
    match date.month() {
        4..=9 => true,
        3 => date.day() >= last_sunday(date.year(), 3),
        10 => date.day() < last_sunday(date.year(), 10),
        _ => false,
    }
}

/// Day of month of the last Sunday of `month`.
fn last_sunday(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .expect("first of month is always valid")
        .pred_opt()
        .expect("predecessor of first of month exists");
    last.day() - last.weekday().num_days_from_sunday()
}
