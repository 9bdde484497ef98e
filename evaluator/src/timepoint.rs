// Copyright 2025 Google LLC.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Time points in the `YYYY:MM:DDThh:mm:ss[.fff]Z` wire format.
//!
//! Note the colons between year, month, and day: this is not ISO-8601.
//! Comparison is field-wise; seconds are fractional.

use certifier_proto::TimePoint;
use chrono::{Datelike, Timelike, Utc};
use std::cmp::Ordering;

/// The current UTC wall clock, truncated to whole seconds.
pub fn now() -> TimePoint {
    let t = Utc::now();
    TimePoint {
        year: Some(t.year()),
        month: Some(t.month() as i32),
        day: Some(t.day() as i32),
        hour: Some(t.hour() as i32),
        minute: Some(t.minute() as i32),
        seconds: Some(t.second() as f64),
    }
}

pub fn format_time(tp: &TimePoint) -> String {
    format!(
        "{:04}:{:02}:{:02}T{:02}:{:02}:{}Z",
        tp.year.unwrap_or(0),
        tp.month.unwrap_or(0),
        tp.day.unwrap_or(0),
        tp.hour.unwrap_or(0),
        tp.minute.unwrap_or(0),
        tp.seconds.unwrap_or(0.0)
    )
}

pub fn parse_time(s: &str) -> Option<TimePoint> {
    let (date, time) = s.split_once('T')?;
    let mut date_fields = date.splitn(3, ':');
    let year: i32 = date_fields.next()?.parse().ok()?;
    let month: i32 = date_fields.next()?.parse().ok()?;
    let day: i32 = date_fields.next()?.parse().ok()?;

    let time = time.strip_suffix('Z').unwrap_or(time);
    let mut time_fields = time.splitn(3, ':');
    let hour: i32 = time_fields.next()?.parse().ok()?;
    let minute: i32 = time_fields.next()?.parse().ok()?;
    let seconds: f64 = time_fields.next()?.parse().ok()?;

    Some(TimePoint {
        year: Some(year),
        month: Some(month),
        day: Some(day),
        hour: Some(hour),
        minute: Some(minute),
        seconds: Some(seconds),
    })
}

/// Field-wise comparison in the order year, month, day, hour, minute,
/// seconds. Absent fields count as zero.
pub fn compare_time(t1: &TimePoint, t2: &TimePoint) -> Ordering {
    let coarse = |t: &TimePoint| {
        (
            t.year.unwrap_or(0),
            t.month.unwrap_or(0),
            t.day.unwrap_or(0),
            t.hour.unwrap_or(0),
            t.minute.unwrap_or(0),
        )
    };
    coarse(t1).cmp(&coarse(t2)).then_with(|| {
        t1.seconds
            .unwrap_or(0.0)
            .partial_cmp(&t2.seconds.unwrap_or(0.0))
            .unwrap_or(Ordering::Equal)
    })
}

/// Add a duration in seconds over a simplified calendar: 365-day years,
/// the fixed month table {31,28,31,30,31,30,31,31,30,31,30,31}, and no
/// leap-year correction. Validity windows computed with it can be off by
/// a day per leap year spanned; callers only use it for coarse
/// not-before/not-after bounds.
pub fn time_plus_seconds(t: &TimePoint, duration: f64) -> TimePoint {
    let mut year = t.year.unwrap_or(0);

    let mut ns = t.seconds.unwrap_or(0.0) + duration;
    let whole_years = (ns / (365.0 * 86400.0)) as i32;
    year += whole_years;
    ns -= whole_years as f64 * 365.0 * 86400.0;
    let mut extra_days = (ns / 86400.0) as i32;
    ns -= extra_days as f64 * 86400.0;
    let mut extra_hours = (ns / 3600.0) as i32;
    ns -= (extra_hours * 3600) as f64;
    let mut extra_minutes = (ns / 60.0) as i32;
    ns -= (extra_minutes * 60) as f64;
    let seconds = ns;

    extra_minutes += t.minute.unwrap_or(0);
    let carry = extra_minutes / 60;
    let minute = extra_minutes - 60 * carry;
    extra_hours += carry + t.hour.unwrap_or(0);
    let carry = extra_hours / 24;
    let hour = extra_hours - 24 * carry;
    extra_days += carry + t.day.unwrap_or(0);

    let mut month = t.month.unwrap_or(0);
    loop {
        let days_in_month = match 1 + ((month - 1) % 12) {
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        };
        if extra_days <= days_in_month {
            break;
        }
        month += 1;
        extra_days -= days_in_month;
    }
    let wrapped_years = (month - 1) / 12;

    TimePoint {
        year: Some(year + wrapped_years),
        month: Some(month - wrapped_years * 12),
        day: Some(extra_days),
        hour: Some(hour),
        minute: Some(minute),
        seconds: Some(seconds),
    }
}
