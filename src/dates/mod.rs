//! Time-range resolution.
//!
//! Symbolic ranges (`day`, `week`, `month`) are resolved against a reference
//! date in the dashboard's time zone. Custom ranges take caller bounds and
//! widen them to whole local days. All bounds are inclusive and expressed as
//! UTC instants so they compare directly against record timestamps.

use crate::models::{FilterOptions, TimeRange};
use chrono::{
    DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
    Utc,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RangeError {
    #[error("Custom time range requires dateRange.start and dateRange.end")]
    MissingBounds,

    #[error("Invalid date range: start {start} is after end {end}")]
    Inverted {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Date out of supported range")]
    OutOfRange,
}

/// Inclusive `[start, end]` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant <= self.end
    }
}

// ── Day boundaries ────────────────────────────────────────────────────────────

/// Convert a local wall-clock time to UTC. Ambiguous times take the earliest
/// mapping; times inside a DST gap are shifted forward by an hour.
fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + TimeDelta::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// 00:00:00.000 local.
pub fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    localize(tz, date.and_time(NaiveTime::MIN))
}

/// 23:59:59.999 local.
pub fn end_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<DateTime<Utc>, RangeError> {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).ok_or(RangeError::OutOfRange)?;
    Ok(localize(tz, date.and_time(last)))
}

fn whole_days<Tz: TimeZone>(
    first: NaiveDate,
    last: NaiveDate,
    tz: &Tz,
) -> Result<DateRange, RangeError> {
    let range = DateRange {
        start: start_of_day(first, tz),
        end: end_of_day(last, tz)?,
    };
    if range.start > range.end {
        return Err(RangeError::Inverted {
            start: range.start,
            end: range.end,
        });
    }
    Ok(range)
}

// ── Symbolic ranges ───────────────────────────────────────────────────────────

pub fn day_range<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<DateRange, RangeError> {
    whole_days(date, date, tz)
}

/// Monday through Sunday of the week containing `date`.
pub fn week_range<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<DateRange, RangeError> {
    let back = u64::from(date.weekday().num_days_from_monday());
    let monday = date
        .checked_sub_days(Days::new(back))
        .ok_or(RangeError::OutOfRange)?;
    let sunday = monday
        .checked_add_days(Days::new(6))
        .ok_or(RangeError::OutOfRange)?;
    whole_days(monday, sunday, tz)
}

pub fn month_range<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<DateRange, RangeError> {
    let first = date.with_day(1).ok_or(RangeError::OutOfRange)?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or(RangeError::OutOfRange)?;
    whole_days(first, last, tz)
}

/// Caller bounds clamped to the start of the first day and the end of the last.
pub fn custom_range<Tz: TimeZone>(
    start: NaiveDate,
    end: NaiveDate,
    tz: &Tz,
) -> Result<DateRange, RangeError> {
    whole_days(start, end, tz)
}

/// Resolve a symbolic range around `date`. `Custom` has no symbolic meaning
/// and falls back to the single day, so callers pass explicit bounds instead.
pub fn resolve<Tz: TimeZone>(
    range: TimeRange,
    date: NaiveDate,
    tz: &Tz,
) -> Result<DateRange, RangeError> {
    match range {
        TimeRange::Day | TimeRange::Custom => day_range(date, tz),
        TimeRange::Week => week_range(date, tz),
        TimeRange::Month => month_range(date, tz),
    }
}

/// Resolve the bounds a dashboard query covers.
///
/// Custom ranges require `dateRange` and are widened to whole local days.
/// Symbolic ranges with a `dateRange` were already resolved by the client in
/// its own zone, so those bounds are used exactly as sent. Without one they
/// are resolved around `now`.
pub fn resolve_filter<Tz: TimeZone>(
    filter: &FilterOptions,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<DateRange, RangeError> {
    let local_date = |instant: &DateTime<Utc>| instant.with_timezone(tz).date_naive();

    match (filter.time_range, filter.date_range.as_ref()) {
        (TimeRange::Custom, Some(bounds)) => {
            custom_range(local_date(&bounds.start), local_date(&bounds.end), tz)
        }
        (TimeRange::Custom, None) => Err(RangeError::MissingBounds),
        (_, Some(bounds)) => {
            if bounds.start > bounds.end {
                return Err(RangeError::Inverted {
                    start: bounds.start,
                    end: bounds.end,
                });
            }
            Ok(DateRange {
                start: bounds.start,
                end: bounds.end,
            })
        }
        (range, None) => resolve(range, local_date(&now), tz),
    }
}
