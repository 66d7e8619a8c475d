//! Bucket series planning.
//!
//! A series is anchored to the evaluation instant converted into the
//! network's local wall time and truncated at the interval's granularity,
//! then rewound by the requested period. Truncating in local time is what
//! aligns daily buckets to local midnight rather than UTC midnight.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::intervals::{Interval, Period};

/// The complete shape of one output time series: granularity plus
/// inclusive local-time bounds. The series stays abstract; the storage
/// engine materializes the buckets with `generate_series`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketSeries {
    pub interval: Interval,
    /// First bucket, local wall time.
    pub start: NaiveDateTime,
    /// Last bucket (the truncated anchor), local wall time.
    pub end: NaiveDateTime,
}

impl BucketSeries {
    pub fn plan(interval: Interval, period: Period, tz: Tz, now: DateTime<Utc>) -> Self {
        let local = now.with_timezone(&tz).naive_local();
        let end = interval.truncation().truncate(local);
        let start = period.rewind(end);
        BucketSeries {
            interval,
            start,
            end,
        }
    }

    /// Number of buckets `generate_series(start, end, step)` yields with
    /// both bounds inclusive. Always at least 1, even when the span is
    /// shorter than the step.
    pub fn bucket_count(&self) -> i64 {
        match self.interval.step_seconds() {
            Some(step) => (self.end - self.start).num_seconds() / step + 1,
            None => {
                let mut count = 0;
                let mut cursor = self.start;
                while cursor <= self.end {
                    count += 1;
                    cursor = self.interval.advance(cursor);
                }
                count
            }
        }
    }

    /// Lower bound as a quoted timestamp literal.
    pub fn start_literal(&self) -> String {
        quote_timestamp(self.start)
    }

    /// Upper bound as a quoted timestamp literal.
    pub fn end_literal(&self) -> String {
        quote_timestamp(self.end)
    }
}

fn quote_timestamp(ts: NaiveDateTime) -> String {
    format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn seven_daily_buckets_anchor_to_perth_midnight() {
        // 04:30 UTC is 12:30 in Perth (+08:00, no DST).
        let now = Utc.with_ymd_and_hms(2026, 8, 23, 4, 30, 0).unwrap();
        let series = BucketSeries::plan(
            Interval::OneDay,
            Period::SevenDays,
            chrono_tz::Australia::Perth,
            now,
        );

        assert_eq!(series.end_literal(), "'2026-08-23 00:00:00'");
        assert_eq!(series.start_literal(), "'2026-08-16 00:00:00'");
        assert_eq!(series.bucket_count(), 8);
    }

    #[test]
    fn local_date_wins_over_utc_date() {
        // Still Aug 22 in UTC, already Aug 23 in Perth.
        let now = Utc.with_ymd_and_hms(2026, 8, 22, 17, 0, 0).unwrap();
        let series = BucketSeries::plan(
            Interval::OneDay,
            Period::SevenDays,
            chrono_tz::Australia::Perth,
            now,
        );
        assert_eq!(series.end_literal(), "'2026-08-23 00:00:00'");
    }

    #[test]
    fn five_minute_week_has_2017_buckets() {
        let now = Utc.with_ymd_and_hms(2026, 8, 23, 4, 30, 0).unwrap();
        let series = BucketSeries::plan(
            Interval::FiveMinutes,
            Period::SevenDays,
            chrono_tz::Australia::Brisbane,
            now,
        );
        // Hour-truncated anchor, 12 buckets an hour for 7 days, plus the
        // inclusive upper bound.
        assert_eq!(series.bucket_count(), 7 * 24 * 12 + 1);
    }

    #[test]
    fn hourly_month_spans_the_real_calendar_month() {
        // Anchored mid-August; the preceding month (Jul 23..Aug 23) is 31
        // days long.
        let now = Utc.with_ymd_and_hms(2026, 8, 23, 4, 30, 0).unwrap();
        let series = BucketSeries::plan(
            Interval::OneHour,
            Period::OneMonth,
            chrono_tz::Australia::Perth,
            now,
        );
        assert_eq!(series.end_literal(), "'2026-08-23 12:00:00'");
        assert_eq!(series.start_literal(), "'2026-07-23 12:00:00'");
        assert_eq!(series.bucket_count(), 31 * 24 + 1);
    }

    #[test]
    fn calendar_steps_count_by_walking() {
        let now = Utc.with_ymd_and_hms(2026, 8, 23, 4, 30, 0).unwrap();
        let monthly = BucketSeries::plan(
            Interval::OneMonth,
            Period::OneYear,
            chrono_tz::Australia::Brisbane,
            now,
        );
        assert_eq!(monthly.end_literal(), "'2026-08-01 00:00:00'");
        assert_eq!(monthly.bucket_count(), 13);

        let yearly = BucketSeries::plan(
            Interval::OneYear,
            Period::FiveYears,
            chrono_tz::Australia::Brisbane,
            now,
        );
        assert_eq!(yearly.bucket_count(), 6);

        let all = BucketSeries::plan(
            Interval::OneYear,
            Period::AllHistory,
            chrono_tz::Australia::Brisbane,
            now,
        );
        assert_eq!(all.bucket_count(), 21);
    }

    #[test]
    fn span_shorter_than_step_still_yields_a_bucket() {
        let now = Utc.with_ymd_and_hms(2026, 8, 23, 4, 30, 0).unwrap();
        let series = BucketSeries::plan(
            Interval::OneYear,
            Period::SevenDays,
            chrono_tz::Australia::Perth,
            now,
        );
        assert_eq!(series.bucket_count(), 1);
    }

    #[test]
    fn daily_buckets_keep_wall_clock_midnight_across_dst() {
        // Sydney enters DST on 2026-10-04; the series straddles it. Bounds
        // stay on wall-clock midnight because the series axis is naive
        // local time, matching generate_series over timestamp literals.
        let now = Utc.with_ymd_and_hms(2026, 10, 7, 2, 0, 0).unwrap();
        let series = BucketSeries::plan(
            Interval::OneDay,
            Period::SevenDays,
            chrono_tz::Australia::Sydney,
            now,
        );
        assert_eq!(series.end_literal(), "'2026-10-07 00:00:00'");
        assert_eq!(series.start_literal(), "'2026-09-30 00:00:00'");
        assert_eq!(series.bucket_count(), 8);
    }

    #[test]
    fn utc_zone_truncates_the_instant_directly() {
        let now = Utc.with_ymd_and_hms(2026, 8, 23, 14, 37, 22).unwrap();
        let series = BucketSeries::plan(
            Interval::OneHour,
            Period::SevenDays,
            chrono_tz::UTC,
            now,
        );
        assert_eq!(series.end_literal(), "'2026-08-23 14:00:00'");
    }
}
