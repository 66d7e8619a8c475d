//! Interval and period catalogs.
//!
//! Both catalogs are closed tables: every supported token is enumerated
//! explicitly, unknown tokens are rejected at parse time and never
//! defaulted. Tokens are case-insensitive on input; `Display` gives the
//! canonical uppercase form back.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Calendar granularity a timestamp is rounded down to before bucket
/// assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncUnit {
    Hour,
    Day,
    Month,
    Year,
}

impl TruncUnit {
    /// Field name accepted by `date_trunc`.
    pub fn sql_field(self) -> &'static str {
        match self {
            TruncUnit::Hour => "hour",
            TruncUnit::Day => "day",
            TruncUnit::Month => "month",
            TruncUnit::Year => "year",
        }
    }

    /// Rounds `ts` down to this granularity.
    pub fn truncate(self, ts: NaiveDateTime) -> NaiveDateTime {
        let date = ts.date();
        let truncated = match self {
            TruncUnit::Hour => date.and_hms_opt(ts.hour(), 0, 0),
            TruncUnit::Day => date.and_hms_opt(0, 0, 0),
            TruncUnit::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            TruncUnit::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
        };
        truncated.unwrap_or(ts)
    }
}

/// Output bucket granularity.
///
/// Sub-hour intervals truncate to the hour; the finer spacing lives in the
/// series step, not the truncation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    OneDay,
    OneMonth,
    OneYear,
}

impl Interval {
    pub const ALL: [Interval; 7] = [
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::OneHour,
        Interval::OneDay,
        Interval::OneMonth,
        Interval::OneYear,
    ];

    /// Resolves a caller-supplied token. Case-insensitive, no unit
    /// inference: "90M" is an error, not ninety minutes.
    pub fn parse(token: &str) -> Result<Self, QueryError> {
        match token.trim().to_uppercase().as_str() {
            "5M" => Ok(Interval::FiveMinutes),
            "15M" => Ok(Interval::FifteenMinutes),
            "30M" => Ok(Interval::ThirtyMinutes),
            "1H" => Ok(Interval::OneHour),
            "1D" => Ok(Interval::OneDay),
            "1M" => Ok(Interval::OneMonth),
            "1Y" => Ok(Interval::OneYear),
            _ => Err(QueryError::UnsupportedGranularity(token.to_string())),
        }
    }

    /// Canonical catalog token.
    pub fn token(self) -> &'static str {
        match self {
            Interval::FiveMinutes => "5M",
            Interval::FifteenMinutes => "15M",
            Interval::ThirtyMinutes => "30M",
            Interval::OneHour => "1H",
            Interval::OneDay => "1D",
            Interval::OneMonth => "1M",
            Interval::OneYear => "1Y",
        }
    }

    /// Label consumers see on the output series ("1H" is reported as "60m").
    pub fn label(self) -> &'static str {
        match self {
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "60m",
            Interval::OneDay => "1D",
            Interval::OneMonth => "1M",
            Interval::OneYear => "1Y",
        }
    }

    pub fn truncation(self) -> TruncUnit {
        match self {
            Interval::FiveMinutes | Interval::FifteenMinutes | Interval::ThirtyMinutes => {
                TruncUnit::Hour
            }
            Interval::OneHour => TruncUnit::Hour,
            Interval::OneDay => TruncUnit::Day,
            Interval::OneMonth => TruncUnit::Month,
            Interval::OneYear => TruncUnit::Year,
        }
    }

    /// Step expression accepted by `generate_series`.
    pub fn step_sql(self) -> &'static str {
        match self {
            Interval::FiveMinutes => "5 minutes",
            Interval::FifteenMinutes => "15 minutes",
            Interval::ThirtyMinutes => "30 minutes",
            Interval::OneHour => "1 hour",
            Interval::OneDay => "1 day",
            Interval::OneMonth => "1 month",
            Interval::OneYear => "1 year",
        }
    }

    /// Step width in seconds for fixed-width steps; `None` for
    /// calendar-sized steps (month, year).
    pub fn step_seconds(self) -> Option<i64> {
        match self {
            Interval::FiveMinutes => Some(300),
            Interval::FifteenMinutes => Some(900),
            Interval::ThirtyMinutes => Some(1800),
            Interval::OneHour => Some(3600),
            Interval::OneDay => Some(86_400),
            Interval::OneMonth | Interval::OneYear => None,
        }
    }

    /// Start of the bucket after the one starting at `ts`. Month and year
    /// steps clamp to month-end the same way Postgres interval addition
    /// does; clamping never occurs in practice because calendar steps only
    /// pair with calendar truncation, which pins the day to 1.
    pub fn advance(self, ts: NaiveDateTime) -> NaiveDateTime {
        match self {
            Interval::FiveMinutes => ts + Duration::minutes(5),
            Interval::FifteenMinutes => ts + Duration::minutes(15),
            Interval::ThirtyMinutes => ts + Duration::minutes(30),
            Interval::OneHour => ts + Duration::hours(1),
            Interval::OneDay => ts + Duration::days(1),
            Interval::OneMonth => ts
                .checked_add_months(Months::new(1))
                .unwrap_or(NaiveDateTime::MAX),
            Interval::OneYear => ts
                .checked_add_months(Months::new(12))
                .unwrap_or(NaiveDateTime::MAX),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Interval {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::parse(s)
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Interval::parse(&raw).map_err(de::Error::custom)
    }
}

/// How far back from the anchor the series reaches.
///
/// "ALL" is a deliberately large fixed bound standing in for all history;
/// market data does not predate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    SevenDays,
    OneMonth,
    OneYear,
    FiveYears,
    AllHistory,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::SevenDays,
        Period::OneMonth,
        Period::OneYear,
        Period::FiveYears,
        Period::AllHistory,
    ];

    pub fn parse(token: &str) -> Result<Self, QueryError> {
        match token.trim().to_uppercase().as_str() {
            "7D" => Ok(Period::SevenDays),
            "1M" => Ok(Period::OneMonth),
            "1Y" => Ok(Period::OneYear),
            "5Y" => Ok(Period::FiveYears),
            "ALL" => Ok(Period::AllHistory),
            _ => Err(QueryError::UnsupportedSpan(token.to_string())),
        }
    }

    /// Canonical catalog token.
    pub fn token(self) -> &'static str {
        match self {
            Period::SevenDays => "7D",
            Period::OneMonth => "1M",
            Period::OneYear => "1Y",
            Period::FiveYears => "5Y",
            Period::AllHistory => "ALL",
        }
    }

    /// Span expression in interval syntax.
    pub fn span_sql(self) -> &'static str {
        match self {
            Period::SevenDays => "7 days",
            Period::OneMonth => "1 month",
            Period::OneYear => "1 year",
            Period::FiveYears => "5 years",
            Period::AllHistory => "20 years",
        }
    }

    /// Anchor minus the span. Month arithmetic clamps to month-end like
    /// Postgres interval subtraction.
    pub fn rewind(self, ts: NaiveDateTime) -> NaiveDateTime {
        let months = |n: u32| {
            ts.checked_sub_months(Months::new(n))
                .unwrap_or(NaiveDateTime::MIN)
        };
        match self {
            Period::SevenDays => ts - Duration::days(7),
            Period::OneMonth => months(1),
            Period::OneYear => months(12),
            Period::FiveYears => months(60),
            Period::AllHistory => months(240),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Period {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::parse(s)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Period::parse(&raw).map_err(de::Error::custom)
    }
}
