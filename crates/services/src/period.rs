//! Date ranges used by the time-scoped reads.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Reporting window ending today.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReportPeriod {
    #[serde(rename = "7d")]
    Last7Days,
    #[default]
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "current_month")]
    CurrentMonth,
}

impl ReportPeriod {
    pub const ALL: [ReportPeriod; 3] = [
        ReportPeriod::Last7Days,
        ReportPeriod::Last30Days,
        ReportPeriod::CurrentMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Last7Days => "7d",
            ReportPeriod::Last30Days => "30d",
            ReportPeriod::CurrentMonth => "current_month",
        }
    }

    /// Inclusive `(start, end)` dates; `end` is always `today`.
    pub fn range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = match self {
            ReportPeriod::Last7Days => today - Duration::days(7),
            ReportPeriod::Last30Days => today - Duration::days(30),
            ReportPeriod::CurrentMonth => {
                NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today)
            }
        };
        (start, today)
    }

    /// Half-open timestamp window `[start 00:00, end+1 00:00)` in UTC.
    pub fn timestamp_range(&self, today: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let (start, end) = self.range(today);
        (day_bounds(start).0, day_bounds(end).1)
    }
}

impl core::fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ReportPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" => Ok(ReportPeriod::Last7Days),
            "30d" => Ok(ReportPeriod::Last30Days),
            "current_month" => Ok(ReportPeriod::CurrentMonth),
            other => Err(format!("unknown report period: {other} (expected 7d, 30d or current_month)")),
        }
    }
}

/// `[date 00:00, next day 00:00)` in UTC.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let next = date.succ_opt().unwrap_or(date);
    (
        date.and_time(NaiveTime::MIN).and_utc(),
        next.and_time(NaiveTime::MIN).and_utc(),
    )
}
