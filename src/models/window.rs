//! Reporting time windows.
//!
//! Windows are inclusive `[start, end]` UTC ranges used to build tracker
//! queries and to slice report periods. Construction accepts a fixed UTC
//! offset so a team can anchor quarters to its local midnight; the resulting
//! window is always expressed in UTC.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

/// Error raised for invalid window parameters.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("quarter must be 1..=4, got {0}")]
    InvalidQuarter(u32),
    #[error("invalid calendar date: {0}")]
    InvalidDate(String),
    #[error("window start {start} is after end {end}")]
    InvertedRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// An inclusive time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// First instant of the window (inclusive).
    pub start: DateTime<Utc>,
    /// Last instant of the window (inclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window from explicit UTC instants.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        if start > end {
            return Err(WindowError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The window covering one calendar quarter.
    ///
    /// Starts at the first instant of the quarter and ends at the last
    /// microsecond of the quarter's last day, both interpreted at `offset`.
    pub fn quarter(year: i32, quarter: u32, offset: FixedOffset) -> Result<Self, WindowError> {
        if !(1..=4).contains(&quarter) {
            return Err(WindowError::InvalidQuarter(quarter));
        }
        let month_start = 1 + (quarter - 1) * 3;
        let month_end = month_start + 2;

        let first = NaiveDate::from_ymd_opt(year, month_start, 1)
            .ok_or_else(|| WindowError::InvalidDate(format!("{}-{:02}-01", year, month_start)))?;
        let last = last_day_of_month(year, month_end)?;

        Self::from_local_days(first, last, offset)
    }

    /// A window spanning whole days, from the start of `start_date` to the
    /// last microsecond of `end_date` at `offset`.
    pub fn custom(
        start_date: NaiveDate,
        end_date: NaiveDate,
        offset: FixedOffset,
    ) -> Result<Self, WindowError> {
        Self::from_local_days(start_date, end_date, offset)
    }

    /// A trailing window covering the last `months` months, ending now.
    pub fn relative(months: u32, offset: FixedOffset) -> Result<Self, WindowError> {
        let end = Utc::now();
        let local_end = end.with_timezone(&offset);
        let local_start = local_end
            .checked_sub_months(Months::new(months))
            .ok_or_else(|| WindowError::InvalidDate(format!("{} months back", months)))?;
        Self::new(local_start.with_timezone(&Utc), end)
    }

    /// Duration of the window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True when the instant lies inside the window (inclusive).
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }

    /// Split the window into labelled calendar-month sub-windows (UTC
    /// months), each clipped to the parent window. Labels are `YYYY-MM`.
    pub fn split_by_month(&self) -> Vec<(String, TimeWindow)> {
        let mut parts = Vec::new();
        let mut cursor = self.start;

        while cursor <= self.end {
            let label = format!("{:04}-{:02}", cursor.year(), cursor.month());
            let next_month = first_of_next_month(cursor);
            let sub_end = (next_month - Duration::microseconds(1)).min(self.end);
            parts.push((
                label,
                TimeWindow {
                    start: cursor,
                    end: sub_end,
                },
            ));
            cursor = next_month;
        }

        parts
    }

    fn from_local_days(
        first: NaiveDate,
        last: NaiveDate,
        offset: FixedOffset,
    ) -> Result<Self, WindowError> {
        let start_naive = first.and_time(NaiveTime::MIN);
        let end_naive = last
            .and_time(NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).expect("valid time"));

        let start = offset
            .from_local_datetime(&start_naive)
            .single()
            .ok_or_else(|| WindowError::InvalidDate(start_naive.to_string()))?;
        let end = offset
            .from_local_datetime(&end_naive)
            .single()
            .ok_or_else(|| WindowError::InvalidDate(end_naive.to_string()))?;

        Self::new(start.with_timezone(&Utc), end.with_timezone(&Utc))
    }
}

fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate, WindowError> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| WindowError::InvalidDate(format!("{}-{:02}-01", next_year, next_month)))?;
    first_next
        .pred_opt()
        .ok_or_else(|| WindowError::InvalidDate(format!("{}-{:02}", year, month)))
}

fn first_of_next_month(at: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if at.month() == 12 {
        (at.year() + 1, 1)
    } else {
        (at.year(), at.month() + 1)
    };
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .expect("first of month is unambiguous in UTC")
}
