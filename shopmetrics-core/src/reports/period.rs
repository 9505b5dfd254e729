//! Date ranges, presets, and adaptive granularity.
//!
//! Every report runs over an inclusive [`DateRange`]. The range picks its
//! own chart [`Granularity`] from its length, and can shift itself backward
//! to the immediately preceding period of identical length for trend
//! comparison.

use crate::error::{Error, Result};
use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;

/// Time-window width for chart buckets, chosen adaptively from the range
/// length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// One bucket per day (ranges up to 14 days)
    Daily,
    /// Fixed 7-day windows from the range start (15 to 60 days)
    Weekly,
    /// Calendar months, clipped to the range (more than 60 days)
    Monthly,
}

impl Granularity {
    /// Pick the granularity for a period of `duration_days` days.
    ///
    /// The thresholds are part of the reporting contract: `<= 14` daily,
    /// `<= 60` weekly, otherwise monthly.
    pub fn for_duration(duration_days: i64) -> Self {
        if duration_days <= 14 {
            Granularity::Daily
        } else if duration_days <= 60 {
            Granularity::Weekly
        } else {
            Granularity::Monthly
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }
}

/// An inclusive date range.
///
/// `start <= end` always holds; construction rejects anything else, so the
/// duration invariant `end - start + 1 >= 1` is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DateRange {
    /// First day of the period (inclusive)
    pub start: NaiveDate,
    /// Last day of the period (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse a range from two ISO `yyyy-mm-dd` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let parse_day = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| Error::Config(format!("invalid date '{}': {}", s, e)))
        };
        Self::new(parse_day(start)?, parse_day(end)?)
    }

    // Internal constructor for ranges derived from an already-valid one.
    fn from_ordered(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Number of days in the period, inclusive of both ends.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The granularity charts over this range bucket at.
    pub fn granularity(&self) -> Granularity {
        Granularity::for_duration(self.duration_days())
    }

    /// The immediately preceding period of identical length.
    ///
    /// `prior.end = start - 1 day`, `prior.start = prior.end - duration + 1`.
    pub fn prior(&self) -> DateRange {
        let prior_end = self.start - Duration::days(1);
        let prior_start = prior_end - Duration::days(self.duration_days() - 1);
        Self::from_ordered(prior_start, prior_end)
    }

    /// Whether `day` falls inside the range.
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    /// The ordered bucket spans covering this range at its granularity.
    pub fn bucket_spans(&self) -> Vec<BucketSpan> {
        let mut spans = Vec::new();
        match self.granularity() {
            Granularity::Daily => {
                let mut day = self.start;
                while day <= self.end {
                    spans.push(BucketSpan::new(day, day));
                    day += Duration::days(1);
                }
            }
            Granularity::Weekly => {
                // Fixed 7-day windows from the range start; the final
                // window is clipped to the range end.
                let mut cursor = self.start;
                while cursor <= self.end {
                    let week_end = (cursor + Duration::days(6)).min(self.end);
                    spans.push(BucketSpan::new(cursor, week_end));
                    cursor += Duration::days(7);
                }
            }
            Granularity::Monthly => {
                // Calendar-month windows, clipped to the range at both ends.
                let mut cursor = self.start;
                while cursor <= self.end {
                    let month_end = last_day_of_month(cursor).min(self.end);
                    spans.push(BucketSpan::new(cursor, month_end));
                    cursor = month_end + Duration::days(1);
                }
            }
        }
        spans
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// One bucket's window within a range (inclusive bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BucketSpan {
    fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `day` falls inside this span.
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    /// Chart label for this span at the given granularity.
    ///
    /// Daily: `"Jun 5"`. Weekly: `"Jun 5-11"`, or `"Jun 29-Jul 5"` across a
    /// month boundary. Monthly: `"Jun 2024"`.
    pub fn label(&self, granularity: Granularity) -> String {
        match granularity {
            Granularity::Daily => format!("{} {}", self.start.format("%b"), self.start.day()),
            Granularity::Weekly => {
                if self.start == self.end {
                    format!("{} {}", self.start.format("%b"), self.start.day())
                } else if self.start.month() == self.end.month()
                    && self.start.year() == self.end.year()
                {
                    format!(
                        "{} {}-{}",
                        self.start.format("%b"),
                        self.start.day(),
                        self.end.day()
                    )
                } else {
                    format!(
                        "{} {}-{} {}",
                        self.start.format("%b"),
                        self.start.day(),
                        self.end.format("%b"),
                        self.end.day()
                    )
                }
            }
            Granularity::Monthly => {
                format!("{} {}", self.start.format("%b"), self.start.year())
            }
        }
    }
}

/// Last calendar day of the month `day` falls in.
fn last_day_of_month(day: NaiveDate) -> NaiveDate {
    let (year, month) = if day.month() == 12 {
        (day.year() + 1, 1)
    } else {
        (day.year(), day.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is always valid")
        - Duration::days(1)
}

/// Named date-range presets offered by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangePreset {
    /// Today only
    Today,
    /// Last 7 calendar days ending today
    Last7Days,
    /// Last 30 calendar days ending today
    #[default]
    Last30Days,
    /// Last 90 calendar days ending today
    Last90Days,
    /// First of the current month through today
    ThisMonth,
    /// January 1 of the current year through today
    ThisYear,
}

impl RangePreset {
    /// Resolve the preset against a reference day (normally today).
    ///
    /// "Last N days" means N days inclusive of `today`, so the duration of
    /// the resolved range is exactly N.
    pub fn to_range(self, today: NaiveDate) -> DateRange {
        let start = match self {
            RangePreset::Today => today,
            RangePreset::Last7Days => today - Duration::days(6),
            RangePreset::Last30Days => today - Duration::days(29),
            RangePreset::Last90Days => today - Duration::days(89),
            RangePreset::ThisMonth => today.with_day(1).expect("day 1 is always valid"),
            RangePreset::ThisYear => {
                NaiveDate::from_ymd_opt(today.year(), 1, 1).expect("January 1 is always valid")
            }
        };
        DateRange::from_ordered(start, today)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RangePreset::Today => "today",
            RangePreset::Last7Days => "last-7-days",
            RangePreset::Last30Days => "last-30-days",
            RangePreset::Last90Days => "last-90-days",
            RangePreset::ThisMonth => "this-month",
            RangePreset::ThisYear => "this-year",
        }
    }

    /// All presets, in the order the CLI lists them.
    pub const fn all() -> &'static [Self] {
        &[
            RangePreset::Today,
            RangePreset::Last7Days,
            RangePreset::Last30Days,
            RangePreset::Last90Days,
            RangePreset::ThisMonth,
            RangePreset::ThisYear,
        ]
    }
}

impl std::str::FromStr for RangePreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "today" => Ok(RangePreset::Today),
            "last-7-days" => Ok(RangePreset::Last7Days),
            "last-30-days" => Ok(RangePreset::Last30Days),
            "last-90-days" => Ok(RangePreset::Last90Days),
            "this-month" => Ok(RangePreset::ThisMonth),
            "this-year" => Ok(RangePreset::ThisYear),
            _ => Err(format!("unknown range preset: {}", s)),
        }
    }
}

impl fmt::Display for RangePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
