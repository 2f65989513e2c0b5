//! Calendar arithmetic for recurring expenses and budgets.
//!
//! Monthly steps keep the day of month when the target month has it and
//! otherwise clamp to that month's last day, so `2024-01-31` is followed by
//! `2024-02-29`. Chains step from the previous occurrence, never from the
//! original start date.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// Upper bound on occurrences produced by a single generation pass.
pub const MAX_OCCURRENCES: usize = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("malformed date `{0}`: expected YYYY-MM-DD")]
    Malformed(String),
    #[error("date `{0}` does not exist in the calendar")]
    InvalidDate(String),
    #[error("unknown frequency: {0}")]
    UnknownFrequency(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(RecurrenceError::UnknownFrequency(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub start_date: NaiveDate,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency, start_date: NaiveDate) -> Self {
        Self {
            frequency,
            start_date,
        }
    }

    /// The occurrence after `start_date`.
    pub fn next_due_date(&self) -> NaiveDate {
        next_due_date(self.start_date, self.frequency)
    }

    /// First occurrence that falls inside `year`.
    ///
    /// Templates starting in `year` (or later) keep their exact start date.
    pub fn first_occurrence_in_year(&self, year: i32) -> NaiveDate {
        let start = self.start_date;
        if start.year() >= year {
            return start;
        }
        let Some(year_start) = NaiveDate::from_ymd_opt(year, 1, 1) else {
            return start;
        };
        let candidate = match self.frequency {
            Frequency::Daily => year_start,
            Frequency::Weekly => {
                let days_since_start = (year_start - start).num_days();
                let weeks = (days_since_start + 6).div_euclid(7);
                let mut first = start + Duration::weeks(weeks);
                if first < year_start {
                    first += Duration::weeks(1);
                }
                first
            }
            Frequency::Monthly => (1..=12)
                .find(|month| start.day() <= days_in_month(year, *month))
                .and_then(|month| NaiveDate::from_ymd_opt(year, month, start.day()))
                .unwrap_or(year_start),
            Frequency::Yearly => clamped_date(year, start.month(), start.day()),
        };
        candidate.max(start)
    }
}

/// Computes the occurrence one period after `start`.
pub fn next_due_date(start: NaiveDate, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Daily => start + Duration::days(1),
        Frequency::Weekly => start + Duration::days(7),
        Frequency::Monthly => {
            let (year, month) = if start.month() == 12 {
                (start.year() + 1, 1)
            } else {
                (start.year(), start.month() + 1)
            };
            clamped_date(year, month, start.day())
        }
        Frequency::Yearly => clamped_date(start.year() + 1, start.month(), start.day()),
    }
}

/// Parses a `YYYY-MM-DD` string and advances it by one period.
pub fn next_due_date_str(input: &str, frequency: Frequency) -> Result<NaiveDate, RecurrenceError> {
    let start = parse_due_date(input)?;
    Ok(next_due_date(start, frequency))
}

/// Lenient variant: malformed input degrades to `today` and is logged.
pub fn next_due_date_or_today(input: &str, frequency: Frequency, today: NaiveDate) -> NaiveDate {
    match next_due_date_str(input, frequency) {
        Ok(date) => date,
        Err(err) => {
            error!(target: "recurrence", input, %err, "falling back to today");
            today
        }
    }
}

/// Strict `YYYY-MM-DD` parser: exactly three dash-separated numeric parts.
pub fn parse_due_date(input: &str) -> Result<NaiveDate, RecurrenceError> {
    let trimmed = input.trim();
    let parts: Vec<&str> = trimmed.split('-').collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|part| part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(RecurrenceError::Malformed(input.to_string()));
    }
    let year: i32 = parts[0]
        .parse()
        .map_err(|_| RecurrenceError::Malformed(input.to_string()))?;
    let month: u32 = parts[1]
        .parse()
        .map_err(|_| RecurrenceError::Malformed(input.to_string()))?;
    let day: u32 = parts[2]
        .parse()
        .map_err(|_| RecurrenceError::Malformed(input.to_string()))?;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| RecurrenceError::InvalidDate(input.to_string()))
}

/// Every occurrence in `[from, until]`, stepping from `from`.
pub fn occurrences_between(frequency: Frequency, from: NaiveDate, until: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = from;
    while current <= until {
        if dates.len() >= MAX_OCCURRENCES {
            warn!(
                target: "recurrence",
                %from,
                %until,
                frequency = %frequency,
                "occurrence cap reached"
            );
            break;
        }
        dates.push(current);
        current = next_due_date(current, frequency);
    }
    dates
}

/// Inclusive window of the period containing `today`.
///
/// Weeks run Monday to Sunday.
pub fn period_window(frequency: Frequency, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    match frequency {
        Frequency::Daily => (today, today),
        Frequency::Weekly => {
            let start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
            (start, start + Duration::days(6))
        }
        Frequency::Monthly => (
            clamped_date(today.year(), today.month(), 1),
            clamped_date(
                today.year(),
                today.month(),
                days_in_month(today.year(), today.month()),
            ),
        ),
        Frequency::Yearly => (
            clamped_date(today.year(), 1, 1),
            clamped_date(today.year(), 12, 31),
        ),
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.min(days_in_month(year, month)).max(1);
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}
