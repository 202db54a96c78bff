//! Fiscal calendar resolution.
//!
//! The reporting service's fiscal year does not align with the calendar year:
//! it rolls over at a configured initial-period month offset (zero-based
//! calendar month, default 9 = October). Dates from that month onward belong
//! to the *next* fiscal year's periods 1..; earlier dates fall in the current
//! year label's tail periods.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Zero-based calendar month at which the next fiscal year begins.
pub const DEFAULT_INITIAL_PERIOD: u8 = 9;

/// The 8-digit date mask all configuration dates are expressed in.
pub const DATE_MASK: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]");

#[derive(Debug, Error)]
#[error("end date {end} precedes start date {start}")]
pub struct InvalidRange {
    pub start: Date,
    pub end: Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiscalPeriod {
    pub year: i32,
    pub period: u8,
}

impl fmt::Display for FiscalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-P{:02}", self.year, self.period)
    }
}

pub fn parse_date(raw: &str) -> Result<Date, time::error::Parse> {
    Date::parse(raw, DATE_MASK)
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_MASK)
        .unwrap_or_else(|_| date.to_string())
}

/// Ordered, inclusive sequence of calendar dates between `start` and `end`.
pub fn dates_in_range(start: Date, end: Date) -> Result<Vec<Date>, InvalidRange> {
    if end < start {
        return Err(InvalidRange { start, end });
    }
    let mut dates = Vec::new();
    let mut day = start;
    while day <= end {
        dates.push(day);
        day = match day.next_day() {
            Some(next) => next,
            None => break,
        };
    }
    Ok(dates)
}

/// Map one calendar date onto its fiscal period.
///
/// `current_year` / `next_year` are the fiscal year labels the caller wants
/// tail-of-year dates assigned to; a date in a month at or past the initial
/// period belongs to `next_year`, never wrapped back into `current_year`.
pub fn period_for_date(
    current_year: i32,
    next_year: i32,
    date: Date,
    initial_period: u8,
) -> FiscalPeriod {
    let month0 = u8::from(date.month()) - 1;
    if month0 >= initial_period {
        FiscalPeriod {
            year: next_year,
            period: month0 - initial_period + 1,
        }
    } else {
        FiscalPeriod {
            year: current_year,
            period: month0 + (12 - initial_period) + 1,
        }
    }
}

/// Unique, order-preserving set of fiscal periods touched by `dates`.
///
/// Two calendar dates inside the same fiscal period collapse to one entry.
pub fn periods_for_range(
    current_year: i32,
    next_year: i32,
    dates: &[Date],
    initial_period: u8,
) -> Vec<FiscalPeriod> {
    let mut periods: Vec<FiscalPeriod> = Vec::new();
    for &date in dates {
        let period = period_for_date(current_year, next_year, date, initial_period);
        if !periods.contains(&period) {
            periods.push(period);
        }
    }
    periods
}
