//! Calendar date and Julian date conversion functions
//!
//! This module converts between civil dates and the continuous Julian day
//! count. Civil dates on or after 1582-10-15 are read in the Gregorian
//! calendar and earlier dates in the Julian calendar, so that conversions in
//! both directions agree on either side of the cutover.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::constants::{
    DAY_H, DAY_MIN, GREGORIAN_START, GREGORIAN_START_DATE, MAX_YEAR, MIN_YEAR,
};
use crate::{QimenError, Result};

/// A civil wall-clock reading, resolved to the minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CivilTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl CivilTime {
    /// Fractional hour of the day (minutes folded in)
    pub fn fractional_hour(&self) -> f64 {
        self.hour as f64 + self.minute as f64 / 60.0
    }
}

/// Whether a civil date is read in the Gregorian calendar
fn is_gregorian(year: i32, month: u32, day: u32) -> bool {
    (year, month, day) >= GREGORIAN_START_DATE
}

/// Convert Julian day integer to calendar date (year, month, day)
///
/// Uses the proleptic Gregorian calendar unless `julian_before` is set to a
/// specific Julian day, in which case the Julian calendar is used for dates
/// older than that.
pub fn compute_calendar_date(jd_integer: i64, julian_before: Option<i64>) -> (i32, u32, u32) {
    let use_gregorian = match julian_before {
        None => true,
        Some(jb) => jd_integer >= jb,
    };

    // See the Explanatory Supplement to the Astronomical Almanac 15.11.
    let f = jd_integer + 1401;
    let f = if use_gregorian {
        f + ((4 * jd_integer + 274277) / 146097 * 3 / 4 - 38)
    } else {
        f
    };

    let e = 4 * f + 3;
    let g = (e % 1461) / 4;
    let h = 5 * g + 2;
    let day = (h % 153) / 5 + 1;
    let month = (h / 153 + 2) % 12 + 1;
    let year = e / 1461 - 4716 + (12 + 2 - month) / 12;

    (year as i32, month as u32, day as u32)
}

/// Convert a Gregorian (year, month, day) to Julian day integer
pub fn compute_julian_day(year: i32, month: u32, day: u32) -> i64 {
    let (year, month, day) = (year as i64, month as i64, day as i64);
    let janfeb = month < 3;

    1461 * (year + 4800 - if janfeb { 1 } else { 0 }) / 4
        + 367 * (month - 2 + if janfeb { 12 } else { 0 }) / 12
        - 3 * ((year + 4900 - if janfeb { 1 } else { 0 }) / 100) / 4
        - 32075
        + day
}

/// Convert a Julian-calendar (year, month, day) to Julian day integer
pub fn compute_julian_day_old_style(year: i32, month: u32, day: u32) -> i64 {
    let (year, month, day) = (year as i64, month as i64, day as i64);
    let a = (14 - month) / 12;
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;

    day + (153 * m + 2) / 5 + 365 * y + y / 4 - 32083
}

/// Whole-day number of a civil date: `floor(JD at local noon + 0.5)`
///
/// Picks the Gregorian or Julian rule depending on which side of the
/// 1582 cutover the date falls.
pub fn day_number(year: i32, month: u32, day: u32) -> i64 {
    if is_gregorian(year, month, day) {
        compute_julian_day(year, month, day)
    } else {
        compute_julian_day_old_style(year, month, day)
    }
}

/// Convert a civil date and fractional hour to a noon-epoch Julian day
pub fn to_julian_day(year: i32, month: u32, day: u32, hour: f64) -> f64 {
    day_number(year, month, day) as f64 - 0.5 + hour / DAY_H
}

/// Convert a Julian day back to a civil reading, rounded to the minute
///
/// Minutes that round up to a full day carry into the next date.
pub fn from_julian_day(jd: f64) -> CivilTime {
    let total_minutes = ((jd + 0.5) * DAY_MIN).round() as i64;
    let minutes_per_day = DAY_MIN as i64;
    let z = total_minutes.div_euclid(minutes_per_day);
    let minute_of_day = total_minutes.rem_euclid(minutes_per_day);

    let (year, month, day) = compute_calendar_date(z, Some(GREGORIAN_START));

    CivilTime {
        year,
        month,
        day,
        hour: (minute_of_day / 60) as u32,
        minute: (minute_of_day % 60) as u32,
    }
}

/// Julian day of a wall-clock moment; seconds are ignored
pub fn julian_day_of(moment: &NaiveDateTime) -> f64 {
    to_julian_day(
        moment.year(),
        moment.month(),
        moment.day(),
        moment.hour() as f64 + moment.minute() as f64 / 60.0,
    )
}

/// Number of days in a civil month, honouring the Julian leap rule before the cutover
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let leap = if year < GREGORIAN_START_DATE.0
        || (year == GREGORIAN_START_DATE.0 && month < GREGORIAN_START_DATE.1)
    {
        year.rem_euclid(4) == 0
    } else {
        year.rem_euclid(4) == 0 && (year.rem_euclid(100) != 0 || year.rem_euclid(400) == 0)
    };

    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        _ => 28,
    }
}

/// Reject civil fields outside the supported calendar
pub fn check_civil(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Result<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(QimenError::InvalidInput(format!(
            "year {} outside {}..={}",
            year, MIN_YEAR, MAX_YEAR
        )));
    }
    if !(1..=12).contains(&month) {
        return Err(QimenError::InvalidInput(format!("month {}", month)));
    }
    if day == 0 || day > days_in_month(year, month) {
        return Err(QimenError::InvalidInput(format!(
            "day {} in {}-{:02}",
            day, year, month
        )));
    }
    if year == GREGORIAN_START_DATE.0 && month == GREGORIAN_START_DATE.1 && (5..15).contains(&day)
    {
        return Err(QimenError::InvalidInput(format!(
            "1582-10-{:02} falls in the calendar reform gap",
            day
        )));
    }
    if hour > 23 || minute > 59 {
        return Err(QimenError::InvalidInput(format!(
            "time {:02}:{:02}",
            hour, minute
        )));
    }
    Ok(())
}
