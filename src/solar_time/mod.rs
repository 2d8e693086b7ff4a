//! True solar time correction
//!
//! Shifts a China Standard Time wall-clock reading to local apparent solar
//! time: four minutes per degree of longitude away from the 120°E zone
//! meridian, plus a three-term approximation of the equation of time.

use chrono::{Datelike, Duration, NaiveDateTime};
use serde::Serialize;

use crate::constants::{MINUTES_PER_DEGREE, STANDARD_MERIDIAN_DEG, TAU};
use crate::{QimenError, Result};

/// Result of a solar time correction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolarTimeCorrection {
    /// The input moment shifted by `total_diff_minutes`
    pub corrected: NaiveDateTime,
    pub total_diff_minutes: f64,
    pub longitude_offset_minutes: f64,
    pub equation_of_time_minutes: f64,
}

impl SolarTimeCorrection {
    /// A correction that leaves the moment unchanged
    pub fn identity(moment: NaiveDateTime) -> Self {
        Self {
            corrected: moment,
            total_diff_minutes: 0.0,
            longitude_offset_minutes: 0.0,
            equation_of_time_minutes: 0.0,
        }
    }
}

/// Clock minutes gained east of the zone meridian
pub fn longitude_offset_minutes(longitude: f64) -> f64 {
    (longitude - STANDARD_MERIDIAN_DEG) * MINUTES_PER_DEGREE
}

/// Equation of time in minutes for a 1-based day of the year
pub fn equation_of_time_minutes(day_of_year: u32) -> f64 {
    let b = TAU * (day_of_year as f64 - 81.0) / 365.0;
    9.87 * (2.0 * b).sin() - 7.53 * b.cos() - 1.5 * b.sin()
}

/// Correct a civil moment to true solar time at `longitude` (degrees east)
pub fn true_solar_time(moment: NaiveDateTime, longitude: f64) -> Result<SolarTimeCorrection> {
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(QimenError::InvalidInput(format!(
            "longitude {} outside -180..=180",
            longitude
        )));
    }

    let longitude_offset = longitude_offset_minutes(longitude);
    let equation = equation_of_time_minutes(moment.ordinal());
    let total = longitude_offset + equation;

    let shift = Duration::milliseconds((total * 60_000.0) as i64);
    let corrected = moment.checked_add_signed(shift).ok_or_else(|| {
        QimenError::InvalidInput(format!("{} cannot be shifted by {:.2} minutes", moment, total))
    })?;

    Ok(SolarTimeCorrection {
        corrected,
        total_diff_minutes: total,
        longitude_offset_minutes: longitude_offset,
        equation_of_time_minutes: equation,
    })
}

/// Format a minute offset as `+1小时5分` or `-14分`
pub fn format_time_diff(minutes: f64) -> String {
    let abs = minutes.abs();
    let hours = (abs / 60.0).floor();
    let mins = (abs % 60.0).round();
    let sign = if minutes >= 0.0 { '+' } else { '-' };

    if hours > 0.0 {
        format!("{}{}小时{}分", sign, hours, mins)
    } else {
        format!("{}{}分", sign, mins)
    }
}
