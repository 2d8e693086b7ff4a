//! Constants module for calendrical calculations

use std::f64::consts::PI;

// Time constants
/// Minutes in a day
pub const DAY_MIN: f64 = 1_440.0;
/// Hours in a day
pub const DAY_H: f64 = 24.0;
/// Mean tropical year in days, used to extrapolate solar term instants
pub const TROPICAL_YEAR: f64 = 365.2422;
/// Reference year of the approximate solar term table
pub const TERM_BASE_YEAR: i32 = 2000;

// Calendar constants
/// First day of Gregorian calendar in Julian day number (1582-10-15)
pub const GREGORIAN_START: i64 = 2_299_161;
/// First Gregorian civil date as (year, month, day)
pub const GREGORIAN_START_DATE: (i32, u32, u32) = (1582, 10, 15);
/// Offset added to a day number so that `(day_number + offset) mod 60` is the
/// sexagenary index of that day (calibrated on 2000-01-01 = 戊午)
pub const DAY_PAIR_OFFSET: i64 = 49;
/// Earliest civil year accepted by the calendar functions
pub const MIN_YEAR: i32 = -4000;
/// Latest civil year accepted by the calendar functions
pub const MAX_YEAR: i32 = 9999;

// Solar time constants
/// Meridian of the civil time zone the chart is computed in (UTC+8)
pub const STANDARD_MERIDIAN_DEG: f64 = 120.0;
/// Minutes of clock time per degree of longitude
pub const MINUTES_PER_DEGREE: f64 = 4.0;
/// Tau (2*PI) for full circle
pub const TAU: f64 = 2.0 * PI;

// Default observer
/// Default longitude (Beijing), degrees east
pub const DEFAULT_LONGITUDE: f64 = 116.4;
/// Default latitude (Beijing), degrees north
pub const DEFAULT_LATITUDE: f64 = 39.9;
