//! Solar terms (节气) and the term bracket around a moment
//!
//! The tropical year is split into 24 terms. Twelve of them are "sectioning"
//! terms (节) that open the sexagenary months and key the chart pattern
//! numbers; the other twelve are "mid" terms (气).
//!
//! Instants come from an exact per-year table where one exists and are
//! otherwise extrapolated from the year-2000 instants by whole tropical years.

use std::collections::HashMap;
use std::fmt;

use chrono::{Datelike, NaiveDateTime};
use lazy_static::lazy_static;
use log::debug;
use serde::Serialize;

use crate::calendar::{from_julian_day, julian_day_of, to_julian_day, CivilTime};
use crate::constants::{TERM_BASE_YEAR, TROPICAL_YEAR};

/// The 24 solar terms, in calendar order starting at 小寒
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum SolarTerm {
    MinorCold,
    MajorCold,
    StartOfSpring,
    RainWater,
    AwakeningOfInsects,
    SpringEquinox,
    PureBrightness,
    GrainRain,
    StartOfSummer,
    GrainBuds,
    GrainInEar,
    SummerSolstice,
    MinorHeat,
    MajorHeat,
    StartOfAutumn,
    EndOfHeat,
    WhiteDew,
    AutumnEquinox,
    ColdDew,
    FrostDescent,
    StartOfWinter,
    MinorSnow,
    MajorSnow,
    WinterSolstice,
}

/// All 24 terms in order (index 0 = 小寒).
pub const ALL_TERMS: [SolarTerm; 24] = [
    SolarTerm::MinorCold,
    SolarTerm::MajorCold,
    SolarTerm::StartOfSpring,
    SolarTerm::RainWater,
    SolarTerm::AwakeningOfInsects,
    SolarTerm::SpringEquinox,
    SolarTerm::PureBrightness,
    SolarTerm::GrainRain,
    SolarTerm::StartOfSummer,
    SolarTerm::GrainBuds,
    SolarTerm::GrainInEar,
    SolarTerm::SummerSolstice,
    SolarTerm::MinorHeat,
    SolarTerm::MajorHeat,
    SolarTerm::StartOfAutumn,
    SolarTerm::EndOfHeat,
    SolarTerm::WhiteDew,
    SolarTerm::AutumnEquinox,
    SolarTerm::ColdDew,
    SolarTerm::FrostDescent,
    SolarTerm::StartOfWinter,
    SolarTerm::MinorSnow,
    SolarTerm::MajorSnow,
    SolarTerm::WinterSolstice,
];

const TERM_NAMES: [&str; 24] = [
    "小寒", "大寒", "立春", "雨水", "惊蛰", "春分", "清明", "谷雨", "立夏", "小满", "芒种", "夏至",
    "小暑", "大暑", "立秋", "处暑", "白露", "秋分", "寒露", "霜降", "立冬", "小雪", "大雪", "冬至",
];

impl SolarTerm {
    /// 0-based index (小寒=0 .. 冬至=23).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Chinese name of the term.
    pub fn name(self) -> &'static str {
        TERM_NAMES[self.index()]
    }

    /// Look a term up by its Chinese name.
    pub fn from_name(name: &str) -> Option<SolarTerm> {
        TERM_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| ALL_TERMS[i])
    }

    /// Sectioning terms (节) sit at the even indices.
    pub fn is_sectioning(self) -> bool {
        self.index() % 2 == 0
    }

    /// Sexagenary month the term belongs to: 立春/雨水 = 1 … 小寒/大寒 = 12.
    pub fn month_ordinal(self) -> u8 {
        ((self.index() + 24 - 2) % 24 / 2 + 1) as u8
    }
}

impl fmt::Display for SolarTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

serialize_by_name!(SolarTerm);

/// Civil (month, day, hour, minute) of a term instant, Beijing time
type TermCivil = (u32, u32, u32, u32);

/// Term instants of 2000, the base of the extrapolation
const BASE_2000: [TermCivil; 24] = [
    (1, 6, 7, 1),
    (1, 21, 0, 23),
    (2, 4, 20, 40),
    (2, 19, 16, 33),
    (3, 5, 14, 43),
    (3, 20, 15, 35),
    (4, 4, 19, 32),
    (4, 20, 2, 40),
    (5, 5, 13, 50),
    (5, 21, 2, 49),
    (6, 5, 17, 59),
    (6, 21, 9, 48),
    (7, 7, 4, 14),
    (7, 22, 21, 43),
    (8, 7, 13, 43),
    (8, 23, 4, 49),
    (9, 7, 16, 59),
    (9, 23, 2, 28),
    (10, 8, 8, 38),
    (10, 23, 11, 47),
    (11, 7, 11, 48),
    (11, 22, 9, 19),
    (12, 7, 4, 37),
    (12, 21, 21, 37),
];

static EXACT_2025: [TermCivil; 24] = [
    (1, 5, 10, 33),
    (1, 20, 4, 0),
    (2, 3, 22, 10),
    (2, 18, 18, 6),
    (3, 5, 16, 7),
    (3, 20, 17, 1),
    (4, 4, 21, 2),
    (4, 20, 4, 0),
    (5, 5, 14, 12),
    (5, 21, 2, 54),
    (6, 5, 18, 3),
    (6, 21, 10, 42),
    (7, 7, 4, 5),
    (7, 22, 21, 29),
    (8, 7, 9, 51),
    (8, 23, 0, 6),
    (9, 7, 11, 34),
    (9, 22, 21, 20),
    (10, 8, 4, 41),
    (10, 23, 7, 20),
    (11, 7, 6, 54),
    (11, 22, 4, 4),
    (12, 6, 23, 53),
    (12, 21, 17, 43),
];

static EXACT_2026: [TermCivil; 24] = [
    (1, 5, 16, 23),
    (1, 20, 9, 45),
    (2, 4, 4, 2),
    (2, 18, 23, 51),
    (3, 5, 21, 58),
    (3, 20, 22, 45),
    (4, 5, 2, 39),
    (4, 20, 9, 38),
    (5, 5, 19, 48),
    (5, 21, 8, 36),
    (6, 5, 23, 47),
    (6, 21, 16, 24),
    (7, 7, 9, 56),
    (7, 23, 3, 13),
    (8, 7, 15, 42),
    (8, 23, 6, 4),
    (9, 7, 17, 40),
    (9, 23, 3, 4),
    (10, 8, 10, 28),
    (10, 23, 13, 12),
    (11, 7, 12, 51),
    (11, 22, 10, 3),
    (12, 7, 5, 52),
    (12, 21, 23, 49),
];

lazy_static! {
    /// Years with published term instants
    static ref EXACT_TERMS: HashMap<i32, &'static [TermCivil; 24]> = {
        let mut m = HashMap::new();
        m.insert(2025, &EXACT_2025);
        m.insert(2026, &EXACT_2026);
        m
    };

    /// Julian days of the 2000 instants
    static ref BASE_2000_JD: [f64; 24] = {
        let mut jds = [0.0; 24];
        for (jd, &entry) in jds.iter_mut().zip(BASE_2000.iter()) {
            *jd = civil_term_jd(&table_civil(TERM_BASE_YEAR, entry));
        }
        jds
    };
}

fn table_civil(year: i32, (month, day, hour, minute): TermCivil) -> CivilTime {
    CivilTime {
        year,
        month,
        day,
        hour,
        minute,
    }
}

fn civil_term_jd(civil: &CivilTime) -> f64 {
    to_julian_day(civil.year, civil.month, civil.day, civil.fractional_hour())
}

/// One term instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolarTermInstant {
    pub term: SolarTerm,
    pub julian_day: f64,
    pub civil: CivilTime,
}

impl SolarTermInstant {
    /// Whole-day number of the instant (time of day dropped)
    pub fn day_number(&self) -> i64 {
        (self.julian_day + 0.5).floor() as i64
    }

    /// Display form used in chart headers, e.g. `2026/2/4 4:02:00`
    pub fn display_time(&self) -> String {
        format!(
            "{}/{}/{} {}:{:02}:00",
            self.civil.year, self.civil.month, self.civil.day, self.civil.hour, self.civil.minute
        )
    }
}

/// Whether an exact table exists for `year`
pub fn has_exact_terms(year: i32) -> bool {
    EXACT_TERMS.contains_key(&year)
}

/// The 24 term instants of a civil year, in term order
pub fn year_terms(year: i32) -> Vec<SolarTermInstant> {
    if let Some(table) = EXACT_TERMS.get(&year) {
        return ALL_TERMS
            .iter()
            .zip(table.iter())
            .map(|(&term, &entry)| {
                let civil = table_civil(year, entry);
                SolarTermInstant {
                    term,
                    julian_day: civil_term_jd(&civil),
                    civil,
                }
            })
            .collect();
    }

    debug!("no exact solar terms for {}, extrapolating from {}", year, TERM_BASE_YEAR);
    let shift = (year - TERM_BASE_YEAR) as f64 * TROPICAL_YEAR;
    ALL_TERMS
        .iter()
        .zip(BASE_2000_JD.iter())
        .map(|(&term, &base)| {
            let julian_day = base + shift;
            SolarTermInstant {
                term,
                julian_day,
                civil: from_julian_day(julian_day),
            }
        })
        .collect()
}

/// Instant of one term in a civil year
pub fn term_instant(year: i32, term: SolarTerm) -> SolarTermInstant {
    year_terms(year)[term.index()]
}

/// The terms enclosing a moment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TermBracket {
    /// Latest term (sectioning or mid) at or before the moment
    pub term: SolarTermInstant,
    /// Nearest sectioning term at or before the moment
    pub current_jie: Option<SolarTermInstant>,
    /// Nearest sectioning term strictly after `term`
    pub next_jie: Option<SolarTermInstant>,
}

/// Locate the term bracket of a Julian day that falls in civil `year`
///
/// Terms of the neighbouring years are scanned as well so brackets spanning
/// the new year resolve. `None` only when no term precedes the moment.
pub fn current_bracket(jd: f64, year: i32) -> Option<TermBracket> {
    let all: Vec<SolarTermInstant> = (year - 1..=year + 1).flat_map(year_terms).collect();

    let i = all.iter().rposition(|t| jd >= t.julian_day)?;

    let current_jie = all[..=i].iter().rev().find(|t| t.term.is_sectioning()).copied();
    let next_jie = all[i + 1..].iter().find(|t| t.term.is_sectioning()).copied();

    Some(TermBracket {
        term: all[i],
        current_jie,
        next_jie,
    })
}

/// Term bracket of a wall-clock moment
pub fn bracket_for(moment: &NaiveDateTime) -> Option<TermBracket> {
    current_bracket(julian_day_of(moment), moment.year())
}
