//! Sexagenary (干支) cycle arithmetic and four-pillar derivation
//!
//! Ten heavenly stems and twelve earthly branches combine into the 60-pair
//! cycle used to name years, months, days and double-hours. A pair is stored
//! as its cycle index `i` (0 = 甲子), the unique value with
//! `stem = i mod 10` and `branch = i mod 12`.

use std::collections::HashMap;
use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike};
use lazy_static::lazy_static;
use log::debug;

use crate::calendar::{day_number, julian_day_of};
use crate::constants::DAY_PAIR_OFFSET;
use crate::terms::{bracket_for, term_instant, SolarTerm, TermBracket};
use crate::{QimenError, Result};

/// The ten heavenly stems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Stem {
    Jia,
    Yi,
    Bing,
    Ding,
    Wu,
    Ji,
    Geng,
    Xin,
    Ren,
    Gui,
}

/// All stems in cycle order (index 0 = 甲).
pub const ALL_STEMS: [Stem; 10] = [
    Stem::Jia,
    Stem::Yi,
    Stem::Bing,
    Stem::Ding,
    Stem::Wu,
    Stem::Ji,
    Stem::Geng,
    Stem::Xin,
    Stem::Ren,
    Stem::Gui,
];

const STEM_NAMES: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];

impl Stem {
    /// 0-based index (甲=0 .. 癸=9).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stem at a cycle position; wraps modulo 10.
    pub fn from_index(index: usize) -> Stem {
        ALL_STEMS[index % 10]
    }

    pub fn name(self) -> &'static str {
        STEM_NAMES[self.index()]
    }

    pub fn from_name(name: &str) -> Option<Stem> {
        STEM_NAMES
            .iter()
            .position(|&n| n == name)
            .map(Stem::from_index)
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The twelve earthly branches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Branch {
    Zi,
    Chou,
    Yin,
    Mao,
    Chen,
    Si,
    Wu,
    Wei,
    Shen,
    You,
    Xu,
    Hai,
}

/// All branches in cycle order (index 0 = 子).
pub const ALL_BRANCHES: [Branch; 12] = [
    Branch::Zi,
    Branch::Chou,
    Branch::Yin,
    Branch::Mao,
    Branch::Chen,
    Branch::Si,
    Branch::Wu,
    Branch::Wei,
    Branch::Shen,
    Branch::You,
    Branch::Xu,
    Branch::Hai,
];

const BRANCH_NAMES: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];

impl Branch {
    /// 0-based index (子=0 .. 亥=11).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Branch at a cycle position; wraps modulo 12.
    pub fn from_index(index: usize) -> Branch {
        ALL_BRANCHES[index % 12]
    }

    pub fn name(self) -> &'static str {
        BRANCH_NAMES[self.index()]
    }

    pub fn from_name(name: &str) -> Option<Branch> {
        BRANCH_NAMES
            .iter()
            .position(|&n| n == name)
            .map(Branch::from_index)
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the 60 stem-branch pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SexagenaryPair(u8);

lazy_static! {
    /// Map from two-character names to pairs
    static ref PAIRS_BY_NAME: HashMap<String, SexagenaryPair> = {
        let mut m = HashMap::new();
        for pair in all_pairs() {
            m.insert(pair.name(), pair);
        }
        m
    };
}

impl SexagenaryPair {
    /// Pair at cycle index `index` (0..60).
    pub fn new(index: usize) -> Option<SexagenaryPair> {
        (index < 60).then_some(SexagenaryPair(index as u8))
    }

    /// Pair at any integer position, reduced modulo 60.
    pub fn wrapping(position: i64) -> SexagenaryPair {
        SexagenaryPair(position.rem_euclid(60) as u8)
    }

    /// Combine a stem and a branch; only same-parity combinations exist.
    pub fn from_parts(stem: Stem, branch: Branch) -> Option<SexagenaryPair> {
        let (s, b) = (stem.index() as i64, branch.index() as i64);
        if (s - b) % 2 != 0 {
            return None;
        }
        Some(Self::wrapping(6 * s - 5 * b))
    }

    pub fn from_name(name: &str) -> Option<SexagenaryPair> {
        PAIRS_BY_NAME.get(name).copied()
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn stem(self) -> Stem {
        Stem::from_index(self.index())
    }

    pub fn branch(self) -> Branch {
        Branch::from_index(self.index())
    }

    pub fn name(self) -> String {
        format!("{}{}", self.stem().name(), self.branch().name())
    }

    /// First pair (a 甲 pair) of the ten-pair decan this pair belongs to.
    pub fn decan_head(self) -> SexagenaryPair {
        SexagenaryPair(self.0 / 10 * 10)
    }

    /// Position within the decan, 0..10.
    pub fn decan_offset(self) -> usize {
        self.index() % 10
    }

    /// The two branches the decan never reaches (旬空).
    pub fn void_branches(self) -> [Branch; 2] {
        let start = self.decan_head().index();
        [Branch::from_index(start + 10), Branch::from_index(start + 11)]
    }

    /// Void branches joined for display, e.g. `午未`.
    pub fn void_display(self) -> String {
        let [a, b] = self.void_branches();
        format!("{}{}", a, b)
    }
}

impl fmt::Display for SexagenaryPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem(), self.branch())
    }
}

/// All 60 pairs in cycle order
pub fn all_pairs() -> impl Iterator<Item = SexagenaryPair> {
    (0..60u8).map(SexagenaryPair)
}

/// Travelling-horse branch (驿马) for a branch
pub fn horse_branch(branch: Branch) -> Branch {
    match branch {
        Branch::Shen | Branch::Zi | Branch::Chen => Branch::Yin,
        Branch::Yin | Branch::Wu | Branch::Xu => Branch::Shen,
        Branch::Si | Branch::You | Branch::Chou => Branch::Hai,
        Branch::Hai | Branch::Mao | Branch::Wei => Branch::Si,
    }
}

/// Year pillar of a pillar year (the year beginning at 立春)
pub fn year_pillar(pillar_year: i32) -> SexagenaryPair {
    SexagenaryPair::wrapping(pillar_year as i64 - 4)
}

/// Month pillar by the five-tigers rule
///
/// `ordinal` is the month number opened by the sectioning term, 立春 = 1
/// through 小寒 = 12.
pub fn month_pillar(pillar_year: i32, ordinal: u8) -> SexagenaryPair {
    let year_stem = (pillar_year as i64 - 4).rem_euclid(10);
    // 寅 month of a 甲 or 己 year is 丙寅 (2); each later stem pair adds 12
    SexagenaryPair::wrapping(12 * (year_stem % 5) + 2 + ordinal as i64 - 1)
}

/// Day pillar of a whole-day number
pub fn day_pillar_for_number(day_number: i64) -> SexagenaryPair {
    SexagenaryPair::wrapping(day_number + DAY_PAIR_OFFSET)
}

/// Day pillar of a civil date
pub fn day_pillar(year: i32, month: u32, day: u32) -> SexagenaryPair {
    day_pillar_for_number(day_number(year, month, day))
}

/// Double-hour slot (0 = 子 … 11 = 亥) of a clock hour
pub fn hour_branch_slot(hour: u32) -> usize {
    match hour {
        23 | 0 => 0,
        h => ((h + 1) / 2) as usize,
    }
}

/// Hour pillar by the five-rats rule, given the stem of the governing day
pub fn hour_pillar(day_stem: Stem, hour: u32) -> SexagenaryPair {
    // 子 hour of a 甲 or 己 day is 甲子; each later stem pair adds 12
    let first = 12 * (day_stem.index() % 5) as i64;
    SexagenaryPair::wrapping(first + hour_branch_slot(hour) as i64)
}

/// Year, month, day and hour pillars of a moment with the enclosing terms
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct FourPillars {
    pub year: SexagenaryPair,
    pub month: SexagenaryPair,
    pub day: SexagenaryPair,
    pub hour: SexagenaryPair,
    pub bracket: TermBracket,
    /// Civil year shifted back by one before that year's 立春
    pub pillar_year: i32,
    /// Whole-day number of the civil date
    pub day_number: i64,
}

impl FourPillars {
    /// `丙午年　庚寅月　庚申日　丁亥时`
    pub fn display(&self) -> String {
        format!(
            "{}年　{}月　{}日　{}时",
            self.year, self.month, self.day, self.hour
        )
    }

    /// Void branches of all four pillars, `寅卯空　午未空　子丑空　午未空`
    pub fn void_display(&self) -> String {
        [self.year, self.month, self.day, self.hour]
            .iter()
            .map(|p| format!("{}空", p.void_display()))
            .collect::<Vec<_>>()
            .join("　")
    }
}

/// Derive the four pillars of a wall-clock moment
pub fn four_pillars(moment: &NaiveDateTime) -> Result<FourPillars> {
    let jd = julian_day_of(moment);
    let bracket =
        bracket_for(moment).ok_or(QimenError::TermBracketUnresolvable { julian_day: jd })?;

    let civil_year = moment.year();
    let spring = term_instant(civil_year, SolarTerm::StartOfSpring);
    let pillar_year = if jd < spring.julian_day {
        civil_year - 1
    } else {
        civil_year
    };

    let ordinal = bracket
        .current_jie
        .map(|t| t.term)
        .unwrap_or(bracket.term.term)
        .month_ordinal();

    let today = day_number(civil_year, moment.month(), moment.day());
    let day = day_pillar_for_number(today);

    // From 23:00 the hour belongs to the next day's 子 hour
    let hour_day = if moment.hour() == 23 {
        day_pillar_for_number(today + 1)
    } else {
        day
    };

    let pillars = FourPillars {
        year: year_pillar(pillar_year),
        month: month_pillar(pillar_year, ordinal),
        day,
        hour: hour_pillar(hour_day.stem(), moment.hour()),
        bracket,
        pillar_year,
        day_number: today,
    };
    debug!("four pillars of {}: {}", moment, pillars.display());
    Ok(pillars)
}
