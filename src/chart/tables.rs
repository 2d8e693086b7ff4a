//! Fixed tables of the nine-palace chart
//!
//! Palaces, the eight-palace ring, stars, doors, spirits and the lookups that
//! key them. Everything here is static; the placement steps only index into
//! these tables.

use std::fmt;

use serde::Serialize;

use crate::ganzhi::{Branch, SexagenaryPair, Stem};
use crate::terms::SolarTerm;

/// One of the nine palaces, numbered 1–9 with 5 at the center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Palace(pub(super) u8);

/// The eight outer palaces in spatial ring order
pub const RING: [Palace; 8] = [
    Palace(1),
    Palace(8),
    Palace(3),
    Palace(4),
    Palace(9),
    Palace(2),
    Palace(7),
    Palace(6),
];

/// Palace layout of the 3×3 display grid, top row first
pub const GRID: [[Palace; 3]; 3] = [
    [Palace(4), Palace(9), Palace(2)],
    [Palace(3), Palace(5), Palace(7)],
    [Palace(8), Palace(1), Palace(6)],
];

const NUMERALS: [&str; 9] = ["一", "二", "三", "四", "五", "六", "七", "八", "九"];

impl Palace {
    pub const CENTER: Palace = Palace(5);
    /// Palace 2 (坤), which stands in for the center as a ring anchor
    pub const KUN: Palace = Palace(2);
    /// Palace 8 (艮)
    pub const GEN: Palace = Palace(8);

    pub fn new(number: u8) -> Option<Palace> {
        (1..=9).contains(&number).then_some(Palace(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// 0-based slot for arrays indexed by palace
    pub fn slot(self) -> usize {
        self.0 as usize - 1
    }

    pub fn is_center(self) -> bool {
        self == Self::CENTER
    }

    /// The palace itself, or 2 if it is the center
    pub fn or_kun(self) -> Palace {
        if self.is_center() {
            Self::KUN
        } else {
            self
        }
    }

    /// Position on the eight-palace ring, the center counted as palace 2
    pub fn ring_position(self) -> usize {
        match self.0 {
            1 => 0,
            8 => 1,
            3 => 2,
            4 => 3,
            9 => 4,
            2 | 5 => 5,
            7 => 6,
            6 => 7,
            // unreachable: constructors keep palaces within 1..=9
            _ => 0,
        }
    }

    /// Ring palace at a position, wrapping modulo 8
    pub fn on_ring(position: usize) -> Palace {
        RING[position % 8]
    }

    /// Next palace by number, 1..9 wrapping, in the polarity's direction
    pub fn numeric_step(self, polarity: Polarity) -> Palace {
        Palace(polarity.walk(self.slot(), 1, 9) as u8 + 1)
    }

    /// Chinese numeral, `一` .. `九`
    pub fn numeral(self) -> &'static str {
        NUMERALS[self.slot()]
    }

    /// Palaces 1 through 9
    pub fn all() -> impl Iterator<Item = Palace> {
        (1..=9).map(Palace)
    }
}

impl fmt::Display for Palace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Yin or yang escape (遁): sets the direction of every walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Yang,
    Yin,
}

impl Polarity {
    pub fn name(self) -> &'static str {
        match self {
            Polarity::Yang => "阳",
            Polarity::Yin => "阴",
        }
    }

    pub fn is_yang(self) -> bool {
        self == Polarity::Yang
    }

    /// Step `steps` places from `start` on a cycle of `modulus`,
    /// forward for yang and backward for yin
    pub fn walk(self, start: usize, steps: usize, modulus: usize) -> usize {
        let delta = match self {
            Polarity::Yang => steps as i64,
            Polarity::Yin => -(steps as i64),
        };
        (start as i64 + delta).rem_euclid(modulus as i64) as usize
    }
}

/// Upper, middle or lower period (元) of a term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Upper,
    Middle,
    Lower,
}

impl Period {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Period::Upper => "上元",
            Period::Middle => "中元",
            Period::Lower => "下元",
        }
    }
}

/// The nine stars, in home-palace order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Star {
    Peng,
    Rui,
    Chong,
    Fu,
    Qin,
    Xin,
    Zhu,
    Ren,
    Ying,
}

pub const ALL_STARS: [Star; 9] = [
    Star::Peng,
    Star::Rui,
    Star::Chong,
    Star::Fu,
    Star::Qin,
    Star::Xin,
    Star::Zhu,
    Star::Ren,
    Star::Ying,
];

impl Star {
    pub fn name(self) -> &'static str {
        match self {
            Star::Peng => "天蓬",
            Star::Rui => "天芮",
            Star::Chong => "天冲",
            Star::Fu => "天辅",
            Star::Qin => "天禽",
            Star::Xin => "天心",
            Star::Zhu => "天柱",
            Star::Ren => "天任",
            Star::Ying => "天英",
        }
    }

    pub fn home(self) -> Palace {
        Palace(self as u8 + 1)
    }

    /// The star whose home is `palace`
    pub fn at_home(palace: Palace) -> Star {
        ALL_STARS[palace.slot()]
    }

    /// 天禽 has no place on the ring and travels with 天芮.
    pub const PAIRED: Star = Star::Qin;
    pub const PARTNER: Star = Star::Rui;
}

/// The eight doors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Door {
    Rest,
    Death,
    Harm,
    Block,
    Open,
    Fright,
    Life,
    View,
}

pub const ALL_DOORS: [Door; 8] = [
    Door::Rest,
    Door::Death,
    Door::Harm,
    Door::Block,
    Door::Open,
    Door::Fright,
    Door::Life,
    Door::View,
];

impl Door {
    pub fn name(self) -> &'static str {
        match self {
            Door::Rest => "休门",
            Door::Death => "死门",
            Door::Harm => "伤门",
            Door::Block => "杜门",
            Door::Open => "开门",
            Door::Fright => "惊门",
            Door::Life => "生门",
            Door::View => "景门",
        }
    }

    pub fn home(self) -> Palace {
        match self {
            Door::Rest => Palace(1),
            Door::Death => Palace(2),
            Door::Harm => Palace(3),
            Door::Block => Palace(4),
            Door::Open => Palace(6),
            Door::Fright => Palace(7),
            Door::Life => Palace(8),
            Door::View => Palace(9),
        }
    }

    /// The door whose home is `palace`; the center lends 死门 from palace 2
    pub fn at_home(palace: Palace) -> Door {
        match palace.0 {
            1 => Door::Rest,
            3 => Door::Harm,
            4 => Door::Block,
            6 => Door::Open,
            7 => Door::Fright,
            8 => Door::Life,
            9 => Door::View,
            _ => Door::Death,
        }
    }
}

/// The eight spirits, in walking order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spirit {
    Chief,
    Serpent,
    GreatYin,
    SixHarmony,
    WhiteTiger,
    Tortoise,
    NineEarth,
    NineHeaven,
}

pub const ALL_SPIRITS: [Spirit; 8] = [
    Spirit::Chief,
    Spirit::Serpent,
    Spirit::GreatYin,
    Spirit::SixHarmony,
    Spirit::WhiteTiger,
    Spirit::Tortoise,
    Spirit::NineEarth,
    Spirit::NineHeaven,
];

impl Spirit {
    pub fn name(self) -> &'static str {
        match self {
            Spirit::Chief => "直符",
            Spirit::Serpent => "腾蛇",
            Spirit::GreatYin => "太阴",
            Spirit::SixHarmony => "六合",
            Spirit::WhiteTiger => "白虎",
            Spirit::Tortoise => "玄武",
            Spirit::NineEarth => "九地",
            Spirit::NineHeaven => "九天",
        }
    }
}

serialize_by_name!(Polarity, Period, Star, Door, Spirit);

/// The nine stems laid on the earth plate: six instruments then three wonders
pub const NINE_STEMS: [Stem; 9] = [
    Stem::Wu,
    Stem::Ji,
    Stem::Geng,
    Stem::Xin,
    Stem::Ren,
    Stem::Gui,
    Stem::Ding,
    Stem::Bing,
    Stem::Yi,
];

/// The six instruments (六仪) in order
pub const INSTRUMENTS: [Stem; 6] = [
    Stem::Wu,
    Stem::Ji,
    Stem::Geng,
    Stem::Xin,
    Stem::Ren,
    Stem::Gui,
];

/// Ordinal among the instruments, if the stem is one
pub fn instrument_ordinal(stem: Stem) -> Option<usize> {
    INSTRUMENTS.iter().position(|&s| s == stem)
}

/// Instrument hiding the 甲 of a decan: 甲子戊 甲戌己 甲申庚 甲午辛 甲辰壬 甲寅癸
pub fn decan_instrument(pair: SexagenaryPair) -> Stem {
    INSTRUMENTS[pair.decan_head().index() / 10]
}

/// Ring steps from the lead origin for the three wonders
pub fn wonder_offset(stem: Stem) -> Option<usize> {
    match stem {
        Stem::Yi => Some(1),
        Stem::Bing => Some(2),
        Stem::Ding => Some(3),
        _ => None,
    }
}

/// Palace a branch sits in
pub fn branch_palace(branch: Branch) -> Palace {
    match branch {
        Branch::Zi => Palace(1),
        Branch::Chou | Branch::Yin => Palace(8),
        Branch::Mao => Palace(3),
        Branch::Chen | Branch::Si => Palace(4),
        Branch::Wu => Palace(9),
        Branch::Wei | Branch::Shen => Palace(2),
        Branch::You => Palace(7),
        Branch::Xu | Branch::Hai => Palace(6),
    }
}

/// Polarity and the upper/middle/lower pattern numbers of a term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternRow {
    pub polarity: Polarity,
    pub numbers: [u8; 3],
}

impl PatternRow {
    pub fn number(&self, period: Period) -> u8 {
        self.numbers[period.index()]
    }
}

/// Pattern numbers (局) of every solar term
pub fn pattern_row(term: SolarTerm) -> PatternRow {
    use Polarity::{Yang, Yin};
    use SolarTerm::*;

    let (polarity, numbers) = match term {
        WinterSolstice => (Yang, [1, 7, 4]),
        MinorCold => (Yang, [2, 8, 5]),
        MajorCold => (Yang, [3, 9, 6]),
        StartOfSpring => (Yang, [8, 5, 2]),
        RainWater => (Yang, [9, 6, 3]),
        AwakeningOfInsects => (Yang, [1, 7, 4]),
        SpringEquinox => (Yang, [3, 9, 6]),
        PureBrightness => (Yang, [4, 1, 7]),
        GrainRain => (Yang, [5, 2, 8]),
        StartOfSummer => (Yang, [4, 1, 7]),
        GrainBuds => (Yang, [5, 2, 8]),
        GrainInEar => (Yang, [6, 3, 9]),
        SummerSolstice => (Yin, [9, 3, 6]),
        MinorHeat => (Yin, [8, 2, 5]),
        MajorHeat => (Yin, [7, 1, 4]),
        StartOfAutumn => (Yin, [2, 5, 8]),
        EndOfHeat => (Yin, [1, 4, 7]),
        WhiteDew => (Yin, [9, 3, 6]),
        AutumnEquinox => (Yin, [7, 1, 4]),
        ColdDew => (Yin, [6, 9, 3]),
        FrostDescent => (Yin, [5, 8, 2]),
        StartOfWinter => (Yin, [6, 9, 3]),
        MinorSnow => (Yin, [5, 8, 2]),
        MajorSnow => (Yin, [4, 7, 1]),
    };
    PatternRow { polarity, numbers }
}
