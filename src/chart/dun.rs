//! Polarity, pattern number and period of a moment
//!
//! Two methods are supported. The patch method (拆补法) reads the pattern of
//! the moment's own term and picks the period from the day pillar's decan.
//! The intercalation method (置闰法) counts back to the period head (符头)
//! and compares that day with the current sectioning term: a head on or
//! before the term is "overtaking" (超神), a head after it is "receiving"
//! (接气), and more than nine days of drift either flags or triggers an
//! intercalated period.

use log::{debug, warn};
use serde::Serialize;

use super::tables::{pattern_row, Period, Polarity};
use crate::config::Method;
use crate::ganzhi::{FourPillars, SexagenaryPair};
use crate::terms::SolarTerm;
use crate::Result;

/// Days of drift beyond which an intercalated period is due
const MAX_DRIFT_DAYS: i64 = 9;

/// How the pattern term was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transmission {
    /// Period head and sectioning term fall on the same day (正授)
    Exact,
    /// Head precedes the term by up to nine days (超神)
    Overtaking { days: i64 },
    /// Head precedes the term by more than nine days
    NeedsIntercalation { days: i64 },
    /// Head trails the term by more than nine days; the next term's pattern applies
    ReceivingSwitched { days: i64, term: SolarTerm },
    /// Head trails the term by up to nine days (接气)
    ReceivingIntercalated { days: i64 },
    /// Patch method
    Patch,
    /// No sectioning term was available; the patch period rule was used
    Simplified,
}

impl Transmission {
    pub fn name(&self) -> String {
        match *self {
            Transmission::Exact => "正授".to_string(),
            Transmission::Overtaking { days } => format!("超神{}天", days),
            Transmission::NeedsIntercalation { days } => format!("超神{}天,需置闰", days),
            Transmission::ReceivingSwitched { days, term } => {
                format!("接气{}天,用{}", days, term)
            }
            Transmission::ReceivingIntercalated { days } => format!("置闰(接气{}天)", days),
            Transmission::Patch => "拆补".to_string(),
            Transmission::Simplified => "简化".to_string(),
        }
    }

    /// Whether the method flagged an intercalated period
    pub fn is_intercalated(&self) -> bool {
        matches!(
            self,
            Transmission::NeedsIntercalation { .. }
                | Transmission::ReceivingSwitched { .. }
                | Transmission::ReceivingIntercalated { .. }
        )
    }
}

serialize_by_name!(Transmission);

/// Outcome of the polarity decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DunDecision {
    pub polarity: Polarity,
    pub pattern_number: u8,
    pub period: Period,
    /// Term whose pattern row was used
    pub term: SolarTerm,
    pub transmission: Transmission,
}

/// Period by the decan of the day pillar
pub fn patch_period(day: SexagenaryPair) -> Period {
    match day.decan_head().index() {
        0 | 30 => Period::Upper,
        20 | 50 => Period::Middle,
        _ => Period::Lower,
    }
}

/// Days since the last period head (甲子 甲午 己卯 己酉 heads at 0, 15, 30, 45)
pub fn days_since_period_head(day: SexagenaryPair) -> usize {
    day.index() % 15
}

fn decide(term: SolarTerm, period: Period, transmission: Transmission) -> DunDecision {
    let row = pattern_row(term);
    DunDecision {
        polarity: row.polarity,
        pattern_number: row.number(period),
        period,
        term,
        transmission,
    }
}

/// Decide polarity, pattern number and period for a set of pillars
pub fn determine(pillars: &FourPillars, method: Method) -> Result<DunDecision> {
    let decision = match method {
        Method::Patch => decide(
            pillars.bracket.term.term,
            patch_period(pillars.day),
            Transmission::Patch,
        ),
        Method::Intercalation => intercalate(pillars),
    };
    debug!(
        "{}遁{}局 {} via {} ({})",
        decision.polarity.name(),
        decision.pattern_number,
        decision.period.name(),
        decision.term,
        decision.transmission.name()
    );
    Ok(decision)
}

fn intercalate(pillars: &FourPillars) -> DunDecision {
    let Some(current) = pillars.bracket.current_jie else {
        warn!(
            "no sectioning term before {}, using the patch period rule",
            pillars.bracket.term.display_time()
        );
        return decide(
            pillars.bracket.term.term,
            patch_period(pillars.day),
            Transmission::Simplified,
        );
    };

    let k = days_since_period_head(pillars.day);
    let period = match k {
        0..=4 => Period::Upper,
        5..=9 => Period::Middle,
        _ => Period::Lower,
    };

    let head_day = pillars.day_number - k as i64;
    let term_day = current.day_number();

    if head_day <= term_day {
        let days = term_day - head_day;
        let transmission = if days > MAX_DRIFT_DAYS {
            Transmission::NeedsIntercalation { days }
        } else if days == 0 {
            Transmission::Exact
        } else {
            Transmission::Overtaking { days }
        };
        return decide(current.term, period, transmission);
    }

    let days = head_day - term_day;
    match pillars.bracket.next_jie {
        Some(next) if days > MAX_DRIFT_DAYS => decide(
            next.term,
            period,
            Transmission::ReceivingSwitched {
                days,
                term: next.term,
            },
        ),
        _ => decide(
            current.term,
            period,
            Transmission::ReceivingIntercalated { days },
        ),
    }
}
