//! Nine-palace chart construction
//!
//! [`Chart::compute`] runs the whole pipeline for one moment: optional true
//! solar time, four pillars, polarity and pattern number, then the earth,
//! heaven, star, door, hidden and spirit layers and the void/horse marks.
//! The result is immutable.

pub mod dun;
pub mod placement;
pub mod tables;

use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use serde::Serialize;

pub use dun::{DunDecision, Transmission};
pub use placement::Lead;
pub use tables::{Door, Palace, Period, Polarity, Spirit, Star, GRID, RING};

use crate::calendar::check_civil;
use crate::config::ChartOptions;
use crate::constants::{DEFAULT_LATITUDE, DEFAULT_LONGITUDE};
use crate::ganzhi::{
    day_pillar, four_pillars, horse_branch, Branch, FourPillars, SexagenaryPair, Stem,
};
use crate::solar_time::{format_time_diff, true_solar_time, SolarTimeCorrection};
use crate::terms::SolarTermInstant;
use crate::{QimenError, Result};

/// Moment and place a chart is cast for
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartInput {
    moment: NaiveDateTime,
    longitude: f64,
    latitude: f64,
}

impl ChartInput {
    /// Validate civil fields; the location defaults to Beijing
    pub fn from_civil(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Result<Self> {
        check_civil(year, month, day, hour, minute)?;
        let moment = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .ok_or_else(|| {
                QimenError::InvalidInput(format!(
                    "{}-{:02}-{:02} {:02}:{:02} is not a proleptic Gregorian date",
                    year, month, day, hour, minute
                ))
            })?;
        Ok(Self {
            moment,
            longitude: DEFAULT_LONGITUDE,
            latitude: DEFAULT_LATITUDE,
        })
    }

    /// Wrap an existing moment; seconds are ignored
    pub fn from_moment(moment: NaiveDateTime) -> Result<Self> {
        use chrono::{Datelike, Timelike};
        Self::from_civil(
            moment.year(),
            moment.month(),
            moment.day(),
            moment.hour(),
            moment.minute(),
        )
    }

    /// Set the observer location in degrees (east and north positive)
    pub fn at(self, longitude: f64, latitude: f64) -> Result<Self> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(QimenError::InvalidInput(format!("longitude {}", longitude)));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(QimenError::InvalidInput(format!("latitude {}", latitude)));
        }
        Ok(Self {
            longitude,
            latitude,
            ..self
        })
    }

    pub fn moment(&self) -> NaiveDateTime {
        self.moment
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }
}

/// Everything placed in one palace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PalaceState {
    pub palace: Palace,
    pub earth_stem: Stem,
    pub heaven_stem: Option<Stem>,
    pub star: Option<Star>,
    pub door: Option<Door>,
    pub hidden_stem: Stem,
    pub ground_spirit: Option<Spirit>,
    pub sky_spirit: Option<Spirit>,
    /// Center earth stem carried by 天禽 where it rides with 天芮
    pub auxiliary_stem: Option<Stem>,
    pub void: bool,
    pub horse: bool,
}

/// A complete nine-palace chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    input: ChartInput,
    options: ChartOptions,
    solar_time: SolarTimeCorrection,
    pillars: FourPillars,
    dun: DunDecision,
    lead: Lead,
    void_branches: [Branch; 2],
    horse_branch: Branch,
    palaces: [PalaceState; 9],
}

impl Chart {
    /// Cast the chart for `input`
    pub fn compute(input: &ChartInput, options: &ChartOptions) -> Result<Chart> {
        let solar_time = if options.use_solar_time {
            true_solar_time(input.moment, input.longitude)?
        } else {
            SolarTimeCorrection::identity(input.moment)
        };
        debug!(
            "casting {} ({} after correction)",
            input.moment, solar_time.corrected
        );

        let pillars = four_pillars(&solar_time.corrected)?;
        let dun = dun::determine(&pillars, options.method)?;
        let polarity = dun.polarity;

        let earth = placement::earth_stems(dun.pattern_number, polarity)?;
        let lead = placement::lead(&earth, pillars.hour, polarity, options.door_rule)?;

        let heaven = placement::heaven_stems(&earth, lead.star_rotation());
        let stars = placement::stars(lead.star_rotation());
        let doors = placement::doors(lead.door_rotation());
        let hidden = placement::hidden_stems(
            lead.envoy_destination,
            pillars.hour.stem(),
            lead.instrument,
            polarity,
        )?;
        let ground = placement::spirits(lead.origin, polarity);
        let sky = placement::spirits(lead.destination, polarity);

        let void_branches = pillars.hour.void_branches();
        let horse = horse_branch(pillars.hour.branch());
        let void_palaces = void_branches.map(tables::branch_palace);
        let horse_palace = tables::branch_palace(horse);

        let partner_palace = Palace::all()
            .find(|p| stars[p.slot()] == Some(Star::PARTNER))
            .ok_or_else(|| QimenError::TableLookup("天芮 did not land".to_string()))?;
        let center_stem = earth[Palace::CENTER.slot()];

        let palaces = RING_AND_CENTER.map(|n| {
            let palace = Palace(n);
            let slot = palace.slot();
            PalaceState {
                palace,
                earth_stem: earth[slot],
                heaven_stem: heaven[slot],
                star: stars[slot],
                door: doors[slot],
                hidden_stem: hidden[slot],
                ground_spirit: ground[slot],
                sky_spirit: sky[slot],
                auxiliary_stem: (palace == partner_palace).then_some(center_stem),
                void: void_palaces.contains(&palace),
                horse: palace == horse_palace,
            }
        });

        Ok(Chart {
            input: *input,
            options: *options,
            solar_time,
            pillars,
            dun,
            lead,
            void_branches,
            horse_branch: horse,
            palaces,
        })
    }

    pub fn input(&self) -> &ChartInput {
        &self.input
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn original_moment(&self) -> NaiveDateTime {
        self.input.moment
    }

    pub fn corrected_moment(&self) -> NaiveDateTime {
        self.solar_time.corrected
    }

    pub fn solar_time(&self) -> &SolarTimeCorrection {
        &self.solar_time
    }

    pub fn time_diff_minutes(&self) -> f64 {
        self.solar_time.total_diff_minutes
    }

    pub fn pillars(&self) -> &FourPillars {
        &self.pillars
    }

    pub fn dun(&self) -> &DunDecision {
        &self.dun
    }

    pub fn polarity(&self) -> Polarity {
        self.dun.polarity
    }

    pub fn pattern_number(&self) -> u8 {
        self.dun.pattern_number
    }

    pub fn period(&self) -> Period {
        self.dun.period
    }

    pub fn transmission(&self) -> Transmission {
        self.dun.transmission
    }

    /// The term enclosing the moment (sectioning or mid)
    pub fn term(&self) -> &SolarTermInstant {
        &self.pillars.bracket.term
    }

    /// The sectioning term at or before the moment
    pub fn current_jie(&self) -> Option<&SolarTermInstant> {
        self.pillars.bracket.current_jie.as_ref()
    }

    pub fn next_jie(&self) -> Option<&SolarTermInstant> {
        self.pillars.bracket.next_jie.as_ref()
    }

    pub fn lead(&self) -> &Lead {
        &self.lead
    }

    pub fn decan_head(&self) -> SexagenaryPair {
        self.lead.decan_head
    }

    pub fn lead_star(&self) -> Star {
        self.lead.star
    }

    pub fn envoy_door(&self) -> Door {
        self.lead.door
    }

    pub fn lead_origin(&self) -> Palace {
        self.lead.origin
    }

    pub fn lead_destination(&self) -> Palace {
        self.lead.destination
    }

    pub fn envoy_destination(&self) -> Palace {
        self.lead.envoy_destination
    }

    pub fn void_branches(&self) -> [Branch; 2] {
        self.void_branches
    }

    pub fn horse_branch(&self) -> Branch {
        self.horse_branch
    }

    /// Palaces in ring order followed by the center
    pub fn palaces(&self) -> &[PalaceState; 9] {
        &self.palaces
    }

    pub fn palace(&self, palace: Palace) -> &PalaceState {
        let i = RING_AND_CENTER
            .iter()
            .position(|&n| n == palace.number())
            .unwrap_or(8);
        &self.palaces[i]
    }

    /// Palace where 天禽 rides with 天芮
    pub fn paired_star_palace(&self) -> Option<Palace> {
        self.palaces
            .iter()
            .find(|s| s.auxiliary_stem.is_some())
            .map(|s| s.palace)
    }

    /// `拆补法` or `置闰法`
    pub fn method_name(&self) -> &'static str {
        self.options.method.name()
    }

    /// Decan head with its instrument, e.g. `甲申庚`
    pub fn decan_display(&self) -> String {
        format!("{}{}", self.lead.decan_head, self.lead.instrument)
    }

    /// `立春：2026/2/4 4:02:00　惊蛰：2026/3/5 21:58:00`
    pub fn jie_line(&self) -> String {
        [self.current_jie(), self.next_jie()]
            .iter()
            .flatten()
            .map(|t| format!("{}：{}", t.term, t.display_time()))
            .collect::<Vec<_>>()
            .join("　")
    }

    /// Day within the five-day period, 1–5
    pub fn period_day(&self) -> usize {
        self.pillars.day.decan_offset() % 5 + 1
    }

    /// Date and day pillar of the current term's first day, `2026年2月4日己酉`
    pub fn term_first_day(&self) -> String {
        let c = self.term().civil;
        format!(
            "{}年{}月{}日{}",
            c.year,
            c.month,
            c.day,
            day_pillar(c.year, c.month, c.day)
        )
    }

    /// `直符：天辅　直使：杜门　旬首：甲申庚`
    pub fn lead_line(&self) -> String {
        format!(
            "直符：{}　直使：{}　旬首：{}",
            self.lead.star.name(),
            self.lead.door.name(),
            self.decan_display()
        )
    }

    /// `阳遁二局　值符天辅落八宫　值使杜门落七宫`
    pub fn summary(&self) -> String {
        format!(
            "{}遁{}局　值符{}落{}宫　值使{}落{}宫",
            self.dun.polarity.name(),
            Palace(self.dun.pattern_number).numeral(),
            self.lead.star.name(),
            self.lead.destination.numeral(),
            self.lead.door.name(),
            self.lead.envoy_destination.numeral()
        )
    }

    /// `真太阳时：2026-02-15 21:07 (-29分)`, only when solar time is in use
    pub fn solar_time_line(&self) -> Option<String> {
        self.options.use_solar_time.then(|| {
            format!(
                "真太阳时：{} ({})",
                self.solar_time.corrected.format("%Y-%m-%d %H:%M"),
                format_time_diff(self.solar_time.total_diff_minutes)
            )
        })
    }
}

/// Storage order of `Chart::palaces`
const RING_AND_CENTER: [u8; 9] = [1, 8, 3, 4, 9, 2, 7, 6, 5];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Method;

    fn chart(y: i32, m: u32, d: u32, h: u32, min: u32) -> Chart {
        let input = ChartInput::from_civil(y, m, d, h, min).expect("input");
        Chart::compute(&input, &ChartOptions::default()).expect("chart")
    }

    #[test]
    fn test_header_lines() {
        let c = chart(2026, 2, 15, 21, 36);
        assert_eq!(c.method_name(), "置闰法");
        assert_eq!(c.decan_display(), "甲申庚");
        assert_eq!(c.summary(), "阳遁二局　值符天辅落八宫　值使杜门落七宫");
        assert_eq!(c.lead_line(), "直符：天辅　直使：杜门　旬首：甲申庚");
        assert_eq!(c.jie_line(), "立春：2026/2/4 4:02:00　惊蛰：2026/3/5 21:58:00");
        assert_eq!(c.term_first_day(), "2026年2月4日己酉");
        assert_eq!(c.period_day(), 2);
        assert_eq!(c.solar_time_line(), None);
    }

    #[test]
    fn test_auxiliary_stem_rides_with_rui() {
        let c = chart(2026, 2, 15, 21, 36);
        let four = Palace::new(4).expect("palace");
        assert_eq!(c.paired_star_palace(), Some(four));
        assert_eq!(c.palace(four).auxiliary_stem, Some(Stem::Xin));
        assert_eq!(c.palace(four).star, Some(Star::Rui));
    }

    #[test]
    fn test_center_is_bare() {
        let c = chart(2009, 11, 9, 16, 40);
        let center = c.palace(Palace::CENTER);
        assert_eq!(center.earth_stem, Stem::Ren);
        assert_eq!(center.heaven_stem, None);
        assert_eq!(center.star, None);
        assert_eq!(center.door, None);
        assert_eq!(center.ground_spirit, None);
        assert_eq!(center.sky_spirit, None);
        assert!(!center.void && !center.horse);
    }

    #[test]
    fn test_solar_time_shifts_moment() {
        let input = ChartInput::from_civil(2026, 2, 15, 21, 36).expect("input");
        let options = ChartOptions::new().with_solar_time(true);
        let c = Chart::compute(&input, &options).expect("chart");
        assert!(c.time_diff_minutes() < -28.0);
        assert_eq!(c.corrected_moment().format("%H:%M").to_string(), "21:07");
        assert_eq!(
            c.solar_time_line().as_deref(),
            Some("真太阳时：2026-02-15 21:07 (-29分)")
        );
        // 21:07 is still the 亥 hour
        assert_eq!(c.pillars().hour.name(), "丁亥");
    }

    #[test]
    fn test_input_validation() {
        assert!(ChartInput::from_civil(2026, 2, 30, 0, 0).is_err());
        assert!(ChartInput::from_civil(2026, 2, 1, 0, 60).is_err());
        let input = ChartInput::from_civil(2026, 2, 1, 0, 0).expect("input");
        assert!(input.at(f64::NAN, 0.0).is_err());
        assert!(input.at(116.4, 91.0).is_err());
        let moved = input.at(121.47, 31.23).expect("location");
        assert_eq!(moved.longitude(), 121.47);
        assert_eq!(input.longitude(), DEFAULT_LONGITUDE);
    }

    #[test]
    fn test_from_moment_drops_seconds() {
        let moment = NaiveDate::from_ymd_opt(2026, 2, 15)
            .and_then(|d| d.and_hms_opt(21, 36, 45))
            .expect("moment");
        let input = ChartInput::from_moment(moment).expect("input");
        assert_eq!(input, ChartInput::from_civil(2026, 2, 15, 21, 36).expect("input"));
        let too_early = NaiveDate::from_ymd_opt(1582, 10, 10)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("moment");
        assert!(ChartInput::from_moment(too_early).is_err());
    }

    #[test]
    fn test_patch_method_name() {
        let input = ChartInput::from_civil(2026, 2, 15, 21, 36).expect("input");
        let options = ChartOptions::new().with_method(Method::Patch);
        let c = Chart::compute(&input, &options).expect("chart");
        assert_eq!(c.method_name(), "拆补法");
        assert_eq!(c.transmission(), Transmission::Patch);
    }
}
