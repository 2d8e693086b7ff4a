//! Full chart scenarios cast through the public API

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};

use qimen::chart::{Door, Palace, PalaceState, Period, Spirit, Star, RING};
use qimen::ganzhi::{Branch, Stem};
use qimen::{Chart, ChartInput, ChartOptions, DoorRule, Method, Polarity, SolarTerm, Transmission};
use rstest::rstest;

/// Display order of the palaces: 4 9 2 / 3 5 7 / 8 1 6
const DISPLAY_ORDER: [u8; 9] = [4, 9, 2, 3, 5, 7, 8, 1, 6];

fn cast(y: i32, m: u32, d: u32, h: u32, min: u32, options: ChartOptions) -> Chart {
    let input = ChartInput::from_civil(y, m, d, h, min)
        .and_then(|i| i.at(116.4, 39.9))
        .expect("valid input");
    Chart::compute(&input, &options).expect("chart")
}

fn states(chart: &Chart) -> Vec<&PalaceState> {
    DISPLAY_ORDER
        .iter()
        .map(|&n| chart.palace(Palace::new(n).expect("palace")))
        .collect()
}

fn column<F: Fn(&PalaceState) -> Option<&'static str>>(chart: &Chart, f: F) -> Vec<&'static str> {
    states(chart).into_iter().map(|s| f(s).unwrap_or("-")).collect()
}

fn palace(n: u8) -> Palace {
    Palace::new(n).expect("palace")
}

#[test]
fn test_spring_2026_scenario() {
    let chart = cast(2026, 2, 15, 21, 36, ChartOptions::default());

    assert_eq!(chart.pillars().display(), "丙午年　庚寅月　庚申日　丁亥时");
    assert_eq!(chart.term().term, SolarTerm::StartOfSpring);
    assert_eq!(chart.polarity(), Polarity::Yang);
    assert_eq!(chart.pattern_number(), 2);
    assert_eq!(chart.period(), Period::Lower);
    assert_eq!(chart.transmission(), Transmission::Exact);
    assert_eq!(chart.decan_display(), "甲申庚");
    assert_eq!(chart.lead_star(), Star::Fu);
    assert_eq!(chart.envoy_door(), Door::Block);
    assert_eq!(chart.lead_origin(), palace(4));
    assert_eq!(chart.lead_destination(), palace(8));
    assert_eq!(chart.envoy_destination(), palace(7));
    assert_eq!(chart.void_branches(), [Branch::Wu, Branch::Wei]);
    assert_eq!(chart.horse_branch(), Branch::Si);

    assert_eq!(
        column(&chart, |s| Some(s.earth_stem.name())),
        ["庚", "丙", "戊", "己", "辛", "癸", "丁", "乙", "壬"]
    );
    assert_eq!(
        column(&chart, |s| s.heaven_stem.map(Stem::name)),
        ["戊", "癸", "壬", "丙", "-", "乙", "庚", "己", "丁"]
    );
    assert_eq!(
        column(&chart, |s| s.star.map(Star::name)),
        ["天芮", "天柱", "天心", "天英", "-", "天蓬", "天辅", "天冲", "天任"]
    );
    assert_eq!(
        column(&chart, |s| s.door.map(Door::name)),
        ["休门", "生门", "伤门", "开门", "-", "杜门", "惊门", "死门", "景门"]
    );
    assert_eq!(
        column(&chart, |s| Some(s.hidden_stem.name())),
        ["乙", "壬", "丁", "丙", "戊", "庚", "辛", "癸", "己"]
    );
    assert_eq!(
        column(&chart, |s| s.ground_spirit.map(Spirit::name)),
        ["直符", "腾蛇", "太阴", "九天", "-", "六合", "九地", "玄武", "白虎"]
    );
    assert_eq!(
        column(&chart, |s| s.sky_spirit.map(Spirit::name)),
        ["太阴", "六合", "白虎", "腾蛇", "-", "玄武", "直符", "九天", "九地"]
    );

    assert!(chart.palace(palace(9)).void);
    assert!(chart.palace(palace(2)).void);
    assert!(chart.palace(palace(4)).horse);
    assert_eq!(chart.palace(palace(4)).auxiliary_stem, Some(Stem::Xin));
}

#[test]
fn test_winter_2009_scenario() {
    let chart = cast(2009, 11, 9, 16, 40, ChartOptions::default());

    assert_eq!(chart.pillars().display(), "己丑年　乙亥月　戊午日　庚申时");
    assert_eq!(chart.current_jie().map(|t| t.term), Some(SolarTerm::StartOfWinter));
    assert_eq!(chart.next_jie().map(|t| t.term), Some(SolarTerm::MajorSnow));
    assert_eq!(chart.polarity(), Polarity::Yin);
    assert_eq!(chart.pattern_number(), 9);
    assert_eq!(chart.period(), Period::Middle);
    assert_eq!(chart.transmission(), Transmission::Overtaking { days: 7 });
    assert_eq!(chart.decan_display(), "甲寅癸");
    assert_eq!(chart.lead_origin(), palace(4));
    assert_eq!(chart.lead_destination(), palace(7));
    assert_eq!(chart.envoy_destination(), palace(7));
    assert_eq!(chart.void_branches(), [Branch::Zi, Branch::Chou]);
    assert_eq!(chart.horse_branch(), Branch::Yin);

    assert_eq!(
        column(&chart, |s| s.door.map(Door::name)),
        ["休门", "生门", "伤门", "开门", "-", "杜门", "惊门", "死门", "景门"]
    );
    assert_eq!(
        column(&chart, |s| Some(s.earth_stem.name())),
        ["癸", "戊", "丙", "丁", "壬", "庚", "己", "乙", "辛"]
    );
    assert_eq!(
        column(&chart, |s| s.heaven_stem.map(Stem::name)),
        ["乙", "己", "丁", "辛", "-", "癸", "庚", "丙", "戊"]
    );
    assert_eq!(
        column(&chart, |s| s.star.map(Star::name)),
        ["天蓬", "天任", "天冲", "天心", "-", "天辅", "天柱", "天芮", "天英"]
    );
    assert_eq!(
        column(&chart, |s| Some(s.hidden_stem.name())),
        ["乙", "戊", "丁", "丙", "壬", "庚", "己", "癸", "辛"]
    );
    assert_eq!(
        column(&chart, |s| s.ground_spirit.map(Spirit::name)),
        ["直符", "九天", "九地", "腾蛇", "-", "玄武", "太阴", "六合", "白虎"]
    );
    assert_eq!(
        column(&chart, |s| s.sky_spirit.map(Spirit::name)),
        ["六合", "太阴", "腾蛇", "白虎", "-", "直符", "玄武", "九地", "九天"]
    );

    assert!(chart.palace(palace(1)).void);
    assert!(chart.palace(palace(8)).void && chart.palace(palace(8)).horse);
    assert_eq!(chart.paired_star_palace(), Some(palace(1)));
    assert_eq!(chart.palace(palace(1)).auxiliary_stem, Some(Stem::Ren));
}

#[test]
fn test_hour_23_rolls_hour_stem_only() {
    let chart = cast(2026, 2, 15, 23, 10, ChartOptions::default());
    assert_eq!(chart.pillars().day.name(), "庚申");
    assert_eq!(chart.pillars().hour.name(), "戊子");
    assert_eq!(chart.pattern_number(), 2);
    assert_eq!(chart.lead_destination(), palace(2));
    assert_eq!(chart.envoy_destination(), palace(8));
    assert_eq!(chart.paired_star_palace(), Some(palace(6)));
}

#[test]
fn test_patch_method_scenario() {
    let chart = cast(
        2026,
        2,
        15,
        21,
        36,
        ChartOptions::new().with_method(Method::Patch),
    );
    assert_eq!(chart.polarity(), Polarity::Yang);
    assert_eq!(chart.pattern_number(), 5);
    assert_eq!(chart.period(), Period::Middle);
    assert_eq!(chart.lead_origin(), palace(7));
    assert_eq!(chart.lead_destination(), palace(2));
    assert_eq!(chart.envoy_destination(), palace(1));
    assert_eq!(
        column(&chart, |s| s.door.map(Door::name)),
        ["生门", "伤门", "杜门", "休门", "-", "景门", "开门", "惊门", "死门"]
    );
}

#[test]
fn test_hour_stem_in_center() {
    // 癸巳 hour on a yang 9 plate: 癸 sits in the center
    let chart = cast(2025, 6, 21, 10, 30, ChartOptions::default());
    assert_eq!(chart.pattern_number(), 9);
    assert_eq!(chart.lead_origin(), palace(2));
    assert_eq!(chart.lead_destination(), Palace::CENTER);
    // origin and destination share the ring slot, so nothing turns
    for state in states(&chart) {
        if !state.palace.is_center() {
            assert_eq!(state.heaven_stem, Some(state.earth_stem));
            assert_eq!(state.ground_spirit, state.sky_spirit);
        }
    }
}

#[test]
fn test_lead_in_center_borrows_kun() {
    let chart = cast(2024, 9, 1, 0, 30, ChartOptions::default());
    let switched = Transmission::ReceivingSwitched {
        days: 21,
        term: SolarTerm::WhiteDew,
    };
    assert_eq!(chart.transmission(), switched);
    assert_eq!(chart.polarity(), Polarity::Yin);
    assert_eq!(chart.pattern_number(), 9);
    assert_eq!(chart.lead_origin(), Palace::CENTER);
    assert_eq!(chart.lead_star(), Star::Qin);
    assert_eq!(chart.envoy_door(), Door::Death);
    assert_eq!(chart.envoy_destination(), palace(6));
    assert_eq!(chart.palace(palace(2)).ground_spirit, Some(Spirit::Chief));
    assert_eq!(chart.palace(palace(6)).door, Some(Door::Death));
}

#[test]
fn test_summary_line() {
    let chart = cast(2009, 11, 9, 16, 40, ChartOptions::default());
    assert_eq!(chart.summary(), "阴遁九局　值符天辅落七宫　值使杜门落七宫");
}

fn assert_permutations(chart: &Chart) {
    let outer: Vec<&PalaceState> = RING.iter().map(|&p| chart.palace(p)).collect();

    let earth: HashSet<Stem> = chart.palaces().iter().map(|s| s.earth_stem).collect();
    assert_eq!(earth.len(), 9);
    assert!(!earth.contains(&Stem::Jia));

    let heaven: HashSet<Stem> = outer.iter().filter_map(|s| s.heaven_stem).collect();
    assert_eq!(heaven.len(), 8);
    assert!(heaven.is_subset(&earth));

    let stars: HashSet<Star> = outer.iter().filter_map(|s| s.star).collect();
    assert_eq!(stars.len(), 8);
    assert!(!stars.contains(&Star::Qin));

    let doors: HashSet<Door> = outer.iter().filter_map(|s| s.door).collect();
    assert_eq!(doors.len(), 8);

    let ground: HashSet<Spirit> = outer.iter().filter_map(|s| s.ground_spirit).collect();
    let sky: HashSet<Spirit> = outer.iter().filter_map(|s| s.sky_spirit).collect();
    assert_eq!(ground.len(), 8);
    assert_eq!(sky.len(), 8);

    let hidden: HashSet<Stem> = chart.palaces().iter().map(|s| s.hidden_stem).collect();
    assert_eq!(hidden.len(), 9);

    let center = chart.palace(Palace::CENTER);
    assert!(center.heaven_stem.is_none() && center.star.is_none() && center.door.is_none());

    assert_eq!(chart.palaces().iter().filter(|s| s.horse).count(), 1);
    assert_eq!(
        chart.palaces().iter().filter(|s| s.auxiliary_stem.is_some()).count(),
        1
    );
}

#[rstest]
fn test_layers_are_permutations(
    #[values(Method::Intercalation, Method::Patch)] method: Method,
    #[values(DoorRule::NumericWalk, DoorRule::HalfDecan)] door_rule: DoorRule,
) {
    let options = ChartOptions::new()
        .with_method(method)
        .with_door_rule(door_rule);
    // Every double hour across a stretch of days covering both polarities
    for (y, m, d) in [(2026, 2, 15), (2025, 6, 21), (2009, 11, 9), (1990, 7, 3), (2026, 12, 22)] {
        for day_shift in 0..3 {
            for hour in (0..24).step_by(2) {
                let chart = cast(y, m, d + day_shift, hour, 15, options);
                assert_permutations(&chart);
            }
        }
    }
}

#[test]
fn test_lead_depends_only_on_hour_decan() {
    // Same hour pillar 丁亥 on different days and plates
    let a = cast(2026, 2, 15, 21, 36, ChartOptions::default());
    let b = cast(2026, 4, 16, 21, 36, ChartOptions::default());
    assert_eq!(a.pillars().hour, b.pillars().hour);
    assert_eq!(a.decan_head(), b.decan_head());
    assert_eq!(a.lead().instrument, b.lead().instrument);
    for chart in [&a, &b] {
        assert_eq!(chart.lead_star(), Star::at_home(chart.lead_origin()));
        assert_eq!(chart.envoy_door(), Door::at_home(chart.lead_origin()));
    }

    let void_a = a.void_branches();
    assert_eq!(void_a, b.void_branches());
    assert_eq!(a.horse_branch(), b.horse_branch());
}

#[test]
fn test_lead_star_and_door_sit_at_the_origin() {
    let start = NaiveDate::from_ymd_opt(2024, 8, 15)
        .and_then(|d| d.and_hms_opt(0, 30, 0))
        .expect("moment");
    let mut saw_center = false;
    for hour in 0..60 * 12 {
        let input = ChartInput::from_moment(start + Duration::hours(2 * hour)).expect("input");
        let chart = Chart::compute(&input, &ChartOptions::default()).expect("chart");
        let origin = chart.lead_origin();
        assert_eq!(chart.lead_star(), Star::at_home(origin));
        assert_eq!(chart.envoy_door(), Door::at_home(origin));
        if origin.is_center() {
            saw_center = true;
            assert_eq!(chart.lead_star(), Star::Qin);
            assert_eq!(chart.envoy_door(), Door::Death);
        }
    }
    assert!(saw_center);
}

#[test]
fn test_determinism() {
    let options = ChartOptions::new().with_solar_time(true);
    let a = cast(2026, 2, 15, 21, 36, options);
    let b = cast(2026, 2, 15, 21, 36, options);
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).expect("json"),
        serde_json::to_string(&b).expect("json")
    );
}

#[test]
fn test_json_output_uses_names() {
    let chart = cast(2026, 2, 15, 21, 36, ChartOptions::default());
    let json = serde_json::to_value(&chart).expect("json");
    assert_eq!(json["pillars"]["day"], "庚申");
    assert_eq!(json["dun"]["polarity"], "阳");
    assert_eq!(json["dun"]["transmission"], "正授");
    assert_eq!(json["lead"]["star"], "天辅");
    assert_eq!(json["palaces"][0]["palace"], 1);
    assert_eq!(json["palaces"][0]["door"], "死门");
}

#[test]
fn test_invalid_input_is_rejected() {
    assert!(ChartInput::from_civil(2026, 2, 29, 10, 0).is_err());
    assert!(ChartInput::from_civil(2026, 1, 1, 24, 0).is_err());
    assert!(ChartInput::from_civil(2026, 1, 1, 0, 0)
        .and_then(|i| i.at(f64::INFINITY, 0.0))
        .is_err());
}
