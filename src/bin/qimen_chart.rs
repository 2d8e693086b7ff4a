//! Nine-palace chart tool
//!
//! Casts a chart for a China Standard Time moment and prints the header lines
//! and the palace grid, or the whole chart as JSON.
//!
//! Usage:
//!   cargo run --bin qimen_chart -- 2026-02-15 21:36 [--solar-time] [--json]

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use clap::{ArgAction, Parser};
use qimen::chart::{PalaceState, GRID};
use qimen::{Chart, ChartInput, ChartOptions, DoorRule, Method};

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Width of one grid cell, in full-width characters
const CELL_WIDTH: usize = 7;

/// Nine-palace chart tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Casts a nine-palace (qimen dunjia) chart for a moment",
    long_about = None
)]
struct Args {
    /// Civil date, YYYY-MM-DD
    date: String,

    /// Clock time, HH:MM (China Standard Time)
    time: String,

    /// Longitude in degrees east
    #[arg(
        long,
        default_value_t = qimen::constants::DEFAULT_LONGITUDE,
        allow_negative_numbers = true
    )]
    longitude: f64,

    /// Latitude in degrees north
    #[arg(
        long,
        default_value_t = qimen::constants::DEFAULT_LATITUDE,
        allow_negative_numbers = true
    )]
    latitude: f64,

    /// Pattern method: patch or intercalation
    #[arg(long)]
    method: Option<Method>,

    /// Correct the moment to true solar time
    #[arg(long, action = ArgAction::SetTrue)]
    solar_time: bool,

    /// Door rotation rule: numeric-walk or half-decan
    #[arg(long)]
    door_rule: Option<DoorRule>,

    /// JSON file with chart options; flags given here take precedence
    #[arg(long)]
    config: Option<String>,

    /// Print the chart as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Log construction steps
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

/// Resolve options from the config file and the flags
fn options(args: &Args) -> Result<ChartOptions> {
    let mut options = match &args.config {
        Some(path) => ChartOptions::from_json_file(path)?,
        None => ChartOptions::default(),
    };
    if let Some(method) = args.method {
        options = options.with_method(method);
    }
    if let Some(rule) = args.door_rule {
        options = options.with_door_rule(rule);
    }
    if args.solar_time {
        options = options.with_solar_time(true);
    }
    Ok(options)
}

/// Four text lines for one palace cell
fn cell_lines(state: &PalaceState) -> [String; 4] {
    let or_blank = |s: Option<&'static str>| s.unwrap_or("　");

    if state.palace.is_center() {
        return [
            String::new(),
            String::new(),
            format!("　　{}", state.earth_stem),
            String::new(),
        ];
    }

    let mut marks = String::new();
    if state.horse {
        marks.push('马');
    }
    if state.void {
        marks.push('空');
    }
    let auxiliary = state.auxiliary_stem.map(|s| format!("禽{}", s)).unwrap_or_default();

    [
        format!(
            "{}{}{}",
            or_blank(state.sky_spirit.map(|s| s.name())),
            or_blank(state.heaven_stem.map(|s| s.name())),
            marks
        ),
        format!("{}{}", or_blank(state.star.map(|s| s.name())), auxiliary),
        format!(
            "{}　{}",
            or_blank(state.door.map(|d| d.name())),
            state.earth_stem
        ),
        format!(
            "{}　{}",
            or_blank(state.ground_spirit.map(|s| s.name())),
            state.hidden_stem
        ),
    ]
}

fn print_grid(chart: &Chart) {
    let rule = "─".repeat(CELL_WIDTH * 3 + 2);
    println!("{}", rule);
    for row in GRID {
        let cells: Vec<[String; 4]> = row.iter().map(|&p| cell_lines(chart.palace(p))).collect();
        for line in 0..4 {
            let text: Vec<String> = cells
                .iter()
                .map(|c| format!("{:　<width$}", c[line], width = CELL_WIDTH))
                .collect();
            println!("{}", text.join("|"));
        }
        println!("{}", rule);
    }
}

fn print_header(chart: &Chart) {
    let moment = chart.original_moment();
    println!(
        "{}年{}月{}日{}时{:02}分　{}",
        moment.year(),
        moment.month(),
        moment.day(),
        moment.hour(),
        moment.minute(),
        chart.method_name()
    );
    if let Some(line) = chart.solar_time_line() {
        println!("{}", line);
    }
    println!("{}", chart.pillars().display());
    println!("{}", chart.pillars().void_display());
    println!("{}", chart.jie_line());
    println!("本节气上元第一天为：{}", chart.term_first_day());
    println!(
        "{}{}第{}天　{}",
        chart.term().term,
        chart.period().name(),
        chart.period_day(),
        chart.transmission().name()
    );
    println!("{}", chart.lead_line());
    println!("{}", chart.summary());
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    let date = NaiveDate::parse_from_str(&args.date, "%Y-%m-%d")?;
    let time = NaiveTime::parse_from_str(&args.time, "%H:%M")?;
    let input = ChartInput::from_moment(date.and_time(time))?.at(args.longitude, args.latitude)?;

    let chart = Chart::compute(&input, &options(&args)?)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&chart)?);
        return Ok(());
    }

    print_header(&chart);
    print_grid(&chart);
    Ok(())
}
