//! Qimen: nine-palace (奇门遁甲) chart generation in Rust
//!
//! This crate turns a civil moment in China Standard Time into a nine-palace
//! chart. It provides a Julian-day calendar, a table of the 24 solar terms,
//! sexagenary pillars, an optional true solar time correction, and the chart
//! engine that lays out stems, stars, doors and spirits over the palaces.
//!
//! ```no_run
//! use qimen::{Chart, ChartInput, ChartOptions};
//!
//! let input = ChartInput::from_civil(2026, 2, 15, 21, 36)?.at(116.4, 39.9)?;
//! let chart = Chart::compute(&input, &ChartOptions::default())?;
//! println!("{}", chart.summary());
//! # Ok::<(), qimen::QimenError>(())
//! ```

use thiserror::Error;

/// Serialize a type through its `name()` method
macro_rules! serialize_by_name {
    ($($t:ty),* $(,)?) => {
        $(
            impl serde::Serialize for $t {
                fn serialize<S: serde::Serializer>(
                    &self,
                    serializer: S,
                ) -> std::result::Result<S::Ok, S::Error> {
                    serializer.serialize_str(&self.name())
                }
            }
        )*
    };
}

pub mod calendar;
pub mod chart;
pub mod config;
pub mod constants;
pub mod ganzhi;
pub mod solar_time;
pub mod terms;

serialize_by_name!(ganzhi::Stem, ganzhi::Branch, ganzhi::SexagenaryPair);

// Re-export commonly used types
pub use calendar::CivilTime;
pub use chart::{Chart, ChartInput, Palace, Polarity, Transmission};
pub use config::{ChartOptions, DoorRule, Method};
pub use ganzhi::{FourPillars, SexagenaryPair};
pub use terms::SolarTerm;

/// Main error type for the qimen library
#[derive(Debug, Error)]
pub enum QimenError {
    /// Malformed date, time or coordinates
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No solar term precedes the moment in the available tables
    #[error("No solar term at or before Julian day {julian_day}")]
    TermBracketUnresolvable {
        /// The Julian day that was looked up
        julian_day: f64,
    },

    /// A fixed table had no entry for a value it should cover
    #[error("Table lookup failed: {0}")]
    TableLookup(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for qimen operations
pub type Result<T> = std::result::Result<T, QimenError>;
