//! Chart construction options
//!
//! Options can be built in code or read from JSON:
//!
//! ```json
//! { "method": "intercalation", "use_solar_time": true, "door_rule": "numeric_walk" }
//! ```
//!
//! Missing fields take their defaults.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{QimenError, Result};

/// How polarity and pattern number are chosen for a moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// 拆补法: the moment's own solar term and the day pillar's decan
    Patch,
    /// 置闰法: overtaking and receiving against the sectioning term
    #[default]
    Intercalation,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::Patch => "拆补法",
            Method::Intercalation => "置闰法",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = QimenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patch" | "chaibu" | "拆补法" => Ok(Method::Patch),
            "intercalation" | "zhirun" | "置闰法" => Ok(Method::Intercalation),
            other => Err(QimenError::Config(format!("unknown method '{}'", other))),
        }
    }
}

/// How the door layer is rotated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorRule {
    /// Walk the lead origin through palaces 1..9 by the hour's decan offset
    #[default]
    NumericWalk,
    /// Rotate the ring by half the decan offset
    HalfDecan,
}

impl FromStr for DoorRule {
    type Err = QimenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "numeric_walk" | "walk" => Ok(DoorRule::NumericWalk),
            "half_decan" | "half" => Ok(DoorRule::HalfDecan),
            other => Err(QimenError::Config(format!("unknown door rule '{}'", other))),
        }
    }
}

/// Options controlling chart construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub method: Method,
    /// Correct the moment to true solar time before deriving pillars
    pub use_solar_time: bool,
    pub door_rule: DoorRule,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            method: Method::Intercalation,
            use_solar_time: false,
            door_rule: DoorRule::NumericWalk,
        }
    }
}

impl ChartOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_solar_time(mut self, use_solar_time: bool) -> Self {
        self.use_solar_time = use_solar_time;
        self
    }

    pub fn with_door_rule(mut self, door_rule: DoorRule) -> Self {
        self.door_rule = door_rule;
        self
    }

    /// Parse options from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| QimenError::Config(e.to_string()))
    }

    /// Read options from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| QimenError::Config(e.to_string()))
    }
}
