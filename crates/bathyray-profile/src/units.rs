//! Depth and temperature units accepted on input.
//!
//! Unit tags are parsed permissively: anything unrecognized falls back to
//! metres or Celsius without raising an error.

use serde::{Deserialize, Serialize};

/// Metres per foot.
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Metres per fathom.
pub const METERS_PER_FATHOM: f64 = 1.8288;

/// Raw temperatures at or above this value mark a missing sample.
pub const MISSING_TEMPERATURE: f64 = 1000.0;

/// Linear unit of the raw depth samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthUnit {
    /// Metres.
    #[default]
    Meters,
    /// International feet.
    Feet,
    /// Fathoms (6 ft).
    Fathoms,
}

impl DepthUnit {
    /// Parse a unit tag such as `"m"`, `"ft"`, `"feet"`, `"fm"` or `"fathoms"`.
    ///
    /// Matching is case-insensitive; unknown tags are treated as metres.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "ft" | "feet" => DepthUnit::Feet,
            "fm" | "fathoms" => DepthUnit::Fathoms,
            _ => DepthUnit::Meters,
        }
    }

    /// Convert a depth in this unit to metres.
    #[inline]
    pub fn to_meters(self, depth: f64) -> f64 {
        match self {
            DepthUnit::Meters => depth,
            DepthUnit::Feet => depth * METERS_PER_FOOT,
            DepthUnit::Fathoms => depth * METERS_PER_FATHOM,
        }
    }
}

/// Unit of the raw temperature samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    /// Degrees Celsius.
    #[default]
    Celsius,
    /// Degrees Fahrenheit.
    Fahrenheit,
}

impl TemperatureUnit {
    /// Parse a unit tag. Any tag starting with `f` or `F` selects Fahrenheit,
    /// everything else is Celsius.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().chars().next() {
            Some('f') | Some('F') => TemperatureUnit::Fahrenheit,
            _ => TemperatureUnit::Celsius,
        }
    }

    /// Convert a temperature in this unit to Celsius.
    #[inline]
    pub fn to_celsius(self, temperature: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => temperature,
            TemperatureUnit::Fahrenheit => (temperature - 32.0) * 5.0 / 9.0,
        }
    }

    /// Normalize a raw sample to Celsius, or `None` if it is the missing marker.
    ///
    /// The marker is checked on the raw value, before conversion.
    pub fn normalize(self, raw: f64) -> Option<f64> {
        if !raw.is_finite() || raw >= MISSING_TEMPERATURE {
            None
        } else {
            Some(self.to_celsius(raw))
        }
    }
}
