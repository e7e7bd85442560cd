//! Enum types for the docbind system.
//!
//! [`ChartType`] keeps unknown strings in an `Other` variant so that a
//! settings file written by a newer client still loads; the aggregator
//! rejects such bindings at render time instead.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ===========================================================================
// ChartType
// ===========================================================================

/// The kind of chart a chart binding renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ChartType {
    /// Values summed per calendar day, sorted by date.
    #[default]
    Line,
    /// Values summed per raw x value, first-seen order.
    Bar,
    /// Raw numeric sample for a binned histogram.
    Hist,
    /// Same grouping as `Bar`, drawn as slices.
    Pie,
    /// Any chart type this build does not know how to aggregate.
    Other(String),
}

impl ChartType {
    /// All built-in chart types, in display order.
    pub const BUILTIN: [ChartType; 4] = [Self::Line, Self::Bar, Self::Hist, Self::Pie];

    /// Returns the string representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
            Self::Hist => "hist",
            Self::Pie => "pie",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Returns `true` if this is a built-in (non-`Other`) variant.
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ChartType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChartType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

impl From<&str> for ChartType {
    fn from(s: &str) -> Self {
        match s {
            "line" => Self::Line,
            "bar" => Self::Bar,
            "hist" => Self::Hist,
            "pie" => Self::Pie,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for ChartType {
    fn from(s: String) -> Self {
        // Check known variants first to avoid allocation in common case.
        match s.as_str() {
            "line" => Self::Line,
            "bar" => Self::Bar,
            "hist" => Self::Hist,
            "pie" => Self::Pie,
            _ => Self::Other(s),
        }
    }
}

// ===========================================================================
// InvalidDatePolicy
// ===========================================================================

/// What a line chart does with x values that do not parse as dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvalidDatePolicy {
    /// Group every unparseable value under the `"Invalid Date"` key.
    #[default]
    Group,
    /// Leave unparseable rows out of the series.
    Drop,
}

impl InvalidDatePolicy {
    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Drop => "drop",
        }
    }
}

impl fmt::Display for InvalidDatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===========================================================================
// Scale
// ===========================================================================

/// Output resolution multiplier for a rendered chart artifact.
///
/// Serialized as its numeric factor (`1`, `1.5`, `3`, `6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scale {
    #[default]
    Standard,
    Medium,
    High,
    Ultra,
}

impl Scale {
    /// Every accepted scale, smallest first.
    pub const ALL: [Scale; 4] = [Self::Standard, Self::Medium, Self::High, Self::Ultra];

    /// The multiplier applied to the backend's base resolution.
    pub fn factor(&self) -> f64 {
        match self {
            Self::Standard => 1.0,
            Self::Medium => 1.5,
            Self::High => 3.0,
            Self::Ultra => 6.0,
        }
    }

    /// Maps a numeric factor back to a scale, if it is one of the accepted values.
    pub fn from_factor(factor: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.factor() == factor)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.factor())
    }
}

impl FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("default") {
            return Ok(Self::Standard);
        }
        let factor: f64 = trimmed
            .parse()
            .map_err(|_| format!("invalid scale '{trimmed}' (expected 1, 1.5, 3 or 6)"))?;
        Self::from_factor(factor)
            .ok_or_else(|| format!("unsupported scale {trimmed} (expected 1, 1.5, 3 or 6)"))
    }
}

impl Serialize for Scale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.factor())
    }
}

impl<'de> Deserialize<'de> for Scale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Self::from_factor(n).ok_or_else(|| {
                serde::de::Error::custom(format!("unsupported scale {n} (expected 1, 1.5, 3 or 6)"))
            }),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
