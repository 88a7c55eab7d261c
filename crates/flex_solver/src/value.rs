//! Tagged style lengths and their resolution against an owner size.

use anyhow::{Context as _, Error, bail};
use core::fmt;
use core::str::FromStr;
use serde::Deserialize;

/// Tolerance used when comparing lengths and layout results.
pub const EPSILON: f64 = 0.0001;

/// Unit tag of a [`Value`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Unit {
    /// No value was provided.
    #[default]
    Undefined,
    /// Absolute layout units.
    Point,
    /// Percentage of the owner's size along the relevant axis.
    Percent,
    /// Size left to the algorithm.
    Auto,
}

/// A style length: a unit tag plus a numeric payload.
///
/// The payload is meaningless for `Undefined` and `Auto`; equality ignores it for those units.
#[derive(Copy, Clone, Debug, Default, Deserialize)]
#[serde(try_from = "LengthRepr")]
pub struct Value {
    /// Unit tag.
    pub unit: Unit,
    /// Numeric payload for `Point` and `Percent`.
    pub value: f64,
}

impl Value {
    /// The undefined length.
    pub const UNDEFINED: Self = Self {
        unit: Unit::Undefined,
        value: 0.0,
    };
    /// The `auto` keyword.
    pub const AUTO: Self = Self {
        unit: Unit::Auto,
        value: 0.0,
    };
    /// Zero points.
    pub const ZERO: Self = Self {
        unit: Unit::Point,
        value: 0.0,
    };

    /// A length in points. Non-finite input collapses to undefined.
    #[inline]
    pub const fn points(value: f64) -> Self {
        if value.is_finite() {
            Self {
                unit: Unit::Point,
                value,
            }
        } else {
            Self::UNDEFINED
        }
    }

    /// A percentage of the owner size. Non-finite input collapses to undefined.
    #[inline]
    pub const fn percent(value: f64) -> Self {
        if value.is_finite() {
            Self {
                unit: Unit::Percent,
                value,
            }
        } else {
            Self::UNDEFINED
        }
    }

    #[inline]
    pub fn is_undefined(self) -> bool {
        self.unit == Unit::Undefined
    }

    #[inline]
    pub fn is_auto(self) -> bool {
        self.unit == Unit::Auto
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.unit != other.unit {
            return false;
        }
        match self.unit {
            Unit::Undefined | Unit::Auto => true,
            Unit::Point | Unit::Percent => (self.value - other.value).abs() < EPSILON,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Unit::Undefined => formatter.write_str("undefined"),
            Unit::Auto => formatter.write_str("auto"),
            Unit::Point => write!(formatter, "{}", self.value),
            Unit::Percent => write!(formatter, "{}%", self.value),
        }
    }
}

impl FromStr for Value {
    type Err = Error;

    /// Parses `auto`, `undefined`, `10`, `10px` and `50%`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        match trimmed {
            "auto" => return Ok(Self::AUTO),
            "undefined" | "" => return Ok(Self::UNDEFINED),
            _ => {}
        }
        if let Some(number) = trimmed.strip_suffix('%') {
            let parsed = parse_number(number).with_context(|| format!("invalid percentage `{text}`"))?;
            return Ok(Self::percent(parsed));
        }
        let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
        let parsed = parse_number(number).with_context(|| format!("invalid length `{text}`"))?;
        Ok(Self::points(parsed))
    }
}

/// Parse a finite float, rejecting NaN and infinities.
fn parse_number(text: &str) -> anyhow::Result<f64> {
    let parsed: f64 = text.trim().parse()?;
    if !parsed.is_finite() {
        bail!("length must be finite, got {parsed}");
    }
    Ok(parsed)
}

/// Serialized form of a length: either a bare number of points or a keyword string.
#[derive(Deserialize)]
#[serde(untagged)]
enum LengthRepr {
    /// Points.
    Number(f64),
    /// Text accepted by [`Value::from_str`].
    Text(String),
}

impl TryFrom<LengthRepr> for Value {
    type Error = Error;

    fn try_from(repr: LengthRepr) -> Result<Self, Self::Error> {
        match repr {
            LengthRepr::Number(number) => Ok(Self::points(number)),
            LengthRepr::Text(text) => text.parse(),
        }
    }
}

/// Resolve a length against the owner's size on the same axis.
///
/// Percentages never resolve against an unknown basis.
#[inline]
pub fn resolve_value(value: Value, owner_size: Option<f64>) -> Option<f64> {
    match value.unit {
        Unit::Undefined | Unit::Auto => None,
        Unit::Point => Some(value.value),
        Unit::Percent => owner_size.map(|size| value.value * size / 100.0),
    }
}

/// Like [`resolve_value`], except `auto` margins contribute zero to sizing.
#[inline]
pub fn resolve_value_margin(value: Value, owner_size: Option<f64>) -> Option<f64> {
    if value.is_auto() {
        Some(0.0)
    } else {
        resolve_value(value, owner_size)
    }
}

/// Compare two optional floats, treating two undefined values as equal.
#[inline]
pub fn floats_equal(left: Option<f64>, right: Option<f64>) -> bool {
    match (left, right) {
        (Some(lhs), Some(rhs)) => (lhs - rhs).abs() < EPSILON,
        (None, None) => true,
        _ => false,
    }
}
