//! Headings, light colours, and the sensed traffic bundle

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SmartcabError;

/// A relative driving direction
///
/// Used for the route planner's suggestion, for the intentions of other
/// cars at an intersection, and for the cab's own actions. `None` means
/// "no heading": no suggestion, no car present, or wait in place.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    #[default]
    None,
    Forward,
    Left,
    Right,
}

/// An action is the heading the cab commits to for one step.
/// `Heading::None` waits at the intersection.
pub type Action = Heading;

impl Heading {
    /// Every heading in canonical order. Table columns and tie-breaks
    /// follow this order.
    pub const ALL: [Heading; 4] = [
        Heading::None,
        Heading::Forward,
        Heading::Left,
        Heading::Right,
    ];

    /// Number of headings in the domain
    pub const COUNT: usize = Self::ALL.len();

    /// Position in canonical order
    pub fn index(self) -> usize {
        match self {
            Heading::None => 0,
            Heading::Forward => 1,
            Heading::Left => 2,
            Heading::Right => 3,
        }
    }

    /// Heading at a canonical position
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Parse a raw reading, mapping anything unrecognised or missing to `None`
    pub fn lenient(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or(Heading::None)
    }

    pub fn is_none(self) -> bool {
        self == Heading::None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Heading::None => "none",
            Heading::Forward => "forward",
            Heading::Left => "left",
            Heading::Right => "right",
        }
    }
}

impl std::fmt::Display for Heading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Heading {
    type Err = SmartcabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Heading::None),
            "forward" => Ok(Heading::Forward),
            "left" => Ok(Heading::Left),
            "right" => Ok(Heading::Right),
            _ => Err(SmartcabError::domain("heading", s)),
        }
    }
}

/// Traffic light colour as seen by the cab
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Light {
    Green,
    #[default]
    Red,
}

impl Light {
    pub const ALL: [Light; 2] = [Light::Green, Light::Red];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        match self {
            Light::Green => 0,
            Light::Red => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Parse a raw reading. Unknown or missing colours read as red.
    pub fn lenient(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or(Light::Red)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Light::Green => "green",
            Light::Red => "red",
        }
    }
}

impl std::fmt::Display for Light {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Light {
    type Err = SmartcabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "green" => Ok(Light::Green),
            "red" => Ok(Light::Red),
            _ => Err(SmartcabError::domain("light", s)),
        }
    }
}

/// What the cab perceives at its current intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Sensed {
    pub light: Light,
    /// Intended heading of a car approaching head-on
    pub oncoming: Heading,
    /// Intended heading of a car approaching from the left
    pub left: Heading,
    /// Intended heading of a car approaching from the right
    pub right: Heading,
}

impl Sensed {
    pub fn new(light: Light, oncoming: Heading, left: Heading, right: Heading) -> Self {
        Self {
            light,
            oncoming,
            left,
            right,
        }
    }

    /// Empty intersection under the given light
    pub fn clear(light: Light) -> Self {
        Self::new(light, Heading::None, Heading::None, Heading::None)
    }
}

/// Loosely typed sensor readings, e.g. from a JSON feed or a scripting bridge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSensed {
    pub light: Option<String>,
    pub oncoming: Option<String>,
    pub left: Option<String>,
    pub right: Option<String>,
}

impl From<&RawSensed> for Sensed {
    fn from(raw: &RawSensed) -> Self {
        Sensed {
            light: Light::lenient(raw.light.as_deref()),
            oncoming: Heading::lenient(raw.oncoming.as_deref()),
            left: Heading::lenient(raw.left.as_deref()),
            right: Heading::lenient(raw.right.as_deref()),
        }
    }
}
