//! Discrete state keys and the encoder that produces them

use serde::{Deserialize, Serialize};

use smartcab_core::{Action, Heading, Light, RawSensed, Sensed};

/// Discretized traffic context used to index the value table
///
/// Five fields, each from a small closed domain. [`StateKey::index`] is a
/// bijection onto `0..StateKey::CARDINALITY`, so equal keys always share a
/// row and distinct keys never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey {
    /// Heading suggested by the route oracle
    pub waypoint: Heading,
    pub light: Light,
    pub oncoming: Heading,
    pub left: Heading,
    pub right: Heading,
}

impl StateKey {
    /// Number of distinct keys
    pub const CARDINALITY: usize =
        Heading::COUNT * Light::COUNT * Heading::COUNT * Heading::COUNT * Heading::COUNT;

    pub fn new(waypoint: Heading, sensed: Sensed) -> Self {
        Self {
            waypoint,
            light: sensed.light,
            oncoming: sensed.oncoming,
            left: sensed.left,
            right: sensed.right,
        }
    }

    /// Dense row index, mixed radix over the field domains
    pub fn index(&self) -> usize {
        let mut index = self.waypoint.index();
        index = index * Light::COUNT + self.light.index();
        index = index * Heading::COUNT + self.oncoming.index();
        index = index * Heading::COUNT + self.left.index();
        index * Heading::COUNT + self.right.index()
    }

    /// Inverse of [`StateKey::index`]
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= Self::CARDINALITY {
            return None;
        }

        let mut rest = index;
        let right = Heading::from_index(rest % Heading::COUNT)?;
        rest /= Heading::COUNT;
        let left = Heading::from_index(rest % Heading::COUNT)?;
        rest /= Heading::COUNT;
        let oncoming = Heading::from_index(rest % Heading::COUNT)?;
        rest /= Heading::COUNT;
        let light = Light::from_index(rest % Light::COUNT)?;
        rest /= Light::COUNT;
        let waypoint = Heading::from_index(rest)?;

        Some(Self {
            waypoint,
            light,
            oncoming,
            left,
            right,
        })
    }

    /// Every key in index order
    pub fn all() -> impl Iterator<Item = StateKey> {
        (0..Self::CARDINALITY).filter_map(Self::from_index)
    }

    /// The action the route oracle recommends in this state
    pub fn suggested_action(&self) -> Action {
        self.waypoint
    }

    pub fn sensed(&self) -> Sensed {
        Sensed::new(self.light, self.oncoming, self.left, self.right)
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}",
            self.waypoint, self.light, self.oncoming, self.left, self.right
        )
    }
}

/// Encode the oracle's suggestion and the sensed bundle into a state key
pub fn encode(waypoint: Heading, sensed: &Sensed) -> StateKey {
    StateKey::new(waypoint, *sensed)
}

/// Encode loosely typed readings. Unknown or missing values fall back to
/// their field's default instead of failing.
pub fn encode_raw(waypoint: Option<&str>, raw: &RawSensed) -> StateKey {
    encode(Heading::lenient(waypoint), &Sensed::from(raw))
}
