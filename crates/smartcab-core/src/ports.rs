//! Ports the learning agent is driven through
//!
//! A world implements [`Environment`]; whatever knows the route implements
//! [`RouteOracle`]. The agent only ever sees these two traits.

use crate::error::Result;
use crate::types::{Action, Heading, Sensed};

/// The world as seen by the cab for one decision step
pub trait Environment {
    /// Actions the cab may take, in canonical order
    fn valid_actions(&self) -> &[Action];

    /// Steps remaining before the current trial's deadline
    fn deadline(&self) -> i32;

    /// Read the cab's intersection
    fn sense(&self) -> Sensed;

    /// Execute an action and return its reward
    fn act(&mut self, action: Action) -> Result<f64>;
}

/// Source of the next suggested heading toward the destination
pub trait RouteOracle {
    fn next_waypoint(&self) -> Heading;
}

impl<T: RouteOracle + ?Sized> RouteOracle for &T {
    fn next_waypoint(&self) -> Heading {
        (**self).next_waypoint()
    }
}

impl RouteOracle for Heading {
    /// A fixed suggestion, handy for scripted drivers
    fn next_waypoint(&self) -> Heading {
        *self
    }
}
