//! Route planner suggesting the next heading toward a destination

use serde::Serialize;

use smartcab_core::{Heading, RouteOracle};

use crate::world::{Compass, Position};

/// Greedy planner: close the east-west gap first, then north-south
///
/// Holds a snapshot of the cab's pose; the world refreshes it with
/// [`RoutePlanner::track`] after every move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoutePlanner {
    position: Position,
    heading: Compass,
    destination: Option<Position>,
}

impl RoutePlanner {
    pub fn new(position: Position, heading: Compass) -> Self {
        Self {
            position,
            heading,
            destination: None,
        }
    }

    pub fn route_to(&mut self, destination: Position) {
        self.destination = Some(destination);
    }

    pub fn track(&mut self, position: Position, heading: Compass) {
        self.position = position;
        self.heading = heading;
    }

    pub fn destination(&self) -> Option<Position> {
        self.destination
    }
}

impl RouteOracle for RoutePlanner {
    fn next_waypoint(&self) -> Heading {
        let Some(destination) = self.destination else {
            return Heading::None;
        };
        if destination == self.position {
            return Heading::None;
        }

        let dx = destination.x - self.position.x;
        let dy = destination.y - self.position.y;
        let (hx, hy) = self.heading.delta();

        if dx != 0 {
            if dx * hx > 0 {
                Heading::Forward
            } else if dx * hx < 0 {
                Heading::Right
            } else if dx * hy > 0 {
                Heading::Left
            } else {
                Heading::Right
            }
        } else if dy * hy > 0 {
            Heading::Forward
        } else if dy * hy < 0 {
            Heading::Right
        } else if dy * hx > 0 {
            Heading::Right
        } else {
            Heading::Left
        }
    }
}
