//! Grid city: intersections, traffic lights, scripted traffic, and the cab

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::trace;

use smartcab_core::{
    Action, Environment, Heading, Light, Result, RouteOracle, Sensed, SmartcabError,
};

use crate::config::{SimulationConfig, DEADLINE_PER_DISTANCE, MIN_TRIP_DISTANCE};
use crate::planner::RoutePlanner;

/// Index of the learning cab in the car list
const CAB: usize = 0;

/// Headings scripted cars pick from
const TRAFFIC_HEADINGS: [Heading; 3] = [Heading::Forward, Heading::Left, Heading::Right];

/// Reward for a legal move that follows the planner
pub const REWARD_ON_ROUTE: f64 = 2.0;
/// Reward for a legal move that ignores the planner
pub const REWARD_OFF_ROUTE: f64 = -0.5;
/// Reward for waiting
pub const REWARD_WAIT: f64 = 0.0;
/// Reward for breaking a traffic rule
pub const REWARD_ILLEGAL: f64 = -1.0;
/// Bonus for arriving before the deadline
pub const REWARD_ARRIVAL: f64 = 10.0;

/// Intersection coordinates, `y` grows southwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance
    pub fn distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Absolute direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compass {
    North,
    East,
    South,
    West,
}

impl Compass {
    pub const ALL: [Compass; 4] = [Compass::North, Compass::East, Compass::South, Compass::West];

    /// Unit step `(dx, dy)`
    pub fn delta(self) -> (i32, i32) {
        match self {
            Compass::North => (0, -1),
            Compass::East => (1, 0),
            Compass::South => (0, 1),
            Compass::West => (-1, 0),
        }
    }

    pub fn left(self) -> Compass {
        match self {
            Compass::North => Compass::West,
            Compass::West => Compass::South,
            Compass::South => Compass::East,
            Compass::East => Compass::North,
        }
    }

    pub fn right(self) -> Compass {
        match self {
            Compass::North => Compass::East,
            Compass::East => Compass::South,
            Compass::South => Compass::West,
            Compass::West => Compass::North,
        }
    }

    pub fn reverse(self) -> Compass {
        self.left().left()
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Compass::North | Compass::South)
    }

    /// Direction after taking a relative heading
    pub fn turn(self, heading: Heading) -> Compass {
        match heading {
            Heading::None | Heading::Forward => self,
            Heading::Left => self.left(),
            Heading::Right => self.right(),
        }
    }
}

/// Two-phase signal: either the north-south or the east-west road is open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficLight {
    north_south_open: bool,
    period: u64,
    last_updated: u64,
}

impl TrafficLight {
    pub fn new(north_south_open: bool, period: u64) -> Self {
        Self {
            north_south_open,
            period,
            last_updated: 0,
        }
    }

    pub fn reset(&mut self) {
        self.last_updated = 0;
    }

    /// Flip once `period` steps have passed since the last change
    pub fn update(&mut self, t: u64) {
        if t.saturating_sub(self.last_updated) >= self.period {
            self.north_south_open = !self.north_south_open;
            self.last_updated = t;
        }
    }

    pub fn light_for(&self, heading: Compass) -> Light {
        if self.north_south_open == heading.is_vertical() {
            Light::Green
        } else {
            Light::Red
        }
    }
}

/// Whether `action` obeys the traffic rules at an intersection
pub fn is_legal(action: Action, sensed: &Sensed) -> bool {
    let green = sensed.light == Light::Green;
    match action {
        Heading::None => true,
        Heading::Forward => green,
        Heading::Left => {
            green && matches!(sensed.oncoming, Heading::None | Heading::Left)
        }
        Heading::Right => green || sensed.left != Heading::Forward,
    }
}

/// How the current trial stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStatus {
    Running,
    Reached,
    DeadlineExpired,
    Abandoned,
}

impl TrialStatus {
    pub fn is_finished(self) -> bool {
        self != TrialStatus::Running
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Car {
    position: Position,
    heading: Compass,
    /// Next intended heading, visible to other cars
    waypoint: Heading,
}

/// The city the cab learns to drive in
pub struct World {
    width: i32,
    height: i32,
    lights: Vec<TrafficLight>,
    cars: Vec<Car>,
    planner: RoutePlanner,
    start: Position,
    destination: Position,
    deadline: i32,
    enforce_deadline: bool,
    hard_time_limit: i32,
    t: u64,
    status: TrialStatus,
    rng: StdRng,
}

impl World {
    /// Build the city and place the cab for a first trial
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let lights = (0..config.width * config.height)
            .map(|_| TrafficLight::new(rng.gen_bool(0.5), rng.gen_range(3..=5)))
            .collect();

        let origin = Position::new(1, 1);
        let idle = Car {
            position: origin,
            heading: Compass::East,
            waypoint: Heading::None,
        };

        let mut world = Self {
            width: config.width,
            height: config.height,
            lights,
            cars: vec![idle; config.dummy_agents + 1],
            planner: RoutePlanner::new(origin, Compass::East),
            start: origin,
            destination: origin,
            deadline: 0,
            enforce_deadline: config.enforce_deadline,
            hard_time_limit: config.hard_time_limit,
            t: 0,
            status: TrialStatus::Running,
            rng,
        };
        world.reset();
        Ok(world)
    }

    /// Start a new trial: new trip, fresh deadline, traffic re-scattered
    pub fn reset(&mut self) {
        let (start, destination) = loop {
            let start = self.random_position();
            let destination = self.random_position();
            if start.distance(&destination) >= MIN_TRIP_DISTANCE {
                break (start, destination);
            }
        };
        let heading = self.random_compass();

        self.start = start;
        self.destination = destination;
        self.deadline = start.distance(&destination) * DEADLINE_PER_DISTANCE;
        self.t = 0;
        self.status = TrialStatus::Running;
        for light in &mut self.lights {
            light.reset();
        }

        self.planner.route_to(destination);
        self.planner.track(start, heading);
        self.cars[CAB] = Car {
            position: start,
            heading,
            waypoint: self.planner.next_waypoint(),
        };

        for i in 1..self.cars.len() {
            let car = Car {
                position: self.random_position(),
                heading: self.random_compass(),
                waypoint: self.random_traffic_heading(),
            };
            self.cars[i] = car;
        }

        trace!(?start, ?destination, deadline = self.deadline, "World reset");
    }

    /// Advance signals and scripted traffic ahead of the cab's move
    pub fn tick(&mut self) {
        for light in &mut self.lights {
            light.update(self.t);
        }

        for i in 1..self.cars.len() {
            let mut car = self.cars[i];
            car.waypoint = self.random_traffic_heading();
            self.cars[i] = car;

            let sensed = self.sense_for(i);
            if is_legal(car.waypoint, &sensed) {
                car.heading = car.heading.turn(car.waypoint);
                car.position = self.advance(car.position, car.heading);
            }
            self.cars[i] = car;
        }
    }

    pub fn status(&self) -> TrialStatus {
        self.status
    }

    /// Snapshot of the cab's route planner
    pub fn planner(&self) -> RoutePlanner {
        self.planner
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn destination(&self) -> Position {
        self.destination
    }

    pub fn cab_position(&self) -> Position {
        self.cars[CAB].position
    }

    pub fn cab_heading(&self) -> Compass {
        self.cars[CAB].heading
    }

    /// Steps taken in the current trial
    pub fn time(&self) -> u64 {
        self.t
    }

    /// Place the cab explicitly, keeping the current destination
    pub fn place_cab(&mut self, position: Position, heading: Compass) {
        self.planner.track(position, heading);
        self.cars[CAB] = Car {
            position,
            heading,
            waypoint: self.planner.next_waypoint(),
        };
    }

    /// Place a scripted car explicitly. Returns false if there is no such car.
    pub fn place_traffic(
        &mut self,
        index: usize,
        position: Position,
        heading: Compass,
        waypoint: Heading,
    ) -> bool {
        match self.cars.get_mut(index + 1) {
            Some(car) => {
                *car = Car {
                    position,
                    heading,
                    waypoint,
                };
                true
            }
            None => false,
        }
    }

    /// Light colour the cab would see from `position` facing `heading`
    pub fn light_at(&self, position: Position, heading: Compass) -> Light {
        self.lights
            .get(self.light_index(position))
            .map_or(Light::Red, |light| light.light_for(heading))
    }

    fn light_index(&self, position: Position) -> usize {
        ((position.y - 1) * self.width + (position.x - 1)) as usize
    }

    /// One block along `heading`, wrapping at the edges
    fn advance(&self, position: Position, heading: Compass) -> Position {
        let (dx, dy) = heading.delta();
        Position::new(
            (position.x - 1 + dx).rem_euclid(self.width) + 1,
            (position.y - 1 + dy).rem_euclid(self.height) + 1,
        )
    }

    /// What car `index` perceives at its intersection
    fn sense_for(&self, index: usize) -> Sensed {
        let me = self.cars[index];
        let mut sensed = Sensed::clear(self.light_at(me.position, me.heading));

        for (j, other) in self.cars.iter().enumerate() {
            if j == index || other.position != me.position || other.heading == me.heading {
                continue;
            }
            if other.heading == me.heading.reverse() {
                if sensed.oncoming != Heading::Left {
                    sensed.oncoming = other.waypoint;
                }
            } else if other.heading == me.heading.left() {
                if sensed.right != Heading::Forward && sensed.right != Heading::Left {
                    sensed.right = other.waypoint;
                }
            } else if sensed.left != Heading::Forward {
                sensed.left = other.waypoint;
            }
        }
        sensed
    }

    fn random_position(&mut self) -> Position {
        Position::new(
            self.rng.gen_range(1..=self.width),
            self.rng.gen_range(1..=self.height),
        )
    }

    fn random_compass(&mut self) -> Compass {
        Compass::ALL[self.rng.gen_range(0..Compass::ALL.len())]
    }

    fn random_traffic_heading(&mut self) -> Heading {
        TRAFFIC_HEADINGS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Heading::Forward)
    }
}

impl Environment for World {
    fn valid_actions(&self) -> &[Action] {
        &Heading::ALL
    }

    fn deadline(&self) -> i32 {
        self.deadline
    }

    fn sense(&self) -> Sensed {
        self.sense_for(CAB)
    }

    fn act(&mut self, action: Action) -> Result<f64> {
        if self.status.is_finished() {
            return Err(SmartcabError::Environment(format!(
                "trial already finished ({:?})",
                self.status
            )));
        }

        let sensed = self.sense_for(CAB);
        let waypoint = self.planner.next_waypoint();
        let mut cab = self.cars[CAB];

        let mut reward = if !is_legal(action, &sensed) {
            REWARD_ILLEGAL
        } else if action.is_none() {
            REWARD_WAIT
        } else {
            cab.heading = cab.heading.turn(action);
            cab.position = self.advance(cab.position, cab.heading);
            if action == waypoint {
                REWARD_ON_ROUTE
            } else {
                REWARD_OFF_ROUTE
            }
        };

        self.planner.track(cab.position, cab.heading);
        cab.waypoint = self.planner.next_waypoint();
        self.cars[CAB] = cab;

        if cab.position == self.destination {
            if self.deadline >= 0 {
                reward += REWARD_ARRIVAL;
            }
            self.status = TrialStatus::Reached;
        }

        self.deadline -= 1;
        self.t += 1;

        if !self.status.is_finished() {
            if self.enforce_deadline && self.deadline <= 0 {
                self.status = TrialStatus::DeadlineExpired;
            } else if self.deadline <= -self.hard_time_limit {
                self.status = TrialStatus::Abandoned;
            }
        }

        trace!(
            action = %action,
            reward,
            position = ?cab.position,
            status = ?self.status,
            "Cab moved"
        );
        Ok(reward)
    }
}
