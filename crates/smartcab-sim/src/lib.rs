//! Smartcab Sim - Reference world for the learning agent
//!
//! A small headless grid city with traffic lights and scripted traffic.
//! It implements the core's [`Environment`](smartcab_core::Environment) and
//! [`RouteOracle`](smartcab_core::RouteOracle) ports and runs training trials.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod planner;
pub mod simulator;
pub mod world;

pub use config::SimulationConfig;
pub use planner::RoutePlanner;
pub use simulator::{Simulator, TrainingReport, TrialReport};
pub use world::{is_legal, Compass, Position, TrafficLight, TrialStatus, World};
