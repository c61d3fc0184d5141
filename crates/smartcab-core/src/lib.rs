//! Smartcab Core - Domain types, ports, and shared functionality
//!
//! This crate provides the vocabulary shared by the learning agent and
//! any world that drives it: headings, light colours, the sensed bundle,
//! and the traits an environment and a route oracle must implement.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod ports;
pub mod types;

pub use error::{Result, SmartcabError};
pub use ports::{Environment, RouteOracle};
pub use types::{Action, Heading, Light, RawSensed, Sensed};
