//! Smartcab RL - Tabular Q-learning for the driving agent
//!
//! The agent discretizes what it senses into a [`StateKey`], keeps one
//! value per (state, action) in a [`ValueTable`], picks actions through a
//! [`Policy`], and applies a one-step temporal-difference update that is
//! deferred until the next state has been observed.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod config;
pub mod learner;
pub mod policy;
pub mod q_table;
pub mod state;
pub mod transition;

pub use agent::{AgentStats, LearningAgent, StepOutcome};
pub use config::{AgentConfig, PolicyKind};
pub use learner::{LearningParams, QLearner, TdUpdate};
pub use policy::{EpsilonGreedy, Greedy, Policy};
pub use q_table::ValueTable;
pub use state::{encode, encode_raw, StateKey};
pub use transition::Transition;
