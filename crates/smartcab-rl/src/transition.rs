//! The pending (state, action, reward) triple awaiting its update

use serde::{Deserialize, Serialize};

use smartcab_core::Action;

use crate::state::StateKey;

/// A step whose reward is known but whose successor state is not yet
///
/// The agent holds at most one of these. It is consumed by the update on
/// the following step, once the next state has been encoded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: StateKey,
    pub action: Action,
    pub reward: f64,
}

impl Transition {
    pub fn new(state: StateKey, action: Action, reward: f64) -> Self {
        Self {
            state,
            action,
            reward,
        }
    }
}
