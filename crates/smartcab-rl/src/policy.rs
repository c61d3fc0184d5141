//! Action selection strategies

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use smartcab_core::{Action, Result};

use crate::q_table::ValueTable;
use crate::state::StateKey;

/// Trait for action selection over a value table
pub trait Policy: Send {
    /// Policy name
    fn name(&self) -> &str;

    /// Choose an action for `state`
    fn select(
        &mut self,
        table: &ValueTable,
        state: &StateKey,
        valid_actions: &[Action],
    ) -> Result<Action>;

    /// Called when a new trial begins
    fn begin_trial(&mut self) {}
}

/// Pure exploitation: always the table's best action
///
/// Ignores `valid_actions`; the table already covers every action.
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl Policy for Greedy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn select(
        &mut self,
        table: &ValueTable,
        state: &StateKey,
        _valid_actions: &[Action],
    ) -> Result<Action> {
        table.best_action(state).map(|(action, _)| action)
    }
}

/// Greedy with probability `1 - epsilon`, otherwise a uniformly random valid action
///
/// Epsilon decays multiplicatively at the start of every trial after the
/// first and never drops below `epsilon_min`.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    epsilon: f64,
    decay: f64,
    epsilon_min: f64,
    trials: u64,
    rng: StdRng,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f64, decay: f64, epsilon_min: f64, seed: u64) -> Self {
        Self {
            epsilon: epsilon.clamp(0.0, 1.0),
            decay,
            epsilon_min: epsilon_min.clamp(0.0, 1.0),
            trials: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Policy for EpsilonGreedy {
    fn name(&self) -> &str {
        "epsilon_greedy"
    }

    fn select(
        &mut self,
        table: &ValueTable,
        state: &StateKey,
        valid_actions: &[Action],
    ) -> Result<Action> {
        if self.rng.gen::<f64>() < self.epsilon {
            if let Some(&action) = valid_actions.choose(&mut self.rng) {
                return Ok(action);
            }
        }
        Greedy.select(table, state, valid_actions)
    }

    fn begin_trial(&mut self) {
        if self.trials > 0 {
            self.epsilon = (self.epsilon * self.decay).max(self.epsilon_min);
        }
        self.trials += 1;
    }
}
