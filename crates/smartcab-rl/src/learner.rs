//! Temporal-difference learner

use serde::{Deserialize, Serialize};
use tracing::debug;

use smartcab_core::{Action, Result, SmartcabError};

use crate::q_table::ValueTable;
use crate::state::StateKey;
use crate::transition::Transition;

/// Constants fixed for one training run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningParams {
    /// Learning rate, in (0, 1]
    pub alpha: f64,
    /// Discount factor, in [0, 1]
    pub gamma: f64,
    /// Starting value of each state's suggested action
    pub initial_bias: f64,
}

impl LearningParams {
    pub fn new(alpha: f64, gamma: f64, initial_bias: f64) -> Result<Self> {
        let params = Self {
            alpha,
            gamma,
            initial_bias,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the rates and require a strictly positive, finite bias
    pub fn validate(&self) -> Result<()> {
        self.validate_rates()?;
        if !(self.initial_bias.is_finite() && self.initial_bias > 0.0) {
            return Err(SmartcabError::Config(format!(
                "initial_bias must be positive and finite, got {}",
                self.initial_bias
            )));
        }
        Ok(())
    }

    /// Check `alpha` and `gamma` only
    pub fn validate_rates(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(SmartcabError::Config(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(SmartcabError::Config(format!(
                "gamma must be in [0, 1], got {}",
                self.gamma
            )));
        }
        Ok(())
    }
}

impl Default for LearningParams {
    fn default() -> Self {
        Self {
            alpha: 0.8,
            gamma: 0.1,
            initial_bias: 3.5,
        }
    }
}

/// Record of one applied update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TdUpdate {
    pub state: StateKey,
    pub action: Action,
    pub reward: f64,
    /// Value of the updated entry before the update
    pub previous: f64,
    /// Best value of the successor state
    pub max_next: f64,
    /// `reward + gamma * max_next`
    pub target: f64,
    /// Value of the updated entry after the update
    pub value: f64,
}

/// Owns the value table and applies the one-step Q-learning rule
#[derive(Debug, Clone)]
pub struct QLearner {
    table: ValueTable,
    params: LearningParams,
    updates: u64,
}

impl QLearner {
    pub fn new(params: LearningParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            table: ValueTable::new(params.initial_bias),
            params,
            updates: 0,
        })
    }

    /// Learn on a prepared table
    ///
    /// Only the rates are validated; the table's own bias is taken as is, so
    /// degenerate starts such as an all-zero table can be studied.
    pub fn with_table(params: LearningParams, table: ValueTable) -> Result<Self> {
        params.validate_rates()?;
        Ok(Self {
            params: LearningParams {
                initial_bias: table.initial_bias(),
                ..params
            },
            table,
            updates: 0,
        })
    }

    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    pub fn params(&self) -> &LearningParams {
        &self.params
    }

    /// Number of updates applied so far
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Credit `transition` using the state that followed it
    ///
    /// `Q(s, a) <- (1 - alpha) * Q(s, a) + alpha * (r + gamma * max_a' Q(s', a'))`
    pub fn update(&mut self, transition: &Transition, next_state: &StateKey) -> Result<TdUpdate> {
        let max_next = self.table.max_value(next_state)?;
        let target = transition.reward + self.params.gamma * max_next;
        let previous = self.table.get(&transition.state, transition.action)?;
        let value = (1.0 - self.params.alpha) * previous + self.params.alpha * target;

        self.table.set(&transition.state, transition.action, value)?;
        self.updates += 1;

        debug!(
            state = %transition.state,
            action = %transition.action,
            reward = transition.reward,
            previous,
            target,
            value,
            "Q update"
        );

        Ok(TdUpdate {
            state: transition.state,
            action: transition.action,
            reward: transition.reward,
            previous,
            max_next,
            target,
            value,
        })
    }
}
