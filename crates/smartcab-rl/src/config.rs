//! Agent configuration

use serde::{Deserialize, Serialize};
use tracing::warn;

use smartcab_core::{Result, SmartcabError};

use crate::learner::LearningParams;
use crate::policy::{EpsilonGreedy, Greedy, Policy};

/// Which action selection strategy the agent uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    Greedy,
    EpsilonGreedy,
}

/// Settings for one learning agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub alpha: f64,
    pub gamma: f64,
    pub initial_bias: f64,
    pub policy: PolicyKind,
    /// Exploration rate, only read by `epsilon_greedy`
    pub epsilon: f64,
    pub epsilon_decay: f64,
    pub epsilon_min: f64,
    pub seed: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let params = LearningParams::default();
        Self {
            alpha: params.alpha,
            gamma: params.gamma,
            initial_bias: params.initial_bias,
            policy: PolicyKind::Greedy,
            epsilon: 0.1,
            epsilon_decay: 0.99,
            epsilon_min: 0.01,
            seed: 0,
        }
    }
}

impl AgentConfig {
    pub fn params(&self) -> Result<LearningParams> {
        LearningParams::new(self.alpha, self.gamma, self.initial_bias)
    }

    pub fn validate(&self) -> Result<()> {
        self.params()?;
        if self.policy == PolicyKind::EpsilonGreedy {
            if !(0.0..=1.0).contains(&self.epsilon) {
                return Err(SmartcabError::Config(format!(
                    "epsilon must be in [0, 1], got {}",
                    self.epsilon
                )));
            }
            if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
                return Err(SmartcabError::Config(format!(
                    "epsilon_decay must be in (0, 1], got {}",
                    self.epsilon_decay
                )));
            }
        }
        Ok(())
    }

    pub fn build_policy(&self) -> Box<dyn Policy> {
        match self.policy {
            PolicyKind::Greedy => Box::new(Greedy),
            PolicyKind::EpsilonGreedy => {
                if self.epsilon_min > self.epsilon {
                    warn!(
                        epsilon = self.epsilon,
                        epsilon_min = self.epsilon_min,
                        "epsilon_min exceeds epsilon, exploration will not decay"
                    );
                }
                Box::new(EpsilonGreedy::new(
                    self.epsilon,
                    self.epsilon_decay,
                    self.epsilon_min,
                    self.seed,
                ))
            }
        }
    }
}
