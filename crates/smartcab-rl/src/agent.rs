//! Learning agent - coordinates encoding, learning, and action selection

use serde::Serialize;
use tracing::debug;

use smartcab_core::{Action, Environment, Result, RouteOracle};

use crate::config::AgentConfig;
use crate::learner::{LearningParams, QLearner, TdUpdate};
use crate::policy::{Greedy, Policy};
use crate::q_table::ValueTable;
use crate::state::{encode, StateKey};
use crate::transition::Transition;

/// What happened during one call to [`LearningAgent::step`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepOutcome {
    pub deadline: i32,
    pub state: StateKey,
    pub action: Action,
    pub reward: f64,
    /// Update applied to the previous transition, if there was one
    pub update: Option<TdUpdate>,
}

/// Agent statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStats {
    pub trials: u64,
    pub steps: u64,
    pub updates: u64,
    pub net_reward: f64,
    pub average_reward: f64,
    pub policy: String,
}

/// Q-learning cab
///
/// Owns its learner (and through it the value table) plus the single
/// pending transition. Neither is reset between trials.
pub struct LearningAgent {
    learner: QLearner,
    policy: Box<dyn Policy>,
    pending: Option<Transition>,
    trials: u64,
    steps: u64,
    net_reward: f64,
}

impl LearningAgent {
    /// Create a greedy agent
    pub fn new(params: LearningParams) -> Result<Self> {
        Self::with_policy(params, Box::new(Greedy))
    }

    pub fn with_policy(params: LearningParams, policy: Box<dyn Policy>) -> Result<Self> {
        Ok(Self::with_learner(QLearner::new(params)?, policy))
    }

    /// Wrap an already built learner, e.g. one on a prepared table
    pub fn with_learner(learner: QLearner, policy: Box<dyn Policy>) -> Self {
        Self {
            learner,
            policy,
            pending: None,
            trials: 0,
            steps: 0,
            net_reward: 0.0,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        config.validate()?;
        Self::with_policy(config.params()?, config.build_policy())
    }

    /// Mark the start of a new trial
    ///
    /// The value table and the pending transition carry over, so the last
    /// step of the previous trial is credited against the first state of
    /// this one.
    pub fn begin_trial(&mut self) {
        self.trials += 1;
        self.policy.begin_trial();
    }

    /// Run one decision step against the world
    pub fn step<E, O>(&mut self, env: &mut E, oracle: &O) -> Result<StepOutcome>
    where
        E: Environment + ?Sized,
        O: RouteOracle + ?Sized,
    {
        let waypoint = oracle.next_waypoint();
        let deadline = env.deadline();
        let sensed = env.sense();
        let state = encode(waypoint, &sensed);

        let update = self.learn(&state)?;
        let action = self.choose(&state, env.valid_actions())?;
        let reward = env.act(action)?;
        self.record(state, action, reward);

        debug!(
            deadline,
            state = %state,
            action = %action,
            reward,
            net_reward = self.net_reward,
            "Agent step"
        );

        Ok(StepOutcome {
            deadline,
            state,
            action,
            reward,
            update,
        })
    }

    /// Apply the deferred update for the pending transition, if any
    pub fn learn(&mut self, current: &StateKey) -> Result<Option<TdUpdate>> {
        match self.pending.take() {
            Some(transition) => self.learner.update(&transition, current).map(Some),
            None => Ok(None),
        }
    }

    /// Ask the policy for an action in `state`
    pub fn choose(&mut self, state: &StateKey, valid_actions: &[Action]) -> Result<Action> {
        self.policy
            .select(self.learner.table(), state, valid_actions)
    }

    /// Remember the step just taken until the next state is known
    pub fn record(&mut self, state: StateKey, action: Action, reward: f64) {
        self.pending = Some(Transition::new(state, action, reward));
        self.steps += 1;
        self.net_reward += reward;
    }

    pub fn pending(&self) -> Option<&Transition> {
        self.pending.as_ref()
    }

    pub fn table(&self) -> &ValueTable {
        self.learner.table()
    }

    pub fn params(&self) -> &LearningParams {
        self.learner.params()
    }

    pub fn net_reward(&self) -> f64 {
        self.net_reward
    }

    pub fn stats(&self) -> AgentStats {
        AgentStats {
            trials: self.trials,
            steps: self.steps,
            updates: self.learner.updates(),
            net_reward: self.net_reward,
            average_reward: if self.steps > 0 {
                self.net_reward / self.steps as f64
            } else {
                0.0
            },
            policy: self.policy.name().to_string(),
        }
    }
}

impl std::fmt::Debug for LearningAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearningAgent")
            .field("params", self.learner.params())
            .field("policy", &self.policy.name())
            .field("pending", &self.pending)
            .field("trials", &self.trials)
            .field("steps", &self.steps)
            .field("net_reward", &self.net_reward)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use smartcab_core::{Heading, Light, Sensed, SmartcabError};

    use super::*;

    /// Environment that replays fixed readings and rewards
    struct Replay {
        readings: Vec<Sensed>,
        rewards: Vec<f64>,
        cursor: usize,
    }

    impl Replay {
        fn new(readings: Vec<Sensed>, rewards: Vec<f64>) -> Self {
            Self {
                readings,
                rewards,
                cursor: 0,
            }
        }
    }

    impl Environment for Replay {
        fn valid_actions(&self) -> &[Action] {
            &Heading::ALL
        }

        fn deadline(&self) -> i32 {
            20 - self.cursor as i32
        }

        fn sense(&self) -> Sensed {
            self.readings[self.cursor % self.readings.len()]
        }

        fn act(&mut self, _action: Action) -> Result<f64> {
            let reward = self
                .rewards
                .get(self.cursor)
                .copied()
                .ok_or_else(|| SmartcabError::Environment("out of rewards".to_string()))?;
            self.cursor += 1;
            Ok(reward)
        }
    }

    #[test]
    fn test_agent_creation() {
        let agent = LearningAgent::new(LearningParams::default()).unwrap();
        assert!(agent.pending().is_none());
        assert_eq!(agent.stats().steps, 0);
        assert_eq!(agent.stats().policy, "greedy");
        assert_eq!(agent.stats().average_reward, 0.0);
    }

    #[test]
    fn test_first_step_leaves_table_unchanged() {
        let mut agent = LearningAgent::new(LearningParams::default()).unwrap();
        let before = agent.table().clone();
        let mut env = Replay::new(vec![Sensed::clear(Light::Green)], vec![2.0]);

        let outcome = agent.step(&mut env, &Heading::Forward).unwrap();

        assert!(outcome.update.is_none());
        assert_eq!(outcome.action, Heading::Forward);
        assert_eq!(outcome.deadline, 20);
        assert_eq!(agent.table(), &before);
        assert_eq!(
            agent.pending(),
            Some(&Transition::new(outcome.state, Heading::Forward, 2.0))
        );
    }

    #[test]
    fn test_stats_accumulate() {
        let mut agent = LearningAgent::new(LearningParams::default()).unwrap();
        let mut env = Replay::new(vec![Sensed::clear(Light::Red)], vec![1.0, -0.5, 2.5]);

        agent.begin_trial();
        for _ in 0..3 {
            agent.step(&mut env, &Heading::Left).unwrap();
        }

        let stats = agent.stats();
        assert_eq!(stats.trials, 1);
        assert_eq!(stats.steps, 3);
        assert_eq!(stats.updates, 2);
        assert_eq!(stats.net_reward, 3.0);
        assert_eq!(stats.average_reward, 1.0);
    }

    #[test]
    fn test_environment_failure_propagates() {
        let mut agent = LearningAgent::new(LearningParams::default()).unwrap();
        let mut env = Replay::new(vec![Sensed::default()], vec![]);

        let err = agent.step(&mut env, &Heading::None).unwrap_err();
        assert!(matches!(err, SmartcabError::Environment(_)));
        assert!(agent.pending().is_none());
        assert_eq!(agent.stats().steps, 0);
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = AgentConfig {
            gamma: 2.0,
            ..AgentConfig::default()
        };
        assert!(LearningAgent::from_config(&config).is_err());
    }
}
