//! Trial runner - drives a learning agent through the world

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use smartcab_core::{Environment, Result};
use smartcab_rl::{AgentStats, LearningAgent};

use crate::config::SimulationConfig;
use crate::world::{Position, TrialStatus, World};

/// Outcome of a single trial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialReport {
    pub trial: u32,
    pub status: TrialStatus,
    pub start: Position,
    pub destination: Position,
    pub steps: u32,
    pub net_reward: f64,
    /// Steps that earned a negative reward
    pub penalties: u32,
    /// Deadline left when the trial ended
    pub deadline: i32,
}

impl TrialReport {
    pub fn success(&self) -> bool {
        self.status == TrialStatus::Reached
    }
}

/// Summary of a training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub seed: u64,
    pub trials: Vec<TrialReport>,
    pub successes: u32,
    pub success_rate: f64,
    pub total_reward: f64,
    pub agent: AgentStats,
    /// States whose learned greedy action differs from the route suggestion
    pub overridden_states: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl TrainingReport {
    /// Success rate over the last `n` trials
    pub fn recent_success_rate(&self, n: usize) -> f64 {
        let recent = &self.trials[self.trials.len().saturating_sub(n)..];
        if recent.is_empty() {
            return 0.0;
        }
        recent.iter().filter(|t| t.success()).count() as f64 / recent.len() as f64
    }
}

/// Runs trials of the reference world against one agent
pub struct Simulator {
    world: World,
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let world = World::new(&config)?;
        Ok(Self { world, config })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run every configured trial
    pub fn run(&mut self, agent: &mut LearningAgent) -> Result<TrainingReport> {
        let started_at = Utc::now();
        info!(
            n_trials = self.config.n_trials,
            seed = self.config.seed,
            "Starting training run"
        );

        let mut trials = Vec::with_capacity(self.config.n_trials as usize);
        for trial in 1..=self.config.n_trials {
            trials.push(self.run_trial(agent, trial)?);
        }

        let successes = trials.iter().filter(|t| t.success()).count() as u32;
        let total_reward = trials.iter().map(|t| t.net_reward).sum();
        let report = TrainingReport {
            seed: self.config.seed,
            successes,
            success_rate: f64::from(successes) / f64::from(self.config.n_trials),
            total_reward,
            agent: agent.stats(),
            overridden_states: agent.table().overridden_states(),
            trials,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            successes = report.successes,
            success_rate = report.success_rate,
            total_reward = report.total_reward,
            "Training run complete"
        );
        Ok(report)
    }

    /// Run one trial to arrival, deadline, or the hard limit
    pub fn run_trial(&mut self, agent: &mut LearningAgent, trial: u32) -> Result<TrialReport> {
        self.world.reset();
        agent.begin_trial();

        let start = self.world.start();
        let destination = self.world.destination();
        debug!(
            trial,
            ?start,
            ?destination,
            deadline = self.world.deadline(),
            "Trial started"
        );

        let mut steps = 0;
        let mut net_reward = 0.0;
        let mut penalties = 0;
        while !self.world.status().is_finished() {
            self.world.tick();
            let planner = self.world.planner();
            let outcome = agent.step(&mut self.world, &planner)?;

            steps += 1;
            net_reward += outcome.reward;
            if outcome.reward < 0.0 {
                penalties += 1;
            }

            if self.config.update_delay_ms > 0 {
                std::thread::sleep(Duration::from_millis(self.config.update_delay_ms));
            }
        }

        let report = TrialReport {
            trial,
            status: self.world.status(),
            start,
            destination,
            steps,
            net_reward,
            penalties,
            deadline: self.world.deadline(),
        };

        info!(
            trial,
            status = ?report.status,
            steps,
            net_reward,
            penalties,
            "Trial finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use smartcab_rl::LearningParams;

    use super::*;

    fn config(n_trials: u32) -> SimulationConfig {
        SimulationConfig {
            n_trials,
            seed: 11,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_single_trial_terminates() {
        let mut sim = Simulator::new(config(1)).unwrap();
        let mut agent = LearningAgent::new(LearningParams::default()).unwrap();

        let report = sim.run_trial(&mut agent, 1).unwrap();

        assert!(report.status.is_finished());
        assert!(report.steps > 0);
        assert_eq!(agent.stats().trials, 1);
        assert_eq!(agent.stats().steps, u64::from(report.steps));
    }

    #[test]
    fn test_report_totals() {
        let mut sim = Simulator::new(config(5)).unwrap();
        let mut agent = LearningAgent::new(LearningParams::default()).unwrap();

        let report = sim.run(&mut agent).unwrap();

        assert_eq!(report.trials.len(), 5);
        let successes = report.trials.iter().filter(|t| t.success()).count() as u32;
        assert_eq!(report.successes, successes);
        let total: f64 = report.trials.iter().map(|t| t.net_reward).sum();
        assert!((report.total_reward - total).abs() < 1e-9);
        assert!((report.agent.net_reward - total).abs() < 1e-9);
        assert!(report.finished_at >= report.started_at);
    }

    #[test]
    fn test_recent_success_rate() {
        let mut sim = Simulator::new(config(4)).unwrap();
        let mut agent = LearningAgent::new(LearningParams::default()).unwrap();
        let report = sim.run(&mut agent).unwrap();

        assert_eq!(report.recent_success_rate(100), report.success_rate);
        let rate = report.recent_success_rate(2);
        assert!((0.0..=1.0).contains(&rate));
    }
}
