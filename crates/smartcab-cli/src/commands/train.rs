//! Training command

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use smartcab_rl::{LearningAgent, PolicyKind, StateKey, ValueTable};
use smartcab_sim::{Simulator, TrainingReport};

use crate::config::Config;

/// Trials counted by the "recent" success rate in the summary
const RECENT_WINDOW: usize = 10;

#[derive(Args, Debug, Default)]
pub struct TrainArgs {
    /// Number of trials to run
    #[arg(short = 'n', long)]
    pub trials: Option<u32>,

    /// Seed for the world (trip placement, lights, traffic)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Learning rate
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Discount factor
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Starting value of the route-suggested action in each state
    #[arg(long)]
    pub bias: Option<f64>,

    /// Explore with this probability (switches to the epsilon-greedy policy)
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// End trials when their deadline runs out
    #[arg(long)]
    pub enforce_deadline: bool,

    /// Pause between steps in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Write the full JSON report here
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print states where the learned action departs from the route
    #[arg(long)]
    pub show_policy: bool,
}

impl TrainArgs {
    /// Command-line flags take precedence over every config layer
    fn apply(&self, config: &mut Config) {
        let agent = &mut config.agent;
        let simulation = &mut config.simulation;

        if let Some(trials) = self.trials {
            simulation.n_trials = trials;
        }
        if let Some(seed) = self.seed {
            simulation.seed = seed;
        }
        if let Some(alpha) = self.alpha {
            agent.alpha = alpha;
        }
        if let Some(gamma) = self.gamma {
            agent.gamma = gamma;
        }
        if let Some(bias) = self.bias {
            agent.initial_bias = bias;
        }
        if let Some(epsilon) = self.epsilon {
            agent.policy = PolicyKind::EpsilonGreedy;
            agent.epsilon = epsilon;
        }
        if self.enforce_deadline {
            simulation.enforce_deadline = true;
        }
        if let Some(delay) = self.delay_ms {
            simulation.update_delay_ms = delay;
        }
    }
}

pub fn run(args: &TrainArgs, mut config: Config) -> Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let mut agent =
        LearningAgent::from_config(&config.agent).context("Failed to create learning agent")?;
    let mut simulator =
        Simulator::new(config.simulation.clone()).context("Failed to create simulator")?;

    let report = simulator.run(&mut agent).context("Training run failed")?;

    print_summary(&report);
    if args.show_policy {
        print_policy(agent.table())?;
    }
    if let Some(path) = &args.output {
        write_report(&report, path)?;
        println!("\nReport written to: {}", path.display());
    }
    Ok(())
}

fn print_summary(report: &TrainingReport) {
    let elapsed = report.finished_at - report.started_at;

    println!("Training Summary");
    println!("================\n");
    println!("  Seed:            {}", report.seed);
    println!("  Trials:          {}", report.trials.len());
    println!(
        "  Successes:       {} ({:.1}%)",
        report.successes,
        report.success_rate * 100.0
    );
    println!(
        "  Last {RECENT_WINDOW}:         {:.1}%",
        report.recent_success_rate(RECENT_WINDOW) * 100.0
    );
    println!("  Total reward:    {:.2}", report.total_reward);
    println!("  Steps:           {}", report.agent.steps);
    println!("  Updates:         {}", report.agent.updates);
    println!("  Avg reward/step: {:.3}", report.agent.average_reward);
    println!("  Policy:          {}", report.agent.policy);
    println!("  Learned detours: {}", report.overridden_states);
    println!("  Elapsed:         {} ms", elapsed.num_milliseconds());
}

fn print_policy(table: &ValueTable) -> Result<()> {
    println!("\nLearned Policy");
    println!("==============\n");
    println!(
        "{:<10} {:<6} {:<8} {:<8} {:<8} -> action",
        "waypoint", "light", "oncoming", "left", "right"
    );

    let mut shown = 0;
    for state in StateKey::all() {
        let (action, value) = table.best_action(&state)?;
        if action == state.suggested_action() {
            continue;
        }
        let sensed = state.sensed();
        println!(
            "{:<10} {:<6} {:<8} {:<8} {:<8} -> {} ({value:.3})",
            state.waypoint, sensed.light, sensed.oncoming, sensed.left, sensed.right, action
        );
        shown += 1;
    }

    if shown == 0 {
        println!("(every state follows the route suggestion)");
    }
    Ok(())
}

fn write_report(report: &TrainingReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = TrainArgs {
            trials: Some(7),
            seed: Some(3),
            alpha: Some(0.5),
            epsilon: Some(0.2),
            enforce_deadline: true,
            ..TrainArgs::default()
        };
        let mut config = Config::default();

        args.apply(&mut config);

        assert_eq!(config.simulation.n_trials, 7);
        assert_eq!(config.simulation.seed, 3);
        assert!(config.simulation.enforce_deadline);
        assert_eq!(config.agent.alpha, 0.5);
        assert_eq!(config.agent.gamma, 0.1);
        assert_eq!(config.agent.policy, PolicyKind::EpsilonGreedy);
        assert_eq!(config.agent.epsilon, 0.2);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let mut config = Config::default();
        TrainArgs::default().apply(&mut config);

        assert_eq!(config.agent, Config::default().agent);
        assert_eq!(config.simulation, Config::default().simulation);
    }

    #[test]
    fn test_run_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.json");
        let args = TrainArgs {
            trials: Some(3),
            seed: Some(1),
            output: Some(output.clone()),
            ..TrainArgs::default()
        };

        run(&args, Config::default()).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["seed"], 1);
        assert_eq!(json["trials"].as_array().unwrap().len(), 3);
        assert_eq!(json["agent"]["trials"], 3);
    }

    #[test]
    fn test_run_rejects_invalid_overrides() {
        let args = TrainArgs {
            alpha: Some(0.0),
            ..TrainArgs::default()
        };
        assert!(run(&args, Config::default()).is_err());

        for bias in [0.0, -2.0] {
            let args = TrainArgs {
                bias: Some(bias),
                trials: Some(1),
                ..TrainArgs::default()
            };
            assert!(run(&args, Config::default()).is_err(), "bias {bias}");
        }
    }
}
