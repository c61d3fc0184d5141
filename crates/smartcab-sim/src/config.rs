//! Simulation configuration

use serde::{Deserialize, Serialize};

use smartcab_core::{Result, SmartcabError};

/// Shortest start-to-destination distance a trial may use
pub const MIN_TRIP_DISTANCE: i32 = 4;

/// Steps of deadline granted per unit of trip distance
pub const DEADLINE_PER_DISTANCE: i32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub n_trials: u32,
    /// Intersections per row
    pub width: i32,
    /// Intersections per column
    pub height: i32,
    /// Scripted cars sharing the roads with the cab
    pub dummy_agents: usize,
    /// End a trial as soon as its deadline runs out
    pub enforce_deadline: bool,
    /// Without an enforced deadline, abandon a trial once the deadline is
    /// overrun by this many steps
    pub hard_time_limit: i32,
    /// Pause between steps, for watching logs live
    pub update_delay_ms: u64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_trials: 100,
            width: 8,
            height: 6,
            dummy_agents: 3,
            enforce_deadline: false,
            hard_time_limit: 100,
            update_delay_ms: 0,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_trials == 0 {
            return Err(SmartcabError::Config("n_trials must be at least 1".to_string()));
        }
        if self.width < 1 || self.height < 1 {
            return Err(SmartcabError::Config(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width + self.height - 2 < MIN_TRIP_DISTANCE {
            return Err(SmartcabError::Config(format!(
                "a {}x{} grid has no trips of length {}",
                self.width, self.height, MIN_TRIP_DISTANCE
            )));
        }
        if self.hard_time_limit <= 0 {
            return Err(SmartcabError::Config(format!(
                "hard_time_limit must be positive, got {}",
                self.hard_time_limit
            )));
        }
        Ok(())
    }
}
