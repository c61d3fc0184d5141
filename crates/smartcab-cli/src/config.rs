//! Layered configuration: defaults, then a TOML file, then environment

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

use smartcab_rl::AgentConfig;
use smartcab_sim::SimulationConfig;

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "SMARTCAB_CONFIG";

/// Prefix for per-key overrides, e.g. `SMARTCAB__AGENT__ALPHA=0.5`
pub const ENV_PREFIX: &str = "SMARTCAB";

const CONFIG_FILE: &str = "smartcab.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from the first config file found plus environment
    pub fn load() -> Result<Self> {
        let path = Self::find_config_file();
        if path.is_none() {
            tracing::debug!("No config file found, using defaults");
        }
        Self::load_layers(path.as_deref(), ENV_PREFIX)
    }

    /// Load from an explicit file plus environment
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_layers(Some(path), ENV_PREFIX)
    }

    fn load_layers(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = ConfigBuilder::<config::builder::DefaultState>::default();

        if let Some(path) = path {
            tracing::debug!("Loading config from: {}", path.display());
            builder = builder.add_source(File::from(path.to_path_buf()).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Find the config file: `$SMARTCAB_CONFIG`, `./smartcab.toml`, then the user config dir
    pub fn find_config_file() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }

        Self::user_config_path().filter(|path| path.exists())
    }

    /// `~/.config/smartcab/smartcab.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/smartcab").join(CONFIG_FILE))
    }

    pub fn validate(&self) -> Result<()> {
        self.agent.validate().context("Invalid [agent] configuration")?;
        self.simulation
            .validate()
            .context("Invalid [simulation] configuration")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use smartcab_rl::PolicyKind;
    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = Config::load_layers(None, "SMARTCAB_TEST_NONE").unwrap();
        assert_eq!(config.agent.alpha, 0.8);
        assert_eq!(config.agent.gamma, 0.1);
        assert_eq!(config.agent.initial_bias, 3.5);
        assert_eq!(config.simulation.n_trials, 100);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_config(
            r#"
[agent]
alpha = 0.5
policy = "epsilon_greedy"
epsilon = 0.2

[simulation]
n_trials = 10
enforce_deadline = true
"#,
        );

        let config = Config::load_layers(Some(file.path()), "SMARTCAB_TEST_FILE").unwrap();
        assert_eq!(config.agent.alpha, 0.5);
        assert_eq!(config.agent.gamma, 0.1);
        assert_eq!(config.agent.policy, PolicyKind::EpsilonGreedy);
        assert_eq!(config.agent.epsilon, 0.2);
        assert_eq!(config.simulation.n_trials, 10);
        assert!(config.simulation.enforce_deadline);
        assert_eq!(config.simulation.width, 8);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_config("[agent]\nalpha = 0.5\n");
        std::env::set_var("SMARTCAB_TEST_ENV__AGENT__ALPHA", "0.25");
        std::env::set_var("SMARTCAB_TEST_ENV__SIMULATION__SEED", "42");

        let config = Config::load_layers(Some(file.path()), "SMARTCAB_TEST_ENV").unwrap();

        std::env::remove_var("SMARTCAB_TEST_ENV__AGENT__ALPHA");
        std::env::remove_var("SMARTCAB_TEST_ENV__SIMULATION__SEED");
        assert_eq!(config.agent.alpha, 0.25);
        assert_eq!(config.simulation.seed, 42);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = Path::new("/nonexistent/smartcab.toml");
        let config = Config::load_layers(Some(path), "SMARTCAB_TEST_MISSING").unwrap();
        assert_eq!(config.agent.alpha, 0.8);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_config("[agent]\nalpha = 0.0\n");
        let err = Config::load_layers(Some(file.path()), "SMARTCAB_TEST_INVALID").unwrap_err();
        assert!(format!("{err:#}").contains("[agent]"));

        let file = write_config("[agent]\ninitial_bias = -2.0\n");
        let err = Config::load_layers(Some(file.path()), "SMARTCAB_TEST_BIAS").unwrap_err();
        assert!(format!("{err:#}").contains("initial_bias"));
    }

    #[test]
    fn test_example_file_parses() {
        let config: Config = toml::from_str(crate::commands::config::EXAMPLE_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.agent.alpha, 0.8);
        assert_eq!(config.simulation.n_trials, 100);
    }

    #[test]
    fn test_roundtrips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let file = write_config(&text);
        let loaded = Config::load_layers(Some(file.path()), "SMARTCAB_TEST_ROUNDTRIP").unwrap();
        assert_eq!(loaded.agent, config.agent);
        assert_eq!(loaded.simulation, config.simulation);
    }
}
