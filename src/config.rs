use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use tracing::error;

use crate::assignment::types::TIGHTNESS_TOLERANCE;
use crate::error::Error;

/// Configuration for an assignment state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Absolute tolerance on `cost - resource potential - task potential`
    pub tolerance: f64,

    /// Reject bids with negative cost at construction time
    pub require_non_negative_costs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tolerance: TIGHTNESS_TOLERANCE,
            require_non_negative_costs: false,
        }
    }
}

impl Config {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_non_negative_costs(mut self, required: bool) -> Self {
        self.require_non_negative_costs = required;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::ConfigurationError(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Load a config from a JSON file.
pub fn load_json(config_path: impl AsRef<Path>) -> Result<Config> {
    let config_path = config_path.as_ref();
    let json = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
    parse_config(&json)
}

/// Load a config from a Pkl file, evaluated to JSON by the `pkl` CLI.
pub fn load_pkl(config_path: impl AsRef<Path>) -> Result<Config> {
    let config_path = config_path.as_ref();
    let output = Command::new("pkl")
        .arg("eval")
        .arg("-f")
        .arg("json")
        .arg(config_path)
        .output()
        .context("Failed to execute pkl command")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("pkl failed: {}", stderr);
        return Err(anyhow!("pkl failed: {}", stderr));
    }

    parse_config(&String::from_utf8_lossy(&output.stdout))
}

fn parse_config(json: &str) -> Result<Config> {
    let config: Config = serde_json::from_str(json).context("Failed to parse config json")?;
    config.validate()?;
    Ok(config)
}
