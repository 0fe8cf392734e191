use loadscore_metrics::TelemetryConfig;
use loadscore_scheduler::framework::validate_plugin_weight;
use loadscore_scheduler::{BalanceWeights, PLUGIN_NAME};
use serde::Deserialize;
use std::path::Path;

/// On-disk configuration for the scoring plugin
///
/// Every field has a default, so an empty file (or no file at all) is a
/// valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoadScoreConfig {
    pub telemetry: TelemetryConfig,
    pub weights: BalanceWeights,
    /// Weight of the plugin when combined with other score plugins
    pub plugin_weight: PluginWeight,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct PluginWeight(pub i64);

impl Default for PluginWeight {
    fn default() -> Self {
        Self(1)
    }
}

impl LoadScoreConfig {
    /// Load from a YAML file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> miette::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .map_err(|e| miette::miette!("Failed to read config '{}': {}", path.display(), e))?;
        let config = Self::from_yaml(&raw)
            .map_err(|e| miette::miette!("Invalid config '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section before any client or plugin is built
    pub fn validate(&self) -> miette::Result<()> {
        self.telemetry.validate()?;
        self.weights.validate()?;
        validate_plugin_weight(PLUGIN_NAME, self.plugin_weight.0)?;
        Ok(())
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}
