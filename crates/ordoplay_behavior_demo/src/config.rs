// SPDX-License-Identifier: MIT OR Apache-2.0
//! Demo configuration, stored as RON.

use ordoplay_behavior::{BuilderMisuseError, SequenceError, SequencerSettings, SettingsError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that stop the demo
#[derive(Debug, Error)]
pub enum DemoError {
    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Config values out of range
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// Nested sequencer settings rejected
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// A behavior definition was malformed
    #[error("Bad behavior definition: {0}")]
    Builder(#[from] BuilderMisuseError),

    /// A behavior failed while ticking
    #[error("Behavior failed: {0}")]
    Sequence(#[from] SequenceError),
}

/// How long to run the hive and with how many bees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of ticks to simulate
    pub ticks: u32,
    /// Seconds per tick
    pub delta_time: f32,
    /// Number of forager bees
    pub bees: u32,
    /// Settings for every behavior in the hive
    pub sequencer: SequencerSettings,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            delta_time: 0.1,
            bees: 3,
            sequencer: SequencerSettings::default(),
        }
    }
}

impl DemoConfig {
    /// Load and validate from a RON file
    pub fn load(path: &Path) -> Result<Self, DemoError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = ron::from_str(&content)?;
        config.validate()?;
        tracing::info!("Loaded demo config from {:?}", path);
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), DemoError> {
        if !(self.delta_time.is_finite() && self.delta_time > 0.0) {
            return Err(DemoError::Invalid(format!(
                "delta_time must be positive, got {}",
                self.delta_time
            )));
        }
        if self.bees == 0 {
            return Err(DemoError::Invalid("the hive needs at least one bee".into()));
        }
        self.sequencer.validate()?;
        Ok(())
    }

    /// Settings for the bee at `index`; seeded runs give each bee its own
    /// stream so they do not move in lockstep
    pub fn settings_for(&self, index: u32) -> SequencerSettings {
        SequencerSettings {
            seed: self.sequencer.seed.map(|seed| seed.wrapping_add(u64::from(index))),
            ..self.sequencer.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DemoConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = DemoConfig {
            bees: 5,
            sequencer: SequencerSettings::seeded(7),
            ..DemoConfig::default()
        };
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: DemoConfig = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config() {
        let config: DemoConfig = ron::from_str("(ticks: 10, sequencer: (seed: Some(1)))").unwrap();
        assert_eq!(config.ticks, 10);
        assert_eq!(config.bees, 3);
        assert_eq!(config.sequencer.seed, Some(1));
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = DemoConfig {
            delta_time: 0.0,
            ..DemoConfig::default()
        };
        assert!(matches!(config.validate(), Err(DemoError::Invalid(_))));

        let config = DemoConfig {
            sequencer: SequencerSettings {
                maybe_probability: -0.1,
                ..SequencerSettings::default()
            },
            ..DemoConfig::default()
        };
        assert!(matches!(config.validate(), Err(DemoError::Settings(_))));
    }

    #[test]
    fn test_bees_get_distinct_seeds() {
        let config = DemoConfig {
            sequencer: SequencerSettings::seeded(100),
            ..DemoConfig::default()
        };
        assert_eq!(config.settings_for(0).seed, Some(100));
        assert_eq!(config.settings_for(2).seed, Some(102));
        assert_eq!(DemoConfig::default().settings_for(2).seed, None);
    }
}
