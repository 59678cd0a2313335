// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequencer settings, stored as RON.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default probability for `maybe` steps
pub const DEFAULT_MAYBE_PROBABILITY: f64 = 0.5;

/// Settings applied to every sequence a builder produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerSettings {
    /// Probability that a `maybe` step runs its body
    pub maybe_probability: f64,
    /// Seed for random branches; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Log a warning when a repeat-forever pass finishes within one tick
    pub warn_on_instant_loops: bool,
}

impl Default for SequencerSettings {
    fn default() -> Self {
        Self {
            maybe_probability: DEFAULT_MAYBE_PROBABILITY,
            seed: None,
            warn_on_instant_loops: true,
        }
    }
}

impl SequencerSettings {
    /// Settings with a fixed seed, for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(0.0..=1.0).contains(&self.maybe_probability) {
            return Err(SettingsError::Invalid(format!(
                "maybe_probability {} is outside [0, 1]",
                self.maybe_probability
            )));
        }
        Ok(())
    }

    /// Parse and validate from RON text
    pub fn from_ron(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = ron::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Load from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_ron(&text)?;
        tracing::debug!("Loaded sequencer settings from {:?}", path);
        Ok(settings)
    }

    /// Save to a RON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = SequencerSettings::default();
        assert_eq!(settings.maybe_probability, DEFAULT_MAYBE_PROBABILITY);
        assert_eq!(settings.seed, None);
        assert!(settings.warn_on_instant_loops);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_serialization() {
        let settings = SequencerSettings {
            maybe_probability: 0.25,
            ..SequencerSettings::seeded(9)
        };
        let ron_str = settings.to_ron().unwrap();
        let loaded = SequencerSettings::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded = SequencerSettings::from_ron("(seed: Some(3))").unwrap();
        assert_eq!(loaded.seed, Some(3));
        assert_eq!(loaded.maybe_probability, DEFAULT_MAYBE_PROBABILITY);
    }

    #[test]
    fn test_rejects_bad_probability() {
        assert!(matches!(
            SequencerSettings::from_ron("(maybe_probability: 2.0)"),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(
            SequencerSettings::from_ron("(maybe_probability: "),
            Err(SettingsError::Parse(_))
        ));
    }
}
