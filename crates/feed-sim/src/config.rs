//! Configuration System
//!
//! Loads tuning parameters from tuning.toml for easy adjustment without recompiling.
//! Every section is optional; missing keys fall back to the two-dimension defaults.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::agent::{DEFAULT_FOLLOWER_RANGE, DEFAULT_REACH_RANGE};
use crate::error::{ConfigError, ConfigIssue, Result};
use crate::reactions::ReactionConfig;
use crate::wheel::DEFAULT_SECTOR_COUNT;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub wheel: WheelConfig,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub reactions: ReactionConfig,
}

/// Opinion wheel shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub sector_count: u32,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            sector_count: DEFAULT_SECTOR_COUNT,
        }
    }
}

/// Population generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Agents generated at initialization
    pub size: usize,
    /// Audience size of each agent
    pub followers: UniformRange,
    pub follow_limit: UniformRange,
    pub fame_level: UniformRange,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 20,
            followers: DEFAULT_FOLLOWER_RANGE,
            follow_limit: DEFAULT_REACH_RANGE,
            fame_level: DEFAULT_REACH_RANGE,
        }
    }
}

/// Idea backlog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Ideas waiting to be published; constant over the run
    pub backlog_size: usize,
    /// Chance an idea takes a stance on a given dimension
    pub presence_probability: f64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            backlog_size: 5,
            presence_probability: 0.65,
        }
    }
}

/// Inclusive integer range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniformRange {
    pub min: u32,
    pub max: u32,
}

impl UniformRange {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max)
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn validate(&self, name: &'static str) -> Result<()> {
        if self.min > self.max {
            return Err(ConfigIssue::InvalidRange {
                name,
                min: self.min,
                max: self.max,
            }
            .into());
        }
        Ok(())
    }
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> std::result::Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a path, or use defaults if it cannot be read
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::from_file(path).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", path.display(), e);
            Self::default()
        })
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml(&self) -> std::result::Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Single-dimension preset: politics only, no likes, stricter share/follow.
    pub fn politics_only() -> Self {
        Self {
            reactions: ReactionConfig::politics_only(),
            ..Self::default()
        }
    }

    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population.size = size;
        self
    }

    pub fn with_backlog_size(mut self, size: usize) -> Self {
        self.content.backlog_size = size;
        self
    }

    /// Rejects configurations the engine cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.wheel.sector_count <= 1 {
            return Err(ConfigIssue::TooFewSectors(self.wheel.sector_count).into());
        }
        if self.population.size == 0 {
            return Err(ConfigIssue::EmptyPopulation.into());
        }
        if self.content.backlog_size == 0 {
            return Err(ConfigIssue::EmptyBacklog.into());
        }
        let p = self.content.presence_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigIssue::RatioOutOfRange {
                name: "presence_probability",
                value: p,
            }
            .into());
        }
        self.population.followers.validate("followers")?;
        self.population.follow_limit.validate("follow_limit")?;
        self.population.fame_level.validate("fame_level")?;
        self.reactions.validate()
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Engagement simulation tuning

[wheel]
sector_count = 6

[population]
size = 20
followers = { min = 1, max = 15 }
follow_limit = { min = 1, max = 5000 }
fame_level = { min = 1, max = 5000 }

[content]
backlog_size = 5
presence_probability = 0.65

[reactions]
dimensions = ["politics", "fandom"]
has_like_reaction = true

[reactions.thresholds]
reply = 0.5
share = 0.5
like = 0.5
follow = 0.6
unfollow = 0.5
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::wheel::Dimension;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.wheel.sector_count, 6);
        assert_eq!(config.population.size, 20);
        assert_eq!(config.content.backlog_size, 5);
        assert!(config.reactions.has_like_reaction);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_toml_matches_defaults() {
        let parsed = SimConfig::from_str(&default_config_toml()).unwrap();
        assert_eq!(parsed, SimConfig::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed = SimConfig::from_str("[population]\nsize = 40\n").unwrap();
        assert_eq!(parsed.population.size, 40);
        assert_eq!(parsed.population.followers, DEFAULT_FOLLOWER_RANGE);
        assert_eq!(parsed.content.backlog_size, 5);
        assert_eq!(parsed.reactions.thresholds.follow, 0.6);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = SimConfig::politics_only().with_population_size(12);
        let toml = config.to_toml().unwrap();
        let parsed = SimConfig::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.reactions.dimensions, vec![Dimension::Politics]);
    }

    #[test]
    fn test_validate_rejects_bad_sizes() {
        let err = SimConfig::default().with_population_size(0).validate().unwrap_err();
        assert_eq!(err, SimError::InvalidConfiguration(ConfigIssue::EmptyPopulation));

        let err = SimConfig::default().with_backlog_size(0).validate().unwrap_err();
        assert_eq!(err, SimError::InvalidConfiguration(ConfigIssue::EmptyBacklog));

        let mut config = SimConfig::default();
        config.wheel.sector_count = 1;
        assert_eq!(
            config.validate().unwrap_err(),
            SimError::InvalidConfiguration(ConfigIssue::TooFewSectors(1))
        );
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut config = SimConfig::default();
        config.population.followers = UniformRange { min: 9, max: 3 };
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidConfiguration(ConfigIssue::InvalidRange { name: "followers", .. }))
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = SimConfig::load_or_default("does/not/exist.toml");
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_load_config_file() {
        // This test requires the tuning.toml file to exist
        if Path::new(DEFAULT_TUNING_PATH).exists() {
            let config = SimConfig::from_file(DEFAULT_TUNING_PATH).unwrap();
            assert!(config.validate().is_ok());
        }
    }
}
