//! Opinion-driven engagement simulation engine.
//!
//! A population of synthetic users sits on circular opinion wheels. Publishing
//! an idea scores every user against it, tallies replies, shares, likes and
//! unfollows, and lets positive shares recruit new followers.

pub mod agent;
pub mod config;
pub mod content;
pub mod error;
pub mod events;
pub mod ids;
pub mod reactions;
pub mod simulation;
pub mod stats;
pub mod wheel;

pub use agent::{Agent, AgentGenerator, Frequencies, Polarity};
pub use config::{default_config_toml, SimConfig, UniformRange, DEFAULT_TUNING_PATH};
pub use content::{ContentGenerator, Idea, Post};
pub use error::{ConfigError, ConfigIssue, SimError};
pub use ids::{AgentId, IdeaId, PostId};
pub use reactions::{ReactionConfig, ReactionEngine, ReactionResults, Tally, Thresholds};
pub use simulation::Simulation;
pub use stats::{StatsCollector, SessionStats};
pub use wheel::{Dimension, OpinionProfile, OpinionSlot, Wheel};
