//! Error types for the engine.
//!
//! All fallible engine operations return [`SimError`]. Every variant is a
//! caller or configuration mistake; nothing here is transient.

use crate::ids::{AgentId, IdeaId, PostId};
use crate::wheel::Dimension;

/// Errors surfaced by simulation operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// Publish was requested for an idea that is not in the backlog.
    #[error("idea {0} is not in the backlog")]
    NotFound(IdeaId),

    /// The configuration or a hand-built entity cannot be simulated.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigIssue),

    /// A post's reaction results were already recorded.
    #[error("results for {0} were already recorded")]
    ResultsAlreadyRecorded(PostId),
}

/// The specific reason a configuration was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigIssue {
    #[error("population size must be positive")]
    EmptyPopulation,

    #[error("backlog size must be positive")]
    EmptyBacklog,

    /// The opinion wheel needs at least two sectors.
    #[error("sector count must be greater than 1, got {0}")]
    TooFewSectors(u32),

    #[error("position {position} lies outside [0, {sector_count})")]
    PositionOutOfRange {
        position: f64,
        sector_count: u32,
    },

    /// A slot was built on a wheel of a different size.
    #[error("slot belongs to a {found}-sector wheel, expected {expected}")]
    SectorMismatch { expected: u32, found: u32 },

    #[error("at least one opinion dimension must be configured")]
    NoDimensions,

    #[error("dimension {0} is listed more than once")]
    DuplicateDimension(Dimension),

    /// An agent was compared on a dimension it holds no opinion on.
    #[error("agent {agent} has no {dimension} opinion")]
    MissingDimension {
        agent: AgentId,
        dimension: Dimension,
    },

    /// A dimension was queried that the run does not track.
    #[error("dimension {0} is not tracked by this simulation")]
    UntrackedDimension(Dimension),

    /// The post takes no position on any configured dimension.
    #[error("post takes no position on any configured dimension")]
    NoSharedDimension,

    #[error("{name} must lie in [0, 1], got {value}")]
    RatioOutOfRange { name: &'static str, value: f64 },

    #[error("invalid {name} range [{min}, {max}]")]
    InvalidRange {
        name: &'static str,
        min: u32,
        max: u32,
    },
}

/// Configuration file loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing TOML config
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Error writing TOML config
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
