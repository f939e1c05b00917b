//! Shared output records for the engagement simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! Presentation layers depend on it to read what the engine produced.

pub mod event;
pub mod snapshot;

// Re-export event types
pub use event::{generate_event_id, PostEvent, ReactionCounts};

// Re-export snapshot types
pub use snapshot::{generate_snapshot_id, PopulationSnapshot};
