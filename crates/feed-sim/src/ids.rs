//! Simulation-scoped identities.
//!
//! Each generator owns the counter for the IDs it mints, so two independent
//! simulations never share an identity space.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a population member
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u64);

/// Unique identifier for a backlog idea
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdeaId(pub u64);

/// Unique identifier for a published post
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent_{}", self.0)
    }
}

impl fmt::Display for IdeaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "idea_{}", self.0)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "post_{}", self.0)
    }
}

/// Monotonic counter. Values are never reused.
#[derive(Debug, Clone, Default)]
pub struct IdCounter {
    next: u64,
}

impl IdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the current value and advances.
    pub fn next(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Skip ahead so `value` is never handed out.
    pub fn advance_past(&mut self, value: u64) {
        self.next = self.next.max(value + 1);
    }

    /// How many values have been handed out or skipped so far.
    pub fn issued(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_monotonic() {
        let mut counter = IdCounter::new();
        assert_eq!(counter.next(), 0);
        assert_eq!(counter.next(), 1);
        assert_eq!(counter.next(), 2);
        assert_eq!(counter.issued(), 3);
    }

    #[test]
    fn test_counters_are_independent() {
        let mut a = IdCounter::new();
        let mut b = IdCounter::new();
        a.next();
        a.next();
        assert_eq!(b.next(), 0);
    }

    #[test]
    fn test_advance_past_never_moves_back() {
        let mut counter = IdCounter::new();
        counter.advance_past(9);
        assert_eq!(counter.next(), 10);
        counter.advance_past(3);
        assert_eq!(counter.next(), 11);
    }

    #[test]
    fn test_display() {
        assert_eq!(AgentId(7).to_string(), "agent_7");
        assert_eq!(IdeaId(0).to_string(), "idea_0");
        assert_eq!(PostId(12).to_string(), "post_12");
    }
}
