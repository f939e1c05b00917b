//! Post Events
//!
//! One record per published post, written as a JSON line.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate reaction counters for a single post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCounts {
    pub reply_positive: u32,
    pub reply_negative: u32,
    pub share_positive: u32,
    pub share_negative: u32,
    /// Absent when the run models no like reaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like: Option<u32>,
}

impl ReactionCounts {
    /// Total number of reactions of any kind.
    pub fn total(&self) -> u32 {
        self.reply_positive
            + self.reply_negative
            + self.share_positive
            + self.share_negative
            + self.like.unwrap_or(0)
    }
}

/// A published post and its effect on the population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEvent {
    /// Unique identifier (e.g., "evt_00000042")
    pub event_id: String,
    pub post_id: u64,
    pub idea_id: u64,
    /// Display text attached at publish time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Opinion position per dimension the post takes a stance on
    pub opinions: BTreeMap<String, f64>,
    pub reactions: ReactionCounts,
    /// Agent IDs that started following, in discovery order (may repeat)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_followers: Vec<u64>,
    /// Agent IDs that stopped following
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unfollowed: Vec<u64>,
    pub population_before: usize,
    pub population_after: usize,
}

impl PostEvent {
    /// Create a new event with required fields.
    pub fn new(event_id: impl Into<String>, post_id: u64, idea_id: u64) -> Self {
        Self {
            event_id: event_id.into(),
            post_id,
            idea_id,
            text: None,
            opinions: BTreeMap::new(),
            reactions: ReactionCounts::default(),
            new_followers: Vec::new(),
            unfollowed: Vec::new(),
            population_before: 0,
            population_after: 0,
        }
    }

    /// Sets the display text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Records the post's position on one dimension.
    pub fn with_opinion(mut self, dimension: impl Into<String>, position: f64) -> Self {
        self.opinions.insert(dimension.into(), position);
        self
    }

    /// Sets the reaction counters.
    pub fn with_reactions(mut self, reactions: ReactionCounts) -> Self {
        self.reactions = reactions;
        self
    }

    /// Sets follower churn and the population sizes around the publish.
    pub fn with_churn(
        mut self,
        new_followers: Vec<u64>,
        unfollowed: Vec<u64>,
        population_before: usize,
        population_after: usize,
    ) -> Self {
        self.new_followers = new_followers;
        self.unfollowed = unfollowed;
        self.population_before = population_before;
        self.population_after = population_after;
        self
    }

    /// Population growth caused by this post (negative when it shrank).
    pub fn net_change(&self) -> i64 {
        self.population_after as i64 - self.population_before as i64
    }

    /// Serializes the event to a JSON line (for JSONL format).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Generates an event ID with the given sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_event_id() {
        assert_eq!(generate_event_id(1), "evt_00000001");
        assert_eq!(generate_event_id(42371), "evt_00042371");
    }

    #[test]
    fn test_net_change() {
        let event =
            PostEvent::new("evt_00000001", 0, 3).with_churn(vec![40, 41], vec![2, 5, 7], 20, 19);
        assert_eq!(event.net_change(), -1);
    }

    #[test]
    fn test_reaction_total_ignores_missing_like() {
        let counts = ReactionCounts {
            reply_positive: 2,
            reply_negative: 1,
            share_positive: 3,
            share_negative: 0,
            like: None,
        };
        assert_eq!(counts.total(), 6);

        let with_likes = ReactionCounts { like: Some(4), ..counts };
        assert_eq!(with_likes.total(), 10);
    }

    #[test]
    fn test_jsonl_omits_empty_fields() {
        let event = PostEvent::new("evt_00000007", 6, 11).with_opinion("politics", 2.5);
        let line = event.to_jsonl().unwrap();

        assert!(!line.contains('\n'));
        assert!(!line.contains("new_followers"));
        assert!(!line.contains("\"like\""));
        assert!(!line.contains("\"text\""));

        let parsed = PostEvent::from_jsonl(&line).unwrap();
        assert_eq!(parsed.event_id, "evt_00000007");
        assert_eq!(parsed.opinions.get("politics"), Some(&2.5));
        assert!(parsed.new_followers.is_empty());
    }
}
