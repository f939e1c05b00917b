//! Reaction Engine
//!
//! Scores every agent against a post and tallies replies, shares, likes and
//! unfollows. Positive shares expose the post to a freshly generated audience
//! whose members may start following.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use feed_events::ReactionCounts;

use crate::agent::{Agent, AgentGenerator, Frequencies};
use crate::error::{ConfigIssue, Result};
use crate::ids::AgentId;
use crate::wheel::{Dimension, OpinionProfile};

/// Score cut-offs per reaction kind. A score must be strictly greater to count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub reply: f64,
    pub share: f64,
    pub like: f64,
    pub follow: f64,
    pub unfollow: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            reply: 0.5,
            share: 0.5,
            like: 0.5,
            follow: 0.6,
            unfollow: 0.5,
        }
    }
}

/// Which dimensions are scored, the cut-offs, and whether likes exist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionConfig {
    pub dimensions: Vec<Dimension>,
    pub has_like_reaction: bool,
    pub thresholds: Thresholds,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            dimensions: vec![Dimension::Politics, Dimension::Fandom],
            has_like_reaction: true,
            thresholds: Thresholds::default(),
        }
    }
}

impl ReactionConfig {
    pub fn politics_only() -> Self {
        Self {
            dimensions: vec![Dimension::Politics],
            has_like_reaction: false,
            thresholds: Thresholds {
                share: 0.75,
                follow: 0.75,
                ..Thresholds::default()
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimensions.is_empty() {
            return Err(ConfigIssue::NoDimensions.into());
        }
        let mut seen = HashSet::new();
        for &dimension in &self.dimensions {
            if !seen.insert(dimension) {
                return Err(ConfigIssue::DuplicateDimension(dimension).into());
            }
        }
        Ok(())
    }
}

/// Strict comparison used for every reaction kind.
pub fn exceeds(score: f64, threshold: f64) -> bool {
    score > threshold
}

/// Per-agent linear scores for a single post
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub reply_positive: f64,
    pub reply_negative: f64,
    pub share_positive: f64,
    pub share_negative: f64,
    pub like: f64,
    pub unfollow: f64,
}

impl Scores {
    pub fn new(alignment: f64, frequencies: &Frequencies) -> Self {
        Self {
            reply_positive: alignment * frequencies.reply.positive,
            reply_negative: -alignment * frequencies.reply.negative,
            share_positive: alignment * frequencies.share.positive,
            share_negative: -alignment * frequencies.share.negative,
            like: alignment * frequencies.like,
            unfollow: -alignment * frequencies.unfollow,
        }
    }
}

/// Positive / negative counter pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub positive: u32,
    pub negative: u32,
}

/// Aggregate outcome of one publish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionResults {
    pub reply: Tally,
    pub share: Tally,
    /// `None` when the run models no like reaction
    pub like: Option<u32>,
    /// New followers in discovery order, not deduplicated across shares
    pub follows: Vec<Agent>,
    /// Identities of population members who stopped following
    pub unfollows: Vec<AgentId>,
}

impl ReactionResults {
    fn empty(has_like_reaction: bool) -> Self {
        Self {
            reply: Tally::default(),
            share: Tally::default(),
            like: has_like_reaction.then_some(0),
            follows: Vec::new(),
            unfollows: Vec::new(),
        }
    }

    pub fn follow_ids(&self) -> Vec<AgentId> {
        self.follows.iter().map(Agent::id).collect()
    }

    /// Counters in the shape the event log expects.
    pub fn counts(&self) -> ReactionCounts {
        ReactionCounts {
            reply_positive: self.reply.positive,
            reply_negative: self.reply.negative,
            share_positive: self.share.positive,
            share_negative: self.share.negative,
            like: self.like,
        }
    }
}

/// Turns a post plus a population into reaction results
#[derive(Debug, Clone, Default)]
pub struct ReactionEngine {
    config: ReactionConfig,
}

impl ReactionEngine {
    pub fn new(config: ReactionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReactionConfig {
        &self.config
    }

    /// Equal-weight mean of per-dimension alignment over the configured
    /// dimensions the post takes a stance on.
    pub fn alignment(&self, opinions: &OpinionProfile, agent: &Agent) -> Result<f64> {
        let mut total = 0.0;
        let mut shared = 0usize;
        for &dimension in &self.config.dimensions {
            let Some(post_slot) = opinions.get(dimension) else {
                continue;
            };
            let agent_slot = agent
                .opinions()
                .get(dimension)
                .ok_or(ConfigIssue::MissingDimension {
                    agent: agent.id(),
                    dimension,
                })?;
            if agent_slot.sector_count() != post_slot.sector_count() {
                return Err(ConfigIssue::SectorMismatch {
                    expected: post_slot.sector_count(),
                    found: agent_slot.sector_count(),
                }
                .into());
            }
            total += post_slot.compare(agent_slot);
            shared += 1;
        }
        if shared == 0 {
            return Err(ConfigIssue::NoSharedDimension.into());
        }
        Ok(total / shared as f64)
    }

    /// Evaluate every agent independently; no agent short-circuits another
    /// category. `audience` mints the ersatz followers reached by shares.
    pub fn compute<R: Rng + ?Sized>(
        &self,
        opinions: &OpinionProfile,
        population: &[Agent],
        audience: &mut AgentGenerator,
        rng: &mut R,
    ) -> Result<ReactionResults> {
        let thresholds = &self.config.thresholds;
        let mut results = ReactionResults::empty(self.config.has_like_reaction);

        for agent in population {
            let alignment = self.alignment(opinions, agent)?;
            let scores = Scores::new(alignment, agent.frequencies());

            if exceeds(scores.reply_positive, thresholds.reply) {
                results.reply.positive += 1;
            }
            if exceeds(scores.reply_negative, thresholds.reply) {
                results.reply.negative += 1;
            }
            if let Some(likes) = results.like.as_mut() {
                if exceeds(scores.like, thresholds.like) {
                    *likes += 1;
                }
            }
            if exceeds(scores.share_positive, thresholds.share) {
                results.share.positive += 1;
                let reached = self.propagate(opinions, agent, audience, rng)?;
                results.follows.extend(reached);
            }
            if exceeds(scores.share_negative, thresholds.share) {
                results.share.negative += 1;
            }
            if exceeds(scores.unfollow, thresholds.unfollow) {
                results.unfollows.push(agent.id());
            }
        }

        tracing::debug!(
            population = population.len(),
            reply_positive = results.reply.positive,
            reply_negative = results.reply.negative,
            share_positive = results.share.positive,
            share_negative = results.share.negative,
            follows = results.follows.len(),
            unfollows = results.unfollows.len(),
            "computed reactions"
        );
        Ok(results)
    }

    /// A share reaches a fresh audience the size of the sharer's followers.
    /// Audience members are never drawn from the population and never
    /// deduplicated across sharers.
    fn propagate<R: Rng + ?Sized>(
        &self,
        opinions: &OpinionProfile,
        sharer: &Agent,
        audience: &mut AgentGenerator,
        rng: &mut R,
    ) -> Result<Vec<Agent>> {
        let exposed = audience.generate_audience(sharer.followers() as usize, rng);
        let mut followers = Vec::new();
        for candidate in exposed {
            let alignment = self.alignment(opinions, &candidate)?;
            let follow_score = candidate.frequencies().follow * alignment;
            if exceeds(follow_score, self.config.thresholds.follow) {
                tracing::trace!(
                    sharer = %sharer.id(),
                    follower = %candidate.id(),
                    follow_score,
                    "share gained follower"
                );
                followers.push(candidate);
            }
        }
        Ok(followers)
    }
}
