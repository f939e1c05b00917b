//! Agents
//!
//! Population members and the generator that mints them. Behavioural
//! frequencies are sampled independently of opinions.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{SimConfig, UniformRange};
use crate::error::{ConfigIssue, Result};
use crate::ids::{AgentId, IdCounter};
use crate::wheel::{Dimension, OpinionProfile, Wheel};

/// Default audience size range for a sharing agent
pub const DEFAULT_FOLLOWER_RANGE: UniformRange = UniformRange { min: 1, max: 15 };
/// Default range for follow limit and fame level
pub const DEFAULT_REACH_RANGE: UniformRange = UniformRange { min: 1, max: 5000 };

/// A pair of opposite-sign propensities
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Polarity {
    pub positive: f64,
    pub negative: f64,
}

/// Baseline propensity per reaction kind. All values are 0.0 to 1.0
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Frequencies {
    pub post: f64,
    pub reply: Polarity,
    pub share: Polarity,
    pub like: f64,
    pub follow: f64,
    pub unfollow: f64,
}

impl Frequencies {
    /// Every propensity set to the same ratio.
    pub fn uniform(ratio: f64) -> Self {
        Self {
            post: ratio,
            reply: Polarity {
                positive: ratio,
                negative: ratio,
            },
            share: Polarity {
                positive: ratio,
                negative: ratio,
            },
            like: ratio,
            follow: ratio,
            unfollow: ratio,
        }
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let post = rng.gen();
        let share_negative = rng.gen();
        let share_positive = rng.gen();
        let reply_negative = rng.gen();
        let reply_positive = rng.gen();
        Self {
            post,
            share: Polarity {
                positive: share_positive,
                negative: share_negative,
            },
            reply: Polarity {
                positive: reply_positive,
                negative: reply_negative,
            },
            like: rng.gen(),
            follow: rng.gen(),
            unfollow: rng.gen(),
        }
    }

    /// All eight ratios with their names.
    pub fn ratios(&self) -> [(&'static str, f64); 8] {
        [
            ("post", self.post),
            ("reply.positive", self.reply.positive),
            ("reply.negative", self.reply.negative),
            ("share.positive", self.share.positive),
            ("share.negative", self.share.negative),
            ("like", self.like),
            ("follow", self.follow),
            ("unfollow", self.unfollow),
        ]
    }
}

/// A population member. Immutable after creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    id: AgentId,
    meanness: f64,
    opinions: OpinionProfile,
    frequencies: Frequencies,
    follow_limit: u32,
    fame_level: u32,
    followers: u32,
}

impl Agent {
    pub fn new(id: AgentId, opinions: OpinionProfile, frequencies: Frequencies) -> Self {
        Self {
            id,
            meanness: 0.0,
            opinions,
            frequencies,
            follow_limit: DEFAULT_REACH_RANGE.min,
            fame_level: DEFAULT_REACH_RANGE.min,
            followers: DEFAULT_FOLLOWER_RANGE.min,
        }
    }

    pub fn with_followers(mut self, followers: u32) -> Self {
        self.followers = followers;
        self
    }

    pub fn with_meanness(mut self, meanness: f64) -> Self {
        self.meanness = meanness;
        self
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Not consumed by scoring.
    pub fn meanness(&self) -> f64 {
        self.meanness
    }

    pub fn opinions(&self) -> &OpinionProfile {
        &self.opinions
    }

    pub fn frequencies(&self) -> &Frequencies {
        &self.frequencies
    }

    /// Reserved for composite scoring; currently unused.
    pub fn follow_limit(&self) -> u32 {
        self.follow_limit
    }

    /// Reserved for composite scoring; currently unused.
    pub fn fame_level(&self) -> u32 {
        self.fame_level
    }

    /// Size of this agent's own audience when it shares.
    pub fn followers(&self) -> u32 {
        self.followers
    }
}

/// Mints agents with random opinions and frequencies
#[derive(Debug, Clone)]
pub struct AgentGenerator {
    wheel: Wheel,
    dimensions: Vec<Dimension>,
    followers: UniformRange,
    follow_limit: UniformRange,
    fame_level: UniformRange,
    ids: IdCounter,
}

impl AgentGenerator {
    pub fn new(wheel: Wheel, dimensions: Vec<Dimension>) -> Self {
        Self {
            wheel,
            dimensions,
            followers: DEFAULT_FOLLOWER_RANGE,
            follow_limit: DEFAULT_REACH_RANGE,
            fame_level: DEFAULT_REACH_RANGE,
            ids: IdCounter::new(),
        }
    }

    pub fn from_config(config: &SimConfig) -> Result<Self> {
        let wheel = Wheel::new(config.wheel.sector_count)?;
        let population = &config.population;
        Ok(Self::new(wheel, config.reactions.dimensions.clone())
            .with_follower_range(population.followers)
            .with_reach_ranges(population.follow_limit, population.fame_level))
    }

    pub fn with_follower_range(mut self, range: UniformRange) -> Self {
        self.followers = range;
        self
    }

    pub fn with_reach_ranges(
        mut self,
        follow_limit: UniformRange,
        fame_level: UniformRange,
    ) -> Self {
        self.follow_limit = follow_limit;
        self.fame_level = fame_level;
        self
    }

    pub fn wheel(&self) -> &Wheel {
        &self.wheel
    }

    /// Keep future agent IDs clear of agents created elsewhere.
    pub fn reserve_id(&mut self, id: AgentId) {
        self.ids.advance_past(id.0);
    }

    /// Agents minted so far (ersatz ones included), plus any reserved IDs.
    pub fn issued(&self) -> u64 {
        self.ids.issued()
    }

    /// Generate one agent with a fresh identity.
    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Agent {
        let id = AgentId(self.ids.next());
        let meanness = rng.gen();
        let opinions = self
            .dimensions
            .iter()
            .fold(OpinionProfile::new(), |profile, &dimension| {
                profile.with(dimension, self.wheel.sample(rng))
            });
        let frequencies = Frequencies::random(rng);

        Agent {
            id,
            meanness,
            opinions,
            frequencies,
            follow_limit: self.follow_limit.sample(rng),
            fame_level: self.fame_level.sample(rng),
            followers: self.followers.sample(rng),
        }
    }

    /// Generate `count` independent agents.
    pub fn generate_population<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<Agent>> {
        if count == 0 {
            return Err(ConfigIssue::EmptyPopulation.into());
        }
        Ok(self.generate_audience(count, rng))
    }

    /// Generate a throwaway audience; zero members is allowed.
    pub fn generate_audience<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Vec<Agent> {
        (0..count).map(|_| self.generate(rng)).collect()
    }
}
