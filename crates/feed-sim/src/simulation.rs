//! Simulation State
//!
//! Owns the live population, the idea backlog and the post history, and
//! applies each publish to them in a single uninterrupted pass.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::HashSet;

use feed_events::{generate_event_id, generate_snapshot_id, PopulationSnapshot, PostEvent};

use crate::agent::{Agent, AgentGenerator};
use crate::config::SimConfig;
use crate::content::{ContentGenerator, Idea, Post};
use crate::error::{ConfigIssue, Result, SimError};
use crate::ids::{AgentId, IdeaId};
use crate::reactions::ReactionEngine;
use crate::wheel::{Dimension, OpinionProfile, Wheel};

/// A running engagement simulation.
///
/// All randomness flows from the single seeded generator held here, so two
/// simulations built from the same config and seed replay identically.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    rng: SmallRng,
    agents: AgentGenerator,
    content: ContentGenerator,
    engine: ReactionEngine,
    population: Vec<Agent>,
    backlog: Vec<Idea>,
    posts: Vec<Post>,
}

impl Simulation {
    /// Validate `config`, then generate the population and backlog.
    pub fn new(config: SimConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: SimConfig, mut rng: SmallRng) -> Result<Self> {
        config.validate()?;
        let mut agents = AgentGenerator::from_config(&config)?;
        let mut content = ContentGenerator::from_config(&config)?;
        let population = agents.generate_population(config.population.size, &mut rng)?;
        let backlog = content.generate_backlog(config.content.backlog_size, &mut rng)?;

        tracing::info!(
            population = population.len(),
            backlog = backlog.len(),
            sectors = config.wheel.sector_count,
            dimensions = ?config.reactions.dimensions,
            "initialized simulation"
        );

        Ok(Self {
            engine: ReactionEngine::new(config.reactions.clone()),
            config,
            rng,
            agents,
            content,
            population,
            backlog,
            posts: Vec::new(),
        })
    }

    /// Start from a hand-built population and backlog.
    ///
    /// Every supplied slot must sit on the configured wheel. Generators skip
    /// past every supplied identity so agents and ideas minted later never
    /// collide with them.
    pub fn from_parts(
        config: SimConfig,
        rng: SmallRng,
        population: Vec<Agent>,
        backlog: Vec<Idea>,
    ) -> Result<Self> {
        config.validate()?;
        if population.is_empty() {
            return Err(ConfigIssue::EmptyPopulation.into());
        }
        if backlog.is_empty() {
            return Err(ConfigIssue::EmptyBacklog.into());
        }

        let mut agents = AgentGenerator::from_config(&config)?;
        let wheel = *agents.wheel();
        for agent in &population {
            check_profile(&wheel, agent.opinions())?;
            agents.reserve_id(agent.id());
        }
        let mut content = ContentGenerator::from_config(&config)?;
        for idea in &backlog {
            check_profile(&wheel, idea.opinions())?;
            content.reserve_idea_id(idea.id());
        }

        Ok(Self {
            engine: ReactionEngine::new(config.reactions.clone()),
            config,
            rng,
            agents,
            content,
            population,
            backlog,
            posts: Vec::new(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Current population, in join order.
    pub fn population(&self) -> &[Agent] {
        &self.population
    }

    /// Published posts, oldest first.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn post(&self, index: usize) -> Option<&Post> {
        self.posts.get(index)
    }

    pub fn backlog(&self) -> &[Idea] {
        &self.backlog
    }

    pub fn find_idea(&self, id: IdeaId) -> Option<&Idea> {
        self.backlog.iter().find(|idea| idea.id() == id)
    }

    /// Total agents minted by this simulation, ersatz audiences included.
    pub fn agents_minted(&self) -> u64 {
        self.agents.issued()
    }

    /// Publish a backlog idea and apply its reactions to the population.
    pub fn publish_idea(&mut self, id: IdeaId) -> Result<&Post> {
        self.publish(id, None)
    }

    /// Same as [`Simulation::publish_idea`], attaching display text to the post.
    pub fn publish_idea_with_text(&mut self, id: IdeaId, text: impl Into<String>) -> Result<&Post> {
        self.publish(id, Some(text.into()))
    }

    fn publish(&mut self, id: IdeaId, text: Option<String>) -> Result<&Post> {
        let index = self
            .backlog
            .iter()
            .position(|idea| idea.id() == id)
            .ok_or(SimError::NotFound(id))?;

        let results = self.engine.compute(
            self.backlog[index].opinions(),
            &self.population,
            &mut self.agents,
            &mut self.rng,
        )?;
        let mut post = self.content.publish(&self.backlog[index], text);
        let before = self.population.len();

        // Grow first, then shrink: removal matches on identity only.
        self.population.extend(results.follows.iter().cloned());
        if !results.unfollows.is_empty() {
            let leaving: HashSet<AgentId> = results.unfollows.iter().copied().collect();
            self.population.retain(|agent| !leaving.contains(&agent.id()));
        }

        tracing::debug!(
            post = %post.id(),
            idea = %id,
            follows = results.follows.len(),
            unfollows = results.unfollows.len(),
            population_before = before,
            population_after = self.population.len(),
            "published idea"
        );

        post.record_results(results)?;
        self.posts.push(post);

        self.backlog.remove(index);
        let replacement = self.content.generate_idea(&mut self.rng);
        self.backlog.push(replacement);

        Ok(&self.posts[self.posts.len() - 1])
    }

    /// Agents per sector on one dimension, in sector order.
    pub fn bucket_counts(&self, dimension: Dimension) -> Result<Vec<usize>> {
        if !self.config.reactions.dimensions.contains(&dimension) {
            return Err(ConfigIssue::UntrackedDimension(dimension).into());
        }
        let sector_count = self.config.wheel.sector_count;
        let mut buckets = vec![0; sector_count as usize];
        for slot in self.population.iter().filter_map(|a| a.opinions().get(dimension)) {
            let count = buckets.get_mut(slot.bucket()).ok_or(ConfigIssue::PositionOutOfRange {
                position: slot.position(),
                sector_count,
            })?;
            *count += 1;
        }
        Ok(buckets)
    }

    /// Event log record for `post`.
    ///
    /// The population after the publish is derived from the recorded
    /// follows and unfollows, so older posts convert as well as the latest.
    pub fn post_event(&self, post: &Post, sequence: u64, population_before: usize) -> PostEvent {
        let population_after = match post.results() {
            Some(results) => {
                (population_before + results.follows.len()).saturating_sub(results.unfollows.len())
            }
            None => population_before,
        };
        post.to_event(generate_event_id(sequence), population_before, population_after)
    }

    /// Population state for the presentation layer.
    pub fn snapshot(&self, sequence: u64) -> PopulationSnapshot {
        let snapshot = PopulationSnapshot::new(
            generate_snapshot_id(sequence),
            self.posts.len(),
            self.population.len(),
            self.config.wheel.sector_count,
        )
        .with_backlog(self.backlog.iter().map(|idea| idea.id().0).collect());

        self.config
            .reactions
            .dimensions
            .iter()
            .fold(snapshot, |snapshot, &dimension| match self.bucket_counts(dimension) {
                Ok(buckets) => snapshot.with_distribution(dimension.as_str(), buckets),
                Err(_) => snapshot,
            })
    }
}

fn check_profile(wheel: &Wheel, opinions: &OpinionProfile) -> Result<()> {
    opinions.iter().try_for_each(|(_, slot)| wheel.check(slot))
}
