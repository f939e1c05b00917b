//! Ideas and Posts
//!
//! Ideas wait in the backlog; publishing one produces a post that carries a
//! frozen copy of the idea's stances.

use rand::Rng;
use serde::{Deserialize, Serialize};

use feed_events::PostEvent;

use crate::config::SimConfig;
use crate::error::{ConfigIssue, Result, SimError};
use crate::ids::{IdCounter, IdeaId, PostId};
use crate::reactions::ReactionResults;
use crate::wheel::{Dimension, OpinionProfile, Wheel};

/// A candidate post in the backlog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    id: IdeaId,
    opinions: OpinionProfile,
}

impl Idea {
    pub fn new(id: IdeaId, opinions: OpinionProfile) -> Self {
        Self { id, opinions }
    }

    pub fn id(&self) -> IdeaId {
        self.id
    }

    pub fn opinions(&self) -> &OpinionProfile {
        &self.opinions
    }
}

/// A published idea. Results are recorded once, at publish time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    id: PostId,
    idea_id: IdeaId,
    opinions: OpinionProfile,
    text: Option<String>,
    results: Option<ReactionResults>,
}

impl Post {
    pub fn id(&self) -> PostId {
        self.id
    }

    pub fn idea_id(&self) -> IdeaId {
        self.idea_id
    }

    pub fn opinions(&self) -> &OpinionProfile {
        &self.opinions
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn results(&self) -> Option<&ReactionResults> {
        self.results.as_ref()
    }

    /// Fill the results slot. Fails if it is already filled.
    pub fn record_results(&mut self, results: ReactionResults) -> Result<()> {
        if self.results.is_some() {
            return Err(SimError::ResultsAlreadyRecorded(self.id));
        }
        self.results = Some(results);
        Ok(())
    }

    /// Event log record for this post.
    pub fn to_event(
        &self,
        event_id: impl Into<String>,
        population_before: usize,
        population_after: usize,
    ) -> PostEvent {
        let base = PostEvent::new(event_id, self.id.0, self.idea_id.0);
        let mut event = self.opinions.iter().fold(base, |event, (dimension, slot)| {
            event.with_opinion(dimension.as_str(), slot.position())
        });
        if let Some(text) = &self.text {
            event = event.with_text(text.clone());
        }
        let (follows, unfollows) = match &self.results {
            Some(results) => {
                event = event.with_reactions(results.counts());
                (
                    results.follows.iter().map(|a| a.id().0).collect(),
                    results.unfollows.iter().map(|id| id.0).collect(),
                )
            }
            None => (Vec::new(), Vec::new()),
        };
        event.with_churn(follows, unfollows, population_before, population_after)
    }
}

/// Mints ideas and turns them into posts
#[derive(Debug, Clone)]
pub struct ContentGenerator {
    wheel: Wheel,
    dimensions: Vec<Dimension>,
    presence_probability: f64,
    idea_ids: IdCounter,
    post_ids: IdCounter,
}

impl ContentGenerator {
    pub fn new(wheel: Wheel, dimensions: Vec<Dimension>) -> Self {
        Self {
            wheel,
            dimensions,
            presence_probability: 0.65,
            idea_ids: IdCounter::new(),
            post_ids: IdCounter::new(),
        }
    }

    pub fn from_config(config: &SimConfig) -> Result<Self> {
        let wheel = Wheel::new(config.wheel.sector_count)?;
        Ok(Self::new(wheel, config.reactions.dimensions.clone())
            .with_presence_probability(config.content.presence_probability))
    }

    pub fn with_presence_probability(mut self, probability: f64) -> Self {
        self.presence_probability = probability;
        self
    }

    /// Keep future idea IDs clear of ideas created elsewhere.
    pub fn reserve_idea_id(&mut self, id: IdeaId) {
        self.idea_ids.advance_past(id.0);
    }

    /// Generate an idea with a fresh identity.
    ///
    /// Each dimension takes a stance with `presence_probability`, except the
    /// last one, which is forced when every earlier dimension stayed silent.
    /// A single-dimension run therefore always takes a stance.
    pub fn generate_idea<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Idea {
        let id = IdeaId(self.idea_ids.next());
        let last = self.dimensions.len().saturating_sub(1);

        let mut any_present = false;
        let mut present = Vec::with_capacity(self.dimensions.len());
        for (index, &dimension) in self.dimensions.iter().enumerate() {
            let takes_stance =
                (index == last && !any_present) || rng.gen::<f64>() < self.presence_probability;
            if takes_stance {
                any_present = true;
                present.push(dimension);
            }
        }

        let opinions = present.into_iter().fold(OpinionProfile::new(), |profile, dimension| {
            profile.with(dimension, self.wheel.sample(rng))
        });
        Idea { id, opinions }
    }

    pub fn generate_backlog<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<Idea>> {
        if count == 0 {
            return Err(ConfigIssue::EmptyBacklog.into());
        }
        Ok((0..count).map(|_| self.generate_idea(rng)).collect())
    }

    /// Create a post from an idea; results stay empty until recorded.
    pub fn publish(&mut self, idea: &Idea, text: Option<String>) -> Post {
        Post {
            id: PostId(self.post_ids.next()),
            idea_id: idea.id,
            opinions: idea.opinions.clone(),
            text,
            results: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactions::{Tally, ReactionResults};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn two_dimensions() -> ContentGenerator {
        ContentGenerator::new(Wheel::default(), vec![Dimension::Politics, Dimension::Fandom])
    }

    fn sample_results() -> ReactionResults {
        ReactionResults {
            reply: Tally { positive: 2, negative: 1 },
            share: Tally::default(),
            like: Some(3),
            follows: Vec::new(),
            unfollows: Vec::new(),
        }
    }

    #[test]
    fn test_every_idea_takes_a_stance() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut generator = two_dimensions();
        let mut politics = 0;
        let mut fandom_only = 0;
        for _ in 0..2000 {
            let idea = generator.generate_idea(&mut rng);
            assert!(!idea.opinions().is_empty());
            if idea.opinions().has(Dimension::Politics) {
                politics += 1;
            } else {
                assert!(idea.opinions().has(Dimension::Fandom));
                fandom_only += 1;
            }
        }
        // politics is present about 65% of the time
        assert!((1150..1450).contains(&politics), "politics present {} times", politics);
        assert_eq!(politics + fandom_only, 2000);
    }

    #[test]
    fn test_single_dimension_always_populated() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut generator = ContentGenerator::new(Wheel::default(), vec![Dimension::Politics])
            .with_presence_probability(0.0);
        for _ in 0..100 {
            assert!(generator.generate_idea(&mut rng).opinions().has(Dimension::Politics));
        }
    }

    #[test]
    fn test_idea_ids_are_sequential() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut generator = two_dimensions();
        let backlog = generator.generate_backlog(5, &mut rng).unwrap();
        let ids: Vec<_> = backlog.iter().map(Idea::id).collect();
        assert_eq!(ids, (0..5).map(IdeaId).collect::<Vec<_>>());

        generator.reserve_idea_id(IdeaId(40));
        assert_eq!(generator.generate_idea(&mut rng).id(), IdeaId(41));
    }

    #[test]
    fn test_empty_backlog_rejected() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(two_dimensions().generate_backlog(0, &mut rng).is_err());
    }

    #[test]
    fn test_publish_copies_stances() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut generator = two_dimensions();
        let idea = generator.generate_idea(&mut rng);

        let post = generator.publish(&idea, Some("hot take".to_string()));
        assert_eq!(post.id(), PostId(0));
        assert_eq!(post.idea_id(), idea.id());
        assert_eq!(post.opinions(), idea.opinions());
        assert_eq!(post.text(), Some("hot take"));
        assert!(post.results().is_none());

        let second = generator.publish(&idea, None);
        assert_eq!(second.id(), PostId(1));
    }

    #[test]
    fn test_results_recorded_once() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut generator = two_dimensions();
        let idea = generator.generate_idea(&mut rng);
        let mut post = generator.publish(&idea, None);

        post.record_results(sample_results()).unwrap();
        assert_eq!(post.results().map(|r| r.reply.positive), Some(2));

        let err = post.record_results(sample_results()).unwrap_err();
        assert_eq!(err, SimError::ResultsAlreadyRecorded(PostId(0)));
    }

    #[test]
    fn test_post_event() {
        let wheel = Wheel::default();
        let opinions = OpinionProfile::new().with(Dimension::Fandom, wheel.slot(2.5).unwrap());
        let idea = Idea::new(IdeaId(9), opinions);
        let mut post = two_dimensions().publish(&idea, Some("go team".to_string()));
        post.record_results(sample_results()).unwrap();

        let event = post.to_event("evt_00000001", 20, 20);
        assert_eq!(event.idea_id, 9);
        assert_eq!(event.opinions.get("fandom"), Some(&2.5));
        assert!(!event.opinions.contains_key("politics"));
        assert_eq!(event.reactions.like, Some(3));
        assert_eq!(event.text.as_deref(), Some("go team"));
        assert_eq!(event.net_change(), 0);
    }
}
