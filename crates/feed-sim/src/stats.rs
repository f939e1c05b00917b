//! Statistics Output
//!
//! Collects per-post engagement figures over a session for analysis.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::content::Post;

/// Default statistics file name inside the output directory
pub const STATS_FILE_NAME: &str = "stats.json";

/// One row per published post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub post_id: u64,
    pub reply_positive: u32,
    pub reply_negative: u32,
    pub share_positive: u32,
    pub share_negative: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u32>,
    pub follows: usize,
    pub unfollows: usize,
    pub population_after: usize,
}

/// Whole-session statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_posts: usize,
    pub initial_population: usize,
    pub final_population: usize,
    pub peak_population: usize,
    pub total_follows: usize,
    pub total_unfollows: usize,
    pub total_replies: u32,
    pub total_shares: u32,
    pub average_net_change: f64,
    pub history: Vec<PostSummary>,
}

/// Accumulates statistics as posts are published
#[derive(Debug, Clone, Default)]
pub struct StatsCollector {
    initial_population: usize,
    peak_population: usize,
    history: Vec<PostSummary>,
}

impl StatsCollector {
    pub fn new(initial_population: usize) -> Self {
        Self {
            initial_population,
            peak_population: initial_population,
            history: Vec::new(),
        }
    }

    /// Record a published post and the population size it left behind.
    pub fn record_post(&mut self, post: &Post, population_after: usize) {
        let summary = match post.results() {
            Some(results) => PostSummary {
                post_id: post.id().0,
                reply_positive: results.reply.positive,
                reply_negative: results.reply.negative,
                share_positive: results.share.positive,
                share_negative: results.share.negative,
                likes: results.like,
                follows: results.follows.len(),
                unfollows: results.unfollows.len(),
                population_after,
            },
            None => PostSummary {
                post_id: post.id().0,
                reply_positive: 0,
                reply_negative: 0,
                share_positive: 0,
                share_negative: 0,
                likes: None,
                follows: 0,
                unfollows: 0,
                population_after,
            },
        };
        self.peak_population = self.peak_population.max(population_after);
        self.history.push(summary);
    }

    pub fn post_count(&self) -> usize {
        self.history.len()
    }

    /// Generate final statistics
    pub fn generate_stats(&self) -> SessionStats {
        let final_population = self
            .history
            .last()
            .map_or(self.initial_population, |s| s.population_after);

        let average_net_change = if self.history.is_empty() {
            0.0
        } else {
            (final_population as f64 - self.initial_population as f64) / self.history.len() as f64
        };

        SessionStats {
            total_posts: self.history.len(),
            initial_population: self.initial_population,
            final_population,
            peak_population: self.peak_population,
            total_follows: self.history.iter().map(|s| s.follows).sum(),
            total_unfollows: self.history.iter().map(|s| s.unfollows).sum(),
            total_replies: self.history.iter().map(|s| s.reply_positive + s.reply_negative).sum(),
            total_shares: self.history.iter().map(|s| s.share_positive + s.share_negative).sum(),
            average_net_change,
            history: self.history.clone(),
        }
    }
}

/// Write statistics to a file, creating parent directories as needed
pub fn write_stats(stats: &SessionStats, path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(stats)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::simulation::Simulation;

    #[test]
    fn test_stats_collector_new() {
        let collector = StatsCollector::new(20);
        let stats = collector.generate_stats();
        assert_eq!(collector.post_count(), 0);
        assert_eq!(stats.total_posts, 0);
        assert_eq!(stats.final_population, 20);
        assert_eq!(stats.peak_population, 20);
        assert_eq!(stats.average_net_change, 0.0);
    }

    #[test]
    fn test_collects_session() {
        let mut sim = Simulation::new(SimConfig::default(), 42).unwrap();
        let mut collector = StatsCollector::new(sim.population().len());

        for _ in 0..4 {
            let id = sim.backlog()[0].id();
            let size = {
                sim.publish_idea(id).unwrap();
                sim.population().len()
            };
            let post = sim.posts().last().unwrap();
            collector.record_post(post, size);
        }

        assert_eq!(collector.post_count(), 4);
        let stats = collector.generate_stats();
        assert_eq!(stats.total_posts, 4);
        assert_eq!(stats.final_population, sim.population().len());
        assert!(stats.peak_population >= stats.final_population);
        assert_eq!(
            stats.final_population as i64,
            20 + stats.total_follows as i64 - stats.total_unfollows as i64
        );
    }

    #[test]
    fn test_write_stats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(STATS_FILE_NAME);

        write_stats(&StatsCollector::new(3).generate_stats(), &path).unwrap();

        let parsed: SessionStats =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.initial_population, 3);
        assert!(parsed.history.is_empty());
    }
}
