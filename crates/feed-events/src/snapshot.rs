//! Snapshot Types
//!
//! Population state at a point in the run, shaped for distribution charts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// Population size plus per-dimension sector histograms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub snapshot_id: String,
    /// Number of posts published when the snapshot was taken
    pub post_count: usize,
    pub population_size: usize,
    pub sector_count: u32,
    /// Dimension name -> agent count per sector, in sector order
    #[serde(default)]
    pub distributions: BTreeMap<String, Vec<usize>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backlog: Vec<u64>,
}

impl PopulationSnapshot {
    /// Creates a new snapshot without distributions.
    pub fn new(
        snapshot_id: impl Into<String>,
        post_count: usize,
        population_size: usize,
        sector_count: u32,
    ) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            post_count,
            population_size,
            sector_count,
            distributions: BTreeMap::new(),
            backlog: Vec::new(),
        }
    }

    /// Adds the sector histogram for one dimension.
    pub fn with_distribution(mut self, dimension: impl Into<String>, buckets: Vec<usize>) -> Self {
        self.distributions.insert(dimension.into(), buckets);
        self
    }

    /// Sets the idea IDs waiting in the backlog.
    pub fn with_backlog(mut self, backlog: Vec<u64>) -> Self {
        self.backlog = backlog;
        self
    }

    /// Returns the histogram for a dimension.
    pub fn distribution(&self, dimension: &str) -> Option<&[usize]> {
        self.distributions.get(dimension).map(Vec::as_slice)
    }

    /// Index of the most populated sector for a dimension (lowest index on ties).
    pub fn dominant_sector(&self, dimension: &str) -> Option<usize> {
        let buckets = self.distribution(dimension)?;
        let max = *buckets.iter().max()?;
        buckets.iter().position(|&count| count == max)
    }

    /// Serializes the snapshot to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_snapshot_id() {
        assert_eq!(generate_snapshot_id(1), "snap_000001");
        assert_eq!(generate_snapshot_id(999999), "snap_999999");
    }

    #[test]
    fn test_dominant_sector() {
        let snapshot = PopulationSnapshot::new("snap_000001", 0, 20, 6)
            .with_distribution("politics", vec![2, 5, 5, 3, 1, 4]);

        assert_eq!(snapshot.dominant_sector("politics"), Some(1));
        assert_eq!(snapshot.dominant_sector("fandom"), None);
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = PopulationSnapshot::new("snap_000003", 2, 18, 6)
            .with_distribution("fandom", vec![3, 3, 3, 3, 3, 3])
            .with_backlog(vec![5, 6, 7]);

        let json = snapshot.to_json_pretty().unwrap();
        assert!(json.contains("snap_000003"));
        assert!(json.contains("fandom"));

        let parsed = PopulationSnapshot::from_json(&json).unwrap();
        assert_eq!(parsed.population_size, 18);
        assert_eq!(parsed.distribution("fandom").map(|b| b.iter().sum::<usize>()), Some(18));
        assert_eq!(parsed.backlog, vec![5, 6, 7]);
    }
}
