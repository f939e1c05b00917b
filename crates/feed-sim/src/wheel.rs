//! Opinion Wheel
//!
//! A circular opinion axis split into a fixed number of sectors. Positions are
//! real-valued; the last sector wraps around to touch sector 0.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigIssue, Result, SimError};

/// Default number of sectors on a wheel
pub const DEFAULT_SECTOR_COUNT: u32 = 6;

/// An opinion axis tracked by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Politics,
    Fandom,
}

impl Dimension {
    /// Returns all dimension variants.
    pub fn all() -> &'static [Dimension] {
        &[Dimension::Politics, Dimension::Fandom]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Politics => "politics",
            Dimension::Fandom => "fandom",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Dimension::all()
            .iter()
            .copied()
            .find(|dimension| dimension.as_str() == s)
            .ok_or_else(|| format!("unknown dimension: {}", s))
    }
}

/// The opinion space: a circle of `sector_count` sectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wheel {
    sector_count: u32,
}

impl Default for Wheel {
    fn default() -> Self {
        Self {
            sector_count: DEFAULT_SECTOR_COUNT,
        }
    }
}

impl Wheel {
    pub fn new(sector_count: u32) -> Result<Self> {
        if sector_count <= 1 {
            return Err(ConfigIssue::TooFewSectors(sector_count).into());
        }
        Ok(Self { sector_count })
    }

    pub fn sector_count(&self) -> u32 {
        self.sector_count
    }

    /// Uniformly random slot over `[0, sector_count)`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> OpinionSlot {
        OpinionSlot {
            position: rng.gen_range(0.0..self.sector_count as f64),
            sector_count: self.sector_count,
        }
    }

    /// Slot at an explicit position.
    pub fn slot(&self, position: f64) -> Result<OpinionSlot> {
        if !position.is_finite() || position < 0.0 || position >= self.sector_count as f64 {
            return Err(ConfigIssue::PositionOutOfRange {
                position,
                sector_count: self.sector_count,
            }
            .into());
        }
        Ok(OpinionSlot {
            position,
            sector_count: self.sector_count,
        })
    }

    /// Fails unless `slot` was taken from a wheel of this size.
    pub fn check(&self, slot: &OpinionSlot) -> Result<()> {
        if slot.sector_count() != self.sector_count() {
            return Err(ConfigIssue::SectorMismatch {
                expected: self.sector_count(),
                found: slot.sector_count(),
            }
            .into());
        }
        Ok(())
    }
}

/// A position on a wheel. Immutable once created.
///
/// Deserialized slots are re-validated through [`Wheel::slot`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSlot")]
pub struct OpinionSlot {
    position: f64,
    sector_count: u32,
}

#[derive(Deserialize)]
struct RawSlot {
    position: f64,
    sector_count: u32,
}

impl TryFrom<RawSlot> for OpinionSlot {
    type Error = SimError;

    fn try_from(raw: RawSlot) -> Result<Self> {
        Wheel::new(raw.sector_count)?.slot(raw.position)
    }
}

impl OpinionSlot {
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn sector_count(&self) -> u32 {
        self.sector_count
    }

    /// Alignment from -1 (diametrically opposed) to 1 (identical).
    ///
    /// Takes the shorter of the direct and the wrap-around distance, so the
    /// score is symmetric and sector 0 neighbours the last sector.
    pub fn compare(&self, other: &OpinionSlot) -> f64 {
        let sectors = self.sector_count as f64;
        let direct = (self.position - other.position).abs();
        let wrapped =
            self.position.min(other.position) + (sectors - self.position.max(other.position));
        -2.0 * (direct.min(wrapped) / (sectors / 2.0) - 0.5)
    }

    /// Position of the diametrically opposite point.
    pub fn opposite(&self) -> f64 {
        let sectors = self.sector_count as f64;
        (self.position + sectors / 2.0) % sectors
    }

    /// Discrete sector index, used for distribution charts.
    pub fn bucket(&self) -> usize {
        self.position.floor() as usize
    }
}

/// Opinion positions keyed by dimension. A missing key means "no stance".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpinionProfile {
    slots: BTreeMap<Dimension, OpinionSlot>,
}

impl OpinionProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, dimension: Dimension, slot: OpinionSlot) -> Self {
        self.slots.insert(dimension, slot);
        self
    }

    pub fn get(&self, dimension: Dimension) -> Option<&OpinionSlot> {
        self.slots.get(&dimension)
    }

    pub fn has(&self, dimension: Dimension) -> bool {
        self.slots.contains_key(&dimension)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &OpinionSlot)> {
        self.slots.iter().map(|(d, s)| (*d, s))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn slot(position: f64) -> OpinionSlot {
        Wheel::default().slot(position).unwrap()
    }

    #[test]
    fn test_identical_positions_fully_agree() {
        assert_eq!(slot(0.0).compare(&slot(0.0)), 1.0);
        assert_eq!(slot(4.2).compare(&slot(4.2)), 1.0);
    }

    #[test]
    fn test_opposite_positions_fully_disagree() {
        assert_eq!(slot(0.0).compare(&slot(3.0)), -1.0);
        assert_eq!(slot(1.5).compare(&slot(4.5)), -1.0);
    }

    #[test]
    fn test_wrap_around_neighbours() {
        // 5.5 and 0.5 are one sector apart across the seam
        let across_seam = slot(5.5).compare(&slot(0.5));
        let direct = slot(1.0).compare(&slot(2.0));
        assert!((across_seam - direct).abs() < 1e-12);
        assert!((direct - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_compare_is_symmetric_and_bounded() {
        let wheel = Wheel::default();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..500 {
            let a = wheel.sample(&mut rng);
            let b = wheel.sample(&mut rng);
            let ab = a.compare(&b);
            assert_eq!(ab, b.compare(&a));
            assert!((-1.0..=1.0).contains(&ab));
        }
    }

    #[test]
    fn test_opposite_scores_minus_one() {
        let wheel = Wheel::default();
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..200 {
            let a = wheel.sample(&mut rng);
            let b = wheel.slot(a.opposite()).unwrap();
            assert!((a.compare(&b) + 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_samples_stay_in_range() {
        let wheel = Wheel::new(4).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..1000 {
            let s = wheel.sample(&mut rng);
            assert!(s.position() >= 0.0 && s.position() < 4.0);
            assert!(s.bucket() < 4);
        }
    }

    #[test]
    fn test_bucket_floors_position() {
        assert_eq!(slot(0.0).bucket(), 0);
        assert_eq!(slot(2.999).bucket(), 2);
        assert_eq!(slot(5.01).bucket(), 5);
    }

    #[test]
    fn test_rejects_degenerate_wheels() {
        assert!(Wheel::new(0).is_err());
        assert!(Wheel::new(1).is_err());
        assert_eq!(Wheel::new(2).map(|w| w.sector_count()), Ok(2));
    }

    #[test]
    fn test_rejects_out_of_range_positions() {
        let wheel = Wheel::default();
        assert!(wheel.slot(6.0).is_err());
        assert!(wheel.slot(-0.1).is_err());
        assert!(wheel.slot(f64::NAN).is_err());
    }

    #[test]
    fn test_check_rejects_foreign_slots() {
        let wheel = Wheel::default();
        assert!(wheel.check(&slot(5.5)).is_ok());

        let small = Wheel::new(4).unwrap().slot(0.0).unwrap();
        assert_eq!(
            wheel.check(&small).unwrap_err(),
            SimError::InvalidConfiguration(ConfigIssue::SectorMismatch {
                expected: 6,
                found: 4,
            })
        );
    }

    #[test]
    fn test_deserialize_validates_slot() {
        let parsed: OpinionSlot =
            serde_json::from_str(r#"{"position":2.5,"sector_count":6}"#).unwrap();
        assert_eq!(parsed, slot(2.5));
        assert_eq!(parsed.sector_count(), 6);

        let far: std::result::Result<OpinionSlot, _> =
            serde_json::from_str(r#"{"position":99.0,"sector_count":6}"#);
        assert!(far.is_err());

        let degenerate: std::result::Result<OpinionSlot, _> =
            serde_json::from_str(r#"{"position":99.0,"sector_count":0}"#);
        assert!(degenerate.is_err());
    }

    #[test]
    fn test_dimension_parse() {
        assert_eq!("fandom".parse::<Dimension>(), Ok(Dimension::Fandom));
        assert!("sports".parse::<Dimension>().is_err());
        assert_eq!(Dimension::Politics.to_string(), "politics");
        for dimension in Dimension::all() {
            assert_eq!(dimension.as_str().parse::<Dimension>(), Ok(*dimension));
        }
    }
}
