//! Tiered deviation classification
//!
//! Compares a held-out observation against the population statistics of
//! its baseline and assigns the most severe deviation tier crossed, if
//! any.

use serde::Serialize;

/// Minimum mean or observed value required before classifying at all
///
/// Small absolute swings on low-traffic pages produce spuriously large
/// relative deviations, so pages below this signal level on both counts
/// are skipped as noise.
const MIN_SIGNAL_THRESHOLD: f64 = 100.0;

/// Population statistics of a baseline value sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineStats {
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
}

impl BaselineStats {
    /// Mean and population standard deviation (divide by N, not N-1)
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
                count: 0,
            };
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / count as f64;

        Self {
            mean,
            std_dev: variance.sqrt(),
            count,
        }
    }
}

/// Deviation severity in multiples of the baseline standard deviation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub enum Tier {
    One = 1,
    Two = 2,
    Three = 3,
}

impl Tier {
    /// All tiers, most severe first
    ///
    /// Classification walks this order and stops at the first bound
    /// crossed, which keeps tiers mutually exclusive even when the
    /// bounds coincide (zero stdev).
    pub const DESCENDING: [Tier; 3] = [Tier::Three, Tier::Two, Tier::One];

    /// Multiplier applied to the baseline standard deviation
    pub fn multiplier(&self) -> f64 {
        *self as u8 as f64
    }

    /// Numeric severity level
    pub fn level(&self) -> u8 {
        *self as u8
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> u8 {
        tier as u8
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// Side of the mean the observation fell on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Above => write!(f, "Above"),
            Direction::Below => write!(f, "Below"),
        }
    }
}

/// A crossed tier bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deviation {
    pub tier: Tier,
    pub direction: Direction,
}

/// Outcome of classifying one (baseline, observation) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Assessment {
    /// Signal gate not met; the page is too low-traffic to judge
    InsufficientSignal,
    /// No tier bound crossed
    WithinRange,
    /// The most severe tier bound crossed
    Deviating(Deviation),
}

impl Assessment {
    pub fn deviation(&self) -> Option<Deviation> {
        match self {
            Assessment::Deviating(deviation) => Some(*deviation),
            _ => None,
        }
    }
}

/// Assigns deviation tiers against baseline statistics
///
/// Pure and stateless: the same statistics and observation always yield
/// the same assessment.
#[derive(Debug, Clone, Copy)]
pub struct TieredClassifier {
    /// Minimum mean or observed value required to classify
    pub min_signal: f64,
}

impl TieredClassifier {
    /// Classify `observed` against the baseline statistics
    pub fn classify(&self, stats: &BaselineStats, observed: f64) -> Assessment {
        if stats.mean < self.min_signal && observed < self.min_signal {
            return Assessment::InsufficientSignal;
        }

        // Severity descending with early exit: when the bounds coincide
        // (zero stdev) the most severe tier must win.
        for tier in Tier::DESCENDING {
            let band = tier.multiplier() * stats.std_dev;
            if observed > stats.mean + band {
                return Assessment::Deviating(Deviation {
                    tier,
                    direction: Direction::Above,
                });
            }
            if observed < stats.mean - band {
                return Assessment::Deviating(Deviation {
                    tier,
                    direction: Direction::Below,
                });
            }
        }

        Assessment::WithinRange
    }
}

impl Default for TieredClassifier {
    fn default() -> Self {
        Self {
            min_signal: MIN_SIGNAL_THRESHOLD,
        }
    }
}
