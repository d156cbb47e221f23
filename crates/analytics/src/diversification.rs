use configuration::Concentration;
use core_types::SectorBucket;
use serde::{Deserialize, Serialize};

/// The best score a portfolio can have.
pub const MAX_SCORE: u8 = 10;

/// The concentration verdict over a set of sector buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiversificationReport {
    /// 0 (fully concentrated) to 10 (no concentration findings).
    pub score: u8,
    /// Sectors strictly above the overweight threshold, in bucket order.
    pub overweight_sectors: Vec<String>,
}

/// Derives a concentration score from sector buckets.
///
/// The rule is a deliberate heuristic, not a reproduction of any canonical
/// financial formula: start at 10, lose a point per overweight sector, lose
/// one more when a single sector dominates past the dominant threshold, and
/// never go below 0. More concentration always means a lower score.
#[derive(Debug, Clone)]
pub struct DiversificationScorer {
    params: Concentration,
}

impl DiversificationScorer {
    /// Creates a scorer with the given concentration thresholds. The
    /// thresholds are range-checked at configuration load time.
    pub fn new(params: Concentration) -> Self {
        Self { params }
    }

    pub fn score(&self, buckets: &[SectorBucket]) -> DiversificationReport {
        let overweight_sectors: Vec<String> = buckets
            .iter()
            .filter(|bucket| bucket.overweight)
            .map(|bucket| bucket.sector.clone())
            .collect();

        let mut penalties = overweight_sectors.len() as i64;

        if let Some(largest) = buckets.iter().map(|bucket| bucket.percent_of_portfolio).max() {
            if largest > self.params.dominant_threshold_pct {
                penalties += 1;
            }
        }

        let score = (i64::from(MAX_SCORE) - penalties).max(0) as u8;

        DiversificationReport {
            score,
            overweight_sectors,
        }
    }
}
