use std::collections::HashMap;

use configuration::Concentration;
use core_types::{
    PortfolioSnapshot, PositionMetrics, RejectedHolding, SectorBucket, SortDirection, SortKey,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::diversification::DiversificationScorer;
use crate::ranking;

/// Rolls position metrics up into a complete portfolio snapshot.
///
/// This is the single place portfolio totals, per-position weights and
/// sector buckets are computed. Downstream consumers read them from the
/// snapshot instead of recomputing, so no two screens can disagree.
#[derive(Debug, Clone)]
pub struct PortfolioAggregator {
    concentration: Concentration,
    scorer: DiversificationScorer,
}

impl PortfolioAggregator {
    pub fn new(params: Concentration) -> Self {
        Self {
            scorer: DiversificationScorer::new(params.clone()),
            concentration: params,
        }
    }

    /// Aggregates valued positions and cash into a `PortfolioSnapshot`.
    ///
    /// Closed positions (zero quantity) are excluded from every aggregate.
    /// Rejected holdings are carried through untouched so the dashboard can
    /// surface them instead of silently dropping them.
    pub fn aggregate(
        &self,
        positions: Vec<PositionMetrics>,
        rejected: Vec<RejectedHolding>,
        cash: Decimal,
    ) -> PortfolioSnapshot {
        let before = positions.len();
        let mut open: Vec<PositionMetrics> = positions
            .into_iter()
            .filter(|position| !position.quantity.is_zero())
            .collect();
        if open.len() < before {
            debug!(excluded = before - open.len(), "closed positions excluded from aggregates");
        }

        // --- 1. Portfolio totals ---
        let invested: Decimal = open.iter().map(|position| position.value).sum();
        let total_cost: Decimal = open.iter().map(|position| position.cost_basis).sum();
        let total_gain: Decimal = open.iter().map(|position| position.gain).sum();
        let total_value = invested + cash;

        let total_gain_percent = if total_cost.is_zero() {
            Decimal::ZERO
        } else {
            total_gain / total_cost * Decimal::ONE_HUNDRED
        };

        // --- 2. Per-position weights ---
        // Weights are undefined for an empty portfolio and reported as zero.
        for position in &mut open {
            position.weight = if total_value.is_zero() {
                Decimal::ZERO
            } else {
                position.value / total_value * Decimal::ONE_HUNDRED
            };
        }

        // --- 3. Sector buckets, first-occurrence order ---
        let mut bucket_index: HashMap<String, usize> = HashMap::new();
        let mut sector_buckets: Vec<SectorBucket> = Vec::new();
        for position in &open {
            match bucket_index.get(&position.sector) {
                Some(&index) => sector_buckets[index].value += position.value,
                None => {
                    bucket_index.insert(position.sector.clone(), sector_buckets.len());
                    sector_buckets.push(SectorBucket {
                        sector: position.sector.clone(),
                        value: position.value,
                        percent_of_portfolio: Decimal::ZERO,
                        overweight: false,
                    });
                }
            }
        }
        for bucket in &mut sector_buckets {
            bucket.percent_of_portfolio = if total_value.is_zero() {
                Decimal::ZERO
            } else {
                bucket.value / total_value * Decimal::ONE_HUNDRED
            };
            // Strict inequality: a sector at exactly the threshold is fine.
            bucket.overweight =
                bucket.percent_of_portfolio > self.concentration.overweight_threshold_pct;
        }

        // --- 4. Concentration verdict ---
        let report = self.scorer.score(&sector_buckets);

        // --- 5. Stable default ordering ---
        let positions = ranking::rank(&open, SortKey::Alphabetic, SortDirection::Asc);

        PortfolioSnapshot {
            total_value,
            total_cost,
            total_gain,
            total_gain_percent,
            cash,
            positions,
            sector_buckets,
            diversification_score: report.score,
            overweight_sectors: report.overweight_sectors,
            invalid: rejected,
        }
    }
}
