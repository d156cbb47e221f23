//! # Meridian Engine
//!
//! The orchestrator for one computation cycle. Data flows one direction:
//! quote batch → cache merge → per-position valuation → aggregation →
//! scoring + ranking → delta → output snapshot consumed by presentation.
//!
//! The quote cache is the only state the engine carries between cycles;
//! `compute` itself is a synchronous, pure transformation over the inputs it
//! is given, safe to call from any concurrency model. Deciding *when* to
//! refresh belongs to the external driver, not to this crate.

use chrono::{DateTime, Utc};
use configuration::Config;
use core_types::{
    Holding, PortfolioDelta, PortfolioSnapshot, PositionMetrics, Quote, RejectedHolding,
    SortDirection, SortKey,
};
use quote_cache::{MergeStats, QuoteCache};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use analytics::PortfolioAggregator;

pub mod error;

pub use error::EngineError;

/// The three ranked views the dashboard offers, each in its default
/// direction: symbols ascending, numeric rankings leading with the largest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedViews {
    pub alphabetic: Vec<PositionMetrics>,
    pub by_gain_percent: Vec<PositionMetrics>,
    pub by_weight: Vec<PositionMetrics>,
}

impl RankedViews {
    fn from_snapshot(snapshot: &PortfolioSnapshot) -> Self {
        let view = |key: SortKey| analytics::rank(&snapshot.positions, key, key.default_direction());
        Self {
            alphabetic: view(SortKey::Alphabetic),
            by_gain_percent: view(SortKey::GainLossPercent),
            by_weight: view(SortKey::Weight),
        }
    }
}

/// Everything one cycle produces for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleOutput {
    pub snapshot: PortfolioSnapshot,
    pub delta: PortfolioDelta,
    pub rankings: RankedViews,
}

/// The central orchestrator for the analytics pipeline.
pub struct Engine {
    config: Config,
    aggregator: PortfolioAggregator,
    cache: QuoteCache,
}

impl Engine {
    /// Creates a new `Engine` from a validated configuration.
    pub fn new(config: Config) -> Result<Self, EngineError> {
        config.validate()?;
        let aggregator = PortfolioAggregator::new(config.concentration.clone());
        Ok(Self {
            config,
            aggregator,
            cache: QuoteCache::new(),
        })
    }

    /// Merges a quote batch into the cache.
    ///
    /// Malformed quotes are skipped and out-of-order arrivals discarded; the
    /// returned stats say what actually changed.
    pub fn merge_quotes(&mut self, batch: impl IntoIterator<Item = Quote>) -> MergeStats {
        let stats = self.cache.merge_batch(batch);
        debug!(
            applied = stats.applied(),
            discarded = stats.discarded,
            rejected = stats.rejected,
            "quote batch merged"
        );
        stats
    }

    pub fn quote_cache(&self) -> &QuoteCache {
        &self.cache
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs one full computation cycle over the supplied holdings.
    ///
    /// Per-item failures are recovered locally: an invalid holding is
    /// excluded from the totals but surfaced in `snapshot.invalid`, so one
    /// bad record never blanks the dashboard. Closed holdings are skipped
    /// entirely. Two calls over identical inputs and cache state produce
    /// identical output.
    pub fn compute(
        &self,
        holdings: &[Holding],
        cash: Decimal,
        previous: Option<&PortfolioSnapshot>,
        now: DateTime<Utc>,
    ) -> CycleOutput {
        let freshness_window = self.config.quotes.freshness_window();

        let mut positions: Vec<PositionMetrics> = Vec::with_capacity(holdings.len());
        let mut rejected: Vec<RejectedHolding> = Vec::new();

        for holding in holdings {
            if holding.is_closed() {
                debug!(symbol = %holding.symbol, "skipping closed position");
                continue;
            }
            let lookup = self.cache.get(&holding.symbol, freshness_window, now);
            match analytics::valuate(holding, &lookup) {
                Ok(metrics) => positions.push(metrics),
                Err(e) => {
                    warn!(symbol = %holding.symbol, "excluding invalid holding: {e}");
                    rejected.push(RejectedHolding {
                        symbol: holding.symbol.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let snapshot = self.aggregator.aggregate(positions, rejected, cash);
        let delta = analytics::delta(&snapshot, previous);
        let rankings = RankedViews::from_snapshot(&snapshot);

        CycleOutput {
            snapshot,
            delta,
            rankings,
        }
    }

    /// An ordered view over an existing snapshot, for a caller-selected key
    /// and direction.
    pub fn rank(
        &self,
        snapshot: &PortfolioSnapshot,
        key: SortKey,
        direction: SortDirection,
    ) -> Vec<PositionMetrics> {
        analytics::rank(&snapshot.positions, key, direction)
    }
}
