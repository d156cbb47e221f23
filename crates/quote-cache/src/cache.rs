use chrono::{DateTime, Duration, Utc};
use core_types::{CoreError, Quote};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// What happened to a single quote during a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MergeOutcome {
    /// No quote existed for the symbol; the incoming one was stored.
    Inserted,
    /// The incoming quote was strictly newer and replaced the cached one.
    Replaced,
    /// The incoming quote was older than or as old as the cached one.
    Discarded,
}

/// Per-batch merge accounting, useful for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub inserted: usize,
    pub replaced: usize,
    pub discarded: usize,
    pub rejected: usize,
}

impl MergeStats {
    /// Quotes that changed the cache state.
    pub fn applied(&self) -> usize {
        self.inserted + self.replaced
    }
}

/// The result of looking a symbol up against a freshness window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Lookup {
    /// A quote inside the freshness window.
    Fresh(Quote),
    /// A quote older than the freshness window. Still usable for valuation,
    /// but must be flagged for display.
    Stale(Quote),
    /// No quote was ever seen for the symbol.
    Unknown,
}

impl Lookup {
    /// The cached quote, fresh or stale.
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            Lookup::Fresh(quote) | Lookup::Stale(quote) => Some(quote),
            Lookup::Unknown => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Lookup::Stale(_))
    }
}

/// Holds the most recently observed quote per symbol.
///
/// Writes go through `merge`, which swaps a single map entry per symbol;
/// symbols are independent, so no cross-symbol coordination is needed.
#[derive(Debug, Clone, Default)]
pub struct QuoteCache {
    entries: HashMap<String, Quote>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one quote, keeping the cache on last-write-wins-by-time.
    ///
    /// An incoming quote is applied only if the symbol is unknown or the
    /// quote's `observed_at` is strictly newer than the cached one. An older
    /// or equal-timestamp arrival is discarded, never an error.
    pub fn merge(&mut self, quote: Quote) -> Result<MergeOutcome, CoreError> {
        quote.validate()?;

        if let Some(cached) = self.entries.get(&quote.symbol) {
            if cached.observed_at >= quote.observed_at {
                debug!(
                    symbol = %quote.symbol,
                    incoming = %quote.observed_at,
                    cached = %cached.observed_at,
                    "discarding out-of-order quote"
                );
                return Ok(MergeOutcome::Discarded);
            }
        }

        match self.entries.insert(quote.symbol.clone(), quote) {
            None => Ok(MergeOutcome::Inserted),
            Some(_) => Ok(MergeOutcome::Replaced),
        }
    }

    /// Merges a whole quote batch.
    ///
    /// Malformed items are skipped with a warning and counted as rejected;
    /// one bad quote never aborts the batch.
    pub fn merge_batch(&mut self, batch: impl IntoIterator<Item = Quote>) -> MergeStats {
        let mut stats = MergeStats::default();
        for quote in batch {
            match self.merge(quote) {
                Ok(MergeOutcome::Inserted) => stats.inserted += 1,
                Ok(MergeOutcome::Replaced) => stats.replaced += 1,
                Ok(MergeOutcome::Discarded) => stats.discarded += 1,
                Err(e) => {
                    warn!("skipping malformed quote: {e}");
                    stats.rejected += 1;
                }
            }
        }
        stats
    }

    /// Looks a symbol up and classifies the cached quote against the
    /// freshness window. A quote is stale when `now - observed_at` strictly
    /// exceeds the window; a quote aged exactly the window is still fresh.
    pub fn get(&self, symbol: &str, freshness_window: Duration, now: DateTime<Utc>) -> Lookup {
        match self.entries.get(symbol) {
            None => Lookup::Unknown,
            Some(quote) => {
                if now - quote.observed_at > freshness_window {
                    Lookup::Stale(quote.clone())
                } else {
                    Lookup::Fresh(quote.clone())
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
