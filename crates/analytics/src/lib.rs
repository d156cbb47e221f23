//! # Meridian Analytics
//!
//! This crate turns raw positions and price lookups into the derived
//! financial view every dashboard screen displays: position value, gain/loss,
//! portfolio weight, sector concentration and ranked orderings.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   external systems and performs no I/O.
//! - **Stateless Calculation:** Every operation is a pure function over
//!   immutable inputs. Derived structures are recomputed from scratch each
//!   cycle, which eliminates a whole class of stale-aggregate bugs and makes
//!   two runs over the same inputs produce identical output.
//! - **Full precision inside:** monetary values are never rounded here;
//!   rounding is the presentation boundary's job.
//!
//! ## Public API
//!
//! - `valuate`: position-level metrics from one holding and its price lookup.
//! - `PortfolioAggregator`: totals, weights and sector buckets.
//! - `DiversificationScorer`: the 0-10 concentration heuristic.
//! - `rank`: ordered views with a shared, deterministic tie-break.
//! - `delta`: period-over-period change against a prior snapshot.

// Declare the modules that constitute this crate.
pub mod aggregator;
pub mod delta;
pub mod diversification;
pub mod error;
pub mod ranking;
pub mod valuation;

// Re-export the key components to create a clean, public-facing API.
pub use aggregator::PortfolioAggregator;
pub use delta::delta;
pub use diversification::{DiversificationReport, DiversificationScorer, MAX_SCORE};
pub use error::AnalyticsError;
pub use ranking::rank;
pub use valuation::valuate;
