//! # Meridian Quote Cache
//!
//! The only stateful component of the analytics core. It holds the most
//! recently known price per symbol and answers "is this price stale" against
//! a freshness window.
//!
//! ## Architectural Principles
//!
//! - **Last-write-wins by time:** a cached quote is replaced only by one with
//!   a strictly later observation timestamp. Arrival order is irrelevant, so
//!   merges are idempotent and commutative with respect to final state.
//! - **Unknown is not an error:** a symbol that was never quoted yields
//!   `Lookup::Unknown`, and callers fall back to the holding's cost basis.
//! - **No clocks inside:** `now` is always a parameter, which keeps every
//!   operation deterministic and testable.

// Declare the modules that constitute this crate.
pub mod cache;

// Re-export the key components to create a clean, public-facing API.
pub use cache::{Lookup, MergeOutcome, MergeStats, QuoteCache};
