pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{PriceSource, SortDirection, SortKey};
pub use error::CoreError;
pub use structs::{
    Holding, PortfolioDelta, PortfolioSnapshot, PositionMetrics, Quote, RejectedHolding,
    SectorBucket, FALLBACK_SECTOR,
};
