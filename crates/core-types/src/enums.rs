use serde::{Deserialize, Serialize};

/// The sort key selected by a ranked view.
///
/// Each variant maps to exactly one comparator in the ranking engine; the
/// tie-break rule is shared across all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    /// Case-insensitive comparison on the position's symbol.
    Alphabetic,
    /// Comparison on the raw, unrounded gain/loss percentage.
    GainLossPercent,
    /// Comparison on the raw, unrounded portfolio weight.
    Weight,
}

impl SortKey {
    /// The direction a view starts in before the user flips it: symbols read
    /// naturally ascending, numeric rankings lead with the largest value.
    pub fn default_direction(&self) -> SortDirection {
        match self {
            SortKey::Alphabetic => SortDirection::Asc,
            SortKey::GainLossPercent | SortKey::Weight => SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Returns the opposite direction.
    pub fn opposite(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Where the price used to value a position came from.
///
/// `Stale` and `Unpriced` are display flags, not errors: the position is
/// still valued and still counts toward the portfolio totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceSource {
    /// A quote inside the freshness window.
    Fresh,
    /// A quote older than the freshness window.
    Stale,
    /// No quote was ever seen; the cost basis stands in for the price.
    Unpriced,
}
