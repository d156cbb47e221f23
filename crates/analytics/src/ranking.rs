use std::cmp::Ordering;

use core_types::{PositionMetrics, SortDirection, SortKey};

/// Produces an ordered view of the given positions.
///
/// The primary comparison is on the raw, unrounded metric selected by `key`.
/// When the primary key compares equal, the tie is always broken by symbol
/// ascending, regardless of key or direction, so the result is a total order
/// and identical inputs yield identical output.
pub fn rank(
    positions: &[PositionMetrics],
    key: SortKey,
    direction: SortDirection,
) -> Vec<PositionMetrics> {
    let mut ranked = positions.to_vec();
    ranked.sort_by(|a, b| {
        let primary = match key {
            SortKey::Alphabetic => compare_symbols(&a.symbol, &b.symbol),
            SortKey::GainLossPercent => a.gain_percent.cmp(&b.gain_percent),
            SortKey::Weight => a.weight.cmp(&b.weight),
        };
        let primary = match direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        // The tie-break is deliberately outside the direction flip.
        primary.then_with(|| tie_break(&a.symbol, &b.symbol))
    });
    ranked
}

/// Case-insensitive symbol comparison for the `Alphabetic` key.
fn compare_symbols(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Symbol ascending, case-insensitive first and exact second, so even
/// case-variant symbols order deterministically.
fn tie_break(a: &str, b: &str) -> Ordering {
    compare_symbols(a, b).then_with(|| a.cmp(b))
}
