use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::PriceSource;
use crate::error::CoreError;

/// The sector bucket a holding falls into when its sector is missing or blank.
pub const FALLBACK_SECTOR: &str = "Other";

/// A raw position as supplied by the holdings source.
///
/// Holdings are owned by the snapshot cycle that receives them; the engine
/// never mutates them in place. Field names follow the dashboard's JSON
/// payloads (camelCase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Unique identifier within a portfolio (e.g., "TCS"). Must be non-empty.
    pub symbol: String,
    /// Number of units held. A holding with zero quantity is logically closed.
    pub quantity: Decimal,
    /// Cost basis per unit.
    pub avg_buy_price: Decimal,
    /// Sector label, defaulting to "Other" when the source omits it.
    #[serde(default = "default_sector")]
    pub sector: String,
    /// Display name, carried through to the computed metrics verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_name: Option<String>,
}

fn default_sector() -> String {
    FALLBACK_SECTOR.to_string()
}

impl Holding {
    /// Checks the structural invariants of a raw holding.
    ///
    /// Malformed holdings are rejected per item; the caller excludes them
    /// from aggregates but keeps the rejection visible.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.symbol.trim().is_empty() {
            return Err(CoreError::invalid_input("symbol", "symbol must be non-empty"));
        }
        if self.quantity.is_sign_negative() {
            return Err(CoreError::invalid_input(
                "quantity",
                format!("quantity must be >= 0, got {}", self.quantity),
            ));
        }
        if self.avg_buy_price.is_sign_negative() {
            return Err(CoreError::invalid_input(
                "avgBuyPrice",
                format!("average buy price must be >= 0, got {}", self.avg_buy_price),
            ));
        }
        Ok(())
    }

    /// A holding with zero quantity is closed and excluded from all aggregates.
    pub fn is_closed(&self) -> bool {
        self.quantity.is_zero()
    }

    /// The sector used for bucketing. Blank labels collapse into "Other".
    pub fn effective_sector(&self) -> &str {
        let sector = self.sector.trim();
        if sector.is_empty() { FALLBACK_SECTOR } else { sector }
    }
}

/// The most recently observed price for a symbol.
///
/// A quote is superseded only by one with a strictly later `observed_at` for
/// the same symbol; arrival order is irrelevant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: Decimal,
    #[serde(rename = "timestamp")]
    pub observed_at: DateTime<Utc>,
}

impl Quote {
    /// Checks the structural invariants of an incoming quote.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.symbol.trim().is_empty() {
            return Err(CoreError::invalid_input("symbol", "symbol must be non-empty"));
        }
        if self.price <= Decimal::ZERO {
            return Err(CoreError::invalid_input(
                "price",
                format!("price must be > 0, got {}", self.price),
            ));
        }
        Ok(())
    }
}

/// The computed view of a single position.
///
/// Derived on every cycle, never stored. All monetary fields carry full
/// precision; rounding happens only at the presentation boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionMetrics {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_name: Option<String>,
    pub sector: String,
    pub quantity: Decimal,
    /// The price actually used for valuation (quote price, or the cost basis
    /// per unit when the symbol has never been priced).
    pub price: Decimal,
    /// quantity * price
    pub value: Decimal,
    /// quantity * avg_buy_price
    pub cost_basis: Decimal,
    /// value - cost_basis
    pub gain: Decimal,
    /// gain / cost_basis * 100, exactly zero when the cost basis is zero.
    pub gain_percent: Decimal,
    /// value / total_value * 100, filled in by the aggregator. Zero when the
    /// portfolio total is zero.
    pub weight: Decimal,
    pub price_source: PriceSource,
}

impl PositionMetrics {
    /// True when the position was valued with a quote older than the
    /// freshness window.
    pub fn is_stale(&self) -> bool {
        self.price_source == PriceSource::Stale
    }

    /// True when no quote was ever seen and the cost basis stood in.
    pub fn is_unpriced(&self) -> bool {
        self.price_source == PriceSource::Unpriced
    }
}

/// A holding that failed validation, surfaced alongside the snapshot so the
/// dashboard can show it instead of silently dropping it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedHolding {
    /// The symbol as supplied; may be empty when that was the problem.
    pub symbol: String,
    pub reason: String,
}

/// Value concentrated in one sector, in first-occurrence order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorBucket {
    pub sector: String,
    pub value: Decimal,
    pub percent_of_portfolio: Decimal,
    /// Strictly above the configured concentration threshold. A sector at
    /// exactly the threshold is not overweight.
    pub overweight: bool,
}

/// A complete derived view of the portfolio for one computation cycle.
///
/// Recomputed from scratch every cycle. Identical inputs produce an
/// identical snapshot, so this struct carries no generated timestamps or ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    /// Sum of position values plus cash (the NAV).
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub total_gain: Decimal,
    /// total_gain / total_cost * 100, zero when the total cost is zero.
    pub total_gain_percent: Decimal,
    pub cash: Decimal,
    /// Valued positions ordered by symbol ascending.
    pub positions: Vec<PositionMetrics>,
    /// Sector buckets in first-occurrence order for stable display.
    pub sector_buckets: Vec<SectorBucket>,
    /// Heuristic 0-10 concentration measure across sectors.
    pub diversification_score: u8,
    pub overweight_sectors: Vec<String>,
    /// Holdings excluded by validation, kept visible for the dashboard.
    pub invalid: Vec<RejectedHolding>,
}

/// Period-over-period change of the portfolio total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioDelta {
    pub absolute: Decimal,
    pub percent: Decimal,
}

impl Default for PortfolioDelta {
    fn default() -> Self {
        Self {
            absolute: Decimal::ZERO,
            percent: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn holding(symbol: &str, quantity: Decimal, avg_buy_price: Decimal) -> Holding {
        Holding {
            symbol: symbol.to_string(),
            quantity,
            avg_buy_price,
            sector: "IT".to_string(),
            stock_name: None,
        }
    }

    #[test]
    fn validate_accepts_well_formed_holding() {
        assert!(holding("TCS", dec!(10), dec!(3000)).validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_symbol() {
        let err = holding("  ", dec!(10), dec!(3000)).validate().unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(field, _) if field == "symbol"));
    }

    #[test]
    fn validate_rejects_negative_quantity() {
        let err = holding("TCS", dec!(-1), dec!(3000)).validate().unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(field, _) if field == "quantity"));
    }

    #[test]
    fn validate_rejects_negative_avg_buy_price() {
        let err = holding("TCS", dec!(10), dec!(-0.01)).validate().unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(field, _) if field == "avgBuyPrice"));
    }

    #[test]
    fn zero_quantity_holding_is_closed() {
        assert!(holding("TCS", dec!(0), dec!(3000)).is_closed());
        assert!(!holding("TCS", dec!(1), dec!(3000)).is_closed());
    }

    #[test]
    fn missing_sector_defaults_to_other() {
        let parsed: Holding =
            serde_json::from_str(r#"{"symbol":"TCS","quantity":10,"avgBuyPrice":3000}"#).unwrap();
        assert_eq!(parsed.sector, FALLBACK_SECTOR);
    }

    #[test]
    fn blank_sector_collapses_to_other() {
        let mut h = holding("TCS", dec!(10), dec!(3000));
        h.sector = "   ".to_string();
        assert_eq!(h.effective_sector(), FALLBACK_SECTOR);
    }

    #[test]
    fn quote_validate_rejects_non_positive_price() {
        let quote = Quote {
            symbol: "TCS".to_string(),
            price: dec!(0),
            observed_at: chrono::Utc::now(),
        };
        assert!(quote.validate().is_err());
    }
}
