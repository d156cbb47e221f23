use crate::error::AnalyticsError;
use core_types::{Holding, PositionMetrics, PriceSource};
use quote_cache::Lookup;
use rust_decimal::Decimal;

/// Computes the position-level metrics for one holding and its price lookup.
///
/// Pure function: the same holding and lookup always produce the same
/// metrics. All values are computed at full precision; rounding belongs to
/// the presentation boundary.
///
/// Fallback rules:
/// - `Lookup::Stale` values the position at the stale price and flags it.
/// - `Lookup::Unknown` falls back to the cost basis per unit, so the
///   position reports zero gain and is flagged unpriced.
///
/// A holding with negative quantity or price, or an empty symbol, is
/// rejected with `InvalidInput`; the caller excludes it from aggregates while
/// keeping the rejection visible.
pub fn valuate(holding: &Holding, lookup: &Lookup) -> Result<PositionMetrics, AnalyticsError> {
    holding.validate()?;

    let cost_basis = holding.quantity * holding.avg_buy_price;

    let (price, value, gain, price_source) = match lookup {
        Lookup::Fresh(quote) | Lookup::Stale(quote) => {
            quote.validate()?;
            let value = holding.quantity * quote.price;
            let source = if lookup.is_stale() {
                PriceSource::Stale
            } else {
                PriceSource::Fresh
            };
            (quote.price, value, value - cost_basis, source)
        }
        // Never-priced symbol: the cost basis stands in for display, and the
        // position carries no gain until a real quote arrives.
        Lookup::Unknown => (
            holding.avg_buy_price,
            cost_basis,
            Decimal::ZERO,
            PriceSource::Unpriced,
        ),
    };

    // A freshly-opened zero-cost position reports no percentage.
    let gain_percent = if cost_basis.is_zero() {
        Decimal::ZERO
    } else {
        gain / cost_basis * Decimal::ONE_HUNDRED
    };

    Ok(PositionMetrics {
        symbol: holding.symbol.clone(),
        stock_name: holding.stock_name.clone(),
        sector: holding.effective_sector().to_string(),
        quantity: holding.quantity,
        price,
        value,
        cost_basis,
        gain,
        gain_percent,
        // Weight is the aggregator's job; it is the single place weights are
        // computed so no two screens can disagree.
        weight: Decimal::ZERO,
        price_source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::Quote;
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

    fn fresh(symbol: &str, price: Decimal) -> Lookup {
        Lookup::Fresh(Quote {
            symbol: symbol.to_string(),
            price,
            observed_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        })
    }

    #[test]
    fn values_a_position_against_a_fresh_quote() {
        let metrics = valuate(&holding("TCS", dec!(10), dec!(3000)), &fresh("TCS", dec!(3200))).unwrap();

        assert_eq!(metrics.value, dec!(32000));
        assert_eq!(metrics.cost_basis, dec!(30000));
        assert_eq!(metrics.gain, dec!(2000));
        assert_eq!(metrics.gain_percent.round_dp(2), dec!(6.67));
        assert_eq!(metrics.price_source, PriceSource::Fresh);
    }

    #[test]
    fn losing_position_reports_negative_gain() {
        let metrics = valuate(&holding("HDFC", dec!(5), dec!(1500)), &fresh("HDFC", dec!(1400))).unwrap();

        assert_eq!(metrics.value, dec!(7000));
        assert_eq!(metrics.gain, dec!(-500));
        assert_eq!(metrics.gain_percent.round_dp(2), dec!(-6.67));
    }

    #[test]
    fn zero_cost_basis_reports_zero_percent_not_nan() {
        let metrics = valuate(&holding("FREE", dec!(10), dec!(0)), &fresh("FREE", dec!(50))).unwrap();

        assert_eq!(metrics.gain, dec!(500));
        assert_eq!(metrics.gain_percent, Decimal::ZERO);
    }

    #[test]
    fn zero_quantity_reports_zero_percent_not_nan() {
        let metrics = valuate(&holding("TCS", dec!(0), dec!(3000)), &fresh("TCS", dec!(3200))).unwrap();

        assert_eq!(metrics.cost_basis, Decimal::ZERO);
        assert_eq!(metrics.gain_percent, Decimal::ZERO);
    }

    #[test]
    fn stale_quote_still_values_the_position() {
        let lookup = Lookup::Stale(Quote {
            symbol: "TCS".to_string(),
            price: dec!(3100),
            observed_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        });
        let metrics = valuate(&holding("TCS", dec!(10), dec!(3000)), &lookup).unwrap();

        assert_eq!(metrics.value, dec!(31000));
        assert!(metrics.is_stale());
    }

    #[test]
    fn unknown_price_falls_back_to_cost_basis() {
        let metrics = valuate(&holding("TCS", dec!(10), dec!(3000)), &Lookup::Unknown).unwrap();

        assert_eq!(metrics.price, dec!(3000));
        assert_eq!(metrics.value, dec!(30000));
        assert_eq!(metrics.gain, Decimal::ZERO);
        assert_eq!(metrics.gain_percent, Decimal::ZERO);
        assert!(metrics.is_unpriced());
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let result = valuate(&holding("TCS", dec!(-1), dec!(3000)), &fresh("TCS", dec!(3200)));
        assert!(matches!(result, Err(AnalyticsError::InvalidInput(_))));
    }

    #[test]
    fn blank_sector_lands_in_the_other_bucket() {
        let mut h = holding("TCS", dec!(10), dec!(3000));
        h.sector = String::new();
        let metrics = valuate(&h, &fresh("TCS", dec!(3200))).unwrap();
        assert_eq!(metrics.sector, core_types::FALLBACK_SECTOR);
    }
}
