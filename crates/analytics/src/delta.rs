use core_types::{PortfolioDelta, PortfolioSnapshot};
use rust_decimal::Decimal;

/// Computes the period-over-period change of the portfolio total.
///
/// A missing previous snapshot (first observation) yields a zero delta, and
/// a previous total of zero yields a zero percentage, keeping degenerate
/// baselines out of the normal delta math.
pub fn delta(current: &PortfolioSnapshot, previous: Option<&PortfolioSnapshot>) -> PortfolioDelta {
    let Some(previous) = previous else {
        return PortfolioDelta::default();
    };

    let absolute = current.total_value - previous.total_value;
    let percent = if previous.total_value.is_zero() {
        Decimal::ZERO
    } else {
        absolute / previous.total_value * Decimal::ONE_HUNDRED
    };

    PortfolioDelta { absolute, percent }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(total_value: Decimal) -> PortfolioSnapshot {
        PortfolioSnapshot {
            total_value,
            total_cost: Decimal::ZERO,
            total_gain: Decimal::ZERO,
            total_gain_percent: Decimal::ZERO,
            cash: Decimal::ZERO,
            positions: Vec::new(),
            sector_buckets: Vec::new(),
            diversification_score: 10,
            overweight_sectors: Vec::new(),
            invalid: Vec::new(),
        }
    }

    #[test]
    fn first_observation_yields_a_zero_delta() {
        let d = delta(&snapshot(dec!(40000)), None);
        assert_eq!(d, PortfolioDelta::default());
    }

    #[test]
    fn computes_absolute_and_percent_change() {
        let d = delta(&snapshot(dec!(42000)), Some(&snapshot(dec!(40000))));
        assert_eq!(d.absolute, dec!(2000));
        assert_eq!(d.percent, dec!(5));
    }

    #[test]
    fn losses_come_out_negative() {
        let d = delta(&snapshot(dec!(38000)), Some(&snapshot(dec!(40000))));
        assert_eq!(d.absolute, dec!(-2000));
        assert_eq!(d.percent, dec!(-5));
    }

    #[test]
    fn zero_previous_total_yields_zero_percent() {
        let d = delta(&snapshot(dec!(40000)), Some(&snapshot(Decimal::ZERO)));
        assert_eq!(d.absolute, dec!(40000));
        assert_eq!(d.percent, Decimal::ZERO);
    }
}
