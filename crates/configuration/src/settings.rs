use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::error::ConfigError;

/// The root configuration structure for the analytics engine.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub scheduler: Scheduler,
    pub quotes: Quotes,
    pub concentration: Concentration,
}

/// Contains parameters for the external refresh driver.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Scheduler {
    /// How often the `watch` driver supplies a new quote batch, in seconds.
    pub refresh_interval_secs: u64,
}

/// Contains parameters governing quote freshness.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Quotes {
    /// The maximum age a quote may have before it is flagged stale, in seconds.
    pub freshness_window_secs: i64,
}

/// Contains the sector-concentration thresholds used by the aggregator and
/// the diversification scorer.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Concentration {
    /// A sector strictly above this share of the portfolio is overweight.
    pub overweight_threshold_pct: Decimal,
    /// An additional scoring penalty applies when the single largest sector
    /// exceeds this share.
    pub dominant_threshold_pct: Decimal,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheduler: Scheduler::default(),
            quotes: Quotes::default(),
            concentration: Concentration::default(),
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 3,
        }
    }
}

impl Default for Quotes {
    fn default() -> Self {
        Self {
            freshness_window_secs: 60,
        }
    }
}

impl Default for Concentration {
    fn default() -> Self {
        Self {
            overweight_threshold_pct: dec!(30),
            dominant_threshold_pct: dec!(50),
        }
    }
}

impl Config {
    /// Checks that all tunables are in their legal ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.refresh_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "scheduler.refresh_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.quotes.freshness_window_secs <= 0 {
            return Err(ConfigError::ValidationError(
                "quotes.freshness_window_secs must be greater than 0".to_string(),
            ));
        }
        for (name, pct) in [
            (
                "concentration.overweight_threshold_pct",
                self.concentration.overweight_threshold_pct,
            ),
            (
                "concentration.dominant_threshold_pct",
                self.concentration.dominant_threshold_pct,
            ),
        ] {
            if pct <= dec!(0) || pct >= dec!(100) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 0 and 100 (exclusive)"
                )));
            }
        }
        Ok(())
    }
}

impl Scheduler {
    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_interval_secs)
    }
}

impl Quotes {
    pub fn freshness_window(&self) -> Duration {
        Duration::seconds(self.freshness_window_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_refresh_interval_is_rejected() {
        let mut config = Config::default();
        config.scheduler.refresh_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_freshness_window_is_rejected() {
        let mut config = Config::default();
        config.quotes.freshness_window_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut config = Config::default();
        config.concentration.overweight_threshold_pct = dec!(100);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.concentration.dominant_threshold_pct = dec!(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn freshness_window_converts_to_duration() {
        let quotes = Quotes {
            freshness_window_secs: 60,
        };
        assert_eq!(quotes.freshness_window(), Duration::seconds(60));
    }
}
