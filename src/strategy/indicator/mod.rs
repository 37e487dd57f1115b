//! Signal indicators
//!
//! An indicator turns the latest market snapshot into a proposed
//! [`ActionType`]. It owns whatever rolling state it needs; the trading loop
//! only looks at the returned [`Verdict`].

mod moving_average;
mod percent;

pub use moving_average::MovingAverageIndicator;
pub use percent::PercentIndicator;

use rust_decimal::Decimal;

use crate::common::errors::{Result, TraderError};
use crate::common::types::{ActionType, MarketSnapshot};
use crate::config::IndicatorsConfig;

/// What the loop tells the indicator about the current reference action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorContext {
    /// Price of the last non-idle action
    pub reference_price: Decimal,
    /// Type of the last non-idle action
    pub reference_type: ActionType,
}

impl IndicatorContext {
    pub fn is_holding(&self) -> bool {
        self.reference_type == ActionType::Buy
    }
}

/// Indicator output for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub proposed: ActionType,
    /// Price that triggered the proposal
    pub trigger_price: Decimal,
}

impl Verdict {
    pub fn idle(price: Decimal) -> Self {
        Self {
            proposed: ActionType::Idle,
            trigger_price: price,
        }
    }

    pub fn buy(price: Decimal) -> Self {
        Self {
            proposed: ActionType::Buy,
            trigger_price: price,
        }
    }

    pub fn sell(price: Decimal) -> Self {
        Self {
            proposed: ActionType::Sell,
            trigger_price: price,
        }
    }
}

/// Core indicator trait
///
/// Calls are strictly sequential for a given symbol, so implementations
/// can keep plain mutable state without synchronisation.
#[cfg_attr(test, mockall::automock)]
pub trait Indicator: Send {
    /// Identifier used in configuration
    fn name(&self) -> &str;

    /// Configured trigger threshold for a move in `direction`, in percent,
    /// shown in the cycle summary
    fn threshold(&self, direction: ActionType) -> Decimal;

    /// Evaluate the latest snapshot against the reference action
    fn evaluate(&mut self, snapshot: &MarketSnapshot, ctx: IndicatorContext) -> Verdict;
}

/// Boxed indicator for dynamic dispatch
pub type BoxedIndicator = Box<dyn Indicator>;

/// Build the indicator selected by `id`
///
/// Unknown identifiers and missing parameter sections are configuration
/// errors; the selection never changes during a run.
pub fn build_indicator(id: &str, config: &IndicatorsConfig) -> Result<BoxedIndicator> {
    match id {
        "percent" => {
            let params = config.percent.as_ref().ok_or_else(|| {
                TraderError::Configuration("missing [indicators.percent] section".to_string())
            })?;
            Ok(Box::new(PercentIndicator::from_config(params)?))
        }
        "moving_average" => {
            let params = config.moving_average.as_ref().ok_or_else(|| {
                TraderError::Configuration(
                    "missing [indicators.moving_average] section".to_string(),
                )
            })?;
            Ok(Box::new(MovingAverageIndicator::from_config(params)?))
        }
        other => Err(TraderError::Configuration(format!(
            "unknown indicator '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MovingAverageConfig, PercentConfig};
    use rust_decimal_macros::dec;

    #[test]
    fn test_build_known_indicators() {
        let config = IndicatorsConfig {
            percent: Some(PercentConfig {
                default_percent: dec!(2),
                buy_percent: None,
                sell_percent: None,
            }),
            moving_average: Some(MovingAverageConfig {
                window: 5,
                band_percent: dec!(1),
            }),
        };

        assert_eq!(build_indicator("percent", &config).unwrap().name(), "percent");
        assert_eq!(
            build_indicator("moving_average", &config).unwrap().name(),
            "moving_average"
        );
    }

    #[test]
    fn test_unknown_indicator_is_configuration_error() {
        let err = build_indicator("rsi", &IndicatorsConfig::default()).err().unwrap();
        assert!(matches!(err, TraderError::Configuration(_)));
    }

    #[test]
    fn test_missing_section_is_configuration_error() {
        let err = build_indicator("percent", &IndicatorsConfig::default()).err().unwrap();
        assert!(matches!(err, TraderError::Configuration(_)));
    }
}
