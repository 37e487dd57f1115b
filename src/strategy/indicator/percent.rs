use rust_decimal::Decimal;

use super::{Indicator, IndicatorContext, Verdict};
use crate::common::errors::{Result, TraderError};
use crate::common::types::{ActionType, MarketSnapshot};
use crate::config::PercentConfig;

/// Percent-threshold indicator
///
/// Buys after the price has dropped by more than `buy_percent` since the
/// last sell, sells after it has risen by more than `sell_percent` since the
/// last buy.
#[derive(Debug, Clone)]
pub struct PercentIndicator {
    buy_percent: Decimal,
    sell_percent: Decimal,
}

impl PercentIndicator {
    pub fn new(buy_percent: Decimal, sell_percent: Decimal) -> Result<Self> {
        if buy_percent <= Decimal::ZERO || sell_percent <= Decimal::ZERO {
            return Err(TraderError::Configuration(format!(
                "percent thresholds must be positive (buy {}, sell {})",
                buy_percent, sell_percent
            )));
        }
        Ok(Self {
            buy_percent,
            sell_percent,
        })
    }

    pub fn from_config(config: &PercentConfig) -> Result<Self> {
        Self::new(
            config.buy_percent.unwrap_or(config.default_percent),
            config.sell_percent.unwrap_or(config.default_percent),
        )
    }
}

impl Indicator for PercentIndicator {
    fn name(&self) -> &str {
        "percent"
    }

    fn threshold(&self, direction: ActionType) -> Decimal {
        match direction {
            ActionType::Buy => self.buy_percent,
            _ => self.sell_percent,
        }
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot, ctx: IndicatorContext) -> Verdict {
        let price = snapshot.price;
        if ctx.reference_price <= Decimal::ZERO {
            return Verdict::idle(price);
        }

        let change = (price - ctx.reference_price) / ctx.reference_price * Decimal::ONE_HUNDRED;

        if ctx.is_holding() {
            if change > self.sell_percent {
                return Verdict::sell(price);
            }
        } else if -change > self.buy_percent {
            return Verdict::buy(price);
        }

        Verdict::idle(price)
    }
}
