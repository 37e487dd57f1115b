use rust_decimal::Decimal;
use std::collections::VecDeque;

use super::{Indicator, IndicatorContext, Verdict};
use crate::common::errors::{Result, TraderError};
use crate::common::types::{ActionType, MarketSnapshot};
use crate::config::MovingAverageConfig;

/// Moving-average band indicator
///
/// Keeps the last `window` prices. Once the window is full it buys when the
/// price sits more than `band_percent` below the simple average and sells
/// when it sits more than `band_percent` above it.
#[derive(Debug, Clone)]
pub struct MovingAverageIndicator {
    window: usize,
    band_percent: Decimal,
    prices: VecDeque<Decimal>,
}

impl MovingAverageIndicator {
    pub fn new(window: usize, band_percent: Decimal) -> Result<Self> {
        if window == 0 {
            return Err(TraderError::Configuration(
                "moving_average window must be at least 1".to_string(),
            ));
        }
        if band_percent < Decimal::ZERO {
            return Err(TraderError::Configuration(format!(
                "moving_average band must not be negative, got {}",
                band_percent
            )));
        }
        Ok(Self {
            window,
            band_percent,
            prices: VecDeque::with_capacity(window),
        })
    }

    pub fn from_config(config: &MovingAverageConfig) -> Result<Self> {
        Self::new(config.window, config.band_percent)
    }

    /// Average of the current window, `None` until it is full
    pub fn average(&self) -> Option<Decimal> {
        if self.prices.len() < self.window {
            return None;
        }
        let sum: Decimal = self.prices.iter().sum();
        Some(sum / Decimal::from(self.prices.len()))
    }

    fn push(&mut self, price: Decimal) {
        if self.prices.len() == self.window {
            self.prices.pop_front();
        }
        self.prices.push_back(price);
    }
}

impl Indicator for MovingAverageIndicator {
    fn name(&self) -> &str {
        "moving_average"
    }

    fn threshold(&self, _direction: ActionType) -> Decimal {
        self.band_percent
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot, ctx: IndicatorContext) -> Verdict {
        let price = snapshot.price;
        self.push(price);

        let Some(average) = self.average() else {
            return Verdict::idle(price);
        };

        let band = average * self.band_percent / Decimal::ONE_HUNDRED;

        if ctx.is_holding() {
            if price > average + band {
                return Verdict::sell(price);
            }
        } else if price < average - band {
            return Verdict::buy(price);
        }

        Verdict::idle(price)
    }
}
