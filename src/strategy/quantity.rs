use rust_decimal::{Decimal, RoundingStrategy};

use crate::common::errors::{Result, TraderError};
use crate::config::MarketConfig;

/// Precision applied when the exchange does not publish a step size
pub const DEFAULT_QUANTITY_DP: u32 = 8;

/// Size a buy order
///
/// Spends at most `min(max_fund, available_balance)` and rounds the quantity
/// down to the exchange's minimum tradable unit, so that
/// `quantity * action_price <= available_balance` always holds.
///
/// # Arguments
/// * `max_fund` - Configured spend cap per buy
/// * `action_price` - Price the order is placed at
/// * `available_balance` - Free quote balance fetched this cycle
/// * `step_size` - Minimum tradable unit, `None` for 8 decimal places
pub fn buy_quantity(
    max_fund: Decimal,
    action_price: Decimal,
    available_balance: Decimal,
    step_size: Option<Decimal>,
) -> Result<Decimal> {
    if action_price <= Decimal::ZERO {
        return Err(TraderError::InvalidAmount(format!(
            "cannot size a buy at non-positive price {}",
            action_price
        )));
    }

    let fund = max_fund.min(available_balance);
    if fund <= Decimal::ZERO {
        return Err(TraderError::InvalidAmount(format!(
            "no fund to spend (max_fund {}, balance {})",
            max_fund, available_balance
        )));
    }

    let raw = fund.checked_div(action_price).ok_or_else(|| {
        TraderError::InvalidAmount(format!(
            "buy size overflows: fund {} at price {}",
            fund, action_price
        ))
    })?;
    let quantity = round_down_to_step(raw, step_size)?;
    if quantity <= Decimal::ZERO {
        return Err(TraderError::InvalidAmount(format!(
            "fund {} buys less than one tradable unit at {}",
            fund, action_price
        )));
    }

    Ok(quantity)
}

/// Size a sell order: never more than what is held
pub fn sell_quantity(max_sell: Decimal, held_quantity: Decimal) -> Result<Decimal> {
    if held_quantity <= Decimal::ZERO {
        return Err(TraderError::InvalidAmount(format!(
            "nothing to sell, held quantity is {}",
            held_quantity
        )));
    }
    if max_sell <= Decimal::ZERO {
        return Err(TraderError::InvalidAmount(format!(
            "max_sell must be positive, got {}",
            max_sell
        )));
    }

    Ok(max_sell.min(held_quantity))
}

/// Truncate a quantity to a multiple of `step_size`
///
/// Fails with `InvalidAmount` when the step is too fine to represent the
/// number of steps in `quantity`.
pub fn round_down_to_step(quantity: Decimal, step_size: Option<Decimal>) -> Result<Decimal> {
    match step_size {
        Some(step) if step > Decimal::ZERO => quantity
            .checked_div(step)
            .and_then(|steps| steps.floor().checked_mul(step))
            .map(|q| q.normalize())
            .ok_or_else(|| {
                TraderError::InvalidAmount(format!(
                    "cannot round {} to step {}",
                    quantity, step
                ))
            }),
        _ => Ok(quantity
            .round_dp_with_strategy(DEFAULT_QUANTITY_DP, RoundingStrategy::ToZero)
            .normalize()),
    }
}

/// Sizing limits of one market
#[derive(Debug, Clone, PartialEq)]
pub struct TradeLimits {
    pub max_fund: Decimal,
    pub max_sell: Decimal,
    pub step_size: Option<Decimal>,
}

impl TradeLimits {
    pub fn from_market(config: &MarketConfig) -> Self {
        Self {
            max_fund: config.max_fund,
            max_sell: config.max_sell,
            step_size: config.step_size,
        }
    }

    pub fn buy_quantity(&self, action_price: Decimal, available_balance: Decimal) -> Result<Decimal> {
        buy_quantity(self.max_fund, action_price, available_balance, self.step_size)
    }

    pub fn sell_quantity(&self, held_quantity: Decimal) -> Result<Decimal> {
        sell_quantity(self.max_sell, held_quantity)
    }
}
