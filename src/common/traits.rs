//! Trait definitions for the trading loop's collaborators

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::errors::Result;
use super::types::{MarketSnapshot, OrderResult};
use crate::strategy::CycleReport;

/// Trait for exchange clients (Binance, fakes in tests, ...)
///
/// The trading loop only ever talks to an exchange through this interface.
/// Every call hits the exchange; implementations must not cache prices or
/// balances between calls.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Fetch the current price for a symbol
    async fn fetch_snapshot(&self, symbol: &str) -> Result<MarketSnapshot>;

    /// Available balance of the quote asset used to fund buys
    async fn get_balance(&self) -> Result<Decimal>;

    /// Submit a buy order
    ///
    /// # Arguments
    /// * `symbol` - Traded pair
    /// * `price` - Limit price
    /// * `quantity` - Base asset amount, already sized and positive
    async fn submit_buy(&self, symbol: &str, price: Decimal, quantity: Decimal)
        -> Result<OrderResult>;

    /// Submit a sell order
    async fn submit_sell(
        &self,
        symbol: &str,
        price: Decimal,
        quantity: Decimal,
    ) -> Result<OrderResult>;

    /// Get the name of the exchange
    fn name(&self) -> &'static str;
}

/// Shared exchange handle for dynamic dispatch
pub type SharedExchange = Arc<dyn Exchange>;

/// Trait for consuming the summary row produced by every cycle
pub trait CycleHandler: Send {
    /// Handle the report of a finished cycle
    fn handle_cycle(&mut self, report: &CycleReport);

    /// Called once when the loop stops
    fn on_terminate(&mut self) {}
}
