//! Exchange providers
//!
//! The trading loop sees exchanges only through
//! [`Exchange`](crate::common::traits::Exchange). This module maps a
//! configured market identifier onto a concrete client.

pub mod binance;

pub use binance::BinanceClient;

use std::sync::Arc;
use tracing::info;

use crate::common::errors::{Result, TraderError};
use crate::common::traits::SharedExchange;
use crate::config::AppConfig;

/// Market identifiers with a client implementation
pub const KNOWN_MARKETS: &[&str] = &["binance"];

/// Build the exchange client for a configured market
///
/// Fails with a configuration error when the market has no section in the
/// configuration or no client implementation.
pub fn build_exchange(market_id: &str, config: &AppConfig) -> Result<SharedExchange> {
    let market = config.market(market_id)?;

    let exchange: SharedExchange = match market_id {
        "binance" => Arc::new(BinanceClient::from_config(market)?),
        other => {
            return Err(TraderError::Configuration(format!(
                "no exchange client for market '{}' (known: {})",
                other,
                KNOWN_MARKETS.join(", ")
            )))
        }
    };

    info!("Using {} exchange at market '{}'", exchange.name(), market_id);
    Ok(exchange)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(json: &str) -> AppConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_build_binance() {
        let config = config(r#"{"markets": {"binance": {"max_fund": "10", "max_sell": "1"}}}"#);
        let exchange = build_exchange("binance", &config).unwrap();
        assert_eq!(exchange.name(), "binance");
    }

    #[test]
    fn test_unconfigured_market() {
        let config = config("{}");
        let err = build_exchange("binance", &config).err().unwrap();
        assert!(matches!(err, TraderError::Configuration(_)));
    }

    #[test]
    fn test_configured_but_unsupported_market() {
        let config = config(r#"{"markets": {"kraken": {"max_fund": "10", "max_sell": "1"}}}"#);
        let err = build_exchange("kraken", &config).err().unwrap();
        assert!(matches!(err, TraderError::Configuration(_)));
    }
}
