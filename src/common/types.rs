//! Value types shared by the exchange, the journal and the trading loop

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::errors::TraderError;

/// Kind of decision taken in one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Buy,
    Sell,
    /// No trade this cycle. Never persisted.
    Idle,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Buy => "buy",
            ActionType::Sell => "sell",
            ActionType::Idle => "idle",
        }
    }

    /// True for the two trading kinds
    pub fn is_trade(&self) -> bool {
        !matches!(self, ActionType::Idle)
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Buy => write!(f, "BUY"),
            ActionType::Sell => write!(f, "SELL"),
            ActionType::Idle => write!(f, "IDLE"),
        }
    }
}

impl FromStr for ActionType {
    type Err = TraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(ActionType::Buy),
            "sell" => Ok(ActionType::Sell),
            "idle" => Ok(ActionType::Idle),
            other => Err(TraderError::MalformedRecord(format!(
                "unknown action type '{}'",
                other
            ))),
        }
    }
}

/// Fresh market state fetched once per cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Traded pair, e.g. BTCUSDT
    pub symbol: String,
    /// Last traded price
    pub price: Decimal,
    /// When the price was observed
    pub timestamp: DateTime<Utc>,
}

impl MarketSnapshot {
    pub fn new(symbol: impl Into<String>, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            timestamp: Utc::now(),
        }
    }
}

/// Exchange acknowledgement of a submitted order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    /// Exchange-assigned order identifier
    pub order_id: String,
    pub symbol: String,
    /// Order status as reported by the exchange (NEW, FILLED, ...)
    pub status: String,
    /// Quantity already executed at acknowledgement time
    pub executed_quantity: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_type_parsing() {
        assert_eq!("buy".parse::<ActionType>().unwrap(), ActionType::Buy);
        assert_eq!(" SELL ".parse::<ActionType>().unwrap(), ActionType::Sell);
        assert!("hold".parse::<ActionType>().is_err());
    }

    #[test]
    fn test_action_type_serde_is_lowercase() {
        let json = serde_json::to_string(&ActionType::Sell).unwrap();
        assert_eq!(json, "\"sell\"");
        assert!(ActionType::Buy.is_trade());
        assert!(!ActionType::Idle.is_trade());
    }
}
