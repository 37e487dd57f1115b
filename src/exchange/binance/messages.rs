//! Binance REST response types

use serde::{Deserialize, Serialize};

/// `GET /api/v3/ticker/price`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerPriceResponse {
    pub symbol: String,
    pub price: String,
}

/// `GET /api/v3/account`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    #[serde(default)]
    pub balances: Vec<AssetBalance>,
}

/// One asset line of the account response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetBalance {
    pub asset: String,
    pub free: String,
    pub locked: String,
}

/// `POST /api/v3/order` acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub symbol: String,
    pub order_id: u64,
    #[serde(default)]
    pub client_order_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub executed_qty: Option<String>,
}

/// Error body returned with non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub code: i64,
    pub msg: String,
}
