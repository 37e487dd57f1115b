//! REST client for the Binance spot API

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::auth::{signed_query, API_KEY_HEADER};
use super::messages::*;
use crate::common::errors::{Result, TraderError};
use crate::common::traits::Exchange;
use crate::common::types::{MarketSnapshot, OrderResult};
use crate::config::{ApiCredentials, MarketConfig};

/// Order side as spelled by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

/// REST client for Binance spot trading
#[derive(Debug, Clone)]
pub struct BinanceClient {
    /// HTTP client
    client: Client,
    /// Base URL for the REST API
    base_url: String,
    /// Asset whose free balance funds buys
    quote_asset: String,
    /// Signed request validity window
    recv_window_ms: u64,
    /// Optional API credentials for signed endpoints
    credentials: Option<ApiCredentials>,
}

impl BinanceClient {
    /// Create a new client (unauthenticated)
    pub fn new(base_url: &str, quote_asset: &str) -> Result<Self> {
        Self::with_timeout(base_url, quote_asset, Duration::from_secs(30))
    }

    /// Create a new client with custom timeout
    pub fn with_timeout(base_url: &str, quote_asset: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TraderError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            quote_asset: quote_asset.to_uppercase(),
            recv_window_ms: 5000,
            credentials: None,
        })
    }

    /// Create a client from a market configuration section
    pub fn from_config(config: &MarketConfig) -> Result<Self> {
        let client = Self::with_timeout(
            &config.rest_url,
            &config.quote_asset,
            Duration::from_secs(config.request_timeout_seconds),
        )?
        .with_recv_window(config.recv_window_ms);

        Ok(match (&config.api_key, &config.api_secret) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                client.with_credentials(ApiCredentials::new(key.clone(), secret.clone()))
            }
            _ => client,
        })
    }

    /// Set API credentials for signed requests
    pub fn with_credentials(mut self, credentials: ApiCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_recv_window(mut self, recv_window_ms: u64) -> Self {
        self.recv_window_ms = recv_window_ms;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn credentials(&self) -> Result<&ApiCredentials> {
        self.credentials.as_ref().ok_or_else(|| {
            TraderError::Authentication("API key and secret are required".to_string())
        })
    }

    fn signed(&self, params: &[(&str, String)]) -> Result<(String, &ApiCredentials)> {
        let credentials = self.credentials()?;
        let query = signed_query(
            &credentials.api_secret,
            params,
            self.recv_window_ms,
            chrono::Utc::now().timestamp_millis(),
        )?;
        Ok((query, credentials))
    }

    // ========================================================================
    // Public Endpoints (No Authentication Required)
    // ========================================================================

    /// Get the latest price for a symbol
    #[instrument(skip(self))]
    pub async fn get_ticker_price(&self, symbol: &str) -> Result<Decimal> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        debug!("Fetching price from: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await?;
        let ticker: TickerPriceResponse = Self::parse(response).await?;

        ticker
            .price
            .parse()
            .map_err(|e| TraderError::InvalidResponse(format!("Invalid price: {}", e)))
    }

    // ========================================================================
    // Signed Endpoints
    // ========================================================================

    /// Free balance of an asset
    #[instrument(skip(self))]
    pub async fn get_asset_balance(&self, asset: &str) -> Result<Decimal> {
        let (query, credentials) = self.signed(&[])?;
        let url = format!("{}/api/v3/account?{}", self.base_url, query);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &credentials.api_key)
            .send()
            .await?;
        let account: AccountResponse = Self::parse(response).await?;

        match account.balances.iter().find(|b| b.asset.eq_ignore_ascii_case(asset)) {
            Some(balance) => balance
                .free
                .parse()
                .map_err(|e| TraderError::InvalidResponse(format!("Invalid balance: {}", e))),
            None => Ok(Decimal::ZERO),
        }
    }

    /// Place a GTC limit order
    #[instrument(skip(self))]
    async fn place_limit_order(
        &self,
        side: OrderSide,
        symbol: &str,
        price: Decimal,
        quantity: Decimal,
    ) -> Result<OrderResult> {
        let params = [
            ("symbol", symbol.to_string()),
            ("side", side.as_str().to_string()),
            ("type", "LIMIT".to_string()),
            ("timeInForce", "GTC".to_string()),
            ("quantity", quantity.normalize().to_string()),
            ("price", price.normalize().to_string()),
        ];
        let (query, credentials) = self.signed(&params)?;
        let url = format!("{}/api/v3/order?{}", self.base_url, query);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &credentials.api_key)
            .send()
            .await?;
        let order: OrderResponse = Self::parse(response).await?;

        info!(
            "{} order {} accepted for {} {} @ {}",
            side.as_str(),
            order.order_id,
            quantity,
            symbol,
            price
        );

        let executed_quantity = match order.executed_qty.as_deref() {
            Some(qty) => qty
                .parse()
                .map_err(|e| TraderError::InvalidResponse(format!("Invalid executedQty: {}", e)))?,
            None => Decimal::ZERO,
        };

        Ok(OrderResult {
            order_id: order.order_id.to_string(),
            symbol: order.symbol,
            status: order.status.unwrap_or_else(|| "NEW".to_string()),
            executed_quantity,
        })
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    /// Decode a successful body or turn an error response into a TraderError
    async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT {
            let retry_after_seconds = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(TraderError::RateLimit {
                message: body,
                retry_after_seconds,
            });
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_error) if status == StatusCode::UNAUTHORIZED => Err(
                TraderError::Authentication(format!("{} ({})", api_error.msg, api_error.code)),
            ),
            Ok(api_error) => Err(TraderError::Exchange(format!(
                "{} (code {}, status {})",
                api_error.msg, api_error.code, status
            ))),
            Err(_) => Err(TraderError::InvalidResponse(format!(
                "Server returned status {}: {}",
                status, body
            ))),
        }
    }
}

#[async_trait]
impl Exchange for BinanceClient {
    async fn fetch_snapshot(&self, symbol: &str) -> Result<MarketSnapshot> {
        let price = self.get_ticker_price(symbol).await?;
        Ok(MarketSnapshot::new(symbol, price))
    }

    async fn get_balance(&self) -> Result<Decimal> {
        self.get_asset_balance(&self.quote_asset).await
    }

    async fn submit_buy(
        &self,
        symbol: &str,
        price: Decimal,
        quantity: Decimal,
    ) -> Result<OrderResult> {
        self.place_limit_order(OrderSide::Buy, symbol, price, quantity)
            .await
    }

    async fn submit_sell(
        &self,
        symbol: &str,
        price: Decimal,
        quantity: Decimal,
    ) -> Result<OrderResult> {
        self.place_limit_order(OrderSide::Sell, symbol, price, quantity)
            .await
    }

    fn name(&self) -> &'static str {
        "binance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = BinanceClient::new("https://api.binance.com", "usdt");
        assert!(client.is_ok());
        assert_eq!(client.unwrap().quote_asset, "USDT");
    }

    #[test]
    fn test_url_normalization() {
        let client = BinanceClient::new("https://api.binance.com/", "USDT").unwrap();
        assert!(!client.base_url.ends_with('/'));
    }

    #[tokio::test]
    async fn test_signed_call_without_credentials() {
        let client = BinanceClient::new("http://127.0.0.1:9", "USDT").unwrap();
        let err = client.get_balance().await.unwrap_err();
        assert!(matches!(err, TraderError::Authentication(_)));
    }
}
