//! Configuration types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::common::errors::{Result, TraderError};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// General trader settings
    #[serde(default)]
    pub trader: TraderSettings,
    /// Exchange markets keyed by identifier (e.g. `binance`)
    #[serde(default)]
    pub markets: HashMap<String, MarketConfig>,
    /// Indicator parameters
    #[serde(default)]
    pub indicators: IndicatorsConfig,
    /// Database configuration (optional, selects the Postgres journal)
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    /// Look up a market section, failing for unknown identifiers
    pub fn market(&self, market_id: &str) -> Result<&MarketConfig> {
        self.markets.get(market_id).ok_or_else(|| {
            TraderError::Configuration(format!("unknown market '{}'", market_id))
        })
    }
}

/// How journal files are partitioned on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogPartition {
    /// One file per traded symbol
    #[default]
    Symbol,
    /// One file per calendar day
    Date,
}

/// General trader settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraderSettings {
    /// Directory holding the journal files
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// Journal file partitioning
    #[serde(default)]
    pub log_type: LogPartition,
    /// Whether non-idle dry-run actions are written to the journal
    #[serde(default = "default_persist_dry_run")]
    pub persist_dry_run: bool,
}

impl Default for TraderSettings {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            log_type: LogPartition::default(),
            persist_dry_run: default_persist_dry_run(),
        }
    }
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_persist_dry_run() -> bool {
    true
}

/// Exchange market configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Base URL for the REST API
    #[serde(default = "default_binance_rest_url")]
    pub rest_url: String,
    /// API key for authenticated requests
    #[serde(default)]
    pub api_key: Option<String>,
    /// API secret for signing requests
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Asset funding buys (its free balance is the available balance)
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,
    /// Maximum quote amount spent by a single buy
    pub max_fund: Decimal,
    /// Maximum base amount sold by a single sell
    pub max_sell: Decimal,
    /// Minimum tradable unit of the base asset
    #[serde(default)]
    pub step_size: Option<Decimal>,
    /// Signed request validity window in milliseconds
    #[serde(default = "default_recv_window")]
    pub recv_window_ms: u64,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_binance_rest_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_quote_asset() -> String {
    "USDT".to_string()
}

fn default_recv_window() -> u64 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

/// Indicator parameters keyed by indicator family
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorsConfig {
    #[serde(default)]
    pub percent: Option<PercentConfig>,
    #[serde(default)]
    pub moving_average: Option<MovingAverageConfig>,
}

/// Parameters of the percent-threshold indicator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PercentConfig {
    /// Threshold used for both directions unless overridden
    pub default_percent: Decimal,
    /// Drop (in percent) required before buying
    #[serde(default)]
    pub buy_percent: Option<Decimal>,
    /// Rise (in percent) required before selling
    #[serde(default)]
    pub sell_percent: Option<Decimal>,
}

/// Parameters of the moving-average band indicator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingAverageConfig {
    /// Number of samples in the rolling window
    pub window: usize,
    /// Distance from the average (in percent) that triggers a trade
    pub band_percent: Decimal,
}

/// Database configuration for the action journal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_seconds: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_connection_timeout() -> u64 {
    30
}

/// API credentials for authenticated requests
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl ApiCredentials {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }
}
