//! SignalTrader Library
//!
//! An autonomous trading loop: poll an exchange price, ask an indicator
//! for a buy/sell/idle verdict, size and submit the order, and journal
//! every action taken.

pub mod common;
pub mod config;
pub mod exchange;
pub mod journal;
pub mod strategy;

// Re-export commonly used types
pub use common::display::TableReporter;
pub use common::errors::{Result, TraderError};
pub use common::traits::{CycleHandler, Exchange, SharedExchange};
pub use common::types::{ActionType, MarketSnapshot, OrderResult};
pub use config::types::AppConfig;
pub use exchange::binance::BinanceClient;
pub use journal::{ActionLog, ActionRecord, FileJournal, InMemoryJournal, LogQuery, PgJournal};

// Strategy types
pub use strategy::{
    bootstrap, build_indicator, Action, BoxedIndicator, CycleReport, CycleStatus, FixedResolver,
    Indicator, IntervalTicker, LoopSettings, LoopState, PromptResolver, ReferenceResolver,
    Ticker, TradeLimits, TradingLoop,
};
