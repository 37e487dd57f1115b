//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use signal_trader::common::errors::{Result, TraderError};
use signal_trader::common::traits::{CycleHandler, Exchange};
use signal_trader::common::types::{ActionType, MarketSnapshot, OrderResult};
use signal_trader::journal::{ActionLog, ActionRecord, InMemoryJournal, LogQuery};
use signal_trader::strategy::{
    Action, CycleReport, Indicator, IndicatorContext, LoopSettings, Ticker, TradeLimits, Verdict,
};

pub const MARKET: &str = "binance";
pub const SYMBOL: &str = "BTCUSDT";

/// One order the fake exchange received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedOrder {
    pub side: ActionType,
    pub symbol: String,
    pub price: Decimal,
    pub quantity: Decimal,
}

#[derive(Debug, Default)]
struct FakeExchangeState {
    prices: VecDeque<Decimal>,
    last_price: Decimal,
    balance: Decimal,
    fail_orders: bool,
    fail_balance: bool,
    orders: Vec<SubmittedOrder>,
    balance_calls: usize,
}

/// Exchange replaying a scripted price sequence and recording orders
#[derive(Debug, Clone, Default)]
pub struct FakeExchange {
    state: Arc<Mutex<FakeExchangeState>>,
}

impl FakeExchange {
    pub fn new(prices: &[Decimal], balance: Decimal) -> Self {
        let exchange = Self::default();
        {
            let mut state = exchange.state.lock().unwrap();
            state.prices = prices.iter().copied().collect();
            state.last_price = prices.last().copied().unwrap_or(dec!(1));
            state.balance = balance;
        }
        exchange
    }

    /// Reject every order submission
    pub fn failing_orders(self) -> Self {
        self.state.lock().unwrap().fail_orders = true;
        self
    }

    /// Fail balance lookups
    pub fn failing_balance(self) -> Self {
        self.state.lock().unwrap().fail_balance = true;
        self
    }

    pub fn orders(&self) -> Vec<SubmittedOrder> {
        self.state.lock().unwrap().orders.clone()
    }

    pub fn balance_calls(&self) -> usize {
        self.state.lock().unwrap().balance_calls
    }

    fn submit(&self, side: ActionType, symbol: &str, price: Decimal, quantity: Decimal) -> Result<OrderResult> {
        let mut state = self.state.lock().unwrap();
        if state.fail_orders {
            return Err(TraderError::Exchange(
                "Account has insufficient balance for requested action. (code -2010)".to_string(),
            ));
        }
        state.orders.push(SubmittedOrder {
            side,
            symbol: symbol.to_string(),
            price,
            quantity,
        });
        Ok(OrderResult {
            order_id: state.orders.len().to_string(),
            symbol: symbol.to_string(),
            status: "FILLED".to_string(),
            executed_quantity: quantity,
        })
    }
}

#[async_trait]
impl Exchange for FakeExchange {
    async fn fetch_snapshot(&self, symbol: &str) -> Result<MarketSnapshot> {
        let mut state = self.state.lock().unwrap();
        let price = state.prices.pop_front().unwrap_or(state.last_price);
        Ok(MarketSnapshot::new(symbol, price))
    }

    async fn get_balance(&self) -> Result<Decimal> {
        let mut state = self.state.lock().unwrap();
        state.balance_calls += 1;
        if state.fail_balance {
            return Err(TraderError::Authentication("API key and secret are required".to_string()));
        }
        Ok(state.balance)
    }

    async fn submit_buy(&self, symbol: &str, price: Decimal, quantity: Decimal) -> Result<OrderResult> {
        self.submit(ActionType::Buy, symbol, price, quantity)
    }

    async fn submit_sell(&self, symbol: &str, price: Decimal, quantity: Decimal) -> Result<OrderResult> {
        self.submit(ActionType::Sell, symbol, price, quantity)
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Indicator replaying a fixed list of proposals, then idling
#[derive(Debug)]
pub struct ScriptedIndicator {
    proposals: VecDeque<ActionType>,
    pub contexts: Arc<Mutex<Vec<IndicatorContext>>>,
}

impl ScriptedIndicator {
    pub fn new(proposals: &[ActionType]) -> Self {
        Self {
            proposals: proposals.iter().copied().collect(),
            contexts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Indicator for ScriptedIndicator {
    fn name(&self) -> &str {
        "scripted"
    }

    fn threshold(&self, _direction: ActionType) -> Decimal {
        dec!(5)
    }

    fn evaluate(&mut self, snapshot: &MarketSnapshot, ctx: IndicatorContext) -> Verdict {
        self.contexts.lock().unwrap().push(ctx);
        match self.proposals.pop_front() {
            Some(ActionType::Buy) => Verdict::buy(snapshot.price),
            Some(ActionType::Sell) => Verdict::sell(snapshot.price),
            _ => Verdict::idle(snapshot.price),
        }
    }
}

/// Ticker firing a fixed number of times without waiting
#[derive(Debug)]
pub struct CountingTicker {
    remaining: usize,
    pub ticks: usize,
}

impl CountingTicker {
    pub fn new(cycles: usize) -> Self {
        Self {
            remaining: cycles,
            ticks: 0,
        }
    }
}

#[async_trait]
impl Ticker for CountingTicker {
    async fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.ticks += 1;
        true
    }
}

/// Handler keeping every report
#[derive(Debug, Default)]
pub struct CollectingHandler {
    pub reports: Vec<CycleReport>,
    pub terminated: bool,
}

impl CycleHandler for CollectingHandler {
    fn handle_cycle(&mut self, report: &CycleReport) {
        self.reports.push(report.clone());
    }

    fn on_terminate(&mut self) {
        self.terminated = true;
    }
}

/// Journal whose appends always fail
#[derive(Debug, Default)]
pub struct BrokenJournal {
    inner: InMemoryJournal,
}

#[async_trait]
impl ActionLog for BrokenJournal {
    async fn append(&self, _record: &ActionRecord) -> Result<()> {
        Err(TraderError::Persistence("disk full".to_string()))
    }

    async fn query(&self, query: &LogQuery) -> Result<Vec<ActionRecord>> {
        self.inner.query(query).await
    }
}

pub fn settings(dry_run: bool) -> LoopSettings {
    LoopSettings {
        market: MARKET.to_string(),
        symbol: SYMBOL.to_string(),
        limits: TradeLimits {
            max_fund: dec!(1000),
            max_sell: dec!(1),
            step_size: Some(dec!(0.0001)),
        },
        dry_run,
        persist_dry_run: true,
    }
}

/// BUY reference at 100 holding 0.5
pub fn holding_reference() -> Action {
    Action::seed(ActionType::Buy, MARKET, SYMBOL, dec!(100), Some(dec!(0.5)), 1_700_000_000)
        .unwrap()
}

/// SELL reference at 100, nothing held
pub fn flat_reference() -> Action {
    Action::seed(ActionType::Sell, MARKET, SYMBOL, dec!(100), None, 1_700_000_000).unwrap()
}
