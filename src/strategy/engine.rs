//! The decision-and-execution cycle

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::future::Future;
use tracing::{debug, error, info, warn};

use super::action::Action;
use super::indicator::{BoxedIndicator, IndicatorContext};
use super::quantity::TradeLimits;
use super::ticker::Ticker;
use crate::common::errors::{Result, TraderError};
use crate::common::traits::{CycleHandler, SharedExchange};
use crate::common::types::ActionType;
use crate::journal::SharedActionLog;

/// Static parameters of one trading loop
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub market: String,
    pub symbol: String,
    pub limits: TradeLimits,
    /// Compute and display decisions without submitting orders
    pub dry_run: bool,
    /// Journal non-idle dry-run actions
    pub persist_dry_run: bool,
}

/// Lifecycle of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No reference action known yet
    AwaitingReference,
    /// Polling
    Running,
    /// Stopped by signal or exhausted schedule
    Terminated,
}

/// How a cycle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleStatus {
    /// Indicator proposed nothing
    Idle,
    /// Proposal blocked by the position guard
    Suppressed(String),
    /// Order accepted by the exchange and journaled
    Executed { order_id: String },
    /// Dry run: sized but not submitted
    Simulated,
    /// Trade attempt aborted; nothing was journaled
    Failed(String),
    /// Trade happened but the journal write failed
    Unrecorded(String),
}

/// Summary row emitted once per cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleRow {
    pub action_type: ActionType,
    pub previous_price: Decimal,
    pub action_price: Decimal,
    pub symbol: String,
    pub quantity: Option<Decimal>,
    /// Indicator threshold for the row's direction, in percent
    pub threshold: Decimal,
    /// Move from previous to action price, in percent
    pub change_percent: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub row: CycleRow,
    pub status: CycleStatus,
}

/// Result of one cycle: the reference for the next one plus what to display
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub reference: Action,
    pub report: CycleReport,
}

/// Polls the exchange, asks the indicator and executes its verdicts
pub struct TradingLoop {
    exchange: SharedExchange,
    indicator: BoxedIndicator,
    journal: SharedActionLog,
    settings: LoopSettings,
    state: LoopState,
}

impl TradingLoop {
    pub fn new(
        exchange: SharedExchange,
        indicator: BoxedIndicator,
        journal: SharedActionLog,
        settings: LoopSettings,
    ) -> Self {
        Self {
            exchange,
            indicator,
            journal,
            settings,
            state: LoopState::AwaitingReference,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    /// Run cycles until the ticker is exhausted or `shutdown` resolves
    ///
    /// Returns the reference action in force when the loop stopped.
    pub async fn run<T, F>(
        &mut self,
        reference: Action,
        ticker: &mut T,
        shutdown: F,
        handler: &mut dyn CycleHandler,
    ) -> Action
    where
        T: Ticker + ?Sized,
        F: Future<Output = ()>,
    {
        self.state = LoopState::Running;
        info!(
            "Trading {} on {} with the {} indicator{}",
            self.settings.symbol,
            self.settings.market,
            self.indicator.name(),
            if self.settings.dry_run { " (dry run)" } else { "" }
        );

        tokio::pin!(shutdown);
        let mut reference = reference;

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                more = ticker.tick() => {
                    if !more {
                        debug!("Schedule exhausted");
                        break;
                    }
                }
            }

            let outcome = self.run_cycle(reference).await;
            handler.handle_cycle(&outcome.report);
            reference = outcome.reference;
        }

        self.state = LoopState::Terminated;
        handler.on_terminate();
        info!("Trading loop stopped");
        reference
    }

    /// One cycle: fetch, evaluate, guard, size, submit, journal
    pub async fn run_cycle(&mut self, reference: Action) -> CycleOutcome {
        let now = Utc::now();

        let snapshot = match self.exchange.fetch_snapshot(&self.settings.symbol).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Failed to fetch {} price: {}", self.settings.symbol, e);
                let price = reference.action_price();
                return self.untraded(reference, price, now, CycleStatus::Failed(e.to_string()));
            }
        };

        let ctx = IndicatorContext {
            reference_price: reference.action_price(),
            reference_type: reference.action_type(),
        };
        let verdict = self.indicator.evaluate(&snapshot, ctx);
        let price = if verdict.trigger_price > Decimal::ZERO {
            verdict.trigger_price
        } else {
            snapshot.price
        };

        match verdict.proposed {
            ActionType::Idle => self.untraded(reference, price, now, CycleStatus::Idle),
            ActionType::Buy if reference.is_holding() => {
                debug!("Buy proposal at {} suppressed: already holding", price);
                self.untraded(
                    reference,
                    price,
                    now,
                    CycleStatus::Suppressed("already holding".to_string()),
                )
            }
            ActionType::Sell if !reference.is_holding() => {
                debug!("Sell proposal at {} suppressed: no open position", price);
                self.untraded(
                    reference,
                    price,
                    now,
                    CycleStatus::Suppressed("no open position".to_string()),
                )
            }
            ActionType::Sell if reference.held_quantity() <= Decimal::ZERO => {
                debug!("Sell proposal at {} suppressed: held quantity unknown", price);
                self.untraded(
                    reference,
                    price,
                    now,
                    CycleStatus::Suppressed("no held quantity".to_string()),
                )
            }
            kind => self.trade(reference, kind, price, now).await,
        }
    }

    async fn trade(
        &mut self,
        reference: Action,
        kind: ActionType,
        price: Decimal,
        now: DateTime<Utc>,
    ) -> CycleOutcome {
        let sized = match self.prepare(&reference, kind, price, now).await {
            Ok(action) => action,
            Err(e) => {
                if matches!(e, TraderError::InvalidAmount(_)) {
                    warn!("Skipping {} of {}: {}", kind, self.settings.symbol, e);
                } else {
                    error!("Skipping {} of {}: {}", kind, self.settings.symbol, e);
                }
                return self.attempted(reference, kind, price, now, CycleStatus::Failed(e.to_string()));
            }
        };

        let status = if self.settings.dry_run {
            info!(
                "Dry run: would {} {} {} at {}",
                kind,
                sized.quantity().unwrap_or_default(),
                self.settings.symbol,
                price
            );
            CycleStatus::Simulated
        } else {
            match self.submit(&sized).await {
                Ok(order_id) => CycleStatus::Executed { order_id },
                Err(e) => {
                    error!("{} order for {} failed: {}", kind, self.settings.symbol, e);
                    return self.attempted(
                        reference,
                        kind,
                        price,
                        now,
                        CycleStatus::Failed(e.to_string()),
                    );
                }
            }
        };

        let status = if self.settings.dry_run && !self.settings.persist_dry_run {
            status
        } else {
            match self.journal.append(&sized.to_record()).await {
                Ok(()) => status,
                Err(e) => {
                    error!(
                        "EXECUTED TRADE NOT RECORDED: {:?} could not be journaled: {}",
                        sized, e
                    );
                    CycleStatus::Unrecorded(e.to_string())
                }
            }
        };

        let report = self.report(&sized, now, status);
        CycleOutcome {
            reference: sized,
            report,
        }
    }

    /// Build and size the action for a trade proposal
    async fn prepare(
        &self,
        reference: &Action,
        kind: ActionType,
        price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Action> {
        let action = Action::follow(reference, kind, price, now.timestamp())?;

        let quantity = match kind {
            ActionType::Buy => {
                let balance = self.available_balance().await?;
                self.settings.limits.buy_quantity(price, balance)?
            }
            ActionType::Sell => self
                .settings
                .limits
                .sell_quantity(reference.held_quantity())?,
            ActionType::Idle => {
                return Err(TraderError::Internal("idle actions are never sized".to_string()))
            }
        };

        action.with_quantity(quantity)
    }

    /// Fresh quote balance; a dry run without account access assumes `max_fund`
    async fn available_balance(&self) -> Result<Decimal> {
        match self.exchange.get_balance().await {
            Ok(balance) => Ok(balance),
            Err(e) if self.settings.dry_run => {
                warn!("Balance unavailable in dry run ({}), assuming max_fund", e);
                Ok(self.settings.limits.max_fund)
            }
            Err(e) => Err(e),
        }
    }

    async fn submit(&self, action: &Action) -> Result<String> {
        let quantity = action.quantity().ok_or_else(|| {
            TraderError::InvalidAmount("refusing to submit an unsized order".to_string())
        })?;
        let symbol = action.symbol();
        let price = action.action_price();

        let order = match action.action_type() {
            ActionType::Buy => self.exchange.submit_buy(symbol, price, quantity).await?,
            ActionType::Sell => self.exchange.submit_sell(symbol, price, quantity).await?,
            ActionType::Idle => {
                return Err(TraderError::Internal("idle actions are never submitted".to_string()))
            }
        };

        info!(
            "{} {} {} at {} accepted as order {} ({})",
            action.action_type(),
            quantity,
            symbol,
            price,
            order.order_id,
            order.status
        );
        Ok(order.order_id)
    }

    /// Cycle without a trade: the row shows IDLE and the reference is kept
    fn untraded(
        &self,
        reference: Action,
        price: Decimal,
        now: DateTime<Utc>,
        status: CycleStatus,
    ) -> CycleOutcome {
        let row = self.row(ActionType::Idle, &reference, price, None, now);
        CycleOutcome {
            reference,
            report: CycleReport { row, status },
        }
    }

    /// Trade attempt that did not happen: the row shows the attempted type
    fn attempted(
        &self,
        reference: Action,
        kind: ActionType,
        price: Decimal,
        now: DateTime<Utc>,
        status: CycleStatus,
    ) -> CycleOutcome {
        let row = self.row(kind, &reference, price, None, now);
        CycleOutcome {
            reference,
            report: CycleReport { row, status },
        }
    }

    fn row(
        &self,
        action_type: ActionType,
        reference: &Action,
        price: Decimal,
        quantity: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> CycleRow {
        let previous_price = reference.action_price();
        // an untraded row shows the threshold of the next possible move
        let direction = match action_type {
            ActionType::Idle if reference.is_holding() => ActionType::Sell,
            ActionType::Idle => ActionType::Buy,
            kind => kind,
        };
        CycleRow {
            action_type,
            previous_price,
            action_price: price,
            symbol: self.settings.symbol.clone(),
            quantity,
            threshold: self.indicator.threshold(direction),
            change_percent: percent_change(previous_price, price),
            timestamp: now,
        }
    }

    fn report(&self, action: &Action, now: DateTime<Utc>, status: CycleStatus) -> CycleReport {
        CycleReport {
            row: CycleRow {
                action_type: action.action_type(),
                previous_price: action.previous_price(),
                action_price: action.action_price(),
                symbol: action.symbol().to_string(),
                quantity: action.quantity(),
                threshold: self.indicator.threshold(action.action_type()),
                change_percent: action.change_percent(),
                timestamp: now,
            },
            status,
        }
    }
}

fn percent_change(previous: Decimal, current: Decimal) -> Decimal {
    if previous <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    ((current - previous) / previous * Decimal::ONE_HUNDRED).round_dp(4)
}
