//! Trading strategy: actions, indicators, sizing and the polling loop
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    STARTUP                                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  bootstrap()                                                │
//! │    - Latest journaled action for (market, symbol)           │
//! │    - Otherwise a seed from a ReferenceResolver (prompt/CLI) │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    EVERY TICK                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Exchange.fetch_snapshot()                                  │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  Indicator.evaluate() → BUY / SELL / IDLE                   │
//! │       │                                                     │
//! │       ▼ (passes the position guard)                         │
//! │  TradeLimits sizes it → submit (unless dry run) → journal   │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  CycleHandler gets the CycleReport                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`Action`]: One immutable trading decision
//! - [`Indicator`]: Turns snapshots into proposals
//! - [`TradeLimits`]: Buy/sell quantity calculation
//! - [`TradingLoop`]: The AwaitingReference → Running → Terminated state machine
//! - [`bootstrap`]: Establishes the first reference action

mod action;
mod bootstrap;
mod engine;
pub mod indicator;
pub mod quantity;
mod ticker;

pub use action::Action;

pub use bootstrap::{bootstrap, FixedResolver, PromptResolver, ReferenceResolver, SeedReference};

pub use engine::{
    CycleOutcome, CycleReport, CycleRow, CycleStatus, LoopSettings, LoopState, TradingLoop,
};

pub use indicator::{
    build_indicator, BoxedIndicator, Indicator, IndicatorContext, MovingAverageIndicator,
    PercentIndicator, Verdict,
};

pub use quantity::TradeLimits;

pub use ticker::{IntervalTicker, Ticker};
