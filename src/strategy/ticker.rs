use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Schedule driving the trading loop
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next cycle
    ///
    /// Returns `false` once the schedule is exhausted.
    async fn tick(&mut self) -> bool;
}

/// Fixed-period schedule; the first tick fires immediately
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period.max(Duration::from_millis(1)));
        // a slow cycle pushes the next one back instead of bursting
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn from_secs(seconds: u64) -> Self {
        Self::new(Duration::from_secs(seconds))
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}
