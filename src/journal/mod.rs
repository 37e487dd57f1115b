//! Append-only action journal
//!
//! Every executed (or simulated) non-idle action is appended as an
//! [`ActionRecord`]. Records are never updated or deleted; the most recent
//! record for a (market, symbol) pair is the authoritative position
//! reference at startup.

mod file;
mod memory;
mod postgres;

pub use file::FileJournal;
pub use memory::InMemoryJournal;
pub use postgres::PgJournal;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::common::errors::Result;
use crate::common::types::ActionType;

/// Flat on-disk projection of an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub symbol: String,
    pub market: String,
    pub previous_price: Decimal,
    pub action_price: Decimal,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    /// Seconds since epoch
    pub last_update: i64,
}

/// Equality filter on a record field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Market(String),
    Symbol(String),
    Type(ActionType),
}

impl Filter {
    pub fn matches(&self, record: &ActionRecord) -> bool {
        match self {
            Filter::Market(market) => &record.market == market,
            Filter::Symbol(symbol) => &record.symbol == symbol,
            Filter::Type(action_type) => &record.action_type == action_type,
        }
    }
}

/// Ordering on `lastUpdate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Journal query: equality filters, ordered by `lastUpdate`, optional limit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub filters: Vec<Filter>,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl LogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent record for a (market, symbol) pair
    pub fn latest_for(market: &str, symbol: &str) -> Self {
        Self::new()
            .filter(Filter::Market(market.to_string()))
            .filter(Filter::Symbol(symbol.to_string()))
            .order(SortOrder::Descending)
            .limit(1)
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, record: &ActionRecord) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }

    /// Filter, sort and truncate records held in memory
    ///
    /// The sort is stable, so records sharing a timestamp keep append order
    /// (reversed for descending queries).
    pub fn apply<I>(&self, records: I) -> Vec<ActionRecord>
    where
        I: IntoIterator<Item = ActionRecord>,
    {
        let mut matched: Vec<ActionRecord> =
            records.into_iter().filter(|r| self.matches(r)).collect();

        matched.sort_by_key(|r| r.last_update);
        if self.order == SortOrder::Descending {
            matched.reverse();
        }
        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}

/// Read/write contract of the action journal
#[async_trait]
pub trait ActionLog: Send + Sync {
    /// Append one record
    async fn append(&self, record: &ActionRecord) -> Result<()>;

    /// Run a query against every stored record
    async fn query(&self, query: &LogQuery) -> Result<Vec<ActionRecord>>;
}

/// Shared journal handle for dynamic dispatch
pub type SharedActionLog = Arc<dyn ActionLog>;
