use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ActionLog, ActionRecord, LogQuery};
use crate::common::errors::Result;

/// Journal kept in memory
///
/// Nothing survives the process; used by tests and by callers embedding the
/// trading loop with their own persistence.
#[derive(Debug, Default)]
pub struct InMemoryJournal {
    records: RwLock<Vec<ActionRecord>>,
}

impl InMemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing records
    pub fn with_records(records: Vec<ActionRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Copy of every record in append order
    pub async fn records(&self) -> Vec<ActionRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ActionLog for InMemoryJournal {
    async fn append(&self, record: &ActionRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn query(&self, query: &LogQuery) -> Result<Vec<ActionRecord>> {
        let records = self.records.read().await.clone();
        Ok(query.apply(records))
    }
}
