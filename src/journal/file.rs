use async_trait::async_trait;
use chrono::DateTime;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{ActionLog, ActionRecord, LogQuery};
use crate::common::errors::{Result, TraderError};
use crate::config::LogPartition;

const EXTENSION: &str = "jsonl";

/// Journal stored as JSON-lines files
///
/// Records are spread over partition files (one per symbol or one per day);
/// queries read every partition in the directory so a date rollover never
/// hides the latest reference.
#[derive(Debug, Clone)]
pub struct FileJournal {
    dir: PathBuf,
    partition: LogPartition,
}

impl FileJournal {
    pub fn new(dir: impl Into<PathBuf>, partition: LogPartition) -> Self {
        Self {
            dir: dir.into(),
            partition,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a record is appended to
    pub fn partition_path(&self, record: &ActionRecord) -> PathBuf {
        let name = match self.partition {
            LogPartition::Symbol => sanitize(&record.symbol),
            LogPartition::Date => DateTime::from_timestamp(record.last_update, 0)
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "undated".to_string()),
        };
        self.dir.join(format!("{}.{}", name, EXTENSION))
    }

    async fn read_partition(path: &Path) -> Result<Vec<ActionRecord>> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            TraderError::Persistence(format!("failed to read {}: {}", path.display(), e))
        })?;

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| {
                    TraderError::MalformedRecord(format!("{}:{}: {}", path.display(), n + 1, e))
                })
            })
            .collect()
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[async_trait]
impl ActionLog for FileJournal {
    async fn append(&self, record: &ActionRecord) -> Result<()> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            TraderError::Persistence(format!("failed to create {}: {}", self.dir.display(), e))
        })?;

        let path = self.partition_path(record);
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let write = async {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await?;
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
            file.sync_data().await
        };
        write.await.map_err(|e| {
            TraderError::Persistence(format!("failed to append to {}: {}", path.display(), e))
        })?;

        debug!("Appended {} record to {}", record.action_type, path.display());
        Ok(())
    }

    async fn query(&self, query: &LogQuery) -> Result<Vec<ActionRecord>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(TraderError::Persistence(format!(
                    "failed to list {}: {}",
                    self.dir.display(),
                    e
                )))
            }
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(EXTENSION) {
                records.extend(Self::read_partition(&path).await?);
            }
        }

        Ok(query.apply(records))
    }
}
