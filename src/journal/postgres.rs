use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::{ActionLog, ActionRecord, Filter, LogQuery, SortOrder};
use crate::common::errors::{Result, TraderError};
use crate::common::types::ActionType;
use crate::config::DatabaseConfig;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS trade_actions (
    id             BIGSERIAL PRIMARY KEY,
    action_type    TEXT      NOT NULL,
    symbol         TEXT      NOT NULL,
    market         TEXT      NOT NULL,
    previous_price NUMERIC   NOT NULL,
    action_price   NUMERIC   NOT NULL,
    quantity       NUMERIC,
    last_update    BIGINT    NOT NULL
)"#;

const CREATE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS trade_actions_market_symbol_idx
    ON trade_actions (market, symbol, last_update DESC)"#;

/// Journal stored in a Postgres table
#[derive(Debug, Clone)]
pub struct PgJournal {
    pool: PgPool,
}

impl PgJournal {
    /// Connect and make sure the table exists
    #[instrument(skip(config))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .connect(&config.url)
            .await?;

        let journal = Self::from_pool(pool);
        journal.migrate().await?;
        info!("Connected to Postgres action journal");
        Ok(journal)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    fn decode(row: &PgRow) -> Result<ActionRecord> {
        let action_type: String = row.try_get("action_type")?;
        Ok(ActionRecord {
            action_type: action_type.parse::<ActionType>()?,
            symbol: row.try_get("symbol")?,
            market: row.try_get("market")?,
            previous_price: row.try_get::<Decimal, _>("previous_price")?,
            action_price: row.try_get::<Decimal, _>("action_price")?,
            quantity: row.try_get::<Option<Decimal>, _>("quantity")?,
            last_update: row.try_get("last_update")?,
        })
    }
}

/// Build the SELECT for a query; column names never come from input
fn build_select(query: &LogQuery) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new(
        "SELECT action_type, symbol, market, previous_price, action_price, quantity, last_update \
         FROM trade_actions",
    );

    for (i, filter) in query.filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        match filter {
            Filter::Market(market) => builder.push("market = ").push_bind(market.as_str()),
            Filter::Symbol(symbol) => builder.push("symbol = ").push_bind(symbol.as_str()),
            Filter::Type(action_type) => builder
                .push("action_type = ")
                .push_bind(action_type.as_str()),
        };
    }

    builder.push(match query.order {
        SortOrder::Ascending => " ORDER BY last_update ASC, id ASC",
        SortOrder::Descending => " ORDER BY last_update DESC, id DESC",
    });

    if let Some(limit) = query.limit {
        builder.push(" LIMIT ").push_bind(limit as i64);
    }

    builder
}

#[async_trait]
impl ActionLog for PgJournal {
    async fn append(&self, record: &ActionRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO trade_actions \
             (action_type, symbol, market, previous_price, action_price, quantity, last_update) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record.action_type.as_str())
        .bind(&record.symbol)
        .bind(&record.market)
        .bind(record.previous_price)
        .bind(record.action_price)
        .bind(record.quantity)
        .bind(record.last_update)
        .execute(&self.pool)
        .await
        .map_err(|e| TraderError::Persistence(format!("insert failed: {}", e)))?;

        debug!("Inserted {} record for {}", record.action_type, record.symbol);
        Ok(())
    }

    async fn query(&self, query: &LogQuery) -> Result<Vec<ActionRecord>> {
        let mut builder = build_select(query);
        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(Self::decode).collect()
    }
}
