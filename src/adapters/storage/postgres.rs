use crate::domain::model::{CanonicalEmail, WaitlistEntry};
use crate::domain::ports::WaitlistStore;
use crate::utils::error::{Result, WaitlistError};
use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use bb8_postgres::PostgresConnectionManager;
use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::time::Duration;
use tokio_postgres::NoTls;

pub type PgPool = Pool<PostgresConnectionManager<NoTls>>;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS waitlist (
    email TEXT PRIMARY KEY,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

// The primary key decides. A concurrent duplicate turns into a no-op.
const INSERT_IF_ABSENT: &str =
    "INSERT INTO waitlist (email, created_at) VALUES ($1, $2) ON CONFLICT (email) DO NOTHING";

const COUNT: &str = "SELECT COUNT(*) FROM waitlist";

const SELECT_ONE: &str = "SELECT email, created_at FROM waitlist WHERE email = $1";

fn storage_err(context: &str, e: impl Display) -> WaitlistError {
    tracing::error!("PostgreSQL {}: {}", context, e);
    WaitlistError::storage(format!("{}: {}", context, e))
}

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Builds the pool, checks a connection and creates the table if needed.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let config: tokio_postgres::Config =
            url.parse().map_err(|e| WaitlistError::InvalidConfigValueError {
                field: "storage.url".to_string(),
                value: "<redacted>".to_string(),
                reason: format!("Invalid PostgreSQL connection string: {}", e),
            })?;

        tracing::info!("Connecting to PostgreSQL...");
        let manager = PostgresConnectionManager::new(config, NoTls);
        let pool = Pool::builder()
            .max_size(max_connections)
            .min_idle(Some(1))
            .idle_timeout(Some(Duration::from_secs(180)))
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
            .await
            .map_err(|e| storage_err("pool setup failed", e))?;

        let store = Self { pool };
        store
            .conn()
            .await?
            .batch_execute(CREATE_TABLE)
            .await
            .map_err(|e| storage_err("schema setup failed", e))?;

        tracing::info!("PostgreSQL waitlist store ready");
        Ok(store)
    }

    async fn conn(&self) -> Result<PooledConnection<'_, PostgresConnectionManager<NoTls>>> {
        self.pool
            .get()
            .await
            .map_err(|e| storage_err("connection unavailable", e))
    }
}

#[async_trait]
impl WaitlistStore for PostgresStore {
    async fn insert_if_absent(&self, entry: WaitlistEntry) -> Result<bool> {
        let conn = self.conn().await?;
        let inserted = conn
            .execute(INSERT_IF_ABSENT, &[&entry.email.as_str(), &entry.created_at])
            .await
            .map_err(|e| storage_err("insert failed", e))?;
        Ok(inserted == 1)
    }

    async fn count(&self) -> Result<u64> {
        let conn = self.conn().await?;
        let row = conn
            .query_one(COUNT, &[])
            .await
            .map_err(|e| storage_err("count failed", e))?;
        let count: i64 = row.get(0);
        Ok(count.max(0) as u64)
    }

    async fn get(&self, email: &CanonicalEmail) -> Result<Option<WaitlistEntry>> {
        let conn = self.conn().await?;
        let row = conn
            .query_opt(SELECT_ONE, &[&email.as_str()])
            .await
            .map_err(|e| storage_err("lookup failed", e))?;

        row.map(|row| -> Result<WaitlistEntry> {
            let stored: String = row.get(0);
            let created_at: DateTime<Utc> = row.get(1);
            Ok(WaitlistEntry::new(CanonicalEmail::parse(&stored)?, created_at))
        })
        .transpose()
    }
}
