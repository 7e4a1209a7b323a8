use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{Cents, LedgerSnapshot};

use super::MIGRATION_001_INITIAL;

pub type SnapshotId = Uuid;

/// Metadata of a stored snapshot, without its payload.
#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    pub id: SnapshotId,
    pub saved_at: DateTime<Utc>,
    pub transaction_count: i64,
    pub customer_count: i64,
    pub total_balance: Cents,
}

/// SQLite store of full ledger snapshots. Every save appends a new row, so
/// earlier states can be listed and restored.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Store a snapshot as the newest state.
    pub async fn save_snapshot(&self, snapshot: &LedgerSnapshot) -> Result<SnapshotInfo> {
        let payload = serde_json::to_string(snapshot).context("Failed to serialize snapshot")?;
        let info = SnapshotInfo {
            id: Uuid::new_v4(),
            saved_at: Utc::now(),
            transaction_count: snapshot.transactions.len() as i64,
            customer_count: snapshot.customers.len() as i64,
            total_balance: snapshot.transactions.iter().map(|t| t.amount).sum(),
        };

        sqlx::query(
            r#"
            INSERT INTO snapshots (id, saved_at, transaction_count, customer_count, total_balance, payload)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(info.id.to_string())
        .bind(info.saved_at.to_rfc3339())
        .bind(info.transaction_count)
        .bind(info.customer_count)
        .bind(info.total_balance)
        .bind(&payload)
        .execute(&self.pool)
        .await
        .context("Failed to save snapshot")?;

        log::debug!(
            "Saved snapshot {} ({} transactions)",
            info.id,
            info.transaction_count
        );
        Ok(info)
    }

    /// The most recently saved snapshot, if any.
    pub async fn latest_snapshot(&self) -> Result<Option<LedgerSnapshot>> {
        let row = sqlx::query(
            r#"
            SELECT payload FROM snapshots
            ORDER BY rowid DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch latest snapshot")?;

        row.map(|row| Self::row_to_snapshot(&row)).transpose()
    }

    /// Get a snapshot by ID.
    pub async fn get_snapshot(&self, id: SnapshotId) -> Result<Option<LedgerSnapshot>> {
        let row = sqlx::query("SELECT payload FROM snapshots WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch snapshot")?;

        row.map(|row| Self::row_to_snapshot(&row)).transpose()
    }

    /// List stored snapshots, newest first.
    pub async fn list_snapshots(&self, limit: Option<usize>) -> Result<Vec<SnapshotInfo>> {
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let rows = sqlx::query(
            r#"
            SELECT id, saved_at, transaction_count, customer_count, total_balance
            FROM snapshots
            ORDER BY rowid DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list snapshots")?;

        rows.iter().map(Self::row_to_info).collect()
    }

    fn row_to_snapshot(row: &sqlx::sqlite::SqliteRow) -> Result<LedgerSnapshot> {
        let payload: String = row.get("payload");
        serde_json::from_str(&payload).context("Stored snapshot is not valid JSON")
    }

    fn row_to_info(row: &sqlx::sqlite::SqliteRow) -> Result<SnapshotInfo> {
        let id_str: String = row.get("id");
        let saved_at_str: String = row.get("saved_at");

        Ok(SnapshotInfo {
            id: Uuid::parse_str(&id_str).context("Invalid snapshot ID")?,
            saved_at: DateTime::parse_from_rfc3339(&saved_at_str)
                .context("Invalid saved_at timestamp")?
                .with_timezone(&Utc),
            transaction_count: row.get("transaction_count"),
            customer_count: row.get("customer_count"),
            total_balance: row.get("total_balance"),
        })
    }
}
