use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::model::{ChangeRecord, SitemapRecord};
use crate::store::traits::{ChangeStore, IndexStore, RecordStore, StatusStore};

/// Index backend on PostgreSQL. One row in `record_changes` is one change
/// event; the served ordering lives in the queries below.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the schema when missing. Uses runtime queries so builds never
    /// need a live database.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS record_changes (
                id BIGSERIAL PRIMARY KEY,
                pi TEXT NOT NULL,
                date_created TIMESTAMPTZ,
                date_updated TIMESTAMPTZ,
                date_deleted TIMESTAMPTZ
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create record_changes table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_record_changes_pi ON record_changes (pi)")
            .execute(&self.pool)
            .await
            .context("Failed to create record_changes pi index")?;

        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert one change event. Used by seeding and ingest tooling.
    pub async fn insert_change(&self, record: &ChangeRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO record_changes (pi, date_created, date_updated, date_deleted) VALUES ($1, $2, $3, $4)",
        )
        .bind(&record.pi)
        .bind(record.created)
        .bind(record.updated)
        .bind(record.deleted)
        .execute(&self.pool)
        .await
        .context("Failed to insert change record")?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl ChangeStore for PostgresStore {
    async fn count_changes(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM record_changes")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count change records")?;
        let total: i64 = row.get("total");

        Ok(total as u64)
    }

    async fn changes(&self, offset: u64, limit: u64) -> Result<Vec<ChangeRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT pi, date_created, date_updated, date_deleted
            FROM record_changes
            ORDER BY COALESCE(date_deleted, date_updated, date_created) ASC, pi ASC, id ASC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(offset as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch change records")?;

        Ok(rows
            .into_iter()
            .map(|row| ChangeRecord {
                pi: row.get("pi"),
                created: row.get("date_created"),
                updated: row.get("date_updated"),
                deleted: row.get("date_deleted"),
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl RecordStore for PostgresStore {
    async fn count_records(&self) -> Result<u64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(DISTINCT pi) AS total
            FROM record_changes
            WHERE pi NOT IN (SELECT pi FROM record_changes WHERE date_deleted IS NOT NULL)
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to count live records")?;
        let total: i64 = row.get("total");

        Ok(total as u64)
    }

    async fn records(&self, offset: u64, limit: u64) -> Result<Vec<SitemapRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT pi, MAX(COALESCE(date_updated, date_created)) AS last_modified
            FROM record_changes
            WHERE pi NOT IN (SELECT pi FROM record_changes WHERE date_deleted IS NOT NULL)
            GROUP BY pi
            ORDER BY pi ASC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(offset as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch live records")?;

        Ok(rows
            .into_iter()
            .map(|row| SitemapRecord {
                pi: row.get("pi"),
                last_modified: row.get("last_modified"),
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl StatusStore for PostgresStore {
    async fn check_availability(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }
}

impl IndexStore for PostgresStore {}
