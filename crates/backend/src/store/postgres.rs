//! `PostgreSQL` record store.
//!
//! Records live in a single `records` table keyed by `(kind, id)` with the
//! document itself in a JSONB column; equality filters map to JSONB
//! containment against the GIN index. Queries are bound at runtime because
//! the schema is one generic table rather than per-entity tables.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::{Filter, RecordKind, RecordStore, StoreError};

/// `PostgreSQL`-backed [`RecordStore`] implementation.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with sensible pool defaults.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection cannot be established.
    pub async fn connect(database_url: &secrecy::SecretString) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url.expose_secret())
            .await?;
        Ok(Self::new(pool))
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `MigrateError` if a migration fails.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn insert(&self, kind: RecordKind, id: Uuid, data: Value) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO records (kind, id, data) VALUES ($1, $2, $3)")
            .bind(kind.as_str())
            .bind(id)
            .bind(data)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return StoreError::Conflict(format!("duplicate {kind} id {id}"));
                }
                StoreError::Database(e)
            })?;
        Ok(())
    }

    async fn find_unique(&self, kind: RecordKind, id: Uuid) -> Result<Option<Value>, StoreError> {
        let data = sqlx::query_scalar::<_, Value>(
            "SELECT data FROM records WHERE kind = $1 AND id = $2",
        )
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(data)
    }

    async fn find_many(&self, kind: RecordKind, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let rows = sqlx::query_scalar::<_, Value>(
            "SELECT data FROM records \
             WHERE kind = $1 AND data @> $2 \
             ORDER BY created_at, id",
        )
        .bind(kind.as_str())
        .bind(filter.as_json())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update(
        &self,
        kind: RecordKind,
        id: Uuid,
        patch: Value,
    ) -> Result<Option<Value>, StoreError> {
        let data = sqlx::query_scalar::<_, Value>(
            "UPDATE records SET data = data || $3 \
             WHERE kind = $1 AND id = $2 \
             RETURNING data",
        )
        .bind(kind.as_str())
        .bind(id)
        .bind(patch)
        .fetch_optional(&self.pool)
        .await?;
        Ok(data)
    }

    async fn delete(&self, kind: RecordKind, id: Uuid) -> Result<Option<Value>, StoreError> {
        let data = sqlx::query_scalar::<_, Value>(
            "DELETE FROM records WHERE kind = $1 AND id = $2 RETURNING data",
        )
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(data)
    }

    async fn delete_many(&self, kind: RecordKind, filter: &Filter) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM records WHERE kind = $1 AND data @> $2")
            .bind(kind.as_str())
            .bind(filter.as_json())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
