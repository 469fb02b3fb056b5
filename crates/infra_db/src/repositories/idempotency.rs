//! Idempotency key repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct IdempotencyRepository {
    pool: PgPool,
}

impl IdempotencyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(
        &self,
        idempotency_key: Uuid,
        user_id: Uuid,
    ) -> Result<Option<IdempotencyRow>, DatabaseError> {
        let row = sqlx::query_as::<_, IdempotencyRow>(
            r#"
            SELECT idempotency_key, user_id, operation, item_id, created_at
            FROM idempotency_keys
            WHERE idempotency_key = $1 AND user_id = $2
            "#,
        )
        .bind(idempotency_key)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Inserts a record; the first record for a key and user wins
    pub async fn insert(&self, row: &IdempotencyRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO idempotency_keys (idempotency_key, user_id, operation, item_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (idempotency_key, user_id) DO NOTHING
            "#,
        )
        .bind(row.idempotency_key)
        .bind(row.user_id)
        .bind(&row.operation)
        .bind(row.item_id)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM idempotency_keys WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IdempotencyRow {
    pub idempotency_key: Uuid,
    pub user_id: Uuid,
    pub operation: String,
    pub item_id: Uuid,
    pub created_at: DateTime<Utc>,
}
