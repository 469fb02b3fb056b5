//! PostgreSQL Idempotency Adapter

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, IdempotencyKey, ItemId, PortError, UserId,
};
use domain_items::{ClaimOperation, IdempotencyPort, IdempotencyRecord};

use super::{db_to_port_error, probe};
use crate::error::DatabaseError;
use crate::repositories::idempotency::{IdempotencyRepository, IdempotencyRow};

/// PostgreSQL-backed implementation of the IdempotencyPort trait
#[derive(Debug, Clone)]
pub struct PostgresIdempotencyAdapter {
    repository: IdempotencyRepository,
    pool: PgPool,
}

impl PostgresIdempotencyAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: IdempotencyRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresIdempotencyAdapter {}

#[async_trait]
impl HealthCheckable for PostgresIdempotencyAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        probe(&self.pool, "postgres-idempotency-adapter").await
    }
}

#[async_trait]
impl IdempotencyPort for PostgresIdempotencyAdapter {
    #[instrument(skip(self), fields(key = %key, user_id = %user))]
    async fn lookup(
        &self,
        key: IdempotencyKey,
        user: UserId,
    ) -> Result<Option<IdempotencyRecord>, PortError> {
        let row = self
            .repository
            .find(key.into(), user.into())
            .await
            .map_err(db_to_port_error)?;

        row.map(|row| row_to_record(row).map_err(db_to_port_error))
            .transpose()
    }

    #[instrument(skip(self, record), fields(key = %record.key, operation = %record.operation))]
    async fn store(&self, record: &IdempotencyRecord) -> Result<(), PortError> {
        let row = IdempotencyRow {
            idempotency_key: record.key.into(),
            user_id: record.user_id.into(),
            operation: record.operation.as_str().to_string(),
            item_id: record.item_id.into(),
            created_at: record.created_at,
        };
        self.repository.insert(&row).await.map_err(db_to_port_error)
    }

    #[instrument(skip(self))]
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, PortError> {
        self.repository
            .delete_before(cutoff)
            .await
            .map_err(db_to_port_error)
    }
}

fn row_to_record(row: IdempotencyRow) -> Result<IdempotencyRecord, DatabaseError> {
    let operation: ClaimOperation = row
        .operation
        .parse()
        .map_err(|e: core_kernel::CoreError| DatabaseError::InvalidData(e.to_string()))?;

    Ok(IdempotencyRecord {
        key: IdempotencyKey::from(row.idempotency_key),
        user_id: UserId::from(row.user_id),
        operation,
        item_id: ItemId::from(row.item_id),
        created_at: row.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_unknown_operation_is_invalid_data() {
        let row = IdempotencyRow {
            idempotency_key: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            operation: "cancel_claim".to_string(),
            item_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        assert!(matches!(row_to_record(row), Err(DatabaseError::InvalidData(_))));
    }
}
