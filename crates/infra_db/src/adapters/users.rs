//! PostgreSQL User Directory Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError, UserId};
use domain_items::{Role, UserDirectoryPort, UserSummary};

use super::{db_to_port_error, probe};
use crate::error::DatabaseError;
use crate::repositories::users::{UserRepository, UserRole, UserSummaryRow};

/// Reads reporter and claimant projections from the `users` table
#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    repository: UserRepository,
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Inserts or refreshes a directory entry
    pub async fn upsert(&self, user: &UserSummary, role: Role) -> Result<(), DatabaseError> {
        let row = UserSummaryRow {
            user_id: user.id.into(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            university_id: user.university_id.clone(),
        };
        let role = match role {
            Role::Student => UserRole::Student,
            Role::Staff => UserRole::Staff,
            Role::Admin => UserRole::Admin,
        };
        self.repository.upsert(&row, role).await
    }
}

impl DomainPort for PostgresUserDirectory {}

#[async_trait]
impl HealthCheckable for PostgresUserDirectory {
    async fn health_check(&self) -> HealthCheckResult {
        probe(&self.pool, "postgres-user-directory").await
    }
}

#[async_trait]
impl UserDirectoryPort for PostgresUserDirectory {
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_summaries(&self, ids: &[UserId]) -> Result<Vec<UserSummary>, PortError> {
        let ids: Vec<Uuid> = ids.iter().map(|id| (*id).into()).collect();
        let rows = self
            .repository
            .find_by_ids(&ids)
            .await
            .map_err(db_to_port_error)?;

        Ok(rows
            .into_iter()
            .map(|row| UserSummary {
                id: UserId::from(row.user_id),
                first_name: row.first_name,
                last_name: row.last_name,
                university_id: row.university_id,
            })
            .collect())
    }
}
