//! User directory repository
//!
//! The identity provider owns user records; this repository only reads the
//! display projection, plus an upsert used when seeding the directory.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_ids(&self, user_ids: &[Uuid]) -> Result<Vec<UserSummaryRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, UserSummaryRow>(
            r#"
            SELECT user_id, first_name, last_name, university_id
            FROM users
            WHERE user_id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn upsert(&self, user: &UserSummaryRow, role: UserRole) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, first_name, last_name, university_id, role)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                university_id = EXCLUDED.university_id,
                role = EXCLUDED.role
            "#,
        )
        .bind(user.user_id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.university_id)
        .bind(role)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Staff,
    Admin,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserSummaryRow {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub university_id: String,
}
