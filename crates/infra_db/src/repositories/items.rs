//! Item repository implementation
//!
//! Claim transitions are single statements: the row is locked and its status
//! checked and rewritten in one `UPDATE`, so concurrent claims on the same
//! item serialize on the row lock and only the first one matches.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DatabaseError;

macro_rules! item_columns {
    () => {
        "items.item_id, items.category, items.description, items.item_date, items.location, \
         items.item_type, items.status, items.reported_by, items.claimed_by, items.photo_url, \
         items.contact_info, items.notes, items.created_at"
    };
}

/// Repository for lost and found item reports
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, item: &ItemRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO items (
                item_id, category, description, item_date, location, item_type,
                status, reported_by, claimed_by, photo_url, contact_info, notes, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(item.item_id)
        .bind(item.category)
        .bind(&item.description)
        .bind(item.item_date)
        .bind(&item.location)
        .bind(item.item_type)
        .bind(item.status)
        .bind(item.reported_by)
        .bind(item.claimed_by)
        .bind(&item.photo_url)
        .bind(&item.contact_info)
        .bind(&item.notes)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, item_id: Uuid) -> Result<ItemRow, DatabaseError> {
        sqlx::query_as::<_, ItemRow>(concat!(
            "SELECT ",
            item_columns!(),
            " FROM items WHERE item_id = $1"
        ))
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Item", item_id))
    }

    /// Filtered listing, newest first
    pub async fn search(&self, search: &ItemSearch) -> Result<Vec<ItemRow>, DatabaseError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(concat!("SELECT ", item_columns!(), " FROM items WHERE TRUE"));

        if let Some(item_type) = search.item_type {
            builder.push(" AND item_type = ").push_bind(item_type);
        }
        if let Some(category) = search.category {
            builder.push(" AND category = ").push_bind(category);
        }
        if let Some(status) = search.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if !search.terms.is_empty() {
            builder.push(" AND (");
            for (index, term) in search.terms.iter().enumerate() {
                if index > 0 {
                    builder.push(" OR ");
                }
                let pattern = format!("%{}%", escape_like(term));
                builder
                    .push("description ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR location ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR category::text ILIKE ")
                    .push_bind(pattern);
            }
            builder.push(")");
        }
        builder.push(" ORDER BY created_at DESC, item_id DESC");

        let rows = builder
            .build_query_as::<ItemRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_by_reporter(&self, reporter: Uuid) -> Result<Vec<ItemRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ItemRow>(concat!(
            "SELECT ",
            item_columns!(),
            " FROM items WHERE reported_by = $1 ORDER BY created_at DESC, item_id DESC"
        ))
        .bind(reporter)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Overwrites the provided descriptive columns, leaving `None` fields as stored
    pub async fn update_details(
        &self,
        item_id: Uuid,
        changes: &ItemDetailsUpdate,
    ) -> Result<ItemRow, DatabaseError> {
        sqlx::query_as::<_, ItemRow>(concat!(
            r#"
            UPDATE items SET
                category = COALESCE($2, category),
                description = COALESCE($3, description),
                item_date = COALESCE($4, item_date),
                location = COALESCE($5, location),
                photo_url = COALESCE($6, photo_url),
                contact_info = COALESCE($7, contact_info),
                notes = COALESCE($8, notes)
            WHERE item_id = $1
            RETURNING "#,
            item_columns!()
        ))
        .bind(item_id)
        .bind(changes.category)
        .bind(&changes.description)
        .bind(changes.item_date)
        .bind(&changes.location)
        .bind(&changes.photo_url)
        .bind(&changes.contact_info)
        .bind(&changes.notes)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Item", item_id))
    }

    pub async fn delete(&self, item_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM items WHERE item_id = $1")
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Item", item_id));
        }
        Ok(())
    }

    /// Compare-and-swap on the item status
    ///
    /// Returns `None` when the item does not exist or is not in `expected`.
    pub async fn transition(
        &self,
        item_id: Uuid,
        change: &StatusChange,
    ) -> Result<Option<TransitionRow>, DatabaseError> {
        let row = sqlx::query_as::<_, TransitionRow>(concat!(
            r#"
            WITH previous AS (
                SELECT item_id, claimed_by
                FROM items
                WHERE item_id = $1 AND status = $2
                FOR UPDATE
            )
            UPDATE items SET
                status = $3,
                claimed_by = CASE $4
                    WHEN 'assign' THEN $5
                    WHEN 'retain' THEN items.claimed_by
                    ELSE NULL
                END
            FROM previous
            WHERE items.item_id = previous.item_id AND items.status = $2
            RETURNING previous.claimed_by AS previous_claimant, "#,
            item_columns!()
        ))
        .bind(item_id)
        .bind(change.expected)
        .bind(change.target)
        .bind(change.claimant.mode())
        .bind(change.claimant.assigned())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

/// Escapes `%`, `_` and `\` so a search term matches literally inside ILIKE
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// ============================================================================
// Database Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "item_category")]
pub enum ItemCategory {
    Electronics,
    Books,
    Clothing,
    Accessories,
    #[sqlx(rename = "IDs")]
    Ids,
    Others,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "item_type", rename_all = "lowercase")]
pub enum ItemType {
    Lost,
    Found,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "item_status", rename_all = "lowercase")]
pub enum ItemStatus {
    Available,
    Pending,
    Claimed,
}

// ============================================================================
// Row types
// ============================================================================

/// Database row for an item
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRow {
    pub item_id: Uuid,
    pub category: ItemCategory,
    pub description: String,
    pub item_date: NaiveDate,
    pub location: String,
    pub item_type: ItemType,
    pub status: ItemStatus,
    pub reported_by: Uuid,
    pub claimed_by: Option<Uuid>,
    pub photo_url: Option<String>,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Item row returned by a transition, with the claimant it replaced
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransitionRow {
    pub previous_claimant: Option<Uuid>,
    #[sqlx(flatten)]
    pub item: ItemRow,
}

/// Columns writable by a direct edit
#[derive(Debug, Clone, Default)]
pub struct ItemDetailsUpdate {
    pub category: Option<ItemCategory>,
    pub description: Option<String>,
    pub item_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub photo_url: Option<String>,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
}

/// Filters for [`ItemRepository::search`]
#[derive(Debug, Clone, Default)]
pub struct ItemSearch {
    pub item_type: Option<ItemType>,
    pub category: Option<ItemCategory>,
    pub status: Option<ItemStatus>,
    /// Any term matching description, location, or category selects the row
    pub terms: Vec<String>,
}

/// Guarded status rewrite
#[derive(Debug, Clone, Copy)]
pub struct StatusChange {
    pub expected: ItemStatus,
    pub target: ItemStatus,
    pub claimant: ClaimantWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimantWrite {
    Assign(Uuid),
    Retain,
    Clear,
}

impl ClaimantWrite {
    fn mode(&self) -> &'static str {
        match self {
            ClaimantWrite::Assign(_) => "assign",
            ClaimantWrite::Retain => "retain",
            ClaimantWrite::Clear => "clear",
        }
    }

    fn assigned(&self) -> Option<Uuid> {
        match self {
            ClaimantWrite::Assign(id) => Some(*id),
            _ => None,
        }
    }
}
