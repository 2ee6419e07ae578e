//! PostgreSQL implementation of MarriageStore.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, MarriageId, MemberKey, Timestamp};
use crate::domain::marriage::{Marriage, MarriageStatus};
use crate::ports::MarriageStore;

/// PostgreSQL implementation of MarriageStore.
#[derive(Clone)]
pub struct PostgresMarriageStore {
    pool: PgPool,
}

impl PostgresMarriageStore {
    /// Creates a new PostgresMarriageStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MarriageStore for PostgresMarriageStore {
    async fn insert(&self, marriage: &Marriage) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO marriages (id, husband, wife, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(marriage.id().as_uuid())
        .bind(marriage.husband().as_uuid())
        .bind(marriage.wife().as_uuid())
        .bind(marriage.status().as_str())
        .bind(marriage.created_at().as_datetime())
        .bind(marriage.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(de)
                if de.kind() == sqlx::error::ErrorKind::UniqueViolation =>
            {
                DomainError::new(
                    ErrorCode::DuplicateMarriage,
                    "A marriage record for this pair already exists",
                )
            }
            _ => DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert marriage: {}", e),
            ),
        })?;

        Ok(())
    }

    async fn update(&self, marriage: &Marriage) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE marriages SET
                husband = $2, wife = $3, status = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(marriage.id().as_uuid())
        .bind(marriage.husband().as_uuid())
        .bind(marriage.wife().as_uuid())
        .bind(marriage.status().as_str())
        .bind(marriage.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update marriage: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::MarriageNotFound,
                format!("Marriage not found: {}", marriage.id()),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &MarriageId) -> Result<Option<Marriage>, DomainError> {
        let row = sqlx::query(
            "SELECT id, husband, wife, status, created_at, updated_at FROM marriages WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(fetch_error)?;

        row.map(row_to_marriage).transpose()
    }

    async fn find_active_for(&self, key: &MemberKey) -> Result<Option<Marriage>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, husband, wife, status, created_at, updated_at FROM marriages
            WHERE status = 'Active' AND (husband = $1 OR wife = $1)
            LIMIT 1
            "#,
        )
        .bind(key.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(fetch_error)?;

        row.map(row_to_marriage).transpose()
    }

    async fn find_active_touching(
        &self,
        keys: &[MemberKey],
    ) -> Result<Vec<Marriage>, DomainError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = keys.iter().map(|k| *k.as_uuid()).collect();
        let rows = sqlx::query(
            r#"
            SELECT id, husband, wife, status, created_at, updated_at FROM marriages
            WHERE status = 'Active' AND (husband = ANY($1) OR wife = ANY($1))
            "#,
        )
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await
        .map_err(fetch_error)?;

        rows.into_iter().map(row_to_marriage).collect()
    }

    async fn find_for_pair(
        &self,
        a: &MemberKey,
        b: &MemberKey,
    ) -> Result<Option<Marriage>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, husband, wife, status, created_at, updated_at FROM marriages
            WHERE (husband = $1 AND wife = $2) OR (husband = $2 AND wife = $1)
            LIMIT 1
            "#,
        )
        .bind(a.as_uuid())
        .bind(b.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(fetch_error)?;

        row.map(row_to_marriage).transpose()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn fetch_error(e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to fetch marriage: {}", e),
    )
}

fn row_to_marriage(row: sqlx::postgres::PgRow) -> Result<Marriage, DomainError> {
    let column_error = |name: &str, e: String| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get {}: {}", name, e),
        )
    };

    let id: Uuid = row
        .try_get("id")
        .map_err(|e| column_error("id", e.to_string()))?;
    let husband: Uuid = row
        .try_get("husband")
        .map_err(|e| column_error("husband", e.to_string()))?;
    let wife: Uuid = row
        .try_get("wife")
        .map_err(|e| column_error("wife", e.to_string()))?;
    let status: String = row
        .try_get("status")
        .map_err(|e| column_error("status", e.to_string()))?;
    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| column_error("created_at", e.to_string()))?;
    let updated_at: chrono::DateTime<chrono::Utc> = row
        .try_get("updated_at")
        .map_err(|e| column_error("updated_at", e.to_string()))?;

    let status: MarriageStatus = status
        .parse()
        .map_err(|e: crate::domain::foundation::ValidationError| {
            column_error("status", e.to_string())
        })?;

    Ok(Marriage::reconstitute(
        MarriageId::from_uuid(id),
        MemberKey::from_uuid(husband),
        MemberKey::from_uuid(wife),
        status,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}
