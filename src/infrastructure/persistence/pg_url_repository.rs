//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{InsertOutcome, StoreError, UrlRepository};
use crate::utils::db_error::unique_violation_field;

/// Row shape shared by every query on `urls`.
#[derive(Debug, sqlx::FromRow)]
struct UrlRow {
    code: String,
    target_url: String,
    created_at: DateTime<Utc>,
    visits: i64,
}

impl From<UrlRow> for UrlRecord {
    fn from(row: UrlRow) -> Self {
        UrlRecord::new(row.code, row.target_url, row.created_at, row.visits)
    }
}

/// PostgreSQL repository for short code records.
///
/// Uniqueness of `code` is the primary key; uniqueness of `target_url` is a
/// unique index on its md5 digest, so URLs of any length can be stored.
/// Increments are single `UPDATE ... RETURNING` statements, so
/// concurrent redirects never lose a visit.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn insert_if_unique(&self, new_record: NewUrlRecord) -> Result<InsertOutcome, StoreError> {
        let result = sqlx::query_as::<_, UrlRow>(
            r#"
            INSERT INTO urls (code, target_url, created_at, visits)
            VALUES ($1, $2, $3, 0)
            RETURNING code, target_url, created_at, visits
            "#,
        )
        .bind(&new_record.code)
        .bind(&new_record.target_url)
        .bind(new_record.created_at)
        .fetch_one(self.pool.as_ref())
        .await;

        match result {
            Ok(row) => Ok(InsertOutcome::Inserted(row.into())),
            Err(e) => match unique_violation_field(&e) {
                Some(field) => Ok(InsertOutcome::Conflict(field)),
                None => Err(e.into()),
            },
        }
    }

    async fn find_by_target_url(&self, target_url: &str) -> Result<Option<UrlRecord>, StoreError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT code, target_url, created_at, visits
            FROM urls
            WHERE md5(target_url) = md5($1) AND target_url = $1
            "#,
        )
        .bind(target_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, StoreError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT code, target_url, created_at, visits
            FROM urls
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn find_and_increment_visits(&self, code: &str) -> Result<Option<UrlRecord>, StoreError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            UPDATE urls
            SET visits = visits + 1
            WHERE code = $1
            RETURNING code, target_url, created_at, visits
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn increment_visits(&self, code: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE urls SET visits = visits + 1 WHERE code = $1")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
