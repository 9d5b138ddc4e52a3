//! PostgreSQL implementation of the record repository.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{Lookup, NewRecord, PutOutcome, Record, StoreStats};
use crate::domain::repositories::RecordRepository;
use crate::error::StoreError;

const ID_CONSTRAINT: &str = "urls_pkey";
const URL_CONSTRAINT: &str = "urls_url_key";

/// PostgreSQL repository over the `urls` and `user_urls` tables.
///
/// Collision and duplicate detection rely on the unique constraints of
/// `urls`; there is no read-before-insert, so concurrent writers are
/// serialized by the database itself.
pub struct PgRecordRepository {
    pool: Arc<PgPool>,
}

impl PgRecordRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Opens a pool for `database_url` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database is unreachable or a migration
    /// fails.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Query(format!("migration failed: {e}")))?;

        Ok(Self::new(Arc::new(pool)))
    }

    async fn find_id_by_url(&self, url: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT id FROM urls WHERE url = $1")
            .bind(url)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        row.map(|r| r.try_get::<String, _>("id").map_err(map_sqlx_error))
            .transpose()
    }
}

/// Name of the unique constraint a failed insert violated, if any.
fn violated_unique_constraint(err: &sqlx::Error) -> Option<String> {
    let db_err = err.as_database_error()?;
    if !db_err.is_unique_violation() {
        return None;
    }
    db_err.constraint().map(str::to_owned)
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StoreError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StoreError::InvalidData(message),
        ref e if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
            StoreError::Conflict(message)
        }
        _ => StoreError::Query(message),
    }
}

async fn insert_rows(
    tx: &mut Transaction<'_, Postgres>,
    record: &NewRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO urls (id, url) VALUES ($1, $2)")
        .bind(&record.id)
        .bind(&record.url)
        .execute(&mut **tx)
        .await?;

    sqlx::query("INSERT INTO user_urls (short_id, owner_id) VALUES ($1, $2)")
        .bind(&record.id)
        .bind(&record.owner_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

#[async_trait]
impl RecordRepository for PgRecordRepository {
    async fn put(&self, record: NewRecord) -> Result<PutOutcome, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        if let Err(err) = insert_rows(&mut tx, &record).await {
            // Dropping the transaction rolls it back.
            drop(tx);

            return match violated_unique_constraint(&err).as_deref() {
                Some(ID_CONSTRAINT) => Ok(PutOutcome::Collision),
                Some(URL_CONSTRAINT) => {
                    let existing_id = self.find_id_by_url(&record.url).await?.ok_or_else(|| {
                        StoreError::InvalidData(format!(
                            "url '{}' violated uniqueness but no row holds it",
                            record.url
                        ))
                    })?;
                    Ok(PutOutcome::Duplicate { existing_id })
                }
                _ => Err(map_sqlx_error(err)),
            };
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(PutOutcome::Created)
    }

    async fn get(&self, id: &str) -> Result<Lookup, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT u.url,
                   EXISTS (
                       SELECT 1 FROM user_urls uu
                       WHERE uu.short_id = u.id AND uu.is_deleted
                   ) AS gone
            FROM urls u
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(Lookup::NotFound);
        };

        let gone: bool = row.try_get("gone").map_err(map_sqlx_error)?;
        if gone {
            return Ok(Lookup::Gone);
        }

        let url: String = row.try_get("url").map_err(map_sqlx_error)?;
        Ok(Lookup::Found(url))
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.url, uu.owner_id, uu.is_deleted
            FROM urls u
            JOIN user_urls uu ON uu.short_id = u.id
            WHERE uu.owner_id = $1
            ORDER BY uu.id
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(Record {
                    id: row.try_get("id").map_err(map_sqlx_error)?,
                    url: row.try_get("url").map_err(map_sqlx_error)?,
                    owner_id: row.try_get("owner_id").map_err(map_sqlx_error)?,
                    deleted: row.try_get("is_deleted").map_err(map_sqlx_error)?,
                })
            })
            .collect()
    }

    async fn soft_delete(&self, ids: &[String], owner_id: &str) -> Result<u64, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let mut marked = 0;

        for id in ids {
            let result = sqlx::query(
                r#"
                UPDATE user_urls
                SET is_deleted = TRUE
                WHERE owner_id = $1 AND short_id = $2 AND NOT is_deleted
                "#,
            )
            .bind(owner_id)
            .bind(id)
            .execute(&mut *conn)
            .await;

            match result {
                Ok(done) => marked += done.rows_affected(),
                Err(e) => {
                    tracing::warn!(id = %id, owner_id, error = %e, "Failed to soft-delete record");
                }
            }
        }

        Ok(marked)
    }

    async fn insert_batch(&self, records: Vec<NewRecord>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        for record in &records {
            if let Err(err) = insert_rows(&mut tx, record).await {
                return Err(match violated_unique_constraint(&err).as_deref() {
                    Some(ID_CONSTRAINT) => {
                        StoreError::Conflict(format!("id '{}' is taken", record.id))
                    }
                    Some(URL_CONSTRAINT) => {
                        StoreError::Conflict(format!("url '{}' is already stored", record.url))
                    }
                    _ => map_sqlx_error(err),
                });
            }
        }

        tx.commit().await.map_err(map_sqlx_error)
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM urls) AS urls,
                (SELECT COUNT(DISTINCT owner_id) FROM user_urls WHERE owner_id <> '') AS users
            "#,
        )
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        let urls: i64 = row.try_get("urls").map_err(map_sqlx_error)?;
        let users: i64 = row.try_get("users").map_err(map_sqlx_error)?;

        Ok(StoreStats {
            urls: urls.max(0) as u64,
            users: users.max(0) as u64,
        })
    }
}
