use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row as _, SqlitePool};
use tracing::{debug, info};

use super::{RemoteStore, Row, StoreError, check_identifier, escape_like, writable_columns};
use crate::models::RecordId;

/// Local stand-in for the hosted store: same collections, same unique keys,
/// rows kept as JSON documents.
#[derive(Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let db = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::from_pool(db).await
    }

    /// A private in-memory database. The single connection is never recycled
    /// so the data lives as long as the store.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(db).await
    }

    async fn from_pool(db: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations").run(&db).await?;
        info!("sqlite store ready");
        Ok(Self { db })
    }
}

/// Constraint name from a SQLite uniqueness message, normalised to
/// `<table>_<field>_key`.
///
/// Handles both `UNIQUE constraint failed: index 'cursos_codigo_key'` and
/// `UNIQUE constraint failed: cursos.codigo`.
pub(crate) fn constraint_name(message: &str) -> Option<String> {
    let detail = message.split("UNIQUE constraint failed:").nth(1)?.trim();
    if let Some(rest) = detail.strip_prefix("index '") {
        return rest.split('\'').next().map(str::to_string);
    }
    let first = detail.split(',').next()?.trim();
    let (table, column) = first.split_once('.')?;
    Some(format!("{}_{}_key", table, column))
}

fn json_path(column: &str) -> Result<String, StoreError> {
    Ok(format!("$.{}", check_identifier(column)?))
}

fn decode_row(row: SqliteRow) -> Result<Row, StoreError> {
    let id: i64 = row.try_get("id")?;
    let data: String = row.try_get("data")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    let mut fields: Row = serde_json::from_str(&data)?;
    fields.insert("id".to_string(), Value::from(id));
    fields.insert("created_at".to_string(), Value::String(created_at));
    fields.insert("updated_at".to_string(), Value::String(updated_at));
    Ok(fields)
}

#[async_trait]
impl RemoteStore for SqliteStore {
    async fn list(&self, table: &str, order_by: &str) -> Result<Vec<Row>, StoreError> {
        let sql = format!(
            "SELECT id, data, created_at, updated_at FROM {} \
             ORDER BY json_extract(data, ?) COLLATE NOCASE, id",
            check_identifier(table)?
        );
        let rows = sqlx::query(&sql)
            .bind(json_path(order_by)?)
            .fetch_all(&self.db)
            .await?;
        rows.into_iter().map(decode_row).collect()
    }

    async fn search(
        &self,
        table: &str,
        columns: &[&str],
        term: &str,
        order_by: &str,
    ) -> Result<Vec<Row>, StoreError> {
        if columns.is_empty() {
            return self.list(table, order_by).await;
        }

        let predicate = columns
            .iter()
            .map(|_| "json_extract(data, ?) LIKE ? ESCAPE '\\'")
            .collect::<Vec<_>>()
            .join(" OR ");
        let sql = format!(
            "SELECT id, data, created_at, updated_at FROM {} WHERE {} \
             ORDER BY json_extract(data, ?) COLLATE NOCASE, id",
            check_identifier(table)?,
            predicate
        );
        debug!("search {} for {:?} in {:?}", table, term, columns);

        let pattern = format!("%{}%", escape_like(term));
        let mut query = sqlx::query(&sql);
        for column in columns {
            query = query.bind(json_path(column)?).bind(pattern.clone());
        }
        let rows = query
            .bind(json_path(order_by)?)
            .fetch_all(&self.db)
            .await?;
        rows.into_iter().map(decode_row).collect()
    }

    async fn insert(&self, table: &str, row: &Row) -> Result<Row, StoreError> {
        let sql = format!(
            "INSERT INTO {} (data, created_at, updated_at) VALUES (?1, ?2, ?2) \
             RETURNING id, data, created_at, updated_at",
            check_identifier(table)?
        );
        let data = serde_json::to_string(&writable_columns(row))?;
        let now = Utc::now().to_rfc3339();

        let inserted = sqlx::query(&sql)
            .bind(data)
            .bind(now)
            .fetch_one(&self.db)
            .await?;
        decode_row(inserted)
    }

    async fn update(&self, table: &str, id: RecordId, row: &Row) -> Result<Row, StoreError> {
        let sql = format!(
            "UPDATE {} SET data = ?1, updated_at = ?2 WHERE id = ?3 \
             RETURNING id, data, created_at, updated_at",
            check_identifier(table)?
        );
        let data = serde_json::to_string(&writable_columns(row))?;
        let now = Utc::now().to_rfc3339();

        let updated = sqlx::query(&sql)
            .bind(data)
            .bind(now)
            .bind(id.0)
            .fetch_optional(&self.db)
            .await?
            .ok_or(StoreError::NotFound)?;
        decode_row(updated)
    }

    async fn delete(&self, table: &str, id: RecordId) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", check_identifier(table)?);
        let affected = sqlx::query(&sql)
            .bind(id.0)
            .execute(&self.db)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get(&self, table: &str, id: RecordId) -> Result<Row, StoreError> {
        let sql = format!(
            "SELECT id, data, created_at, updated_at FROM {} WHERE id = ?1",
            check_identifier(table)?
        );
        let row = sqlx::query(&sql)
            .bind(id.0)
            .fetch_optional(&self.db)
            .await?
            .ok_or(StoreError::NotFound)?;
        decode_row(row)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("select 1").execute(&self.db).await?;
        Ok(())
    }
}
