pub mod dto;
pub mod postgrest;
pub mod sqlite;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::RecordId;

pub use postgrest::{PostgrestConfig, PostgrestStore};
pub use sqlite::SqliteStore;

/// A row as the store sees it: field name to value, including the
/// store-owned `id`, `created_at` and `updated_at` columns.
pub type Row = Map<String, Value>;

/// Columns the store assigns; never sent on insert or update.
pub const STORE_OWNED_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key value violates unique constraint \"{constraint}\"")]
    UniqueViolation { constraint: String },

    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("malformed row: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("invalid store url: {0}")]
    InvalidUrl(String),
}

impl StoreError {
    /// Field behind a uniqueness violation, read from a constraint named
    /// `<table>_<field>_key`.
    pub fn unique_field(&self, table: &str) -> Option<&str> {
        match self {
            StoreError::UniqueViolation { constraint } => constraint
                .strip_prefix(table)?
                .strip_prefix('_')?
                .strip_suffix("_key"),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                if let Some(constraint) = sqlite::constraint_name(db.message()) {
                    return StoreError::UniqueViolation { constraint };
                }
            }
        }

        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other),
        }
    }
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list(&self, table: &str, order_by: &str) -> Result<Vec<Row>, StoreError>;

    /// Rows where any of `columns` contains `term`, ignoring case.
    async fn search(
        &self,
        table: &str,
        columns: &[&str],
        term: &str,
        order_by: &str,
    ) -> Result<Vec<Row>, StoreError>;

    async fn insert(&self, table: &str, row: &Row) -> Result<Row, StoreError>;
    async fn update(&self, table: &str, id: RecordId, row: &Row) -> Result<Row, StoreError>;
    async fn delete(&self, table: &str, id: RecordId) -> Result<(), StoreError>;
    async fn get(&self, table: &str, id: RecordId) -> Result<Row, StoreError>;
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Table and column names end up in URLs and SQL text, so only plain
/// snake_case identifiers are accepted.
pub(crate) fn check_identifier(name: &str) -> Result<&str, StoreError> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Backslash-escapes LIKE wildcards so the term matches literally.
pub(crate) fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub(crate) fn writable_columns(row: &Row) -> Row {
    row.iter()
        .filter(|(k, _)| !STORE_OWNED_COLUMNS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
