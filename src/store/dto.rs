use serde::Deserialize;

use super::StoreError;

/// Error body returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
pub struct PostgrestErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

pub const UNIQUE_VIOLATION: &str = "23505";
pub const NO_ROWS: &str = "PGRST116";

impl PostgrestErrorBody {
    pub fn into_store_error(self, status: u16, table: &str) -> StoreError {
        match self.code.as_deref() {
            Some(UNIQUE_VIOLATION) => {
                let constraint = self
                    .message
                    .as_deref()
                    .and_then(quoted_constraint)
                    .or_else(|| {
                        self.details
                            .as_deref()
                            .and_then(key_column)
                            .map(|col| format!("{}_{}_key", table, col))
                    })
                    .unwrap_or_else(|| format!("{}_unknown_key", table));
                StoreError::UniqueViolation { constraint }
            }
            Some(NO_ROWS) => StoreError::NotFound,
            _ => StoreError::Api {
                status,
                message: self
                    .message
                    .unwrap_or_else(|| format!("store responded with HTTP {}", status)),
                code: self.code,
            },
        }
    }
}

/// `duplicate key value violates unique constraint "cursos_codigo_key"`
fn quoted_constraint(message: &str) -> Option<String> {
    let start = message.find('"')? + 1;
    let len = message[start..].find('"')?;
    Some(message[start..start + len].to_string())
}

/// `Key (email)=(ana@x.com) already exists.`
fn key_column(details: &str) -> Option<&str> {
    let start = details.find("Key (")? + "Key (".len();
    let len = details[start..].find(')')?;
    Some(&details[start..start + len])
}
