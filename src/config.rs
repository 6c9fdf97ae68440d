use std::env;
use std::net::SocketAddr;

use crate::error::AppError;
use crate::store::PostgrestConfig;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://registro.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug)]
pub enum StoreConfig {
    Postgrest(PostgrestConfig),
    Sqlite { database_url: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// `SUPABASE_URL` selects the hosted store and then requires
    /// `SUPABASE_ANON_KEY`; otherwise `DATABASE_URL` (or the default file) is
    /// opened with SQLite.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        let store = match lookup("SUPABASE_URL").filter(|v| !v.is_empty()) {
            Some(base_url) => {
                let api_key = lookup("SUPABASE_ANON_KEY")
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| AppError::Config("SUPABASE_ANON_KEY is not set".to_string()))?;
                StoreConfig::Postgrest(PostgrestConfig { base_url, api_key })
            }
            None => StoreConfig::Sqlite {
                database_url: lookup("DATABASE_URL")
                    .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            },
        };

        Ok(Self { bind_addr, store })
    }
}
