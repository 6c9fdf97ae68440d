use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use registro_academico::api::router;
use registro_academico::config::{AppConfig, StoreConfig};
use registro_academico::state::AppState;
use registro_academico::store::{PostgrestStore, RemoteStore, SqliteStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "registro_academico=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let store: Arc<dyn RemoteStore> = match &config.store {
        StoreConfig::Postgrest(postgrest) => {
            info!("using hosted store at {}", postgrest.base_url);
            Arc::new(PostgrestStore::new(postgrest.clone())?)
        }
        StoreConfig::Sqlite { database_url } => {
            info!("using local store at {}", database_url);
            Arc::new(SqliteStore::connect(database_url).await?)
        }
    };

    let state = AppState::new(store);
    state.load_all().await;

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
