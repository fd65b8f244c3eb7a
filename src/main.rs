use std::sync::Arc;

use tower_sessions::MemoryStore;
use tower_sessions_sqlx_store::PostgresStore;

mod app;
mod auth;
mod config;
mod db;
mod error;
mod flash;
mod home;
mod memory;
mod products;
mod state;
mod suppliers;
mod views;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "stockroom=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);

    let app = if config.uses_memory_backend() {
        tracing::warn!("using in-memory storage; data is lost on restart");
        let state = AppState::in_memory(config.clone());
        app::build_app(state, MemoryStore::default())
    } else {
        let pool = db::connect(&config.database_url).await?;
        db::migrate(&pool).await?;

        let session_store = PostgresStore::new(pool.clone());
        session_store.migrate().await?;

        let state = AppState::postgres(config.clone(), pool);
        app::build_app(state, session_store)
    };

    app::serve(app, &config).await
}
