use crate::auth::repo::UserRepo;
use crate::config::{ephemeral_secret, AppConfig, SessionConfig, MEMORY_DATABASE_URL};
use crate::db::PgDb;
use crate::memory::MemoryDb;
use crate::products::repo::ProductRepo;
use crate::suppliers::repo::SupplierRepo;
use sqlx::PgPool;
use std::sync::Arc;
use tower_sessions::cookie::Key;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub suppliers: Arc<dyn SupplierRepo>,
    pub products: Arc<dyn ProductRepo>,
}

impl AppState {
    /// All three repositories served by one backend.
    pub fn from_parts<B>(config: Arc<AppConfig>, backend: Arc<B>) -> Self
    where
        B: UserRepo + SupplierRepo + ProductRepo + 'static,
    {
        Self {
            config,
            users: backend.clone(),
            suppliers: backend.clone(),
            products: backend,
        }
    }

    pub fn postgres(config: Arc<AppConfig>, pool: PgPool) -> Self {
        Self::from_parts(config, Arc::new(PgDb::new(pool)))
    }

    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        Self::from_parts(config, Arc::new(MemoryDb::new()))
    }

    /// In-memory state with test settings.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: MEMORY_DATABASE_URL.into(),
            host: "127.0.0.1".into(),
            port: 0,
            session: SessionConfig {
                cookie_name: "stockroom.sid".into(),
                ttl_hours: 24,
                secure: false,
                key: Key::from(ephemeral_secret().as_bytes()),
            },
        });
        Self::in_memory(config)
    }
}
