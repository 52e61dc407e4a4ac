//! Startup selection of the persistence realization.

use std::sync::Arc;

use pms_core::store::Store;
use pms_db::SqlStore;
use pms_local::{FileKv, KvError, LocalStore};

use crate::config::{StorageBackend, StorageConfig};

#[derive(Debug, thiserror::Error)]
pub enum StorageInitError {
    #[error("Failed to open database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to run database migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Failed to open local store: {0}")]
    Local(#[from] KvError),
}

/// Open the configured backend, ready to serve requests.
///
/// The SQLite realization is health-checked and migrated before it is
/// returned; the local mirror creates its directory if missing.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn Store>, StorageInitError> {
    match config.backend {
        StorageBackend::Sqlite => {
            let pool = pms_db::create_pool(&config.database_url, config.db_max_connections).await?;
            tracing::info!("Database connection pool created");

            pms_db::health_check(&pool).await?;
            tracing::info!("Database health check passed");

            pms_db::run_migrations(&pool).await?;
            tracing::info!("Database migrations applied");

            Ok(Arc::new(SqlStore::new(pool)))
        }
        StorageBackend::Local => {
            let kv = FileKv::open(&config.local_dir).await?;
            tracing::info!(dir = %kv.dir().display(), seed = config.local_seed, "Local store opened");

            Ok(Arc::new(
                LocalStore::new(Arc::new(kv)).with_seed(config.local_seed),
            ))
        }
    }
}
