/// Target storage
///
/// Targets live in a libsql database, either a local file or a remote
/// libsql server. This module owns the schema and the only read/write paths.

pub mod migrations;
pub mod models;
pub mod repository;

#[cfg(test)]
mod tests;

pub use models::TargetRecord;
pub use repository::{DatabaseImpl, TargetStore};

use anyhow::{Context, Result};

use crate::config::{DatabaseConfig, DatabaseLocation};
use crate::pool::build_pool;

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}

/// Open the configured database, bring the schema up to date and return a store
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseImpl> {
    let database = match config.location() {
        DatabaseLocation::Local(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            tracing::info!("Opening local database at {}", path.display());
            libsql::Builder::new_local(&path)
                .build()
                .await
                .with_context(|| format!("opening {}", path.display()))?
        }
        DatabaseLocation::Remote { url, auth_token } => {
            tracing::info!("Connecting to remote database at {}", url);
            libsql::Builder::new_remote(url.clone(), auth_token)
                .build()
                .await
                .with_context(|| format!("connecting to {url}"))?
        }
    };

    let pool = build_pool(database, config.pool_size)?;
    let conn = pool.get().await.context("acquiring a database connection")?;
    initialize_database(&conn).await.context("running migrations")?;
    tracing::info!("Database connected ...");

    Ok(DatabaseImpl::new_from_pool(pool))
}
