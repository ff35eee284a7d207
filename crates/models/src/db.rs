use std::time::Duration;

use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sea_orm::sqlx::ConnectOptions as _;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, SqlxSqliteConnector, Statement,
};
use tracing::info;

/// Build pool options from config.
///
/// In-memory SQLite is pinned to a single connection; see [`in_memory_pool_options`]
/// for the pool that is actually opened in that case.
pub fn connect_options(cfg: &DatabaseConfig) -> ConnectOptions {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);
    if is_in_memory_sqlite(&cfg.url) {
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(cfg.max_connections)
            .min_connections(cfg.min_connections)
            .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs));
    }
    opt
}

/// The database lives inside its only connection, so that connection must never
/// be reaped: no idle timeout and no max lifetime. `ConnectOptions` cannot
/// express "none" (unset falls back to sqlx's 10/30 minute defaults), so this
/// pool is built with sqlx directly.
pub fn in_memory_pool_options(cfg: &DatabaseConfig) -> SqlitePoolOptions {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
}

fn is_in_memory_sqlite(url: &str) -> bool {
    url.starts_with("sqlite:") && url.contains(":memory:")
}

async fn connect_in_memory(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opts: SqliteConnectOptions = cfg.url.parse()?;
    if !cfg.sqlx_logging {
        opts = opts.disable_statement_logging();
    }
    let pool = in_memory_pool_options(cfg).connect_with(opts).await?;
    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let db = if is_in_memory_sqlite(&cfg.url) {
        connect_in_memory(cfg).await?
    } else {
        Database::connect(connect_options(cfg)).await?
    };
    info!(backend = ?db.get_database_backend(), max_connections = cfg.max_connections, "database pool opened");
    Ok(db)
}

/// Create the `person` table if it does not exist yet.
pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
    migration::Migrator::up(db, None).await?;
    Ok(())
}

/// Round-trip a trivial statement through the pool.
pub async fn test_connection(db: &DatabaseConnection) -> anyhow::Result<()> {
    let backend = db.get_database_backend();
    db.execute(Statement::from_string(backend, "SELECT 1".to_string()))
        .await?;
    Ok(())
}

/// Close the pool; outstanding connections are dropped once returned.
pub async fn close(db: DatabaseConnection) -> anyhow::Result<()> {
    db.close().await?;
    info!("database pool closed");
    Ok(())
}
