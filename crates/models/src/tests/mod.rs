

use configs::DatabaseConfig;
use sea_orm::DatabaseConnection;

/// Fresh in-memory SQLite database with the schema applied.
pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..DatabaseConfig::default() };
    let db = crate::db::connect_with_config(&cfg).await?;
    crate::db::migrate(&db).await?;
    Ok(db)
}
