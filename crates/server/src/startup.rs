use std::future::Future;

use axum::Router;
use configs::{AppConfig, DatabaseConfig, PredicateMode};
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the pool, check it, and bring the schema up to date.
pub async fn connect_and_migrate(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let db = models::db::connect_with_config(cfg).await?;
    models::db::test_connection(&db).await?;
    models::db::migrate(&db).await?;
    info!(event = "migrated", "person table ready");
    Ok(db)
}

/// Router over an existing connection, as configured.
pub fn build_app(db: DatabaseConnection, cfg: &AppConfig) -> Router {
    let state = AppState::with_database(db, cfg.find.predicate_mode);
    routes::build_router(state, &cfg.server.route_prefix, build_cors())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(service = "crudtest", event = "shutdown_signal", "shutdown signal received, draining");
}

/// Serve until `shutdown` resolves, then close the pool.
pub async fn serve<F>(cfg: AppConfig, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if cfg.find.predicate_mode == PredicateMode::Raw {
        warn!(
            event = "raw_predicates_enabled",
            "find.predicate_mode=raw splices path text into SQL; expose only to trusted callers"
        );
    }

    let db = connect_and_migrate(&cfg.database).await?;
    let app = build_app(db.clone(), &cfg);

    let addr = listener.local_addr()?;
    info!(%addr, prefix = %cfg.server.route_prefix, "listening");
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    models::db::close(db).await?;
    served?;
    Ok(())
}

/// Public entry: bind the configured address and serve until a shutdown signal.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(cfg.server.bind_addr()).await?;
    serve(cfg, listener, shutdown_signal()).await
}
