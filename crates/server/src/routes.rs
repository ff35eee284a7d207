use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use configs::PredicateMode;
use sea_orm::DatabaseConnection;
use service::person::{repo::seaorm::SeaOrmPersonRepository, repository::PersonRepository, PersonService};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, Level};

use common::types::Health;

use crate::{observability, openapi};

pub mod people;

/// Shared handler state. The repository is a trait object so tests can swap the store.
#[derive(Clone)]
pub struct AppState {
    pub people: Arc<PersonService<dyn PersonRepository>>,
}

impl AppState {
    pub fn new(repo: Arc<dyn PersonRepository>, mode: PredicateMode) -> Self {
        Self { people: Arc::new(PersonService::new(repo, mode)) }
    }

    /// State backed by the sea-orm repository over `db`.
    pub fn with_database(db: DatabaseConnection, mode: PredicateMode) -> Self {
        Self::new(Arc::new(SeaOrmPersonRepository::new(db)), mode)
    }
}

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "OK", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> Response {
    match observability::encode_metrics() {
        Ok(body) => ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response(),
        Err(e) => {
            error!(error = %e, "metrics encoding failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Record routes, relative to the configured prefix.
///
/// Find, update and delete share one path parameter: the router cannot hold two
/// differently named parameters at the same position.
pub fn record_routes() -> Router<AppState> {
    Router::new()
        .route("/api", get(people::list).post(people::create))
        .route(
            "/api/:key",
            get(people::find).put(people::update).delete(people::delete),
        )
}

/// Build the full application router: record routes under `prefix`, operational routes at the root.
pub fn build_router(state: AppState, prefix: &str, cors: CorsLayer) -> Router {
    let api = if prefix.is_empty() {
        record_routes()
    } else {
        Router::new().nest(prefix, record_routes())
    };

    let doc = openapi::document(prefix);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(move || async move { Json(doc) }))
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
