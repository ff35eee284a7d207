use std::collections::BTreeMap;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use service::person::domain::{Person, PersonInput};
use tracing::{debug, info};

use super::AppState;
use crate::{errors::ApiError, observability};

/// Count the outcome, then hand it back unchanged.
fn observe<T>(operation: &'static str, ok: StatusCode, started: Instant, res: Result<T, ApiError>) -> Result<T, ApiError> {
    let status = match &res {
        Ok(_) => ok,
        Err(e) => e.status(),
    };
    observability::record(operation, status, started);
    res
}

/// An undecodable body is treated like one with both names missing.
fn input_or_empty(body: Result<Json<PersonInput>, JsonRejection>) -> PersonInput {
    match body {
        Ok(Json(input)) => input,
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "undecodable person body");
            PersonInput::default()
        }
    }
}

#[utoipa::path(
    get, path = "/api", tag = "person",
    responses(
        (status = 200, description = "All records", body = [crate::openapi::PersonDoc]),
        (status = 404, description = "Store read failed", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Person>>, ApiError> {
    let started = Instant::now();
    let res = state.people.list().await.map_err(ApiError::List);
    if let Ok(rows) = &res {
        info!(count = rows.len(), "list persons");
    }
    observe("list", StatusCode::OK, started, res).map(Json)
}

#[utoipa::path(
    get, path = "/api/{whereclause}", tag = "person",
    params(("whereclause" = String, Path, description = "Predicate, e.g. `id=3` or `last_name='Pike'`")),
    responses(
        (status = 200, description = "Matching records", body = [crate::openapi::PersonDoc]),
        (status = 404, description = "Malformed predicate or query error", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn find(State(state): State<AppState>, Path(clause): Path<String>) -> Result<Json<Vec<Person>>, ApiError> {
    let started = Instant::now();
    let res = state.people.find_by_clause(&clause).await.map_err(ApiError::from);
    observe("find", StatusCode::OK, started, res).map(Json)
}

#[utoipa::path(
    post, path = "/api", tag = "person",
    request_body = crate::openapi::PersonInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::PersonDoc),
        (status = 422, description = "Fields are empty", body = crate::openapi::ErrorBodyDoc),
        (status = 500, description = "Insert failed", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<PersonInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Person>), ApiError> {
    let started = Instant::now();
    let res = state.people.create(input_or_empty(body)).await.map_err(ApiError::from);
    observe("create", StatusCode::CREATED, started, res).map(|p| (StatusCode::CREATED, Json(p)))
}

#[utoipa::path(
    put, path = "/api/{id}", tag = "person",
    params(("id" = i32, Path, description = "Record id")),
    request_body = crate::openapi::PersonInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::PersonDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorBodyDoc),
        (status = 422, description = "Fields are empty", body = crate::openapi::ErrorBodyDoc),
        (status = 500, description = "Update failed", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PersonInput>, JsonRejection>,
) -> Result<Json<Person>, ApiError> {
    let started = Instant::now();
    let res = state.people.update(&id, input_or_empty(body)).await.map_err(ApiError::from);
    observe("update", StatusCode::OK, started, res).map(Json)
}

#[utoipa::path(
    delete, path = "/api/{id}", tag = "person",
    params(("id" = i32, Path, description = "Record id")),
    responses(
        (status = 200, description = "Deleted, body is `{\"id #<id>\": \"deleted\"}`"),
        (status = 404, description = "Not found", body = crate::openapi::ErrorBodyDoc),
        (status = 500, description = "Delete failed", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BTreeMap<String, &'static str>>, ApiError> {
    let started = Instant::now();
    let res = state.people.delete(&id).await.map_err(ApiError::from);
    observe("delete", StatusCode::OK, started, res)
        .map(|_| Json(BTreeMap::from([(format!("id #{id}"), "deleted")])))
}
