use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, info, warn};

pub const CONTENT_NOT_FOUND: &str = "content not found";
pub const LIST_FAILED: &str = "not able to find in the table";
pub const INTERNAL: &str = "internal server error";

/// Handler-boundary error. Every variant renders as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The list read failed; reported with its own message.
    #[error("not able to find in the table: {0}")]
    List(#[source] ServiceError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::List(_) => StatusCode::NOT_FOUND,
            ApiError::Service(e) => match e {
                ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ServiceError::NotFound(_)
                | ServiceError::InvalidId(_)
                | ServiceError::InvalidPredicate(_)
                | ServiceError::Query(_) => StatusCode::NOT_FOUND,
                ServiceError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// External message. Internal detail never leaves the process.
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::List(_) => LIST_FAILED,
            ApiError::Service(ServiceError::Validation(_)) => models::person::EMPTY_FIELDS,
            ApiError::Service(ServiceError::Db(_)) => INTERNAL,
            ApiError::Service(_) => CONTENT_NOT_FOUND,
        }
    }

    fn source_kind(&self) -> &'static str {
        match self {
            ApiError::List(e) | ApiError::Service(e) => e.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.source_kind();
        match &self {
            ApiError::Service(ServiceError::Db(_)) => {
                error!(error_kind = kind, error = %self, status = status.as_u16(), "write failed")
            }
            ApiError::List(_) | ApiError::Service(ServiceError::Query(_) | ServiceError::InvalidPredicate(_)) => {
                warn!(error_kind = kind, error = %self, status = status.as_u16(), "read failed")
            }
            ApiError::Service(_) => {
                info!(error_kind = kind, error = %self, status = status.as_u16(), "request rejected")
            }
        }
        (status, Json(ErrorBody::new(self.message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_message_per_category() {
        let cases = [
            (ApiError::from(ServiceError::Validation("x".into())), 422, "fields are empty"),
            (ApiError::from(ServiceError::not_found("person")), 404, CONTENT_NOT_FOUND),
            (ApiError::from(ServiceError::InvalidId("abc".into())), 404, CONTENT_NOT_FOUND),
            (ApiError::from(ServiceError::InvalidPredicate("x".into())), 404, CONTENT_NOT_FOUND),
            (ApiError::from(ServiceError::Query("syntax".into())), 404, CONTENT_NOT_FOUND),
            (ApiError::from(ServiceError::Db("disk".into())), 500, INTERNAL),
            (ApiError::List(ServiceError::Query("gone".into())), 404, LIST_FAILED),
        ];
        for (err, status, msg) in cases {
            assert_eq!(err.status().as_u16(), status, "{err}");
            assert_eq!(err.message(), msg);
        }
    }

    #[test]
    fn into_response_uses_status() {
        let resp = ApiError::from(ServiceError::Db("boom".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
