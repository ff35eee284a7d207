use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct PersonDoc {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
}

#[derive(ToSchema)]
pub struct PersonInputDoc {
    pub firstname: String,
    pub lastname: String,
}

#[derive(ToSchema)]
pub struct ErrorBodyDoc { pub error: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::people::list,
        crate::routes::people::find,
        crate::routes::people::create,
        crate::routes::people::update,
        crate::routes::people::delete,
    ),
    components(
        schemas(
            HealthResponse,
            PersonDoc,
            PersonInputDoc,
            ErrorBodyDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "person")
    )
)]
pub struct ApiDoc;

/// Record routes are annotated relative to the router prefix; the served
/// document carries the prefix the router was actually mounted at.
pub fn document(prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let paths = std::mem::take(&mut doc.paths.paths);
    doc.paths.paths = paths
        .into_iter()
        .map(|(path, item)| {
            if path == "/api" || path.starts_with("/api/") {
                (format!("{prefix}{path}"), item)
            } else {
                (path, item)
            }
        })
        .collect();
    doc
}
