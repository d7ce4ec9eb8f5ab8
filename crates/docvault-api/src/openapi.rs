//! # OpenAPI Specification
//!
//! utoipa-generated OpenAPI 3.1 document served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "docvault API",
        version = "0.1.0",
        description = "Document custody: content-addressed blob storage with an owner-scoped metadata index."
    ),
    paths(
        crate::routes::users::create_user,
        crate::routes::users::login,
        crate::routes::documents::create_doc,
        crate::routes::documents::query_by_user,
        crate::routes::documents::download_first_for_user,
        crate::routes::documents::query_by_doc_id,
        crate::routes::documents::query_by_name,
        crate::routes::documents::download,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::users::CredentialsRequest,
        crate::routes::users::CreateUserResponse,
        crate::routes::users::LoginResponse,
        crate::routes::documents::CreateDocResponse,
        crate::routes::documents::DocumentSummary,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "accounts", description = "Registration and token login"),
        (name = "documents", description = "Upload, lookup, and download"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
