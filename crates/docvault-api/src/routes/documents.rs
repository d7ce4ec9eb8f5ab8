//! # Documents
//!
//! Upload, lookup, and download. All routes require a bearer token.
//!
//! Owner-scoped lookups take the user id from the path and reject it with
//! 403 unless it names the caller. Lookup by name is global across owners.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use docvault_core::{ContentAddress, DocId, DocumentQuery, DocumentRecord};
use docvault_custody::UploadRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::UploadForm;
use crate::state::AppState;

/// Result of a successful upload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocResponse {
    pub msg: String,
    pub doc_id: String,
    pub owner_id: String,
    pub content_address: String,
}

/// A document as returned by lookups.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub doc_id: String,
    pub name: String,
    pub content_type: String,
    /// ISO-8601 commit time.
    pub created_at: String,
    pub content_address: String,
}

impl From<DocumentRecord> for DocumentSummary {
    fn from(record: DocumentRecord) -> Self {
        Self {
            doc_id: record.doc_id.into(),
            name: record.name,
            content_type: record.content_type,
            created_at: record.created_at.to_iso8601(),
            content_address: record.content_address.into(),
        }
    }
}

/// Authenticated document routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/createdoc", post(create_doc))
        .route("/api/querydocbyuserid/{user_id}", get(query_by_user))
        .route(
            "/api/querydocbyuserid/{user_id}/download",
            get(download_first_for_user),
        )
        .route("/api/querydocbydocid/{user_id}/{doc_id}", get(query_by_doc_id))
        .route("/api/querydocbyname/{doc_name}", get(query_by_name))
        .route("/api/download/{content_address}", get(download))
}

/// POST /api/createdoc: Upload a document.
///
/// Multipart fields: `file` (required), `docid` (required), `docname`,
/// `userid` (must match the caller when present).
#[utoipa::path(
    post,
    path = "/api/createdoc",
    request_body(content_type = "multipart/form-data", description = "file, docid, docname, userid"),
    responses(
        (status = 201, description = "Document stored and indexed", body = CreateDocResponse),
        (status = 403, description = "userid does not match the caller", body = crate::error::ErrorBody),
        (status = 422, description = "Missing file or docid", body = crate::error::ErrorBody),
        (status = 503, description = "Blob store or index unavailable", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub(crate) async fn create_doc(
    State(state): State<AppState>,
    caller: CallerIdentity,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<CreateDocResponse>), AppError> {
    let form = UploadForm::read(multipart).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::Validation("no file uploaded".to_string()))?;

    let declared_name = form.doc_name.as_deref().or(file.file_name.as_deref());
    let request = UploadRequest::new(
        caller.owner_id,
        form.doc_id.as_deref().unwrap_or_default(),
        file.bytes,
        declared_name,
        file.content_type.as_deref(),
        form.user_id.as_deref(),
    )?;

    let record = state.custody.upload(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateDocResponse {
            msg: "document stored".to_string(),
            doc_id: record.doc_id.into(),
            owner_id: record.owner_id.into(),
            content_address: record.content_address.into(),
        }),
    ))
}

/// GET /api/querydocbyuserid/{user_id}: Every document of the caller.
#[utoipa::path(
    get,
    path = "/api/querydocbyuserid/{user_id}",
    params(("user_id" = String, Path, description = "Must be the caller's own id")),
    responses(
        (status = 200, description = "Documents in commit order", body = Vec<DocumentSummary>),
        (status = 403, description = "Not the caller", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub(crate) async fn query_by_user(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<DocumentSummary>>, AppError> {
    caller.ensure_is(&user_id)?;
    let records = state
        .custody
        .resolve(&DocumentQuery::by_owner(caller.owner_id))
        .await?;
    Ok(Json(records.into_iter().map(DocumentSummary::from).collect()))
}

/// GET /api/querydocbyuserid/{user_id}/download: Bytes of the caller's
/// first stored document.
#[utoipa::path(
    get,
    path = "/api/querydocbyuserid/{user_id}/download",
    params(("user_id" = String, Path, description = "Must be the caller's own id")),
    responses(
        (status = 200, description = "Raw bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "Caller has no stored documents", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub(crate) async fn download_first_for_user(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(user_id): Path<String>,
) -> Result<Response, AppError> {
    caller.ensure_is(&user_id)?;
    let (record, bytes) = state.custody.fetch_first_for_owner(&caller.owner_id).await?;
    Ok(blob_response(&record.content_address, bytes))
}

/// GET /api/querydocbydocid/{user_id}/{doc_id}: Records for one document id.
#[utoipa::path(
    get,
    path = "/api/querydocbydocid/{user_id}/{doc_id}",
    params(
        ("user_id" = String, Path, description = "Must be the caller's own id"),
        ("doc_id" = String, Path, description = "Caller-chosen document id"),
    ),
    responses(
        (status = 200, description = "Matching records; empty when none", body = Vec<DocumentSummary>),
        (status = 403, description = "Not the caller", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub(crate) async fn query_by_doc_id(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((user_id, doc_id)): Path<(String, String)>,
) -> Result<Json<Vec<DocumentSummary>>, AppError> {
    caller.ensure_is(&user_id)?;
    let doc_id = DocId::new(doc_id)?;
    let records = state
        .custody
        .resolve(&DocumentQuery::by_doc_id(caller.owner_id, doc_id))
        .await?;
    Ok(Json(records.into_iter().map(DocumentSummary::from).collect()))
}

/// GET /api/querydocbyname/{doc_name}: Records with this name, any owner.
#[utoipa::path(
    get,
    path = "/api/querydocbyname/{doc_name}",
    params(("doc_name" = String, Path, description = "Exact document name")),
    responses(
        (status = 200, description = "Matching records; empty when none", body = Vec<DocumentSummary>),
    ),
    tag = "documents"
)]
pub(crate) async fn query_by_name(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Path(doc_name): Path<String>,
) -> Result<Json<Vec<DocumentSummary>>, AppError> {
    let records = state
        .custody
        .resolve(&DocumentQuery::by_name(doc_name))
        .await?;
    Ok(Json(records.into_iter().map(DocumentSummary::from).collect()))
}

/// GET /api/download/{content_address}: Raw bytes by address.
#[utoipa::path(
    get,
    path = "/api/download/{content_address}",
    params(("content_address" = String, Path, description = "Address returned at upload")),
    responses(
        (status = 200, description = "Raw bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "Unknown address", body = crate::error::ErrorBody),
        (status = 500, description = "Stored bytes failed verification", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub(crate) async fn download(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Path(content_address): Path<String>,
) -> Result<Response, AppError> {
    let address = ContentAddress::new(content_address)?;
    let bytes = state.custody.fetch_blob(&address).await?;
    Ok(blob_response(&address, bytes))
}

fn blob_response(address: &ContentAddress, bytes: Bytes) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_LENGTH, bytes.len().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{address}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
