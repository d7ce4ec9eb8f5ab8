//! # Integration Tests for docvault-api
//!
//! Drives the full router in memory: registration and login, bearer
//! authentication, multipart upload, every lookup route, download headers,
//! health probes, and OpenAPI generation.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use docvault_api::bootstrap;
use docvault_api::config::AppConfig;

const SECRET: &str = "integration-test-secret-0123456789abcdef";
const BOUNDARY: &str = "docvault-test-boundary";

fn test_app() -> axum::Router {
    let state = bootstrap::in_memory(AppConfig::local(SECRET)).unwrap();
    docvault_api::app(state)
}

async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

/// Build a multipart body by hand. `file` is `(file_name, content_type, bytes)`.
fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/createdoc")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Register and log in; returns `(user_id, access_token)`.
async fn register_and_login(app: &axum::Router, email: &str) -> (String, String) {
    let creds = serde_json::json!({ "email": email, "pwd": "correct horse battery" });

    let response = app
        .clone()
        .oneshot(json_post("/api/createUser", creds.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let user_id = created["userId"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_post("/api/login", creds))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["accessToken"]
        .as_str()
        .unwrap()
        .to_string();

    (user_id, token)
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = test_app()
        .oneshot(Request::builder().uri("/health/liveness").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe_with_memory_backends() {
    let response = test_app()
        .oneshot(Request::builder().uri("/health/readiness").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

#[tokio::test]
async fn test_metrics_without_recorder_is_not_found() {
    let response = test_app()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Accounts -----------------------------------------------------------------

#[tokio::test]
async fn test_register_then_login() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "alice@example.com").await;
    assert!(!user_id.is_empty());
    assert_eq!(token.split('.').count(), 3);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = test_app();
    register_and_login(&app, "alice@example.com").await;

    let response = app
        .oneshot(json_post(
            "/api/createUser",
            serde_json::json!({ "email": "Alice@Example.com", "pwd": "another password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = test_app();
    register_and_login(&app, "alice@example.com").await;

    let response = app
        .oneshot(json_post(
            "/api/login",
            serde_json::json!({ "email": "alice@example.com", "pwd": "wrong password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_malformed_json() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/createUser")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");
}

// -- Authentication -----------------------------------------------------------

#[tokio::test]
async fn test_document_routes_require_token() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/querydocbyname/anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let response = test_app()
        .oneshot(authed_get("/api/querydocbyname/anything", "not.a.jwt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_openapi_requires_token_and_lists_routes() {
    let app = test_app();
    let (_, token) = register_and_login(&app, "alice@example.com").await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.oneshot(authed_get("/openapi.json", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert!(doc["paths"]["/api/createdoc"].is_object());
}

// -- Documents ----------------------------------------------------------------

#[tokio::test]
async fn test_upload_then_every_lookup_and_download() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "alice@example.com").await;

    let body = multipart_body(
        &[("docid", "d1"), ("userid", &user_id)],
        Some(("greeting.txt", "text/plain", b"hello")),
    );
    let response = app.clone().oneshot(upload_request(&token, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["docId"], "d1");
    assert_eq!(created["ownerId"], user_id.as_str());
    let address = created["contentAddress"].as_str().unwrap().to_string();
    assert!(!address.is_empty());

    // By owner.
    let response = app
        .clone()
        .oneshot(authed_get(&format!("/api/querydocbyuserid/{user_id}"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let docs = body_json(response).await;
    assert_eq!(docs.as_array().unwrap().len(), 1);
    assert_eq!(docs[0]["name"], "greeting.txt");
    assert_eq!(docs[0]["contentType"], "text/plain");
    assert_eq!(docs[0]["contentAddress"], address.as_str());

    // By doc id.
    let response = app
        .clone()
        .oneshot(authed_get(&format!("/api/querydocbydocid/{user_id}/d1"), &token))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    // By name.
    let response = app
        .clone()
        .oneshot(authed_get("/api/querydocbyname/greeting.txt", &token))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    // Download by address.
    let response = app
        .clone()
        .oneshot(authed_get(&format!("/api/download/{address}"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "5");
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"{address}\"").as_str()
    );
    assert_eq!(body_string(response).await, "hello");

    // Download the owner's first document.
    let response = app
        .oneshot(authed_get(
            &format!("/api/querydocbyuserid/{user_id}/download"),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "hello");
}

#[tokio::test]
async fn test_docname_overrides_file_name() {
    let app = test_app();
    let (_, token) = register_and_login(&app, "alice@example.com").await;

    let body = multipart_body(
        &[("docid", "d1"), ("docname", "contract")],
        Some(("scan.pdf", "application/pdf", b"%PDF-1.4")),
    );
    let response = app.clone().oneshot(upload_request(&token, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(authed_get("/api/querydocbyname/contract", &token))
        .await
        .unwrap();
    let docs = body_json(response).await;
    assert_eq!(docs[0]["docId"], "d1");
    assert_eq!(docs[0]["contentType"], "application/pdf");
}

#[tokio::test]
async fn test_lookups_with_no_match_return_empty_lists() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "alice@example.com").await;

    let response = app
        .clone()
        .oneshot(authed_get(&format!("/api/querydocbydocid/{user_id}/missing"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));

    let response = app
        .oneshot(authed_get("/api/querydocbyname/missing", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn test_owner_without_documents_gets_not_found_on_download() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "alice@example.com").await;

    let response = app
        .oneshot(authed_get(
            &format!("/api/querydocbyuserid/{user_id}/download"),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_address_is_not_found() {
    let app = test_app();
    let (_, token) = register_and_login(&app, "alice@example.com").await;
    let unknown = docvault_core::ContentAddress::from_digest(&docvault_core::sha256_digest(
        b"never uploaded",
    ));

    let response = app
        .oneshot(authed_get(&format!("/api/download/{unknown}"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cid_download_from_digest_store_is_not_found() {
    let app = test_app();
    let (_, token) = register_and_login(&app, "alice@example.com").await;

    let response = app
        .oneshot(authed_get(
            "/api/download/bafkreifzjut3te2nhyekklss27nh3k72ysco7y32koao5eei66wof36n5e",
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_all_documents_listing_is_not_exposed() {
    let app = test_app();
    let (_, token) = register_and_login(&app, "alice@example.com").await;
    let body = multipart_body(&[("docid", "d1")], Some(("a.txt", "text/plain", b"alpha")));
    let response = app.clone().oneshot(upload_request(&token, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(authed_get("/api/queryalldocs", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reading_another_users_documents_is_forbidden() {
    let app = test_app();
    let (alice_id, _) = register_and_login(&app, "alice@example.com").await;
    let (_, bob_token) = register_and_login(&app, "bob@example.com").await;

    let response = app
        .clone()
        .oneshot(authed_get(&format!("/api/querydocbyuserid/{alice_id}"), &bob_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(authed_get(
            &format!("/api/querydocbydocid/{alice_id}/d1"),
            &bob_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_upload_claiming_another_owner_is_forbidden() {
    let app = test_app();
    let (alice_id, _) = register_and_login(&app, "alice@example.com").await;
    let (_, bob_token) = register_and_login(&app, "bob@example.com").await;

    let body = multipart_body(
        &[("docid", "d1"), ("userid", &alice_id)],
        Some(("x.txt", "text/plain", b"x")),
    );
    let response = app.oneshot(upload_request(&bob_token, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_empty_file_is_rejected() {
    let app = test_app();
    let (_, token) = register_and_login(&app, "alice@example.com").await;

    let body = multipart_body(&[("docid", "d1")], Some(("empty.txt", "text/plain", b"")));
    let response = app.oneshot(upload_request(&token, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_upload_without_file_or_docid_is_rejected() {
    let app = test_app();
    let (_, token) = register_and_login(&app, "alice@example.com").await;

    let body = multipart_body(&[("docid", "d1")], None);
    let response = app.clone().oneshot(upload_request(&token, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = multipart_body(&[], Some(("x.txt", "text/plain", b"x")));
    let response = app.oneshot(upload_request(&token, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_same_bytes_under_two_ids_share_an_address() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "alice@example.com").await;

    let mut addresses = Vec::new();
    for doc_id in ["a", "b"] {
        let body = multipart_body(&[("docid", doc_id)], Some(("same.bin", "text/plain", b"same")));
        let response = app.clone().oneshot(upload_request(&token, body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        addresses.push(body_json(response).await["contentAddress"].clone());
    }
    assert_eq!(addresses[0], addresses[1]);

    let response = app
        .oneshot(authed_get(&format!("/api/querydocbyuserid/{user_id}"), &token))
        .await
        .unwrap();
    let docs = body_json(response).await;
    let ids: Vec<_> = docs.as_array().unwrap().iter().map(|d| d["docId"].clone()).collect();
    assert_eq!(ids, vec![Value::from("a"), Value::from("b")]);
}
