//! # Bearer Authentication
//!
//! [`auth_middleware`] resolves the `Authorization` header through the
//! [`IdentityGate`] and injects a [`CallerIdentity`] into request
//! extensions. Handlers take `CallerIdentity` as an extractor; it is the
//! only owner id the upload path trusts.

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docvault_core::OwnerId;
use docvault_identity::{IdentityError, IdentityGate};

use crate::error::{AppError, ErrorBody, ErrorDetail};

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub owner_id: OwnerId,
}

impl CallerIdentity {
    /// Require that a path-supplied user id names the caller.
    pub fn ensure_is(&self, user_id: &str) -> Result<(), AppError> {
        if user_id.trim() == self.owner_id.as_str() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "caller {} may not read documents of user {user_id:?}",
                self.owner_id
            )))
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Validate the bearer token and attach the caller's identity.
///
/// Expects an [`IdentityGate`] in request extensions.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let Some(gate) = request.extensions().get::<IdentityGate>().cloned() else {
        return AppError::Internal("identity gate missing from request extensions".into())
            .into_response();
    };

    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match gate.authorize(header_value) {
        Ok(owner_id) => {
            request.extensions_mut().insert(CallerIdentity { owner_id });
            next.run(request).await
        }
        Err(IdentityError::Unauthorized(reason)) => {
            tracing::warn!(reason = %reason, "authentication failed");
            unauthorized_response(&reason)
        }
        Err(other) => AppError::from(other).into_response(),
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use docvault_identity::{
        CredentialHasher, MemoryUserDirectory, TokenIssuer, DEFAULT_TOKEN_TTL,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn gate() -> IdentityGate {
        IdentityGate::new(
            Arc::new(MemoryUserDirectory::new()),
            CredentialHasher::new(CredentialHasher::MIN_COST),
            TokenIssuer::new(SECRET.to_vec(), DEFAULT_TOKEN_TTL).unwrap(),
        )
    }

    fn test_app(gate: IdentityGate) -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|caller: CallerIdentity| async move { caller.owner_id.to_string() }),
            )
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(gate))
    }

    async fn error_message(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(err["error"]["code"], "UNAUTHORIZED");
        err["error"]["message"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn valid_token_reaches_handler_with_owner() {
        let gate = gate();
        let token = TokenIssuer::new(SECRET.to_vec(), DEFAULT_TOKEN_TTL)
            .unwrap()
            .issue(&OwnerId::new("u1").unwrap(), "a@b.c")
            .unwrap();

        let request = Request::builder()
            .uri("/whoami")
            .header("Authorization", format!("Bearer {}", token.access_token))
            .body(Body::empty())
            .unwrap();
        let response = test_app(gate).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"u1");
    }

    #[tokio::test]
    async fn missing_header_rejected() {
        let request = Request::builder().uri("/whoami").body(Body::empty()).unwrap();
        let response = test_app(gate()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(error_message(response).await.contains("missing"));
    }

    #[tokio::test]
    async fn non_bearer_scheme_rejected() {
        let request = Request::builder()
            .uri("/whoami")
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        let response = test_app(gate()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(error_message(response).await.contains("Bearer scheme"));
    }

    #[tokio::test]
    async fn forged_token_rejected() {
        let forged = TokenIssuer::new(b"ffffffffffffffffffffffffffffffff".to_vec(), DEFAULT_TOKEN_TTL)
            .unwrap()
            .issue(&OwnerId::new("u1").unwrap(), "a@b.c")
            .unwrap();
        let request = Request::builder()
            .uri("/whoami")
            .header("Authorization", format!("Bearer {}", forged.access_token))
            .body(Body::empty())
            .unwrap();
        let response = test_app(gate()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn ensure_is_compares_owner() {
        let caller = CallerIdentity {
            owner_id: OwnerId::new("u1").unwrap(),
        };
        assert!(caller.ensure_is("u1").is_ok());
        assert!(matches!(caller.ensure_is("u2"), Err(AppError::Forbidden(_))));
    }
}
