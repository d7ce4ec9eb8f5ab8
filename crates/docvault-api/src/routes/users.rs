//! # Accounts
//!
//! Registration and login. Both are unauthenticated; login is the only way
//! to obtain a bearer token.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Email and password.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub email: String,
    pub pwd: String,
}

impl Validate for CredentialsRequest {
    fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() || self.pwd.is_empty() {
            return Err("email and pwd are required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub msg: String,
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
}

/// Unauthenticated account routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/createUser", post(create_user))
        .route("/api/login", post(login))
}

/// POST /api/createUser: Register an account.
#[utoipa::path(
    post,
    path = "/api/createUser",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = CreateUserResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid email or password", body = crate::error::ErrorBody),
    ),
    tag = "accounts"
)]
pub(crate) async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateUserResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let account = state.identity.register(&req.email, &req.pwd).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            msg: "user created".to_string(),
            user_id: account.user_id.to_string(),
        }),
    ))
}

/// POST /api/login: Exchange credentials for an access token.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid email or password", body = crate::error::ErrorBody),
    ),
    tag = "accounts"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let issued = state.identity.authenticate(&req.email, &req.pwd).await?;
    Ok(Json(LoginResponse {
        access_token: issued.access_token,
    }))
}
