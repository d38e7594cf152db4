//! Authentication endpoints: register, login, current user.

use axum::{extract::State, routing::{get, post}, Json, Router};
use curio_common::AppResult;
use curio_core::RegisterInput;
use curio_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Registration request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Login request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username or email.
    pub identifier: String,
    pub password: String,
}

/// Authenticated session response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user: user::Model,
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let created = state
        .user_service
        .register(RegisterInput {
            email: req.email,
            username: req.username,
            password: req.password,
            display_name: req.display_name,
        })
        .await?;

    let token = state.tokens.issue(&created.id)?;
    Ok(ApiResponse::ok(SessionResponse {
        token,
        user: created,
    }))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let verified = state
        .user_service
        .verify_credentials(&req.identifier, &req.password)
        .await?;

    let token = state.tokens.issue(&verified.id)?;
    Ok(ApiResponse::ok(SessionResponse {
        token,
        user: verified,
    }))
}

async fn me(AuthUser(user): AuthUser) -> ApiResponse<user::Model> {
    ApiResponse::ok(user)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}
