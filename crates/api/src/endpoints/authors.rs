//! Author application endpoints and badge catalogue.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use curio_common::AppResult;
use curio_core::ApplyForAuthorInput;
use curio_db::entities::{author_profile, badge};
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Author application request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub pen_name: Option<String>,
    pub website: Option<String>,
}

async fn apply(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ApplyRequest>,
) -> AppResult<ApiResponse<author_profile::Model>> {
    auth.ensure_not_banned()?;
    let profile = state
        .author_service
        .apply(
            &auth.0,
            ApplyForAuthorInput {
                pen_name: req.pen_name,
                website: req.website,
            },
        )
        .await?;
    Ok(ApiResponse::ok(profile))
}

async fn own_application(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Option<author_profile::Model>>> {
    let profile = state.author_service.own_application(&user).await?;
    Ok(ApiResponse::ok(profile))
}

async fn badges(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<badge::Model>>> {
    let badges = state.badge_service.list().await?;
    Ok(ApiResponse::ok(badges))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/apply", post(apply))
        .route("/application", get(own_application))
        .route("/badges", get(badges))
}
