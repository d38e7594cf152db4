//! User profile endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
    Json, Router,
};
use curio_common::AppResult;
use curio_core::UpdateProfileInput;
use curio_db::entities::{article, badge, follow, user};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Paging query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

/// Profile update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Password change request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// A badge a user has earned, with its definition.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedBadge {
    pub badge: badge::Model,
    pub awarded_at: chrono::DateTime<chrono::FixedOffset>,
}

/// Public profile response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: user::Model,
    pub badges: Vec<EarnedBadge>,
}

async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let user = state.user_service.get_by_username(&username).await?;
    let badges = state
        .badge_service
        .list_for_user(&user.id)
        .await?
        .into_iter()
        .map(|(entry, badge)| EarnedBadge {
            badge,
            awarded_at: entry.awarded_at,
        })
        .collect();
    Ok(ApiResponse::ok(ProfileResponse { user, badges }))
}

async fn published_articles(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<article::Model>>> {
    let user = state.user_service.get_by_username(&username).await?;
    let articles = state
        .article_service
        .list_published_by_author(&user.id, query.limit.min(100), query.offset)
        .await?;
    Ok(ApiResponse::ok(articles))
}

async fn follow(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<()>> {
    auth.ensure_not_banned()?;
    let target = state.user_service.get_by_username(&username).await?;
    state.engagement_service.follow(&auth.0, &target.id).await?;
    Ok(ApiResponse::ok(()))
}

async fn unfollow(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<()>> {
    auth.ensure_not_banned()?;
    let target = state.user_service.get_by_username(&username).await?;
    state.engagement_service.unfollow(&auth.0, &target.id).await?;
    Ok(ApiResponse::ok(()))
}

async fn followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<follow::Model>>> {
    let user = state.user_service.get_by_username(&username).await?;
    let rows = state
        .engagement_service
        .list_followers(&user.id, query.limit.min(100), query.offset)
        .await?;
    Ok(ApiResponse::ok(rows))
}

async fn following(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<follow::Model>>> {
    let user = state.user_service.get_by_username(&username).await?;
    let rows = state
        .engagement_service
        .list_following(&user.id, query.limit.min(100), query.offset)
        .await?;
    Ok(ApiResponse::ok(rows))
}

async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<ApiResponse<user::Model>> {
    auth.ensure_not_banned()?;
    let updated = state
        .user_service
        .update_profile(
            &auth.0.id,
            UpdateProfileInput {
                display_name: req.display_name,
                bio: req.bio,
                avatar_url: req.avatar_url,
            },
        )
        .await?;
    Ok(ApiResponse::ok(updated))
}

async fn change_password(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .user_service
        .change_password(&auth.0.id, &req.current_password, &req.new_password)
        .await?;
    Ok(ApiResponse::ok(()))
}

async fn delete_account(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<()>> {
    state.user_service.delete_self(&auth.0.id).await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me/profile", patch(update_profile))
        .route("/me/password", post(change_password))
        .route("/me", delete(delete_account))
        .route("/{username}", get(profile))
        .route("/{username}/articles", get(published_articles))
        .route("/{username}/follow", post(follow).delete(unfollow))
        .route("/{username}/followers", get(followers))
        .route("/{username}/following", get(following))
}
