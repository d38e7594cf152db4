//! Comment endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use curio_common::AppResult;
use curio_core::{CommentThread, CreateCommentInput};
use curio_db::entities::comment;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// List query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    50
}

/// Create comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    pub parent_id: Option<String>,
}

/// Edit comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    pub content: String,
}

/// Threaded comment list response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListResponse {
    pub comments: Vec<CommentThread>,
}

async fn list_for_article(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(article_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<CommentListResponse>> {
    let comments = state
        .comment_service
        .list_for_article(viewer.as_ref(), &article_id, query.limit.min(200), query.offset)
        .await?;
    Ok(ApiResponse::ok(CommentListResponse { comments }))
}

async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(article_id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<ApiResponse<comment::Model>> {
    auth.ensure_not_banned()?;
    let created = state
        .comment_service
        .create(
            &auth.0,
            &article_id,
            CreateCommentInput {
                content: req.content,
                parent_id: req.parent_id,
            },
        )
        .await?;
    Ok(ApiResponse::ok(created))
}

async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCommentRequest>,
) -> AppResult<ApiResponse<comment::Model>> {
    auth.ensure_not_banned()?;
    let updated = state
        .comment_service
        .update(&auth.0, &id, &req.content)
        .await?;
    Ok(ApiResponse::ok(updated))
}

async fn delete_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    auth.ensure_not_banned()?;
    state.comment_service.delete(&auth.0, &id).await?;
    Ok(ApiResponse::ok(()))
}

/// Report request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub reason: String,
}

async fn report(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReportRequest>,
) -> AppResult<ApiResponse<()>> {
    auth.ensure_not_banned()?;
    state
        .report_service
        .report_comment(&auth.0, &id, &req.reason)
        .await?;
    Ok(ApiResponse::ok(()))
}

async fn like(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    auth.ensure_not_banned()?;
    state.engagement_service.like_comment(&auth.0, &id).await?;
    Ok(ApiResponse::ok(()))
}

async fn unlike(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    auth.ensure_not_banned()?;
    state.engagement_service.unlike_comment(&auth.0, &id).await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/article/{articleId}", get(list_for_article).post(create))
        .route("/{id}", patch(update).delete(delete_comment))
        .route("/{id}/report", post(report))
        .route("/{id}/like", post(like).delete(unlike))
}
