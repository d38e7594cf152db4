//! Notification endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Router,
};
use curio_common::AppResult;
use curio_db::entities::notification;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// List query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub unread_only: bool,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    50
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub count: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllResponse {
    pub marked: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub deleted: u64,
}

async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<notification::Model>>> {
    let notifications = state
        .notification_service
        .list(&user.id, query.unread_only, query.limit.min(200), query.offset)
        .await?;
    Ok(ApiResponse::ok(notifications))
}

async fn unread_count(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UnreadCountResponse>> {
    let count = state.notification_service.count_unread(&user.id).await?;
    Ok(ApiResponse::ok(UnreadCountResponse { count }))
}

async fn mark_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.notification_service.mark_read(&user.id, &id).await?;
    Ok(ApiResponse::ok(()))
}

async fn mark_all_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MarkAllResponse>> {
    let marked = state.notification_service.mark_all_read(&user.id).await?;
    Ok(ApiResponse::ok(MarkAllResponse { marked }))
}

async fn delete_notification(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.notification_service.delete(&user.id, &id).await?;
    Ok(ApiResponse::ok(()))
}

async fn delete_all(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<DeletedResponse>> {
    let deleted = state.notification_service.delete_all(&user.id).await?;
    Ok(ApiResponse::ok(DeletedResponse { deleted }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).delete(delete_all))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/{id}/read", post(mark_read))
        .route("/{id}", delete(delete_notification))
}
