//! Bookmark and reading list endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Router,
};
use curio_common::AppResult;
use curio_db::entities::{bookmark, reading_list_entry};
use serde::Deserialize;

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

async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<bookmark::Model>>> {
    let bookmarks = state
        .engagement_service
        .list_bookmarks(&auth.0, query.limit.min(100), query.offset)
        .await?;
    Ok(ApiResponse::ok(bookmarks))
}

async fn add(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(article_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    auth.ensure_not_banned()?;
    state.engagement_service.bookmark(&auth.0, &article_id).await?;
    Ok(ApiResponse::ok(()))
}

async fn remove(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(article_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.engagement_service.unbookmark(&auth.0, &article_id).await?;
    Ok(ApiResponse::ok(()))
}

async fn reading_list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<reading_list_entry::Model>>> {
    let entries = state.engagement_service.list_reading_list(&auth.0).await?;
    Ok(ApiResponse::ok(entries))
}

async fn reading_list_add(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(article_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    auth.ensure_not_banned()?;
    state
        .engagement_service
        .add_to_reading_list(&auth.0, &article_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

async fn reading_list_remove(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(article_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .engagement_service
        .remove_from_reading_list(&auth.0, &article_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{articleId}", post(add).delete(remove))
        .route("/reading-list", get(reading_list))
        .route(
            "/reading-list/{articleId}",
            post(reading_list_add).delete(reading_list_remove),
        )
}
