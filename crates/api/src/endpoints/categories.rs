//! Category and tag endpoints (public reads; admin writes live under
//! `/admin`).

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use curio_common::AppResult;
use curio_db::entities::{article, category, tag};
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Category list response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListResponse {
    pub categories: Vec<category::Model>,
}

/// Tag list response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagListResponse {
    pub tags: Vec<tag::Model>,
}

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

/// Articles in a category.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryArticlesResponse {
    pub category: category::Model,
    pub articles: Vec<article::Model>,
}

async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<CategoryListResponse>> {
    let categories = state.category_service.list().await?;
    Ok(ApiResponse::ok(CategoryListResponse { categories }))
}

async fn articles_in_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<CategoryArticlesResponse>> {
    let category = state.category_service.get_by_slug(&slug).await?;
    let articles = state
        .article_service
        .list_published(Some(&category.id), query.limit.min(100), query.offset)
        .await?;
    Ok(ApiResponse::ok(CategoryArticlesResponse {
        category,
        articles,
    }))
}

async fn list_tags(State(state): State<AppState>) -> AppResult<ApiResponse<TagListResponse>> {
    let tags = state.category_service.list_tags().await?;
    Ok(ApiResponse::ok(TagListResponse { tags }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/tags", get(list_tags))
        .route("/{slug}/articles", get(articles_in_category))
}
