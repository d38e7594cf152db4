//! Article endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use curio_common::AppResult;
use curio_core::{CreateArticleInput, UpdateArticleInput};
use curio_db::entities::article;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Feed query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
    pub category_id: Option<String>,
    pub tag_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

/// Create article request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub title: String,
    pub body: String,
    pub excerpt: Option<String>,
    pub category_id: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    pub featured_image_url: Option<String>,
    /// Submit for review immediately instead of saving a draft.
    #[serde(default)]
    pub submit: bool,
}

/// Update article request. Absent fields stay untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub excerpt: Option<String>,
    /// `Some(None)` clears the category.
    #[serde(default, with = "double_option")]
    pub category_id: Option<Option<String>>,
    pub tag_ids: Option<Vec<String>>,
    pub featured_image_url: Option<String>,
}

mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(d: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(d).map(Some)
    }
}

/// Article list response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleListResponse {
    pub articles: Vec<article::Model>,
}

async fn feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<ApiResponse<ArticleListResponse>> {
    let limit = query.limit.min(100);
    let articles = if let Some(tag_id) = query.tag_id.as_deref() {
        state
            .article_service
            .list_published_tagged(tag_id, limit, query.offset)
            .await?
    } else {
        state
            .article_service
            .list_published(query.category_id.as_deref(), limit, query.offset)
            .await?
    };
    Ok(ApiResponse::ok(ArticleListResponse { articles }))
}

async fn featured(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ArticleListResponse>> {
    let articles = state.article_service.list_featured(20).await?;
    Ok(ApiResponse::ok(ArticleListResponse { articles }))
}

async fn own(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<ApiResponse<ArticleListResponse>> {
    let articles = state
        .article_service
        .list_own(&auth.0, query.limit.min(100), query.offset)
        .await?;
    Ok(ApiResponse::ok(ArticleListResponse { articles }))
}

async fn get_article(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<article::Model>> {
    let article = state.article_service.get(viewer.as_ref(), &id).await?;
    Ok(ApiResponse::ok(article))
}

async fn get_by_slug(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<article::Model>> {
    let article = state
        .article_service
        .get_by_slug(viewer.as_ref(), &slug)
        .await?;
    Ok(ApiResponse::ok(article))
}

async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateArticleRequest>,
) -> AppResult<ApiResponse<article::Model>> {
    auth.ensure_not_banned()?;
    let created = state
        .article_service
        .create(
            &auth.0,
            CreateArticleInput {
                title: req.title,
                body: req.body,
                excerpt: req.excerpt,
                category_id: req.category_id,
                tag_ids: req.tag_ids,
                featured_image_url: req.featured_image_url,
                submit: req.submit,
            },
        )
        .await?;
    Ok(ApiResponse::ok(created))
}

async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateArticleRequest>,
) -> AppResult<ApiResponse<article::Model>> {
    auth.ensure_not_banned()?;
    let updated = state
        .article_service
        .update(
            &auth.0,
            &id,
            UpdateArticleInput {
                title: req.title,
                body: req.body,
                excerpt: req.excerpt,
                category_id: req.category_id,
                tag_ids: req.tag_ids,
                featured_image_url: req.featured_image_url,
            },
        )
        .await?;
    Ok(ApiResponse::ok(updated))
}

async fn delete_article(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    auth.ensure_not_banned()?;
    state.article_service.delete(&auth.0, &id).await?;
    Ok(ApiResponse::ok(()))
}

async fn submit(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<article::Model>> {
    auth.ensure_not_banned()?;
    let submitted = state.article_service.submit(&auth.0, &id).await?;
    Ok(ApiResponse::ok(submitted))
}

async fn archive(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<article::Model>> {
    auth.ensure_not_banned()?;
    let archived = state.article_service.archive(&auth.0, &id).await?;
    Ok(ApiResponse::ok(archived))
}

async fn unarchive(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<article::Model>> {
    auth.ensure_not_banned()?;
    let restored = state.article_service.unarchive(&auth.0, &id).await?;
    Ok(ApiResponse::ok(restored))
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
        .report_article(&auth.0, &id, &req.reason)
        .await?;
    Ok(ApiResponse::ok(()))
}

async fn like(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    auth.ensure_not_banned()?;
    state.engagement_service.like_article(&auth.0, &id).await?;
    Ok(ApiResponse::ok(()))
}

async fn unlike(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    auth.ensure_not_banned()?;
    state.engagement_service.unlike_article(&auth.0, &id).await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(feed).post(create))
        .route("/featured", get(featured))
        .route("/mine", get(own))
        .route("/slug/{slug}", get(get_by_slug))
        .route(
            "/{id}",
            get(get_article).patch(update).delete(delete_article),
        )
        .route("/{id}/submit", post(submit))
        .route("/{id}/archive", post(archive))
        .route("/{id}/unarchive", post(unarchive))
        .route("/{id}/report", post(report))
        .route("/{id}/like", post(like).delete(unlike))
}
