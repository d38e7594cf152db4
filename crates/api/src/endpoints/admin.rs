//! Admin endpoints: review queues, moderation, user management and
//! category administration. Every handler takes [`AdminUser`]; service
//! calls re-check the role as a second layer.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
    Json, Router,
};
use curio_common::AppResult;
use curio_core::{
    CreateCategoryInput, ReportEntry, ReportedArticle, ReportedComment, UpdateCategoryInput,
};
use curio_db::entities::{article, author_profile, category, user, user::Role};
use serde::{Deserialize, Serialize};

use crate::{extractors::AdminUser, middleware::AppState, response::ApiResponse};

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

// ========== Article review ==========

async fn pending_articles(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<article::Model>>> {
    let articles = state
        .article_service
        .list_pending(&admin, query.limit.min(100), query.offset)
        .await?;
    Ok(ApiResponse::ok(articles))
}

async fn approve_article(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<article::Model>> {
    let article = state.article_service.approve(&admin, &id).await?;
    Ok(ApiResponse::ok(article))
}

/// Rejection request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectArticleRequest {
    pub reason: String,
}

async fn reject_article(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RejectArticleRequest>,
) -> AppResult<ApiResponse<article::Model>> {
    let article = state.article_service.reject(&admin, &id, &req.reason).await?;
    Ok(ApiResponse::ok(article))
}

async fn feature_article(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<article::Model>> {
    let article = state.article_service.set_featured(&admin, &id, true).await?;
    Ok(ApiResponse::ok(article))
}

async fn unfeature_article(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<article::Model>> {
    let article = state.article_service.set_featured(&admin, &id, false).await?;
    Ok(ApiResponse::ok(article))
}

// ========== Moderation ==========

async fn reported_articles(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<ReportedArticle>>> {
    let reported = state
        .report_service
        .list_reported_articles(&admin, query.limit.min(500), query.offset)
        .await?;
    Ok(ApiResponse::ok(reported))
}

async fn reported_comments(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<ReportedComment>>> {
    let reported = state
        .report_service
        .list_reported_comments(&admin, query.limit.min(500), query.offset)
        .await?;
    Ok(ApiResponse::ok(reported))
}

async fn article_reports(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<ReportEntry>>> {
    let reports = state.report_service.reports_for_article(&admin, &id).await?;
    Ok(ApiResponse::ok(reports))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissedResponse {
    pub dismissed: u64,
}

async fn dismiss_article_report(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .report_service
        .dismiss_article_report(&admin, &report_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

async fn dismiss_comment_report(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .report_service
        .dismiss_comment_report(&admin, &report_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

async fn dismiss_all_article_reports(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DismissedResponse>> {
    let dismissed = state
        .report_service
        .dismiss_all_for_article(&admin, &id)
        .await?;
    Ok(ApiResponse::ok(DismissedResponse { dismissed }))
}

async fn dismiss_all_comment_reports(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DismissedResponse>> {
    let dismissed = state
        .report_service
        .dismiss_all_for_comment(&admin, &id)
        .await?;
    Ok(ApiResponse::ok(DismissedResponse { dismissed }))
}

async fn approve_comment(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.comment_service.approve(&admin, &id).await?;
    Ok(ApiResponse::ok(()))
}

// ========== User management ==========

async fn list_users(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<user::Model>>> {
    let users = state
        .user_service
        .list(query.limit.min(100), query.offset)
        .await?;
    Ok(ApiResponse::ok(users))
}

/// Role change request. Promoting to or demoting from admin requires
/// `confirm: true`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub role: Role,
    #[serde(default)]
    pub confirm: bool,
}

async fn update_role(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> AppResult<ApiResponse<user::Model>> {
    let updated = state
        .user_service
        .update_role(&admin, &id, req.role, req.confirm)
        .await?;
    Ok(ApiResponse::ok(updated))
}

async fn ban_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<user::Model>> {
    let updated = state.user_service.set_banned(&admin, &id, true).await?;
    Ok(ApiResponse::ok(updated))
}

async fn unban_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<user::Model>> {
    let updated = state.user_service.set_banned(&admin, &id, false).await?;
    Ok(ApiResponse::ok(updated))
}

async fn toggle_active(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<user::Model>> {
    let updated = state.user_service.toggle_active(&admin, &id).await?;
    Ok(ApiResponse::ok(updated))
}

async fn delete_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.user_service.admin_delete(&admin, &id).await?;
    Ok(ApiResponse::ok(()))
}

// ========== Author applications ==========

async fn pending_applications(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<author_profile::Model>>> {
    let applications = state
        .author_service
        .list_pending(&admin, query.limit.min(100), query.offset)
        .await?;
    Ok(ApiResponse::ok(applications))
}

async fn approve_application(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<author_profile::Model>> {
    let profile = state.author_service.approve(&admin, &id).await?;
    Ok(ApiResponse::ok(profile))
}

async fn reject_application(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.author_service.reject(&admin, &id).await?;
    Ok(ApiResponse::ok(()))
}

async fn suspend_author(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<author_profile::Model>> {
    let profile = state.author_service.suspend(&admin, &id).await?;
    Ok(ApiResponse::ok(profile))
}

// ========== Categories ==========

/// Category creation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Category update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

async fn create_category(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> AppResult<ApiResponse<category::Model>> {
    let created = state
        .category_service
        .create(
            &admin,
            CreateCategoryInput {
                name: req.name,
                description: req.description,
            },
        )
        .await?;
    Ok(ApiResponse::ok(created))
}

async fn update_category(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCategoryRequest>,
) -> AppResult<ApiResponse<category::Model>> {
    let updated = state
        .category_service
        .update(
            &admin,
            &id,
            UpdateCategoryInput {
                name: req.name,
                description: req.description,
            },
        )
        .await?;
    Ok(ApiResponse::ok(updated))
}

async fn delete_category(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.category_service.delete(&admin, &id).await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        // Article review
        .route("/articles/pending", get(pending_articles))
        .route("/articles/{id}/approve", post(approve_article))
        .route("/articles/{id}/reject", post(reject_article))
        .route("/articles/{id}/feature", post(feature_article).delete(unfeature_article))
        .route(
            "/articles/{id}/reports",
            get(article_reports).delete(dismiss_all_article_reports),
        )
        // Moderation
        .route("/reports/articles", get(reported_articles))
        .route("/reports/comments", get(reported_comments))
        .route("/reports/articles/{reportId}", delete(dismiss_article_report))
        .route("/reports/comments/{reportId}", delete(dismiss_comment_report))
        .route("/comments/{id}/reports", delete(dismiss_all_comment_reports))
        .route("/comments/{id}/approve", post(approve_comment))
        // Users
        .route("/users", get(list_users))
        .route("/users/{id}/role", patch(update_role))
        .route("/users/{id}/ban", post(ban_user).delete(unban_user))
        .route("/users/{id}/active", post(toggle_active))
        .route("/users/{id}", delete(delete_user))
        // Author applications
        .route("/authors/applications", get(pending_applications))
        .route("/authors/{id}/approve", post(approve_application))
        .route("/authors/{id}/reject", post(reject_application))
        .route("/authors/{id}/suspend", post(suspend_author))
        // Categories
        .route("/categories", post(create_category))
        .route("/categories/{id}", patch(update_category).delete(delete_category))
}
