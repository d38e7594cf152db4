//! API integration tests.
//!
//! These drive the router over a mock database and assert on status
//! codes: the envelope and error mapping are covered end to end.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use curio_api::{middleware::AppState, router as api_router, AuthTokens};
use curio_common::config::{AuthConfig, Config, DatabaseConfig, ServerConfig};
use curio_core::{
    ArticleService, AuthorService, BadgeService, CategoryService, CommentService,
    EngagementService, NotificationService, ReportService, UserService,
};
use curio_db::entities::article::{self, ArticleStatus};
use curio_db::repositories::{
    ArticleRepository, AuthorProfileRepository, BadgeRepository, CategoryRepository,
    CommentRepository, EngagementRepository, FollowRepository, NotificationRepository,
    ReportRepository, UserRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            url: "https://curio.example".to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_secs: 3600,
        },
    }
}

fn test_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);
    let config = test_config();

    let user_repo = UserRepository::new(Arc::clone(&db));
    let article_repo = ArticleRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let category_repo = CategoryRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let engagement_repo = EngagementRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));
    let badge_repo = BadgeRepository::new(Arc::clone(&db));
    let author_profile_repo = AuthorProfileRepository::new(Arc::clone(&db));

    let notification_service = NotificationService::new(notification_repo);
    let badge_service = BadgeService::new(
        badge_repo,
        article_repo.clone(),
        engagement_repo.clone(),
    );
    let user_service = UserService::new(user_repo.clone());
    let article_service = ArticleService::new(
        article_repo.clone(),
        user_repo.clone(),
        category_repo.clone(),
        follow_repo.clone(),
        notification_service.clone(),
        badge_service.clone(),
    );
    let comment_service = CommentService::new(
        comment_repo.clone(),
        article_repo.clone(),
        notification_service.clone(),
    );
    let report_service = ReportService::new(
        report_repo,
        article_repo.clone(),
        comment_repo.clone(),
    );
    let category_service = CategoryService::new(category_repo);
    let engagement_service = EngagementService::new(
        engagement_repo,
        article_repo,
        comment_repo,
        follow_repo,
        user_repo,
        notification_service.clone(),
        badge_service.clone(),
    );
    let author_service = AuthorService::new(
        author_profile_repo,
        user_service.clone(),
        notification_service.clone(),
    );

    AppState {
        user_service,
        article_service,
        comment_service,
        report_service,
        notification_service,
        category_service,
        engagement_service,
        badge_service,
        author_service,
        tokens: AuthTokens::new(&config),
    }
}

fn test_router(db: DatabaseConnection) -> Router {
    api_router().with_state(test_state(db))
}

fn published_article(id: &str) -> article::Model {
    article::Model {
        id: id.to_string(),
        author_id: "author1".to_string(),
        category_id: None,
        title: "Hello".to_string(),
        slug: "hello".to_string(),
        excerpt: None,
        body: "Body".to_string(),
        featured_image_url: None,
        status: ArticleStatus::Published,
        rejection_reason: None,
        reviewed_by: Some("admin1".to_string()),
        reviewed_at: Some(Utc::now().into()),
        is_featured: false,
        view_count: 0,
        like_count: 0,
        comment_count: 0,
        published_at: Some(Utc::now().into()),
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

#[tokio::test]
async fn test_categories_list_is_public() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<curio_db::entities::category::Model>::new()])
        .into_connection();
    let app = test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/categories")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_unknown_user_is_unauthorized() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<curio_db::entities::user::Model>::new()])
        .into_connection();
    let app = test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/login")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"identifier":"nobody","password":"wrongpassword"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_article_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<article::Model>::new()])
        .into_connection();
    let app = test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/articles/slug/missing")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_feed_returns_published_articles() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[published_article("a1")]])
        .into_connection();
    let app = test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/articles")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_article_requires_auth() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/articles")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"title":"T","body":"B"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_queue_requires_auth() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/articles/pending")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_notifications_require_auth() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notifications")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
