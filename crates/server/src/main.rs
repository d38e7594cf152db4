//! Curio server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use curio_api::{auth_middleware, router as api_router, AppState, AuthTokens};
use curio_common::Config;
use curio_core::{
    ArticleService, AuthorService, BadgeService, CategoryService, CommentService,
    EngagementService, NotificationService, ReportService, UserService,
};
use curio_db::repositories::{
    ArticleRepository, AuthorProfileRepository, BadgeRepository, CategoryRepository,
    CommentRepository, EngagementRepository, FollowRepository, NotificationRepository,
    ReportRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "curio=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting curio server...");

    let config = Config::load()?;

    let db = curio_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    curio_db::migrate(&db).await?;
    info!("Migrations completed");

    // Repositories
    let db = Arc::new(db);
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

    // Services
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

    let tokens = AuthTokens::new(&config);

    let state = AppState {
        user_service,
        article_service,
        comment_service,
        report_service,
        notification_service,
        category_service,
        engagement_service,
        badge_service,
        author_service,
        tokens,
    };

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
