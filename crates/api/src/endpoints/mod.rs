//! API endpoints.

mod admin;
mod articles;
mod auth;
mod authors;
mod bookmarks;
mod categories;
mod comments;
mod notifications;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/articles", articles::router())
        .nest("/comments", comments::router())
        .nest("/categories", categories::router())
        .nest("/users", users::router())
        .nest("/notifications", notifications::router())
        .nest("/bookmarks", bookmarks::router())
        .nest("/authors", authors::router())
        .nest("/admin", admin::router())
}
