//! HTTP API layer for curio.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: articles, comments, users, moderation
//! - **Extractors**: authentication, admin and ban guards
//! - **Middleware**: JWT resolution, logging, CORS
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{auth_middleware, AppState, AuthTokens, Claims};
