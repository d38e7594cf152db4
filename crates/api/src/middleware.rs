//! API middleware and shared state.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use curio_common::{AppError, AppResult, Config};
use curio_core::{
    ArticleService, AuthorService, BadgeService, CategoryService, CommentService,
    EngagementService, NotificationService, ReportService, UserService,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub article_service: ArticleService,
    pub comment_service: CommentService,
    pub report_service: ReportService,
    pub notification_service: NotificationService,
    pub category_service: CategoryService,
    pub engagement_service: EngagementService,
    pub badge_service: BadgeService,
    pub author_service: AuthorService,
    pub tokens: AuthTokens,
}

/// JWT claims carried by every access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// Expiry (seconds since epoch).
    pub exp: i64,
    /// Issued at (seconds since epoch).
    pub iat: i64,
}

/// Issues and verifies JWT access tokens.
#[derive(Clone)]
pub struct AuthTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl AuthTokens {
    /// Build from application config.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.auth.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.auth.jwt_secret.as_bytes()),
            ttl_secs: i64::try_from(config.auth.token_ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Issue a token for a user.
    pub fn issue(&self, user_id: &str) -> AppResult<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: now + self.ttl_secs,
            iat: now,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Token encoding failed: {e}")))
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized)
    }
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <jwt>` into a user model in the
/// request extensions. Invalid or absent tokens leave the request
/// anonymous; handlers that need a user reject via the extractors.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(claims) = state.tokens.verify(token)
        && let Ok(user) = state.user_service.get(&claims.sub).await
        && user.is_active
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use curio_common::config::{AuthConfig, DatabaseConfig, ServerConfig};

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

    #[test]
    fn test_token_round_trip_preserves_subject() {
        let tokens = AuthTokens::new(&test_config());

        let token = tokens.issue("user1").unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, "user1");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn test_tampered_token_is_unauthorized() {
        let tokens = AuthTokens::new(&test_config());

        let mut token = tokens.issue("user1").unwrap();
        token.push('x');

        assert!(matches!(tokens.verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let tokens = AuthTokens::new(&test_config());
        let mut other_config = test_config();
        other_config.auth.jwt_secret = "different-secret".to_string();
        let other = AuthTokens::new(&other_config);

        let token = other.issue("user1").unwrap();

        assert!(matches!(tokens.verify(&token), Err(AppError::Unauthorized)));
    }
}
