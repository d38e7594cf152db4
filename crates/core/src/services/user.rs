//! User service: accounts, roles and the ban flag.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use curio_common::{AppError, AppResult, IdGenerator};
use curio_db::{
    entities::user::{self, Role},
    repositories::UserRepository,
};
use sea_orm::Set;
use validator::Validate;

/// Input for registering a new account.
#[derive(Debug, Validate)]
pub struct RegisterInput {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    #[validate(regex(
        path = *USERNAME_RE,
        message = "Username may only contain letters, digits and underscores"
    ))]
    pub username: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
    pub display_name: Option<String>,
}

static USERNAME_RE: once_cell::sync::Lazy<regex::Regex> = once_cell::sync::Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    regex::Regex::new(r"^[A-Za-z0-9_]+$").unwrap()
});

/// Input for updating one's own profile.
#[derive(Debug, Default, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(max = 100, message = "Display name too long"))]
    pub display_name: Option<String>,
    #[validate(length(max = 2000, message = "Bio too long"))]
    pub bio: Option<String>,
    #[validate(url(message = "Invalid avatar URL"))]
    pub avatar_url: Option<String>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account. Everyone starts as a plain `user`.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(input.email),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            password_hash: Set(password_hash),
            display_name: Set(input.display_name),
            bio: Set(None),
            avatar_url: Set(None),
            role: Set(Role::User),
            is_banned: Set(false),
            is_active: Set(true),
            article_count: Set(0),
            follower_count: Set(0),
            following_count: Set(0),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        self.user_repo.create(model).await
    }

    /// Verify a username (or email) and password pair.
    ///
    /// Deactivated accounts cannot log in; banned accounts can — the ban
    /// only blocks content mutations, enforced at the extractor.
    pub async fn verify_credentials(
        &self,
        identifier: &str,
        password: &str,
    ) -> AppResult<user::Model> {
        let found = if identifier.contains('@') {
            self.user_repo.find_by_email(identifier).await?
        } else {
            self.user_repo.find_by_username(identifier).await?
        };

        let Some(found) = found else {
            return Err(AppError::Unauthorized);
        };

        if !verify_password(password, &found.password_hash) {
            return Err(AppError::Unauthorized);
        }
        if !found.is_active {
            return Err(AppError::Forbidden("Account is deactivated".to_string()));
        }

        Ok(found)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get a user by username (case-insensitive).
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))
    }

    /// Update one's own profile.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;
        let current = self.user_repo.get_by_id(user_id).await?;

        let mut model: user::ActiveModel = current.into();
        if let Some(display_name) = input.display_name {
            model.display_name = Set(Some(display_name));
        }
        if let Some(bio) = input.bio {
            model.bio = Set(Some(bio));
        }
        if let Some(avatar_url) = input.avatar_url {
            model.avatar_url = Set(Some(avatar_url));
        }
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(model).await
    }

    /// Change one's own password; the current password must verify.
    pub async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        if new_password.len() < 8 || new_password.len() > 128 {
            return Err(AppError::Validation(
                "Password must be 8-128 characters".to_string(),
            ));
        }

        let current = self.user_repo.get_by_id(user_id).await?;
        if !verify_password(current_password, &current.password_hash) {
            return Err(AppError::Unauthorized);
        }

        let mut model: user::ActiveModel = current.into();
        model.password_hash = Set(hash_password(new_password)?);
        model.updated_at = Set(Some(chrono::Utc::now().into()));
        self.user_repo.update(model).await?;
        Ok(())
    }

    /// Delete one's own account. No restrictions; everything cascades.
    pub async fn delete_self(&self, user_id: &str) -> AppResult<()> {
        self.user_repo.get_by_id(user_id).await?;
        self.user_repo.delete(user_id).await
    }

    /// List users (admin view).
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<user::Model>> {
        self.user_repo.list(limit, offset).await
    }

    // ========== Admin: roles, bans, deactivation ==========

    /// Change a user's role.
    ///
    /// Promoting to or demoting from `admin` requires an explicit
    /// `confirm` flag; the role itself is a closed enum, so unknown role
    /// strings never reach this far. Setting the current role again is a
    /// no-op success.
    pub async fn update_role(
        &self,
        admin: &user::Model,
        target_id: &str,
        role: Role,
        confirm: bool,
    ) -> AppResult<user::Model> {
        ensure_admin(admin)?;
        if admin.id == target_id {
            return Err(AppError::Forbidden(
                "Cannot change your own role".to_string(),
            ));
        }

        let target = self.user_repo.get_by_id(target_id).await?;
        if target.role == role {
            return Ok(target);
        }

        let admin_involved = role == Role::Admin || target.role == Role::Admin;
        if admin_involved && !confirm {
            return Err(AppError::Validation(
                "Changing the admin role requires confirm: true".to_string(),
            ));
        }

        let mut model: user::ActiveModel = target.into();
        model.role = Set(role);
        model.updated_at = Set(Some(chrono::Utc::now().into()));
        self.user_repo.update(model).await
    }

    /// Set or clear the ban flag. Admins cannot be banned. The ban keeps
    /// the account and its content visible; only mutations are blocked.
    pub async fn set_banned(
        &self,
        admin: &user::Model,
        target_id: &str,
        banned: bool,
    ) -> AppResult<user::Model> {
        ensure_admin(admin)?;
        if admin.id == target_id {
            return Err(AppError::Forbidden("Cannot ban yourself".to_string()));
        }

        let target = self.user_repo.get_by_id(target_id).await?;
        if banned && target.role == Role::Admin {
            return Err(AppError::Forbidden("Cannot ban an admin".to_string()));
        }
        if target.is_banned == banned {
            return Ok(target);
        }

        let mut model: user::ActiveModel = target.into();
        model.is_banned = Set(banned);
        model.updated_at = Set(Some(chrono::Utc::now().into()));
        self.user_repo.update(model).await
    }

    /// Toggle account activation. Deactivating an admin account through
    /// this path is not allowed.
    pub async fn toggle_active(
        &self,
        admin: &user::Model,
        target_id: &str,
    ) -> AppResult<user::Model> {
        ensure_admin(admin)?;

        let target = self.user_repo.get_by_id(target_id).await?;
        if target.is_active && target.role == Role::Admin {
            return Err(AppError::Forbidden(
                "Cannot deactivate an admin account".to_string(),
            ));
        }

        let next = !target.is_active;
        let mut model: user::ActiveModel = target.into();
        model.is_active = Set(next);
        model.updated_at = Set(Some(chrono::Utc::now().into()));
        self.user_repo.update(model).await
    }

    /// Delete another user's account (admin path). Admins cannot delete
    /// themselves here; self-deletion has its own endpoint.
    pub async fn admin_delete(&self, admin: &user::Model, target_id: &str) -> AppResult<()> {
        ensure_admin(admin)?;
        if admin.id == target_id {
            return Err(AppError::Conflict(
                "Use account deletion to remove your own account".to_string(),
            ));
        }

        self.user_repo.get_by_id(target_id).await?;
        self.user_repo.delete(target_id).await
    }
}

/// Require the admin role.
pub fn ensure_admin(user: &user::Model) -> AppResult<()> {
    if user.role != Role::Admin {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(())
}

/// Require an unbanned account for mutating operations.
pub fn ensure_not_banned(user: &user::Model) -> AppResult<()> {
    if user.is_banned {
        return Err(AppError::Forbidden("Account is banned".to_string()));
    }
    Ok(())
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_user(id: &str, role: Role) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            username: id.to_string(),
            username_lower: id.to_lowercase(),
            password_hash: "hash".to_string(),
            display_name: None,
            bio: None,
            avatar_url: None,
            role,
            is_banned: false,
            is_active: true,
            article_count: 0,
            follower_count: 0,
            following_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: sea_orm::DatabaseConnection) -> UserService {
        UserService::new(UserRepository::new(Arc::new(db)))
    }

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_guards() {
        let admin = test_user("a", Role::Admin);
        let user = test_user("u", Role::User);
        let mut banned = test_user("b", Role::User);
        banned.is_banned = true;

        assert!(ensure_admin(&admin).is_ok());
        assert!(matches!(ensure_admin(&user), Err(AppError::Forbidden(_))));
        assert!(ensure_not_banned(&user).is_ok());
        assert!(matches!(
            ensure_not_banned(&banned),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_register_input_rejects_bad_username() {
        let input = RegisterInput {
            email: "a@example.com".to_string(),
            username: "not valid!".to_string(),
            password: "longenough".to_string(),
            display_name: None,
        };
        assert!(input.validate().is_err());
    }

    #[tokio::test]
    async fn test_update_role_requires_confirm_for_admin() {
        let target = test_user("u", Role::User);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[target]])
            .into_connection();
        let svc = service(db);
        let admin = test_user("a", Role::Admin);

        let result = svc.update_role(&admin, "u", Role::Admin, false).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_role_same_role_is_noop() {
        let target = test_user("u", Role::Author);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[target]])
            .into_connection();
        let svc = service(db);
        let admin = test_user("a", Role::Admin);

        let result = svc.update_role(&admin, "u", Role::Author, false).await.unwrap();

        assert_eq!(result.role, Role::Author);
    }

    #[tokio::test]
    async fn test_cannot_ban_admin() {
        let target = test_user("other_admin", Role::Admin);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[target]])
            .into_connection();
        let svc = service(db);
        let admin = test_user("a", Role::Admin);

        let result = svc.set_banned(&admin, "other_admin", true).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_non_admin_cannot_change_roles() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);
        let author = test_user("author1", Role::Author);

        let result = svc.update_role(&author, "u", Role::Author, true).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_admin_delete_self_is_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);
        let admin = test_user("a", Role::Admin);

        let result = svc.admin_delete(&admin, "a").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
