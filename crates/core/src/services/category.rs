//! Category and tag service.

use crate::services::user::ensure_admin;
use curio_common::{slugify, slugify_unique, AppError, AppResult, IdGenerator};
use curio_db::{
    entities::{category, tag, user},
    repositories::CategoryRepository,
};
use sea_orm::Set;
use validator::Validate;

/// Input for creating a category.
#[derive(Debug, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "Description too long"))]
    pub description: Option<String>,
}

/// Input for updating a category.
#[derive(Debug, Default, Validate)]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "Description too long"))]
    pub description: Option<String>,
}

/// Category service for business logic.
#[derive(Clone)]
pub struct CategoryService {
    category_repo: CategoryRepository,
    id_gen: IdGenerator,
}

impl CategoryService {
    /// Create a new category service.
    #[must_use]
    pub const fn new(category_repo: CategoryRepository) -> Self {
        Self {
            category_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// All categories, alphabetical.
    pub async fn list(&self) -> AppResult<Vec<category::Model>> {
        self.category_repo.list().await
    }

    /// One category by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<category::Model> {
        self.category_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category not found: {slug}")))
    }

    /// Create a category (admin).
    pub async fn create(
        &self,
        admin: &user::Model,
        input: CreateCategoryInput,
    ) -> AppResult<category::Model> {
        ensure_admin(admin)?;
        input.validate()?;

        let slug = slugify(&input.name);
        if self.category_repo.find_by_slug(&slug).await?.is_some() {
            return Err(AppError::Conflict("Category already exists".to_string()));
        }

        let model = category::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            slug: Set(slug),
            description: Set(input.description),
            article_count: Set(0),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.category_repo.create(model).await
    }

    /// Update a category (admin). Renaming regenerates the slug.
    pub async fn update(
        &self,
        admin: &user::Model,
        category_id: &str,
        input: UpdateCategoryInput,
    ) -> AppResult<category::Model> {
        ensure_admin(admin)?;
        input.validate()?;

        let current = self.category_repo.get_by_id(category_id).await?;
        let mut model: category::ActiveModel = current.into();

        if let Some(name) = input.name {
            let slug = slugify(&name);
            let taken = self
                .category_repo
                .find_by_slug(&slug)
                .await?
                .is_some_and(|c| c.id != category_id);
            model.slug = Set(if taken { slugify_unique(&name) } else { slug });
            model.name = Set(name);
        }
        if let Some(description) = input.description {
            model.description = Set(Some(description));
        }

        self.category_repo.update(model).await
    }

    /// Delete a category (admin). Articles keep their rows with a null
    /// category.
    pub async fn delete(&self, admin: &user::Model, category_id: &str) -> AppResult<()> {
        ensure_admin(admin)?;
        self.category_repo.get_by_id(category_id).await?;
        self.category_repo.delete(category_id).await
    }

    // ========== Tags ==========

    /// All tags.
    pub async fn list_tags(&self) -> AppResult<Vec<tag::Model>> {
        self.category_repo.list_tags().await
    }

    /// Find a tag by slug, creating it when missing.
    pub async fn get_or_create_tag(&self, name: &str) -> AppResult<tag::Model> {
        let name = name.trim();
        if name.is_empty() || name.len() > 64 {
            return Err(AppError::Validation(
                "Tag name must be 1-64 characters".to_string(),
            ));
        }

        let slug = slugify(name);
        if let Some(existing) = self.category_repo.find_tag_by_slug(&slug).await? {
            return Ok(existing);
        }

        let model = tag::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            slug: Set(slug),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.category_repo.create_tag(model).await
    }

    /// Tags attached to an article.
    pub async fn tags_for_article(&self, article_id: &str) -> AppResult<Vec<tag::Model>> {
        self.category_repo.tags_for_article(article_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use curio_db::entities::user::Role;
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

    fn service(db: sea_orm::DatabaseConnection) -> CategoryService {
        CategoryService::new(CategoryRepository::new(Arc::new(db)))
    }

    #[tokio::test]
    async fn test_create_requires_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);
        let author = test_user("author1", Role::Author);

        let result = svc
            .create(
                &author,
                CreateCategoryInput {
                    name: "Tech".to_string(),
                    description: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_duplicate_slug_is_conflict() {
        let existing = category::Model {
            id: "cat1".to_string(),
            name: "Tech".to_string(),
            slug: "tech".to_string(),
            description: None,
            article_count: 0,
            created_at: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing]])
            .into_connection();
        let svc = service(db);
        let admin = test_user("admin1", Role::Admin);

        let result = svc
            .create(
                &admin,
                CreateCategoryInput {
                    name: "Tech".to_string(),
                    description: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
