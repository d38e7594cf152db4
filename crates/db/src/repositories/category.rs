//! Category and tag repository.

use std::sync::Arc;

use crate::entities::{article_tag, category, tag, ArticleTag, Category, Tag};
use curio_common::{AppError, AppResult};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

/// Category repository for database operations.
#[derive(Clone)]
pub struct CategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl CategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<category::Model>> {
        Category::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a category by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<category::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category not found: {id}")))
    }

    /// Find a category by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<category::Model>> {
        Category::find()
            .filter(category::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All categories, alphabetical.
    pub async fn list(&self) -> AppResult<Vec<category::Model>> {
        Category::find()
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a category.
    pub async fn create(&self, model: category::ActiveModel) -> AppResult<category::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a category.
    pub async fn update(&self, model: category::ActiveModel) -> AppResult<category::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a category. Articles keep their rows; the FK nulls their
    /// category.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Category::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Adjust the published-article count atomically, floored at zero.
    pub async fn adjust_article_count(&self, id: &str, delta: i32) -> AppResult<()> {
        let expr = if delta >= 0 {
            Expr::col(category::Column::ArticleCount).add(delta)
        } else {
            Expr::cust("GREATEST(article_count - 1, 0)")
        };
        Category::update_many()
            .col_expr(category::Column::ArticleCount, expr)
            .filter(category::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ==================== Tags ====================

    /// Find a tag by slug.
    pub async fn find_tag_by_slug(&self, slug: &str) -> AppResult<Option<tag::Model>> {
        Tag::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All tags, alphabetical.
    pub async fn list_tags(&self) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a tag.
    pub async fn create_tag(&self, model: tag::ActiveModel) -> AppResult<tag::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tags attached to an article.
    pub async fn tags_for_article(&self, article_id: &str) -> AppResult<Vec<tag::Model>> {
        let links = ArticleTag::find()
            .filter(article_tag::Column::ArticleId.eq(article_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if links.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = links.into_iter().map(|l| l.tag_id).collect();
        Tag::find()
            .filter(tag::Column::Id.is_in(ids))
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_category(id: &str, name: &str, slug: &str) -> category::Model {
        category::Model {
            id: id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            article_count: 0,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_slug() {
        let category = create_test_category("cat1", "Technology", "technology");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[category]])
                .into_connection(),
        );

        let repo = CategoryRepository::new(db);
        let result = repo.find_by_slug("technology").await.unwrap();

        assert_eq!(result.unwrap().name, "Technology");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<category::Model>::new()])
                .into_connection(),
        );

        let repo = CategoryRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
