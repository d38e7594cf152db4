//! Create article table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Article::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Article::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Article::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Article::CategoryId).string_len(32))
                    .col(ColumnDef::new(Article::Title).string_len(512).not_null())
                    .col(
                        ColumnDef::new(Article::Slug)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Article::Excerpt).text())
                    .col(ColumnDef::new(Article::Body).text().not_null())
                    .col(ColumnDef::new(Article::FeaturedImageUrl).string_len(512))
                    .col(
                        ColumnDef::new(Article::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Article::RejectionReason).text())
                    .col(ColumnDef::new(Article::ReviewedBy).string_len(32))
                    .col(ColumnDef::new(Article::ReviewedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Article::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Article::ViewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Article::LikeCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Article::CommentCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Article::PublishedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Article::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Article::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_author")
                            .from(Article::Table, Article::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_category")
                            .from(Article::Table, Article::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: author_id (for listing an author's articles)
        manager
            .create_index(
                Index::create()
                    .name("idx_article_author_id")
                    .table(Article::Table)
                    .col(Article::AuthorId)
                    .to_owned(),
            )
            .await?;

        // Index: (status, published_at) (for the published feed and the review queue)
        manager
            .create_index(
                Index::create()
                    .name("idx_article_status_published_at")
                    .table(Article::Table)
                    .col(Article::Status)
                    .col(Article::PublishedAt)
                    .to_owned(),
            )
            .await?;

        // Index: category_id (for category listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_article_category_id")
                    .table(Article::Table)
                    .col(Article::CategoryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Article::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Article {
    Table,
    Id,
    AuthorId,
    CategoryId,
    Title,
    Slug,
    Excerpt,
    Body,
    FeaturedImageUrl,
    Status,
    RejectionReason,
    ReviewedBy,
    ReviewedAt,
    IsFeatured,
    ViewCount,
    LikeCount,
    CommentCount,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
}
