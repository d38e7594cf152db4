//! Create article_like, comment_like, bookmark and reading_list_entry
//! tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ArticleLike::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ArticleLike::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ArticleLike::ArticleId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ArticleLike::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(ArticleLike::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_like_article")
                            .from(ArticleLike::Table, ArticleLike::ArticleId)
                            .to(Article::Table, Article::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_like_user")
                            .from(ArticleLike::Table, ArticleLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_article_like_unique_pair")
                    .table(ArticleLike::Table)
                    .col(ArticleLike::ArticleId)
                    .col(ArticleLike::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CommentLike::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CommentLike::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CommentLike::CommentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CommentLike::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(CommentLike::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_like_comment")
                            .from(CommentLike::Table, CommentLike::CommentId)
                            .to(Comment::Table, Comment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_like_user")
                            .from(CommentLike::Table, CommentLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comment_like_unique_pair")
                    .table(CommentLike::Table)
                    .col(CommentLike::CommentId)
                    .col(CommentLike::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bookmark::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookmark::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bookmark::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Bookmark::ArticleId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Bookmark::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookmark_user")
                            .from(Bookmark::Table, Bookmark::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookmark_article")
                            .from(Bookmark::Table, Bookmark::ArticleId)
                            .to(Article::Table, Article::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookmark_unique_pair")
                    .table(Bookmark::Table)
                    .col(Bookmark::ArticleId)
                    .col(Bookmark::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ReadingListEntry::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReadingListEntry::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReadingListEntry::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReadingListEntry::ArticleId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReadingListEntry::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ReadingListEntry::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reading_list_user")
                            .from(ReadingListEntry::Table, ReadingListEntry::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reading_list_article")
                            .from(ReadingListEntry::Table, ReadingListEntry::ArticleId)
                            .to(Article::Table, Article::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reading_list_unique_pair")
                    .table(ReadingListEntry::Table)
                    .col(ReadingListEntry::UserId)
                    .col(ReadingListEntry::ArticleId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReadingListEntry::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bookmark::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CommentLike::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ArticleLike::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ArticleLike {
    Table,
    Id,
    ArticleId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum CommentLike {
    Table,
    Id,
    CommentId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Bookmark {
    Table,
    Id,
    UserId,
    ArticleId,
    CreatedAt,
}

#[derive(Iden)]
enum ReadingListEntry {
    Table,
    Id,
    UserId,
    ArticleId,
    Position,
    CreatedAt,
}

#[derive(Iden)]
enum Article {
    Table,
    Id,
}

#[derive(Iden)]
enum Comment {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
