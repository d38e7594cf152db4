//! Create article_report and comment_report tables migration.
//!
//! The unique (target, reporter) indexes enforce the one-report-per-pair
//! rule at the storage level, settling the check-then-insert race.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ArticleReport::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ArticleReport::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ArticleReport::ArticleId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ArticleReport::ReporterId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ArticleReport::Reason).text().not_null())
                    .col(
                        ColumnDef::new(ArticleReport::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_report_article")
                            .from(ArticleReport::Table, ArticleReport::ArticleId)
                            .to(Article::Table, Article::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_report_reporter")
                            .from(ArticleReport::Table, ArticleReport::ReporterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_article_report_unique_pair")
                    .table(ArticleReport::Table)
                    .col(ArticleReport::ArticleId)
                    .col(ArticleReport::ReporterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CommentReport::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CommentReport::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CommentReport::CommentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CommentReport::ReporterId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CommentReport::Reason).text().not_null())
                    .col(
                        ColumnDef::new(CommentReport::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_report_comment")
                            .from(CommentReport::Table, CommentReport::CommentId)
                            .to(Comment::Table, Comment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_report_reporter")
                            .from(CommentReport::Table, CommentReport::ReporterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comment_report_unique_pair")
                    .table(CommentReport::Table)
                    .col(CommentReport::CommentId)
                    .col(CommentReport::ReporterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CommentReport::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ArticleReport::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ArticleReport {
    Table,
    Id,
    ArticleId,
    ReporterId,
    Reason,
    CreatedAt,
}

#[derive(Iden)]
enum CommentReport {
    Table,
    Id,
    CommentId,
    ReporterId,
    Reason,
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
