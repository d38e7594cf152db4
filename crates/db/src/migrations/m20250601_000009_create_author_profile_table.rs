//! Create author_profile table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuthorProfile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthorProfile::UserId)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AuthorProfile::AuthorStatus)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(AuthorProfile::PenName).string_len(256))
                    .col(ColumnDef::new(AuthorProfile::Website).string_len(512))
                    .col(
                        ColumnDef::new(AuthorProfile::AppliedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(AuthorProfile::ReviewedBy).string_len(32))
                    .col(ColumnDef::new(AuthorProfile::ReviewedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_author_profile_user")
                            .from(AuthorProfile::Table, AuthorProfile::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuthorProfile::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AuthorProfile {
    Table,
    UserId,
    AuthorStatus,
    PenName,
    Website,
    AppliedAt,
    ReviewedBy,
    ReviewedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
