//! Create badge and user_badge tables migration, with the seed badge set.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Badge::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Badge::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Badge::Name)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Badge::Description).text().not_null())
                    .col(ColumnDef::new(Badge::Icon).string_len(512))
                    .col(ColumnDef::new(Badge::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(Badge::Threshold).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserBadge::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserBadge::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(UserBadge::BadgeId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(UserBadge::AwardedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserBadge::UserId)
                            .col(UserBadge::BadgeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_badge_user")
                            .from(UserBadge::Table, UserBadge::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_badge_badge")
                            .from(UserBadge::Table, UserBadge::BadgeId)
                            .to(Badge::Table, Badge::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Seed the fixed badge set
        let seed = [
            ("badge_first_pub", "First Publication", "Published a first article.", "publications", 1),
            ("badge_ten_pubs", "Prolific Author", "Published ten articles.", "publications", 10),
            ("badge_hundred_likes", "Reader Favorite", "Received one hundred likes.", "likes_received", 100),
        ];

        for (id, name, description, kind, threshold) in seed {
            manager
                .exec_stmt(
                    Query::insert()
                        .into_table(Badge::Table)
                        .columns([
                            Badge::Id,
                            Badge::Name,
                            Badge::Description,
                            Badge::Kind,
                            Badge::Threshold,
                        ])
                        .values_panic([
                            id.into(),
                            name.into(),
                            description.into(),
                            kind.into(),
                            threshold.into(),
                        ])
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserBadge::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Badge::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Badge {
    Table,
    Id,
    Name,
    Description,
    Icon,
    Kind,
    Threshold,
}

#[derive(Iden)]
enum UserBadge {
    Table,
    UserId,
    BadgeId,
    AwardedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
