//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_user_table;
mod m20250601_000002_create_category_table;
mod m20250601_000003_create_article_table;
mod m20250601_000004_create_comment_table;
mod m20250601_000005_create_report_tables;
mod m20250601_000006_create_notification_table;
mod m20250601_000007_create_engagement_tables;
mod m20250601_000008_create_follow_table;
mod m20250601_000009_create_author_profile_table;
mod m20250601_000010_create_tag_tables;
mod m20250601_000011_create_badge_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_user_table::Migration),
            Box::new(m20250601_000002_create_category_table::Migration),
            Box::new(m20250601_000003_create_article_table::Migration),
            Box::new(m20250601_000004_create_comment_table::Migration),
            Box::new(m20250601_000005_create_report_tables::Migration),
            Box::new(m20250601_000006_create_notification_table::Migration),
            Box::new(m20250601_000007_create_engagement_tables::Migration),
            Box::new(m20250601_000008_create_follow_table::Migration),
            Box::new(m20250601_000009_create_author_profile_table::Migration),
            Box::new(m20250601_000010_create_tag_tables::Migration),
            Box::new(m20250601_000011_create_badge_tables::Migration),
        ]
    }
}
