//! Create blog table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Blog::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Blog::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Blog::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Blog::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Blog::Content).text().not_null())
                    .col(ColumnDef::new(Blog::Excerpt).text().not_null())
                    .col(
                        ColumnDef::new(Blog::Category)
                            .string_len(32)
                            .not_null()
                            .default("Safety Tips"),
                    )
                    .col(ColumnDef::new(Blog::ImageUrl).string_len(2048))
                    .col(ColumnDef::new(Blog::IsPublished).boolean().not_null().default(true))
                    .col(ColumnDef::new(Blog::Views).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Blog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Blog::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_author")
                            .from(Blog::Table, Blog::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (is_published, created_at) for the public listing
        manager
            .create_index(
                Index::create()
                    .name("idx_blog_published_created")
                    .table(Blog::Table)
                    .col(Blog::IsPublished)
                    .col(Blog::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: author_id
        manager
            .create_index(
                Index::create()
                    .name("idx_blog_author_id")
                    .table(Blog::Table)
                    .col(Blog::AuthorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Blog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Blog {
    Table,
    Id,
    AuthorId,
    Title,
    Content,
    Excerpt,
    Category,
    ImageUrl,
    IsPublished,
    Views,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
