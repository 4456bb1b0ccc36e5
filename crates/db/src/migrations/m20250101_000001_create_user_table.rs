//! Create user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(User::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(User::Name).string_len(256).not_null())
                    .col(ColumnDef::new(User::Email).string_len(320).not_null())
                    .col(ColumnDef::new(User::PasswordHash).string_len(256).not_null())
                    .col(
                        ColumnDef::new(User::Role)
                            .string_len(16)
                            .not_null()
                            .default("public"),
                    )
                    .col(ColumnDef::new(User::Lat).double().not_null().default(23.8103))
                    .col(ColumnDef::new(User::Lng).double().not_null().default(90.4125))
                    .col(ColumnDef::new(User::Phone).string_len(32))
                    .col(ColumnDef::new(User::IsAvailable).boolean().not_null().default(true))
                    .col(ColumnDef::new(User::Points).integer().not_null().default(0))
                    .col(ColumnDef::new(User::RescueCount).integer().not_null().default(0))
                    .col(ColumnDef::new(User::ClinicName).string_len(256))
                    .col(ColumnDef::new(User::Specialization).string_len(128))
                    .col(ColumnDef::new(User::Experience).integer())
                    .col(ColumnDef::new(User::VetAvailability).string_len(32))
                    .col(ColumnDef::new(User::EmergencyContact).string_len(64))
                    .col(ColumnDef::new(User::Website).string_len(1024))
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(User::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: email (stored lowercase)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_email")
                    .table(User::Table)
                    .col(User::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (role, is_available) for rescuer fan-out and vet lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_user_role_available")
                    .table(User::Table)
                    .col(User::Role)
                    .col(User::IsAvailable)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Role,
    Lat,
    Lng,
    Phone,
    IsAvailable,
    Points,
    RescueCount,
    ClinicName,
    Specialization,
    Experience,
    VetAvailability,
    EmergencyContact,
    Website,
    CreatedAt,
    UpdatedAt,
}
