//! Create report table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Report::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Report::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Report::PhotoUrl).string_len(2048).not_null())
                    .col(ColumnDef::new(Report::Description).text())
                    .col(ColumnDef::new(Report::Lat).double().not_null())
                    .col(ColumnDef::new(Report::Lng).double().not_null())
                    .col(
                        ColumnDef::new(Report::IssueType)
                            .string_len(16)
                            .not_null()
                            .default("Other"),
                    )
                    .col(ColumnDef::new(Report::AnimalType).string_len(64))
                    .col(ColumnDef::new(Report::AnimalName).string_len(128))
                    .col(
                        ColumnDef::new(Report::InjurySeverity)
                            .string_len(16)
                            .not_null()
                            .default("Medium"),
                    )
                    .col(
                        ColumnDef::new(Report::FirstAidSuggestions)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(Report::ReporterPhone).string_len(32))
                    .col(ColumnDef::new(Report::ReporterEmail).string_len(320))
                    .col(
                        ColumnDef::new(Report::Status)
                            .string_len(32)
                            .not_null()
                            .default("Pending"),
                    )
                    .col(ColumnDef::new(Report::CreatedBy).string_len(32))
                    .col(ColumnDef::new(Report::AssignedTo).string_len(32))
                    .col(ColumnDef::new(Report::AssignedVet).string_len(32))
                    .col(ColumnDef::new(Report::RecoveryPhotoUrl).string_len(2048))
                    .col(ColumnDef::new(Report::HealthInfo).text())
                    .col(ColumnDef::new(Report::VetNotes).text())
                    .col(ColumnDef::new(Report::TreatmentPlan).text())
                    .col(ColumnDef::new(Report::EstimatedRecoveryTime).string_len(128))
                    .col(
                        ColumnDef::new(Report::IsForAdoption)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Report::AdoptionPostedBy).string_len(32))
                    .col(ColumnDef::new(Report::AdoptionContactPerson).string_len(16))
                    .col(ColumnDef::new(Report::AdoptionContactPhone).string_len(32))
                    .col(ColumnDef::new(Report::AdoptionContactEmail).string_len(320))
                    .col(ColumnDef::new(Report::AdoptionLocation).string_len(512))
                    .col(ColumnDef::new(Report::AdoptionFee).double())
                    .col(ColumnDef::new(Report::AdoptionRequirements).text())
                    .col(
                        ColumnDef::new(Report::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Report::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_created_by")
                            .from(Report::Table, Report::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_assigned_to")
                            .from(Report::Table, Report::AssignedTo)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_assigned_vet")
                            .from(Report::Table, Report::AssignedVet)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: status (listing filters, vet open cases)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_status")
                    .table(Report::Table)
                    .col(Report::Status)
                    .to_owned(),
            )
            .await?;

        // Index: created_by (my reports)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_created_by")
                    .table(Report::Table)
                    .col(Report::CreatedBy)
                    .to_owned(),
            )
            .await?;

        // Index: assigned_vet (vet case list)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_assigned_vet")
                    .table(Report::Table)
                    .col(Report::AssignedVet)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (newest-first listing, monthly stats)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_created_at")
                    .table(Report::Table)
                    .col(Report::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Report::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Report {
    Table,
    Id,
    PhotoUrl,
    Description,
    Lat,
    Lng,
    IssueType,
    AnimalType,
    AnimalName,
    InjurySeverity,
    FirstAidSuggestions,
    ReporterPhone,
    ReporterEmail,
    Status,
    CreatedBy,
    AssignedTo,
    AssignedVet,
    RecoveryPhotoUrl,
    HealthInfo,
    VetNotes,
    TreatmentPlan,
    EstimatedRecoveryTime,
    IsForAdoption,
    AdoptionPostedBy,
    AdoptionContactPerson,
    AdoptionContactPhone,
    AdoptionContactEmail,
    AdoptionLocation,
    AdoptionFee,
    AdoptionRequirements,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
