//! Create adoption request table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdoptionRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdoptionRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AdoptionRequest::ReportId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdoptionRequest::ApplicantId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdoptionRequest::ApplicantName)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AdoptionRequest::Message).text().not_null())
                    .col(
                        ColumnDef::new(AdoptionRequest::ContactPhone)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdoptionRequest::ContactEmail)
                            .string_len(320)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdoptionRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("Pending"),
                    )
                    .col(ColumnDef::new(AdoptionRequest::ResponseMessage).text())
                    .col(
                        ColumnDef::new(AdoptionRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(AdoptionRequest::RespondedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_adoption_request_report")
                            .from(AdoptionRequest::Table, AdoptionRequest::ReportId)
                            .to(Report::Table, Report::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_adoption_request_applicant")
                            .from(AdoptionRequest::Table, AdoptionRequest::ApplicantId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (report_id, created_at) for ordered listing per report
        manager
            .create_index(
                Index::create()
                    .name("idx_adoption_request_report_created")
                    .table(AdoptionRequest::Table)
                    .col(AdoptionRequest::ReportId)
                    .col(AdoptionRequest::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: (report_id, applicant_id) for the duplicate check
        manager
            .create_index(
                Index::create()
                    .name("idx_adoption_request_report_applicant")
                    .table(AdoptionRequest::Table)
                    .col(AdoptionRequest::ReportId)
                    .col(AdoptionRequest::ApplicantId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdoptionRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AdoptionRequest {
    Table,
    Id,
    ReportId,
    ApplicantId,
    ApplicantName,
    Message,
    ContactPhone,
    ContactEmail,
    Status,
    ResponseMessage,
    CreatedAt,
    RespondedAt,
}

#[derive(Iden)]
enum Report {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
