//! Create feedback table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Feedback::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Feedback::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Feedback::ComplaintId).string_len(32).not_null())
                    .col(ColumnDef::new(Feedback::StudentId).string_len(32).not_null())
                    .col(ColumnDef::new(Feedback::Body).text().not_null())
                    .col(
                        ColumnDef::new(Feedback::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedback_complaint")
                            .from(Feedback::Table, Feedback::ComplaintId)
                            .to(Complaint::Table, Complaint::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: complaint_id
        manager
            .create_index(
                Index::create()
                    .name("idx_feedback_complaint_id")
                    .table(Feedback::Table)
                    .col(Feedback::ComplaintId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Feedback::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Feedback {
    Table,
    Id,
    ComplaintId,
    StudentId,
    Body,
    CreatedAt,
}

#[derive(Iden)]
enum Complaint {
    Table,
    Id,
}
