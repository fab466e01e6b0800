//! Create complaint table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Complaint::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Complaint::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Complaint::StudentId).string_len(32).not_null())
                    .col(ColumnDef::new(Complaint::StudentName).string_len(256).not_null())
                    .col(ColumnDef::new(Complaint::StudentEmail).string_len(320).not_null())
                    .col(ColumnDef::new(Complaint::Category).string_len(32).not_null())
                    .col(ColumnDef::new(Complaint::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Complaint::Description).text().not_null())
                    .col(ColumnDef::new(Complaint::AttachmentKey).string_len(512))
                    .col(ColumnDef::new(Complaint::AttachmentName).string_len(256))
                    .col(ColumnDef::new(Complaint::AttachmentType).string_len(128))
                    .col(ColumnDef::new(Complaint::AttachmentSize).big_integer())
                    .col(
                        ColumnDef::new(Complaint::Status)
                            .string_len(16)
                            .not_null()
                            .default("baru"),
                    )
                    .col(
                        ColumnDef::new(Complaint::Priority)
                            .string_len(16)
                            .not_null()
                            .default("rendah"),
                    )
                    .col(ColumnDef::new(Complaint::AdminNotes).text())
                    .col(
                        ColumnDef::new(Complaint::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Complaint::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaint_student")
                            .from(Complaint::Table, Complaint::StudentId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: student_id (student's own list)
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_student_id")
                    .table(Complaint::Table)
                    .col(Complaint::StudentId)
                    .to_owned(),
            )
            .await?;

        // Index: (status, category) for admin filtering
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_status_category")
                    .table(Complaint::Table)
                    .col(Complaint::Status)
                    .col(Complaint::Category)
                    .to_owned(),
            )
            .await?;

        // Index: created_at
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_created_at")
                    .table(Complaint::Table)
                    .col(Complaint::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Complaint::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Complaint {
    Table,
    Id,
    StudentId,
    StudentName,
    StudentEmail,
    Category,
    Title,
    Description,
    AttachmentKey,
    AttachmentName,
    AttachmentType,
    AttachmentSize,
    Status,
    Priority,
    AdminNotes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
