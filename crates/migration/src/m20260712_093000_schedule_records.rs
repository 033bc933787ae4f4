use sea_orm_migration::prelude::*;

use crate::m20260712_090000_pens::Pens;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum ScheduleRecords {
    Table,
    Id,
    PenId,
    TemplateId,
    VaccineName,
    Stage,
    ScheduledDate,
    Status,
    CompletedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // template_id carries no foreign key: templates may be deleted while
        // historical records keep the orphaned reference plus the
        // vaccine_name/stage snapshot.
        manager
            .create_table(
                Table::create()
                    .table(ScheduleRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScheduleRecords::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScheduleRecords::PenId).string().not_null())
                    .col(ColumnDef::new(ScheduleRecords::TemplateId).string())
                    .col(
                        ColumnDef::new(ScheduleRecords::VaccineName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ScheduleRecords::Stage).integer().not_null())
                    .col(
                        ColumnDef::new(ScheduleRecords::ScheduledDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ScheduleRecords::Status).string().not_null())
                    .col(ColumnDef::new(ScheduleRecords::CompletedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-schedule_records-pen_id")
                            .from(ScheduleRecords::Table, ScheduleRecords::PenId)
                            .to(Pens::Table, Pens::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // The idempotency key: at most one record per (pen, template) pair.
        // NULL template ids (ad hoc records) are exempt.
        manager
            .create_index(
                Index::create()
                    .name("idx-schedule_records-pen_id-template_id")
                    .table(ScheduleRecords::Table)
                    .col(ScheduleRecords::PenId)
                    .col(ScheduleRecords::TemplateId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-schedule_records-scheduled_date")
                    .table(ScheduleRecords::Table)
                    .col(ScheduleRecords::ScheduledDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScheduleRecords::Table).to_owned())
            .await
    }
}
