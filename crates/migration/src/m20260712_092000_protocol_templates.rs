use sea_orm_migration::prelude::*;

use crate::m20260712_091000_vaccines::Vaccines;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum ProtocolTemplates {
    Table,
    Id,
    VaccineId,
    VaccineName,
    Stage,
    DaysOld,
    Dosage,
    Notes,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProtocolTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProtocolTemplates::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProtocolTemplates::VaccineId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProtocolTemplates::VaccineName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProtocolTemplates::Stage)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProtocolTemplates::DaysOld)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProtocolTemplates::Dosage)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProtocolTemplates::Notes).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-protocol_templates-vaccine_id")
                            .from(ProtocolTemplates::Table, ProtocolTemplates::VaccineId)
                            .to(Vaccines::Table, Vaccines::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Two template items must never share a (vaccine, stage) pair.
        manager
            .create_index(
                Index::create()
                    .name("idx-protocol_templates-vaccine_id-stage")
                    .table(ProtocolTemplates::Table)
                    .col(ProtocolTemplates::VaccineId)
                    .col(ProtocolTemplates::Stage)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProtocolTemplates::Table).to_owned())
            .await
    }
}
