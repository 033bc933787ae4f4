use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Pens {
    Table,
    Id,
    Name,
    IntakeDate,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pens::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Pens::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Pens::Name).string().not_null())
                    .col(ColumnDef::new(Pens::IntakeDate).date().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pens::Table).to_owned())
            .await
    }
}
