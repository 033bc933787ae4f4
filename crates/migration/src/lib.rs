pub use sea_orm_migration::prelude::*;

mod m20260712_090000_pens;
mod m20260712_091000_vaccines;
mod m20260712_092000_protocol_templates;
mod m20260712_093000_schedule_records;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260712_090000_pens::Migration),
            Box::new(m20260712_091000_vaccines::Migration),
            Box::new(m20260712_092000_protocol_templates::Migration),
            Box::new(m20260712_093000_schedule_records::Migration),
        ]
    }
}
