pub use sea_orm_migration::prelude::*;

mod m20260101_000001_baseline;
mod m20260102_000002_history_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_baseline::Migration),
            Box::new(m20260102_000002_history_indexes::Migration),
        ]
    }
}
