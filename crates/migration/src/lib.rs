//! Migrator for the `person` table.
//! Every migration is idempotent (`IF NOT EXISTS`), so running it on each start is safe.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_person;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_person::Migration)]
    }
}
