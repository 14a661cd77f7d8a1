//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_companies;
mod m20250301_000002_create_profiles;
mod m20250301_000003_create_valves;
mod m20250301_000004_create_service_orders;
mod m20250301_000005_create_inspections;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_companies::Migration),
            Box::new(m20250301_000002_create_profiles::Migration),
            Box::new(m20250301_000003_create_valves::Migration),
            Box::new(m20250301_000004_create_service_orders::Migration),
            Box::new(m20250301_000005_create_inspections::Migration),
        ]
    }
}
