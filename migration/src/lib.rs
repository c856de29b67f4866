pub use sea_orm_migration::prelude::*;

mod m20250915_000001_baseline_schema;
mod m20260412_000002_add_expense_tracking;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250915_000001_baseline_schema::Migration),
            Box::new(m20260412_000002_add_expense_tracking::Migration),
        ]
    }
}
