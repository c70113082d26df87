pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_enum_types;
mod m20250901_000002_create_accounts;
mod m20250901_000003_create_catalog;
mod m20250901_000004_create_orders;
mod m20250901_000005_create_payments;
mod m20250901_000006_create_loyalty;
mod m20250901_000007_create_promotions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_enum_types::Migration),
            Box::new(m20250901_000002_create_accounts::Migration),
            Box::new(m20250901_000003_create_catalog::Migration),
            Box::new(m20250901_000004_create_orders::Migration),
            Box::new(m20250901_000005_create_payments::Migration),
            Box::new(m20250901_000006_create_loyalty::Migration),
            Box::new(m20250901_000007_create_promotions::Migration),
        ]
    }
}
