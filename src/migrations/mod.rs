pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_users_table;
mod m20250901_000002_create_revoked_tokens_table;
mod m20250901_000003_add_password_changed_at;
mod m20250901_000004_create_reset_and_verification_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_users_table::Migration),
            Box::new(m20250901_000002_create_revoked_tokens_table::Migration),
            Box::new(m20250901_000003_add_password_changed_at::Migration),
            Box::new(m20250901_000004_create_reset_and_verification_tokens::Migration),
        ]
    }
}
