//! Persistence layer for the orchard inventory service
//!
//! SeaORM entities, migrations, and the role-scoped visibility rules shared
//! by list and stats queries. Supports SQLite (tests, small deployments) and
//! PostgreSQL through the same connection URL.

pub mod entities;
pub mod migrator;
pub mod origin;
pub mod scope;

use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

/// Connect to the database given a SeaORM connection URL
/// (e.g. `sqlite://orchard.db?mode=rwc` or `postgres://...`).
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(url).await?;
    info!("Database connection established");
    Ok(db)
}

/// Apply all pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    migrator::Migrator::up(db, None).await?;
    info!("Database schema is up to date");
    Ok(())
}
