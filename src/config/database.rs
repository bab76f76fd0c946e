//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! The schema is generated from the entity definition with
//! `Schema::create_table_from_entity`, ensuring the database layout matches the
//! Rust struct without requiring manual SQL.

use crate::entities::TrackerRecord;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Fallback database location when `DATABASE_URL` is not set.
/// `mode=rwc` lets `SQLite` create the file on first use.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/tarkov_tracker.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable or
/// returns the default local `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the `SQLite` database using the configured URL.
///
/// Falls back to a default local `SQLite` file if no environment variable is
/// set. This is the single place the rest of the crate obtains its connection.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates the tracker state table using `SeaORM`'s schema generation from the
/// entity definition.
///
/// Safe to call on every session start: the statement carries
/// `IF NOT EXISTS`, so an already-provisioned database is left untouched.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut table = schema.create_table_from_entity(TrackerRecord);
    db.execute(builder.build(table.if_not_exists())).await?;

    Ok(())
}
