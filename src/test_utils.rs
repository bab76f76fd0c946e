//! Shared test utilities for the tracker core.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{config, core::items, errors::Result, models::Item};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber. Safe to call from every test;
/// later calls are ignored.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with the schema initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test item with sensible defaults.
///
/// # Defaults
/// * `quantity`: 1
/// * `tags`: none
/// * `high_priority`: false
pub async fn add_test_item(db: &DatabaseConnection, name: &str) -> Result<Item> {
    items::add_item(db, name, 1, "", false).await
}

/// Creates a test item with custom parameters.
/// Use this when a test needs a specific quantity, tag set, or priority.
pub async fn add_custom_item(
    db: &DatabaseConnection,
    name: &str,
    quantity: i64,
    raw_tags: &str,
    high_priority: bool,
) -> Result<Item> {
    items::add_item(db, name, quantity, raw_tags, high_priority).await
}

/// Sets up a complete test environment with one default item.
/// Returns `(db, item)` for common test scenarios.
pub async fn setup_with_item() -> Result<(DatabaseConnection, Item)> {
    let db = setup_test_db().await?;
    let item = add_test_item(&db, "Test Item").await?;
    Ok((db, item))
}
