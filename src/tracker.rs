//! Session service object - owns the database connection and exposes every
//! core operation as a method.
//!
//! A [`Tracker`] is constructed once per session and passed by reference to
//! whatever presentation layer needs it; the collections are never reachable
//! through ambient globals. All methods are thin delegations to the
//! framework-agnostic functions in [`crate::core`].

use crate::{
    config,
    core::{history, items, transfer, views},
    errors::Result,
    models::{Bundle, FoundItem, Item},
};
use sea_orm::DatabaseConnection;

/// The per-session service owning both persisted collections.
pub struct Tracker {
    /// Database connection for all storage operations
    database: DatabaseConnection,
}

impl Tracker {
    /// Wraps an already-provisioned database connection.
    #[must_use]
    pub const fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    /// Connects to the configured database and provisions the schema,
    /// producing a session-ready service.
    pub async fn connect() -> Result<Self> {
        let database = config::database::create_connection().await?;
        config::database::create_tables(&database).await?;
        Ok(Self { database })
    }

    /// The underlying connection, for callers composing their own queries.
    #[must_use]
    pub const fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    // --- Need-list operations ---

    /// Current need-list, most recently added first.
    pub async fn items(&self) -> Result<Vec<Item>> {
        items::list_items(&self.database).await
    }

    /// Looks an item up by id.
    pub async fn item(&self, id: &str) -> Result<Option<Item>> {
        items::get_item(&self.database, id).await
    }

    /// Adds a new item to the front of the need-list.
    pub async fn add_item(
        &self,
        name: &str,
        quantity: i64,
        raw_tags: &str,
        high_priority: bool,
    ) -> Result<Item> {
        items::add_item(&self.database, name, quantity, raw_tags, high_priority).await
    }

    /// Deletes an item; no-op if absent.
    pub async fn remove_item(&self, id: &str) -> Result<Vec<Item>> {
        items::remove_item(&self.database, id).await
    }

    /// Increases an item's needed quantity.
    pub async fn increase_quantity(&self, id: &str, by: i64) -> Result<Vec<Item>> {
        items::increase_quantity(&self.database, id, by).await
    }

    /// Decreases an item's needed quantity, clamping at the floor.
    pub async fn decrease_quantity(&self, id: &str, by: i64) -> Result<Vec<Item>> {
        items::decrease_quantity(&self.database, id, by).await
    }

    /// Flips an item's high-priority flag.
    pub async fn toggle_priority(&self, id: &str) -> Result<Vec<Item>> {
        items::toggle_priority(&self.database, id).await
    }

    /// Replaces an item's tag set from free text.
    pub async fn set_tags(&self, id: &str, raw_tags: &str) -> Result<Vec<Item>> {
        items::set_tags(&self.database, id, raw_tags).await
    }

    // --- History operations ---

    /// Current history, most recently found first.
    pub async fn history(&self) -> Result<Vec<FoundItem>> {
        history::list_history(&self.database).await
    }

    /// Records one found-event for an item.
    pub async fn mark_found(&self, item_id: &str) -> Result<history::MarkFoundResult> {
        history::mark_found(&self.database, item_id).await
    }

    /// Moves a history entry back onto the need-list.
    pub async fn restore_entry(&self, found_id: &str) -> Result<Vec<Item>> {
        history::restore_entry(&self.database, found_id).await
    }

    /// Removes a history entry; no-op if absent.
    pub async fn delete_entry(&self, id: &str) -> Result<Vec<FoundItem>> {
        history::delete_entry(&self.database, id).await
    }

    // --- Import/export ---

    /// Snapshot of both collections for export.
    pub async fn export(&self) -> Result<Bundle> {
        transfer::export_bundle(&self.database).await
    }

    /// Imports a serialized payload under the given reconciliation policy.
    pub async fn import(
        &self,
        raw: &[u8],
        mode: transfer::ImportMode,
    ) -> Result<transfer::ImportReport> {
        transfer::import_bundle(&self.database, raw, mode).await
    }

    // --- Derived projections ---

    /// Need-list with high-priority items first (stable partition).
    pub async fn sorted_items(&self) -> Result<Vec<Item>> {
        views::sorted_items(&self.database).await
    }

    /// Every name either collection has seen, deduplicated, ascending.
    pub async fn known_names(&self) -> Result<Vec<String>> {
        views::distinct_known_names(&self.database).await
    }

    /// Union of all tag sets, deduplicated, ascending.
    pub async fn tags(&self) -> Result<Vec<String>> {
        views::distinct_tags(&self.database).await
    }

    /// Known names matching a case-insensitive substring query.
    pub async fn autocomplete(&self, query: &str) -> Result<Vec<String>> {
        views::autocomplete(&self.database, query).await
    }

    /// Aggregate counts for conditional presentation affordances.
    pub async fn summary(&self) -> Result<views::TrackerSummary> {
        views::summary(&self.database).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::transfer::ImportMode;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_tracker_session_flow() -> Result<()> {
        let tracker = Tracker::new(setup_test_db().await?);

        let bolts = tracker.add_item("Bolts", 2, "barter", true).await?;
        tracker.add_item("Screws", 1, "", false).await?;

        let found = tracker.mark_found(&bolts.id).await?;
        assert_eq!(found.items[0].quantity_needed, 1);

        assert_eq!(tracker.known_names().await?, vec!["Bolts", "Screws"]);
        assert_eq!(tracker.tags().await?, vec!["barter"]);
        assert_eq!(tracker.autocomplete("bo").await?, vec!["Bolts"]);

        let summary = tracker.summary().await?;
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.history_count, 1);
        assert!(summary.has_data);

        Ok(())
    }

    #[tokio::test]
    async fn test_tracker_export_import_between_sessions() -> Result<()> {
        let source = Tracker::new(setup_test_db().await?);
        source.add_item("Bolts", 3, "", false).await?;

        let payload = serde_json::to_vec(&source.export().await?).unwrap();

        let target = Tracker::new(setup_test_db().await?);
        target.add_item("Bolts", 2, "", false).await?;
        let report = target.import(&payload, ImportMode::Merge).await?;

        assert_eq!(report.items_accepted, 1);
        let items = target.items().await?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity_needed, 5);

        Ok(())
    }
}
