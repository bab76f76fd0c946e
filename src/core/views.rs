//! View-projection business logic - derived read-only views over both
//! collections.
//!
//! Projections hold no state of their own; every call recomputes from the
//! persisted collections, so a presentation layer can re-render from them
//! after any mutation without cache invalidation concerns.

use crate::{errors::Result, models::Item, store};
use sea_orm::DatabaseConnection;
use std::collections::BTreeSet;

/// Aggregate counts a presentation layer needs for conditional affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSummary {
    /// Number of need-list entries
    pub item_count: usize,
    /// Sum of `quantity_needed` across the need-list
    pub total_quantity_needed: i64,
    /// Number of history entries
    pub history_count: usize,
    /// Whether either collection holds anything (e.g. to enable export)
    pub has_data: bool,
}

/// Returns the need-list with all high-priority items placed before all
/// others.
///
/// This is a stable partition, not a full comparator sort: relative order
/// within each partition is preserved from the underlying storage order.
pub async fn sorted_items(db: &DatabaseConnection) -> Result<Vec<Item>> {
    let mut items = store::load_items(db).await?;
    items.sort_by_key(|item| !item.is_high_priority);
    Ok(items)
}

/// Returns every name the tracker has ever seen: the union of current
/// need-list names and all history item names, deduplicated and sorted
/// ascending.
pub async fn distinct_known_names(db: &DatabaseConnection) -> Result<Vec<String>> {
    let items = store::load_items(db).await?;
    let history = store::load_history(db).await?;

    let names: BTreeSet<String> = items
        .into_iter()
        .map(|item| item.name)
        .chain(history.into_iter().map(|entry| entry.item_name))
        .collect();
    Ok(names.into_iter().collect())
}

/// Returns the union of all need-list tag sets, deduplicated and sorted
/// ascending.
pub async fn distinct_tags(db: &DatabaseConnection) -> Result<Vec<String>> {
    let items = store::load_items(db).await?;

    let tags: BTreeSet<String> = items.into_iter().flat_map(|item| item.tags).collect();
    Ok(tags.into_iter().collect())
}

/// Returns the known names containing `query` as a case-insensitive
/// substring, in the same ascending order as [`distinct_known_names`].
///
/// An empty query yields an empty result, not the full name list.
pub async fn autocomplete(db: &DatabaseConnection, query: &str) -> Result<Vec<String>> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let needle = query.to_lowercase();
    let names = distinct_known_names(db).await?;
    Ok(names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .collect())
}

/// Computes the aggregate counts over both collections.
pub async fn summary(db: &DatabaseConnection) -> Result<TrackerSummary> {
    let items = store::load_items(db).await?;
    let history = store::load_history(db).await?;

    Ok(TrackerSummary {
        item_count: items.len(),
        total_quantity_needed: items.iter().map(|item| item.quantity_needed).sum(),
        history_count: history.len(),
        has_data: !items.is_empty() || !history.is_empty(),
    })
}
