//! History log business logic - the mark-found/restore protocol and history
//! maintenance.
//!
//! Marking an item found and restoring a history entry each touch both
//! collections, so those operations run their load-transform-flush cycle
//! inside a database transaction: either the whole change set lands or none
//! of it does.

use crate::{
    errors::{Error, Result},
    ident::generate_id,
    models::{FoundItem, Item, MIN_QUANTITY},
    store,
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::debug;

/// The outcome of a mark-found call: the new need-list state and the history
/// entry that was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkFoundResult {
    /// Need-list after the decrement (the item is gone if it reached zero)
    pub items: Vec<Item>,
    /// The single history entry appended by this call
    pub entry: FoundItem,
}

/// Retrieves the current history, most recently found first.
pub async fn list_history(db: &DatabaseConnection) -> Result<Vec<FoundItem>> {
    store::load_history(db).await
}

/// Records one found-event for the given item.
///
/// Prepends a history entry with `quantity` 1 and the item's current name,
/// then decrements the item's needed quantity; if that reaches zero the item
/// is deleted from the need-list. Exactly one history entry is created per
/// call regardless of the remaining quantity.
///
/// # Errors
/// Returns [`Error::ItemNotFound`] if the id does not resolve.
pub async fn mark_found(db: &DatabaseConnection, item_id: &str) -> Result<MarkFoundResult> {
    let txn = db.begin().await?;

    let mut items = store::load_items(&txn).await?;
    let position = items
        .iter()
        .position(|item| item.id == item_id)
        .ok_or_else(|| Error::ItemNotFound {
            id: item_id.to_string(),
        })?;

    let entry = FoundItem {
        id: generate_id(),
        item_name: items[position].name.clone(),
        quantity: 1,
        found_at: Utc::now(),
    };

    let mut history = store::load_history(&txn).await?;
    history.insert(0, entry.clone());
    store::save_history(&txn, &history).await?;

    items[position].quantity_needed -= 1;
    if items[position].quantity_needed <= 0 {
        let done = items.remove(position);
        debug!("item '{}' fully found, removed from need-list", done.name);
    }
    store::save_items(&txn, &items).await?;

    txn.commit().await?;
    Ok(MarkFoundResult { items, entry })
}

/// Moves a history entry back onto the need-list.
///
/// The entry is removed from the history; if a need-list item carries the
/// exact same name (case-sensitive, first match in scan order) it gains the
/// entry's quantity, otherwise a fresh item is prepended with that quantity,
/// no tags, and normal priority.
///
/// # Errors
/// Returns [`Error::EntryNotFound`] if the id does not resolve.
pub async fn restore_entry(db: &DatabaseConnection, found_id: &str) -> Result<Vec<Item>> {
    let txn = db.begin().await?;

    let mut history = store::load_history(&txn).await?;
    let position = history
        .iter()
        .position(|entry| entry.id == found_id)
        .ok_or_else(|| Error::EntryNotFound {
            id: found_id.to_string(),
        })?;
    let entry = history.remove(position);

    let mut items = store::load_items(&txn).await?;
    if let Some(existing) = items.iter_mut().find(|item| item.name == entry.item_name) {
        existing.quantity_needed = existing.quantity_needed.saturating_add(entry.quantity);
    } else {
        items.insert(
            0,
            Item {
                id: generate_id(),
                name: entry.item_name.clone(),
                quantity_needed: entry.quantity.max(MIN_QUANTITY),
                is_high_priority: false,
                tags: Vec::new(),
            },
        );
    }

    store::save_items(&txn, &items).await?;
    store::save_history(&txn, &history).await?;

    txn.commit().await?;
    debug!("restored '{}' to the need-list", entry.item_name);
    Ok(items)
}

/// Removes a history entry unconditionally. A no-op if the id is absent.
pub async fn delete_entry(db: &DatabaseConnection, id: &str) -> Result<Vec<FoundItem>> {
    let mut history = store::load_history(db).await?;
    let before = history.len();
    history.retain(|entry| entry.id != id);
    if history.len() != before {
        store::save_history(db, &history).await?;
    }
    Ok(history)
}
