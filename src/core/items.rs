//! Need-list business logic - Handles all mutation operations on the
//! collection of items still being sought.
//!
//! Every operation loads the current working copy, applies a pure
//! transformation, flushes the result back to durable storage, and returns the
//! new collection state. The `quantity_needed >= MIN_QUANTITY` invariant is
//! enforced on every mutation; quantity decreases clamp at the floor and never
//! delete, which is intentionally different from the mark-found protocol in
//! [`crate::core::history`].

use crate::{
    errors::{Error, Result},
    ident::generate_id,
    models::{Item, MIN_QUANTITY, parse_tags},
    store,
};
use sea_orm::DatabaseConnection;
use tracing::debug;

/// Retrieves the current need-list, most recently added first.
pub async fn list_items(db: &DatabaseConnection) -> Result<Vec<Item>> {
    store::load_items(db).await
}

/// Finds a specific item by its id, returning `None` if absent.
pub async fn get_item(db: &DatabaseConnection, id: &str) -> Result<Option<Item>> {
    Ok(store::load_items(db).await?.into_iter().find(|item| item.id == id))
}

/// Creates a new need-list item and prepends it (most-recent-first ordering).
///
/// The name must trim to something non-empty; the quantity is coerced up to
/// [`MIN_QUANTITY`]; tags are parsed from free text with [`parse_tags`].
///
/// # Errors
/// Returns [`Error::Validation`] if the name trims to empty.
pub async fn add_item(
    db: &DatabaseConnection,
    name: &str,
    quantity: i64,
    raw_tags: &str,
    high_priority: bool,
) -> Result<Item> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation {
            message: "item name cannot be empty".to_string(),
        });
    }

    let item = Item {
        id: generate_id(),
        name: trimmed.to_string(),
        quantity_needed: quantity.max(MIN_QUANTITY),
        is_high_priority: high_priority,
        tags: parse_tags(raw_tags),
    };

    let mut items = store::load_items(db).await?;
    items.insert(0, item.clone());
    store::save_items(db, &items).await?;

    debug!("added item '{}' (id {})", item.name, item.id);
    Ok(item)
}

/// Deletes the matching item. A no-op (not an error) if the id is absent.
pub async fn remove_item(db: &DatabaseConnection, id: &str) -> Result<Vec<Item>> {
    let mut items = store::load_items(db).await?;
    let before = items.len();
    items.retain(|item| item.id != id);
    if items.len() != before {
        store::save_items(db, &items).await?;
    }
    Ok(items)
}

/// Increases an item's needed quantity. Silent no-op if the id is absent.
pub async fn increase_quantity(db: &DatabaseConnection, id: &str, by: i64) -> Result<Vec<Item>> {
    mutate_item(db, id, |item| {
        item.quantity_needed = item.quantity_needed.saturating_add(by);
    })
    .await
}

/// Decreases an item's needed quantity, clamping at [`MIN_QUANTITY`].
///
/// A decrease never deletes the item and never goes below the floor; only the
/// mark-found protocol can remove an item by driving its quantity to zero.
/// Silent no-op if the id is absent.
pub async fn decrease_quantity(db: &DatabaseConnection, id: &str, by: i64) -> Result<Vec<Item>> {
    mutate_item(db, id, |item| {
        item.quantity_needed = item.quantity_needed.saturating_sub(by);
    })
    .await
}

/// Flips an item's high-priority flag. Silent no-op if the id is absent.
pub async fn toggle_priority(db: &DatabaseConnection, id: &str) -> Result<Vec<Item>> {
    mutate_item(db, id, |item| {
        item.is_high_priority = !item.is_high_priority;
    })
    .await
}

/// Replaces an item's tag set with the parsed result of `raw_tags` (same
/// parse rule as [`add_item`]). Silent no-op if the id is absent.
pub async fn set_tags(db: &DatabaseConnection, id: &str, raw_tags: &str) -> Result<Vec<Item>> {
    let tags = parse_tags(raw_tags);
    mutate_item(db, id, move |item| {
        item.tags = tags;
    })
    .await
}

/// Applies an in-place transformation to the matching item, re-clamps the
/// quantity invariant, and flushes. Unknown ids leave the collection untouched
/// and skip the flush.
async fn mutate_item<F>(db: &DatabaseConnection, id: &str, apply: F) -> Result<Vec<Item>>
where
    F: FnOnce(&mut Item),
{
    let mut items = store::load_items(db).await?;
    if let Some(item) = items.iter_mut().find(|item| item.id == id) {
        apply(item);
        item.quantity_needed = item.quantity_needed.max(MIN_QUANTITY);
        store::save_items(db, &items).await?;
    }
    Ok(items)
}
