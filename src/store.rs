//! Wholesale load and flush of the persisted collections.
//!
//! The durable store holds two independent records, each a JSON-encoded array:
//! [`ITEMS_KEY`] for the need-list and [`HISTORY_KEY`] for the found-item
//! history. Every operation in the core loads the working copy through this
//! module, transforms it, and flushes it back before returning, so no
//! in-memory-only mutation is ever left unpersisted. Functions are generic
//! over [`ConnectionTrait`] so the same accessors run inside database
//! transactions for multi-record writes.

use crate::entities::{TrackerRecord, record};
use crate::errors::Result;
use crate::models::{FoundItem, Item};
use sea_orm::{ConnectionTrait, Set, prelude::*};
use tracing::{debug, instrument};

/// Store key for the need-list record.
pub const ITEMS_KEY: &str = "tarkov_items";
/// Store key for the found-item history record.
pub const HISTORY_KEY: &str = "tarkov_history";

/// Retrieves a raw record payload from the key-value store.
///
/// Returns `Ok(None)` if the key has never been written, which callers treat
/// as an empty collection.
#[instrument(skip(db))]
pub async fn get_value<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let found = TrackerRecord::find()
        .filter(record::Column::Key.eq(key))
        .one(db)
        .await?;
    debug!("record '{}' present: {}", key, found.is_some());
    Ok(found.map(|model| model.value))
}

/// Sets or updates a record payload in the key-value store (UPSERT behavior).
#[instrument(skip(db, value))]
pub async fn set_value<C>(db: &C, key: &str, value: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now().naive_utc();

    let existing = TrackerRecord::find()
        .filter(record::Column::Key.eq(key))
        .one(db)
        .await?;

    if let Some(model) = existing {
        // Update existing record
        let mut active: record::ActiveModel = model.into();
        active.value = Set(value.to_string());
        active.updated_at = Set(now);
        active.update(db).await?;
    } else {
        // Insert new record
        let active = record::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(now),
            ..Default::default()
        };
        active.insert(db).await?;
    }

    debug!("flushed record '{}'", key);
    Ok(())
}

/// Loads the need-list working copy, most recently added first.
///
/// Every record passes through [`Item::normalized`] so schema evolution
/// (missing priority/tag fields in old records) is absorbed here, before the
/// data enters working memory.
pub async fn load_items<C>(db: &C) -> Result<Vec<Item>>
where
    C: ConnectionTrait,
{
    match get_value(db, ITEMS_KEY).await? {
        Some(raw) => {
            let items: Vec<Item> = serde_json::from_str(&raw)?;
            Ok(items.into_iter().map(Item::normalized).collect())
        }
        None => Ok(Vec::new()),
    }
}

/// Flushes the need-list back to the durable store.
pub async fn save_items<C>(db: &C, items: &[Item]) -> Result<()>
where
    C: ConnectionTrait,
{
    set_value(db, ITEMS_KEY, &serde_json::to_string(items)?).await
}

/// Loads the history working copy, most recently found first.
pub async fn load_history<C>(db: &C) -> Result<Vec<FoundItem>>
where
    C: ConnectionTrait,
{
    match get_value(db, HISTORY_KEY).await? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}

/// Flushes the history back to the durable store.
pub async fn save_history<C>(db: &C, history: &[FoundItem]) -> Result<()>
where
    C: ConnectionTrait,
{
    set_value(db, HISTORY_KEY, &serde_json::to_string(history)?).await
}
