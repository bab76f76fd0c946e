//! Domain records and their wire schema.
//!
//! The structs in this module are both the in-memory working copies and the
//! persisted/exported JSON shapes; serde attributes pin the wire field names
//! (`quantity_needed`, `isHighPriority`, `item_name`, `found_at`) so stored
//! records, export bundles, and legacy imports all share one schema. Records
//! read from storage or from an import payload pass through [`Item::normalized`]
//! before they enter working memory, so default-backfilling happens in exactly
//! one place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Floor for `quantity_needed`: the need-list never holds an item below this.
/// Reaching zero is only possible through the mark-found protocol, which
/// deletes the item instead.
pub const MIN_QUANTITY: i64 = 1;

/// A need-list entry: an item still being sought.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Opaque unique identifier, assigned at creation, immutable
    pub id: String,
    /// Non-empty trimmed display name; duplicates by name are legal and
    /// distinct by id
    pub name: String,
    /// How many are still needed; always >= [`MIN_QUANTITY`]
    pub quantity_needed: i64,
    /// Priority flag; high-priority items sort ahead of the rest
    #[serde(rename = "isHighPriority", default)]
    pub is_high_priority: bool,
    /// Lowercase, trimmed, deduplicated tags in first-seen order
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Item {
    /// Normalizes a record read from storage or import into the canonical
    /// shape: clamps the quantity to [`MIN_QUANTITY`] and re-canonicalizes the
    /// tag set. Missing `isHighPriority`/`tags` fields are already backfilled
    /// by the serde defaults on deserialization.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.quantity_needed = self.quantity_needed.max(MIN_QUANTITY);
        self.tags = normalize_tags(self.tags);
        self
    }
}

/// A history entry: one found-event for a single item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundItem {
    /// Opaque unique identifier
    pub id: String,
    /// Name copied from the item at the moment it was marked found; there is
    /// no ownership link back to the item, which may since have been deleted
    pub item_name: String,
    /// Quantity found in this single event; always 1 under the current
    /// mutation operations, but the field is general
    pub quantity: i64,
    /// When the find happened; immutable, ISO-8601 on the wire
    pub found_at: DateTime<Utc>,
}

/// The combined import/export payload: both collections plus a timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    /// Need-list snapshot, most recently added first
    pub items: Vec<Item>,
    /// History snapshot, most recently found first
    pub history: Vec<FoundItem>,
    /// When the bundle was produced
    pub exported_at: DateTime<Utc>,
}

/// Parses a free-text tag string into the canonical tag set: split on commas,
/// trim, lowercase, drop empty tokens, deduplicate preserving first-seen order.
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(',').map(str::to_string).collect())
}

/// Canonicalizes an already-split tag list with the same rules as
/// [`parse_tags`].
fn normalize_tags(raw: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for token in raw {
        let tag = token.trim().to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}
