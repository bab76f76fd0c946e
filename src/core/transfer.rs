//! Import/export business logic - serializes both collections as one bundle
//! and implements merge-or-replace reconciliation.
//!
//! Import payloads are untrusted: they are classified into a tagged parse
//! result first and then validated field-by-field, never deserialized blindly
//! into the typed records. The validate-then-apply sequence is one database
//! transaction, so either the whole validated change set lands or none of it
//! does.

use crate::{
    errors::{Error, Result},
    ident::generate_id,
    models::{Bundle, FoundItem, Item, MIN_QUANTITY},
    store,
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::Value;
use tracing::info;

/// Reconciliation policy for an import, supplied by the caller (the
/// presentation layer obtains the decision from the user).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Discard the current collections and adopt the imported lists verbatim
    Replace,
    /// Combine imported records with existing ones by name-matching and
    /// concatenation
    Merge,
}

/// Counts of accepted records, returned for caller-level reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// The policy that was applied
    pub mode: ImportMode,
    /// Items that survived validation
    pub items_accepted: usize,
    /// History entries that survived validation
    pub history_accepted: usize,
}

/// The two supported payload shapes, classified before any field is trusted.
enum ImportPayload {
    /// A bare array of item-shaped objects (legacy exports, items only)
    Legacy(Vec<Value>),
    /// The bundle shape with both collections
    Bundle {
        items: Vec<Value>,
        history: Vec<Value>,
    },
}

/// Produces a bundle snapshot of both collections, stamped with the current
/// time.
pub async fn export_bundle(db: &DatabaseConnection) -> Result<Bundle> {
    Ok(Bundle {
        items: store::load_items(db).await?,
        history: store::load_history(db).await?,
        exported_at: Utc::now(),
    })
}

/// Imports a serialized payload under the given reconciliation policy.
///
/// Accepts the bundle shape or a bare legacy item array. An item is kept only
/// if it has a non-empty-string `name` and a numeric `quantity_needed`; a
/// history entry is kept only if it has a string `item_name` and a numeric
/// `quantity`. Records that pass validation are normalized into the canonical
/// shape (quantity floor, backfilled priority/tags/id/timestamp) before they
/// are applied.
///
/// # Errors
/// [`Error::Format`] if the payload matches neither supported shape;
/// [`Error::EmptyImport`] if validation leaves both lists empty. Both leave
/// persisted state untouched.
pub async fn import_bundle(
    db: &DatabaseConnection,
    raw: &[u8],
    mode: ImportMode,
) -> Result<ImportReport> {
    let (raw_items, raw_history) = match classify(raw)? {
        ImportPayload::Legacy(items) => (items, Vec::new()),
        ImportPayload::Bundle { items, history } => (items, history),
    };

    let imported_items: Vec<Item> = raw_items.iter().filter_map(validate_item).collect();
    let imported_history: Vec<FoundItem> =
        raw_history.iter().filter_map(validate_entry).collect();

    if imported_items.is_empty() && imported_history.is_empty() {
        return Err(Error::EmptyImport);
    }

    let report = ImportReport {
        mode,
        items_accepted: imported_items.len(),
        history_accepted: imported_history.len(),
    };

    let txn = db.begin().await?;
    match mode {
        ImportMode::Replace => {
            store::save_items(&txn, &imported_items).await?;
            store::save_history(&txn, &imported_history).await?;
        }
        ImportMode::Merge => {
            let mut items = store::load_items(&txn).await?;
            for imported in imported_items {
                // First existing item with the exact same name wins; its tags
                // and priority are left untouched.
                if let Some(existing) = items.iter_mut().find(|item| item.name == imported.name) {
                    existing.quantity_needed =
                        existing.quantity_needed.saturating_add(imported.quantity_needed);
                } else {
                    items.push(imported);
                }
            }

            let mut history = store::load_history(&txn).await?;
            history.extend(imported_history);

            store::save_items(&txn, &items).await?;
            store::save_history(&txn, &history).await?;
        }
    }
    txn.commit().await?;

    info!(
        "import applied: {} items, {} history entries ({:?})",
        report.items_accepted, report.history_accepted, report.mode
    );
    Ok(report)
}

/// Classifies a raw payload into one of the supported shapes without trusting
/// any field.
fn classify(raw: &[u8]) -> Result<ImportPayload> {
    let value: Value = serde_json::from_slice(raw).map_err(|e| Error::Format {
        message: format!("payload is not valid JSON: {e}"),
    })?;

    match value {
        Value::Array(items) => Ok(ImportPayload::Legacy(items)),
        Value::Object(mut map) => {
            let Some(Value::Array(items)) = map.remove("items") else {
                return Err(Error::Format {
                    message: "payload has no `items` array".to_string(),
                });
            };
            let history = match map.remove("history") {
                Some(Value::Array(history)) => history,
                _ => Vec::new(),
            };
            Ok(ImportPayload::Bundle { items, history })
        }
        _ => Err(Error::Format {
            message: "payload is neither an item array nor an export bundle".to_string(),
        }),
    }
}

/// Validates one imported item-shaped object. `None` drops the record.
fn validate_item(value: &Value) -> Option<Item> {
    let object = value.as_object()?;

    let name = object.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    let quantity = object.get("quantity_needed")?.as_f64()?;

    let item = Item {
        id: imported_id(object),
        name: name.to_string(),
        quantity_needed: quantity.floor() as i64,
        is_high_priority: object
            .get("isHighPriority")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        tags: object
            .get("tags")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    };
    Some(item.normalized())
}

/// Validates one imported history-shaped object. `None` drops the record.
fn validate_entry(value: &Value) -> Option<FoundItem> {
    let object = value.as_object()?;

    let item_name = object.get("item_name")?.as_str()?;
    let quantity = object.get("quantity")?.as_f64()?;

    let found_at = object
        .get("found_at")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map_or_else(Utc::now, |parsed| parsed.with_timezone(&Utc));

    Some(FoundItem {
        id: imported_id(object),
        item_name: item_name.to_string(),
        quantity: (quantity.floor() as i64).max(MIN_QUANTITY),
        found_at,
    })
}

/// Keeps an imported record's string id, or mints a fresh one when the field
/// is missing or malformed.
fn imported_id(object: &serde_json::Map<String, Value>) -> String {
    object
        .get("id")
        .and_then(Value::as_str)
        .map_or_else(generate_id, str::to_string)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{history::list_history, items::list_items};
    use crate::test_utils::{add_custom_item, setup_test_db};

    #[tokio::test]
    async fn test_export_snapshot_shape() -> Result<()> {
        let db = setup_test_db().await?;
        let item = add_custom_item(&db, "Bolts", 2, "barter", true).await?;
        crate::core::history::mark_found(&db, &item.id).await?;

        let bundle = export_bundle(&db).await?;
        assert_eq!(bundle.items.len(), 1);
        assert_eq!(bundle.history.len(), 1);

        // Exact wire keys, per the export file format
        let value = serde_json::to_value(&bundle).unwrap();
        assert!(value.get("items").unwrap().is_array());
        assert!(value.get("history").unwrap().is_array());
        assert!(value.get("exported_at").unwrap().is_string());

        let item_value = &value["items"][0];
        assert!(item_value.get("quantity_needed").is_some());
        assert!(item_value.get("isHighPriority").is_some());
        let entry_value = &value["history"][0];
        assert!(entry_value.get("item_name").is_some());
        assert!(entry_value.get("found_at").is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_import_legacy_array() -> Result<()> {
        let db = setup_test_db().await?;

        let raw = br#"[{"name":"Bolts","quantity_needed":3},{"name":"Screws","quantity_needed":1}]"#;
        let report = import_bundle(&db, raw, ImportMode::Replace).await?;

        assert_eq!(report.items_accepted, 2);
        assert_eq!(report.history_accepted, 0);

        let items = list_items(&db).await?;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Bolts");
        // Legacy records gain canonical defaults on the way in
        assert!(!items[0].is_high_priority);
        assert!(items[0].tags.is_empty());
        assert!(!items[0].id.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_import_round_trips_an_export() -> Result<()> {
        let db = setup_test_db().await?;
        let item = add_custom_item(&db, "Bolts", 2, "barter", true).await?;
        crate::core::history::mark_found(&db, &item.id).await?;

        let exported = serde_json::to_vec(&export_bundle(&db).await?).unwrap();

        let other = setup_test_db().await?;
        let report = import_bundle(&other, &exported, ImportMode::Replace).await?;
        assert_eq!(report.items_accepted, 1);
        assert_eq!(report.history_accepted, 1);

        assert_eq!(list_items(&other).await?, list_items(&db).await?);
        assert_eq!(list_history(&other).await?, list_history(&db).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_merge_adds_quantity_onto_matching_name() -> Result<()> {
        let db = setup_test_db().await?;
        add_custom_item(&db, "Bolts", 2, "barter", true).await?;

        let raw = br#"[{"name":"Bolts","quantity_needed":3}]"#;
        import_bundle(&db, raw, ImportMode::Merge).await?;

        let items = list_items(&db).await?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity_needed, 5);
        // The existing item's tags and priority are left untouched
        assert_eq!(items[0].tags, vec!["barter"]);
        assert!(items[0].is_high_priority);

        Ok(())
    }

    #[tokio::test]
    async fn test_replace_discards_prior_entries() -> Result<()> {
        let db = setup_test_db().await?;
        add_custom_item(&db, "Bolts", 2, "", false).await?;
        add_custom_item(&db, "Screws", 1, "", false).await?;

        let raw = br#"[{"name":"Bolts","quantity_needed":3}]"#;
        import_bundle(&db, raw, ImportMode::Replace).await?;

        let items = list_items(&db).await?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Bolts");
        assert_eq!(items[0].quantity_needed, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_merge_appends_unmatched_items_and_concats_history() -> Result<()> {
        let db = setup_test_db().await?;
        let item = add_custom_item(&db, "Bolts", 1, "", false).await?;
        crate::core::history::mark_found(&db, &item.id).await?;

        let raw = br#"{
            "items": [{"name":"Screws","quantity_needed":2}],
            "history": [{"item_name":"Wires","quantity":1,"found_at":"2026-01-05T10:00:00Z"}]
        }"#;
        let report = import_bundle(&db, raw, ImportMode::Merge).await?;
        assert_eq!(report.items_accepted, 1);
        assert_eq!(report.history_accepted, 1);

        // Unmatched imported item is appended after existing entries
        let items = list_items(&db).await?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Screws");

        // Imported history lands after existing entries, no dedup
        let history = list_history(&db).await?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].item_name, "Bolts");
        assert_eq!(history[1].item_name, "Wires");

        Ok(())
    }

    #[tokio::test]
    async fn test_import_filters_invalid_records() -> Result<()> {
        let db = setup_test_db().await?;

        let raw = br#"{
            "items": [
                {"name":"Bolts","quantity_needed":3},
                {"name":"","quantity_needed":2},
                {"name":"NoQuantity"},
                {"name":"BadQuantity","quantity_needed":"four"},
                "not-an-object"
            ],
            "history": [
                {"item_name":"Wires","quantity":2},
                {"item_name":"NoQuantity"},
                {"quantity":1}
            ]
        }"#;
        let report = import_bundle(&db, raw, ImportMode::Replace).await?;

        assert_eq!(report.items_accepted, 1);
        assert_eq!(report.history_accepted, 1);

        let history = list_history(&db).await?;
        assert_eq!(history[0].item_name, "Wires");
        assert_eq!(history[0].quantity, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_import_clamps_and_floors_quantities() -> Result<()> {
        let db = setup_test_db().await?;

        let raw = br#"[
            {"name":"Bolts","quantity_needed":2.9},
            {"name":"Screws","quantity_needed":0},
            {"name":"Wires","quantity_needed":-3}
        ]"#;
        import_bundle(&db, raw, ImportMode::Replace).await?;

        let items = list_items(&db).await?;
        assert_eq!(items[0].quantity_needed, 2);
        assert_eq!(items[1].quantity_needed, MIN_QUANTITY);
        assert_eq!(items[2].quantity_needed, MIN_QUANTITY);

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_import_fails_and_leaves_state_unchanged() -> Result<()> {
        let db = setup_test_db().await?;
        add_custom_item(&db, "Bolts", 2, "", false).await?;

        let before_items = list_items(&db).await?;
        let before_history = list_history(&db).await?;

        let result = import_bundle(&db, b"[]", ImportMode::Replace).await;
        assert!(matches!(result.unwrap_err(), Error::EmptyImport));

        // Everything-filtered-out payloads get the same treatment
        let result = import_bundle(
            &db,
            br#"[{"name":"","quantity_needed":1}]"#,
            ImportMode::Merge,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::EmptyImport));

        assert_eq!(list_items(&db).await?, before_items);
        assert_eq!(list_history(&db).await?, before_history);

        Ok(())
    }

    #[tokio::test]
    async fn test_unrecognized_payloads_fail_with_format_error() -> Result<()> {
        let db = setup_test_db().await?;
        add_custom_item(&db, "Bolts", 2, "", false).await?;
        let before = list_items(&db).await?;

        let payloads: [&[u8]; 5] = [
            b"not json at all",
            br#""just a string""#,
            b"42",
            br#"{"history":[]}"#,
            br#"{"items":"not-an-array"}"#,
        ];
        for raw in payloads {
            let result = import_bundle(&db, raw, ImportMode::Replace).await;
            assert!(matches!(result.unwrap_err(), Error::Format { message: _ }));
        }

        assert_eq!(list_items(&db).await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn test_import_backfills_missing_found_at_and_id() -> Result<()> {
        let db = setup_test_db().await?;

        let raw = br#"{"items":[],"history":[{"item_name":"Wires","quantity":1,"found_at":"garbage"}]}"#;
        import_bundle(&db, raw, ImportMode::Replace).await?;

        let history = list_history(&db).await?;
        assert_eq!(history.len(), 1);
        assert!(!history[0].id.is_empty());
        // Unparseable timestamp backfilled with "now", i.e. not in the past era
        assert!(history[0].found_at.timestamp() > 0);

        Ok(())
    }
}
