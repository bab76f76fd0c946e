//! Tracker record entity - the durable key-value store backing both collections.
//!
//! Two rows carry the whole persisted state: key `tarkov_items` holds the
//! need-list and key `tarkov_history` holds the found-item history, each as a
//! JSON-encoded array. Collections are loaded wholesale into an in-memory
//! working copy and flushed back whole on every mutation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tracker record database model - stores one collection per key
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tracker_state")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Record key (`"tarkov_items"` or `"tarkov_history"`)
    pub key: String,
    /// Record payload: a JSON-encoded array of the collection's entries
    pub value: String,
    /// When this record was last flushed
    pub updated_at: DateTime,
}

/// `TrackerRecord` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
