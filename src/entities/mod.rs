//! Entity module - Contains the SeaORM entity definitions for the database.
//! The durable store is a single key-value table; each row holds one
//! collection record serialized as a JSON array.

pub mod record;

// Re-export specific types to avoid conflicts
pub use record::{Column as RecordColumn, Entity as TrackerRecord, Model as RecordModel};
