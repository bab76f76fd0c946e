//! Core business logic - framework-agnostic need-list, history, import/export,
//! and view-projection operations.
//!
//! Every operation reads the current collection(s) through the store, applies
//! a pure transformation, persists the result, and returns the new state for
//! the caller to re-render from.

/// History log operations and the mark-found/restore protocol
pub mod history;
/// Need-list mutation operations
pub mod items;
/// Import/export of the combined bundle with merge-or-replace reconciliation
pub mod transfer;
/// Derived read-only projections over both collections
pub mod views;
