//! Port contracts for task persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod store;

pub use store::{StorageError, StoreOperation, StoreResult, TaskStore, TaskTransaction};
