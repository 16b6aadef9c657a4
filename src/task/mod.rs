//! Ordered task list.
//!
//! Tasks carry a client-chosen `sort_order`. Writing a task to a position that
//! is already taken shifts every task at or above that position up by one, all
//! inside a single store transaction. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
