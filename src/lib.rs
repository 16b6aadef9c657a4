//! Tasklist: an ordered to-do list served over HTTP.
//!
//! Each task has a client-chosen position (`sort_order`). Writing a task to
//! an occupied position shifts the tasks at and above it up by one inside a
//! single store transaction, so the list never shows a partial reordering.
//!
//! # Architecture
//!
//! Tasklist follows hexagonal architecture principles:
//!
//! - **Domain**: Pure task model with no infrastructure dependencies
//! - **Ports**: The transactional store contract
//! - **Adapters**: `PostgreSQL` and in-memory stores
//! - **Services**: Validation and the transactional write lifecycle
//!
//! # Modules
//!
//! - [`task`]: Task model, store contract, adapters and lifecycle service
//! - [`http`]: JSON-over-HTTP surface
//! - [`config`]: Environment-driven configuration
//! - [`telemetry`]: Tracing subscriber set-up

pub mod config;
pub mod http;
pub mod task;
pub mod telemetry;
