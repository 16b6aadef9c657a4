//! JSON-over-HTTP surface for the task list.
//!
//! | Method | Path | Success |
//! | ------ | ---- | ------- |
//! | GET | `/task` | 200 list, or 200 message when empty |
//! | GET | `/task/{id}` | 200 task |
//! | POST | `/task` | 201 task with `Location` |
//! | PUT | `/task/{id}` | 200 task |
//! | PATCH | `/task/{id}` | 204 |
//! | DELETE | `/task/{id}` | 204 |
//! | GET | `/health` | 200 |
//!
//! Failures answer `{code, message}` with 400, 404, 422 or 500.

pub mod dto;
mod error;
pub mod extract;
pub mod handlers;
pub mod messages;
mod routes;
mod server;

pub use error::ApiError;
pub use routes::create_router;
pub use server::Server;
