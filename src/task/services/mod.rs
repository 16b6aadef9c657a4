//! Application services for the ordered task list.

mod lifecycle;
mod payload;

pub use lifecycle::{
    TaskLifecycleService, TaskListing, TaskOperation, TaskServiceError, TaskServiceResult,
    WriteStage,
};
pub use payload::{Patch, TaskPayload};
