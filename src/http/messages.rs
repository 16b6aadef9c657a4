//! Client-facing response messages.

/// Listing returned no task.
pub const EMPTY_LIST: &str = "Wow. You have nothing else to do. Enjoy the rest of your day!";
/// Content missing, blank, or not a string.
pub const EMPTY_CONTENT: &str = "Bad move! Try removing the task instead of deleting its content.";
/// Task type missing or unsupported.
pub const INVALID_TYPE: &str =
    "The task type you provided is not supported. You can only use shopping or work.";
/// Sort order missing or not an integer.
pub const INVALID_SORT_ORDER: &str = "Invalid Sort Order";
/// Done flag missing or not a boolean.
pub const INVALID_DONE: &str = "Invalid Done";
/// Read of a missing task.
pub const GET_NOT_FOUND: &str = "Oops! Task not found!";
/// Update of a missing task.
pub const UPDATE_NOT_FOUND: &str =
    "Are you a hacker or something? The task you were trying to edit doesn't exist.";
/// Delete of a missing task.
pub const REMOVE_NOT_FOUND: &str = "Good news! The task you were trying to delete didn't even exist.";
/// Any storage or transaction failure.
pub const INTERNAL_ERROR: &str = "Oops! Something is wrong!";
/// Body is not a JSON object.
pub const BAD_REQUEST: &str = "Bad request!";
