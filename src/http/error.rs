//! Mapping of service failures to HTTP responses.

use super::{dto::MessageBody, messages};
use crate::task::{
    domain::TaskValidationError,
    services::{TaskOperation, TaskServiceError},
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Error response with a status and a catalogue message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    /// Creates an error response.
    #[must_use]
    pub const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    /// 400 for a body that is not a JSON object.
    #[must_use]
    pub const fn bad_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST, messages::BAD_REQUEST)
    }

    /// 404 with `message`.
    #[must_use]
    pub const fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 500 with the generic message.
    #[must_use]
    pub const fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, messages::INTERNAL_ERROR)
    }

    /// Returns the response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = MessageBody::new(self.status.as_u16(), self.message);
        (self.status, Json(body)).into_response()
    }
}

impl From<TaskValidationError> for ApiError {
    fn from(err: TaskValidationError) -> Self {
        let message = match err {
            TaskValidationError::EmptyContent => messages::EMPTY_CONTENT,
            TaskValidationError::InvalidKind(_) => messages::INVALID_TYPE,
            TaskValidationError::InvalidSortOrder => messages::INVALID_SORT_ORDER,
            TaskValidationError::InvalidDone => messages::INVALID_DONE,
        };
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::Validation(validation) => validation.into(),
            TaskServiceError::NotFound { operation, .. } => Self::not_found(match operation {
                TaskOperation::Get => messages::GET_NOT_FOUND,
                TaskOperation::Update => messages::UPDATE_NOT_FOUND,
                TaskOperation::Remove => messages::REMOVE_NOT_FOUND,
            }),
            TaskServiceError::Internal { stage, source } => {
                tracing::error!(
                    stage = %stage,
                    operation = %source.operation(),
                    code = source.code().unwrap_or("none"),
                    error = %source,
                    "task write failed"
                );
                Self::internal()
            }
            TaskServiceError::Storage(source) => {
                tracing::error!(
                    operation = %source.operation(),
                    code = source.code().unwrap_or("none"),
                    error = %source,
                    "task storage failed"
                );
                Self::internal()
            }
        }
    }
}
