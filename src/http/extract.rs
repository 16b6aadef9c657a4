//! Request extractors with catalogue rejections.

use super::{ApiError, messages};
use crate::task::{domain::TaskId, services::TaskPayload};
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde_json::Value;

/// `{id}` path segment holding only ASCII digits.
///
/// Anything else, including values past `i64::MAX`, is rejected as 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskIdParam(pub TaskId);

impl<S> FromRequestParts<S> for TaskIdParam
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::not_found(messages::GET_NOT_FOUND))?;
        parse_task_id(&raw)
            .map(Self)
            .ok_or(ApiError::not_found(messages::GET_NOT_FOUND))
    }
}

fn parse_task_id(raw: &str) -> Option<TaskId> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i64>().ok().map(TaskId::new)
}

/// JSON object body decoded into a [`TaskPayload`].
///
/// Bodies that are not valid JSON, or are JSON but not an object, are
/// rejected as 400 before any validation runs.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskBody(pub TaskPayload);

impl<S> FromRequest<S> for TaskBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| ApiError::bad_request())?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|err| {
            tracing::debug!(error = %err, "rejecting malformed JSON body");
            ApiError::bad_request()
        })?;
        if !value.is_object() {
            return Err(ApiError::bad_request());
        }
        serde_json::from_value(value)
            .map(Self)
            .map_err(|_| ApiError::bad_request())
    }
}
