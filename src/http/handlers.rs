//! Route handlers for the task endpoints.

use super::{
    ApiError,
    dto::{HealthBody, MessageBody, TaskView},
    extract::{TaskBody, TaskIdParam},
    messages,
};
use crate::task::{
    ports::TaskStore,
    services::{TaskLifecycleService, TaskListing},
};
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use mockable::Clock;

/// Shared handler state.
pub type TaskState<S, C> = State<TaskLifecycleService<S, C>>;

/// `GET /task`
///
/// An empty list answers 200 with a message body rather than `[]`.
///
/// # Errors
///
/// Returns 500 when the store read fails.
pub async fn list_tasks<S, C>(State(service): TaskState<S, C>) -> Result<Response, ApiError>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    match service.list().await? {
        TaskListing::Empty => {
            let body = MessageBody::new(StatusCode::OK.as_u16(), messages::EMPTY_LIST);
            Ok(Json(body).into_response())
        }
        TaskListing::Tasks(tasks) => {
            let views: Vec<TaskView> = tasks.iter().map(TaskView::from).collect();
            Ok(Json(views).into_response())
        }
    }
}

/// `GET /task/{id}`
///
/// # Errors
///
/// Returns 404 for a missing task and 500 when the store read fails.
pub async fn get_task<S, C>(
    State(service): TaskState<S, C>,
    TaskIdParam(id): TaskIdParam,
) -> Result<Json<TaskView>, ApiError>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    let task = service.get(id).await?;
    Ok(Json(TaskView::from(&task)))
}

/// `POST /task`
///
/// # Errors
///
/// Returns 400 for a malformed body, 422 for invalid fields and 500 when
/// the transactional write fails.
pub async fn create_task<S, C>(
    State(service): TaskState<S, C>,
    TaskBody(payload): TaskBody,
) -> Result<Response, ApiError>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    let task = service.create(payload).await?;
    let location = format!("/task/{}", task.id());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TaskView::from(&task)),
    )
        .into_response())
}

/// `PUT /task/{id}`
///
/// # Errors
///
/// Returns 400 for a malformed body, 422 for invalid or missing fields, 404
/// for a missing task and 500 when the transactional write fails.
pub async fn replace_task<S, C>(
    State(service): TaskState<S, C>,
    TaskIdParam(id): TaskIdParam,
    TaskBody(payload): TaskBody,
) -> Result<Json<TaskView>, ApiError>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    let task = service.replace(id, payload).await?;
    Ok(Json(TaskView::from(&task)))
}

/// `PATCH /task/{id}`
///
/// # Errors
///
/// Returns 400 for a malformed body, 422 for an invalid supplied field, 404
/// for a missing task and 500 when the transactional write fails.
pub async fn patch_task<S, C>(
    State(service): TaskState<S, C>,
    TaskIdParam(id): TaskIdParam,
    TaskBody(payload): TaskBody,
) -> Result<StatusCode, ApiError>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    service.patch(id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /task/{id}`
///
/// # Errors
///
/// Returns 404 for a missing task and 500 when the delete fails.
pub async fn remove_task<S, C>(
    State(service): TaskState<S, C>,
    TaskIdParam(id): TaskIdParam,
) -> Result<StatusCode, ApiError>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    service.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /health`
pub async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok".to_owned(),
    })
}
