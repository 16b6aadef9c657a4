//! Router assembly.

use super::handlers::{
    create_task, get_task, health, list_tasks, patch_task, remove_task, replace_task,
};
use crate::task::{ports::TaskStore, services::TaskLifecycleService};
use axum::{Router, routing::get};
use mockable::Clock;
use tower_http::trace::TraceLayer;

/// Builds the task API router around `service`.
///
/// ```ignore
/// let service = TaskLifecycleService::new(Arc::new(store), Arc::new(DefaultClock));
/// let router = create_router(service);
/// ```
pub fn create_router<S, C>(service: TaskLifecycleService<S, C>) -> Router
where
    S: TaskStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/task", get(list_tasks::<S, C>).post(create_task::<S, C>))
        .route(
            "/task/{id}",
            get(get_task::<S, C>)
                .put(replace_task::<S, C>)
                .patch(patch_task::<S, C>)
                .delete(remove_task::<S, C>),
        )
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
