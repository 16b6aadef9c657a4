//! Service orchestration tests for transactional task writes.

use std::sync::Arc;

use super::FixedClock;
use crate::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{Task, TaskId, TaskKind, TaskValidationError},
    ports::{StoreOperation, StoreResult, TaskStore, TaskTransaction},
    services::{
        TaskLifecycleService, TaskListing, TaskOperation, TaskPayload, TaskServiceError,
        TaskServiceResult, WriteStage,
    },
};
use async_trait::async_trait;
use rstest::{fixture, rstest};

type TestService = TaskLifecycleService<InMemoryTaskStore, FixedClock>;

fn service_over(store: InMemoryTaskStore) -> TestService {
    TaskLifecycleService::new(Arc::new(store), Arc::new(FixedClock::at_noon()))
}

#[fixture]
fn service() -> TestService {
    service_over(InMemoryTaskStore::new())
}

fn shopping(content: &str, sort_order: i64) -> TaskPayload {
    TaskPayload::new()
        .with_content(content)
        .with_kind("shopping")
        .with_sort_order(sort_order)
}

async fn positions(service: &TestService) -> Vec<(String, i64)> {
    service
        .list()
        .await
        .expect("list")
        .into_tasks()
        .into_iter()
        .map(|task| (task.content().as_str().to_owned(), task.sort_order().value()))
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_of_nothing_is_empty(service: TestService) {
    assert_eq!(service.list().await.expect("list"), TaskListing::Empty);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_round_trips_through_get(service: TestService) {
    let created = service
        .create(shopping("Buy milk", 1))
        .await
        .expect("create");
    let fetched = service.get(created.id()).await.expect("get");

    assert_eq!(fetched, created);
    assert_eq!(fetched.kind(), TaskKind::Shopping);
    assert_eq!(fetched.content().as_str(), "Buy milk");
    assert_eq!(fetched.sort_order().value(), 1);
    assert!(!fetched.is_done());
    assert!(!fetched.uuid().into_inner().is_nil());
    assert_eq!(fetched.created_at(), FixedClock::at_noon().0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_at_a_taken_position_shifts_the_chain(service: TestService) {
    service.create(shopping("old1", 1)).await.expect("create");
    service.create(shopping("old2", 2)).await.expect("create");
    service.create(shopping("gap", 5)).await.expect("create");

    let created = service.create(shopping("new", 1)).await.expect("create");

    assert_eq!(created.sort_order().value(), 1);
    assert_eq!(
        positions(&service).await,
        vec![
            ("new".to_owned(), 1),
            ("old1".to_owned(), 2),
            ("old2".to_owned(), 3),
            ("gap".to_owned(), 6),
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_at_a_free_position_moves_nothing(service: TestService) {
    service.create(shopping("old", 1)).await.expect("create");
    service.create(shopping("new", 3)).await.expect("create");

    assert_eq!(
        positions(&service).await,
        vec![("old".to_owned(), 1), ("new".to_owned(), 3)]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_create_writes_nothing(service: TestService) {
    service.create(shopping("old", 1)).await.expect("create");

    let result = service
        .create(TaskPayload::new().with_content("new").with_kind("home").with_sort_order(1))
        .await;

    assert!(matches!(
        result,
        Err(TaskServiceError::Validation(TaskValidationError::InvalidKind(ref kind))) if kind == "home"
    ));
    assert_eq!(positions(&service).await, vec![("old".to_owned(), 1)]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_insert_rolls_back_the_shift() {
    let store = InMemoryTaskStore::new();
    let healthy = service_over(store.clone());
    let failing = service_over(store.failing_on(StoreOperation::Create));
    healthy.create(shopping("old", 1)).await.expect("create");

    let result = failing.create(shopping("new", 1)).await;

    assert!(matches!(
        result,
        Err(TaskServiceError::Internal {
            stage: WriteStage::Write,
            ..
        })
    ));
    assert_eq!(positions(&healthy).await, vec![("old".to_owned(), 1)]);
}

#[rstest]
#[case::shift(StoreOperation::ShiftSortOrders, WriteStage::Shift)]
#[case::commit(StoreOperation::Commit, WriteStage::Commit)]
#[case::begin(StoreOperation::Begin, WriteStage::Begin)]
#[case::conflict_check(StoreOperation::HasSortOrder, WriteStage::ConflictCheck)]
#[tokio::test(flavor = "multi_thread")]
async fn failed_steps_report_their_stage_and_leave_the_list_untouched(
    #[case] operation: StoreOperation,
    #[case] stage: WriteStage,
) {
    let store = InMemoryTaskStore::new();
    let healthy = service_over(store.clone());
    let failing = service_over(store.failing_on(operation));
    healthy.create(shopping("old", 1)).await.expect("create");

    let result = failing.create(shopping("new", 1)).await;

    assert!(matches!(
        result,
        Err(TaskServiceError::Internal { stage: reported, .. }) if reported == stage
    ));
    assert_eq!(positions(&healthy).await, vec![("old".to_owned(), 1)]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_of_a_missing_task_is_not_found_and_shifts_nothing(service: TestService) {
    service.create(shopping("old", 1)).await.expect("create");
    let missing = TaskId::new(404);

    let patched = service
        .patch(missing, TaskPayload::new().with_sort_order(1))
        .await;
    let replaced = service
        .replace(missing, shopping("new", 1).with_done(false))
        .await;

    for result in [patched, replaced.map(|_| ())] {
        assert!(matches!(
            result,
            Err(TaskServiceError::NotFound {
                operation: TaskOperation::Update,
                id,
            }) if id == missing
        ));
    }
    assert_eq!(positions(&service).await, vec![("old".to_owned(), 1)]);
}

/// Store whose lookups delete the row they find, as if a concurrent
/// request removed it right after the existence check.
#[derive(Debug, Clone)]
struct VanishingStore {
    inner: InMemoryTaskStore,
}

#[async_trait]
impl TaskStore for VanishingStore {
    async fn list_all(&self) -> StoreResult<Vec<Task>> {
        self.inner.list_all().await
    }

    async fn get_by_id(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let found = self.inner.get_by_id(id).await?;
        self.inner.remove(id).await?;
        Ok(found)
    }

    async fn remove(&self, id: TaskId) -> StoreResult<bool> {
        self.inner.remove(id).await
    }

    async fn begin_transaction(&self) -> StoreResult<Box<dyn TaskTransaction>> {
        self.inner.begin_transaction().await
    }
}

#[derive(Debug, Clone, Copy)]
enum UpdateForm {
    Full,
    Partial,
}

impl UpdateForm {
    /// Moves `id` to the top of the list with this form of update.
    async fn move_to_top<S: TaskStore>(
        self,
        service: &TaskLifecycleService<S, FixedClock>,
        id: TaskId,
    ) -> TaskServiceResult<()> {
        match self {
            Self::Full => service
                .replace(id, shopping("second", 1).with_done(false))
                .await
                .map(|_| ()),
            Self::Partial => service.patch(id, TaskPayload::new().with_sort_order(1)).await,
        }
    }
}

#[rstest]
#[case::full(UpdateForm::Full)]
#[case::partial(UpdateForm::Partial)]
#[tokio::test(flavor = "multi_thread")]
async fn failed_update_rolls_back_the_shift(#[case] form: UpdateForm) {
    let store = InMemoryTaskStore::new();
    let healthy = service_over(store.clone());
    let failing = service_over(store.failing_on(StoreOperation::Update));
    healthy.create(shopping("first", 1)).await.expect("create");
    let second = healthy.create(shopping("second", 2)).await.expect("create");

    let result = form.move_to_top(&failing, second.id()).await;

    assert!(matches!(
        result,
        Err(TaskServiceError::Internal {
            stage: WriteStage::Write,
            ..
        })
    ));
    assert_eq!(
        positions(&healthy).await,
        vec![("first".to_owned(), 1), ("second".to_owned(), 2)]
    );
}

#[rstest]
#[case::full(UpdateForm::Full)]
#[case::partial(UpdateForm::Partial)]
#[tokio::test(flavor = "multi_thread")]
async fn update_of_a_task_deleted_mid_write_rolls_back_the_shift(#[case] form: UpdateForm) {
    let store = InMemoryTaskStore::new();
    let healthy = service_over(store.clone());
    healthy.create(shopping("first", 1)).await.expect("create");
    let second = healthy.create(shopping("second", 2)).await.expect("create");
    let racing = TaskLifecycleService::new(
        Arc::new(VanishingStore { inner: store }),
        Arc::new(FixedClock::at_noon()),
    );

    let result = form.move_to_top(&racing, second.id()).await;

    assert!(matches!(
        result,
        Err(TaskServiceError::NotFound {
            operation: TaskOperation::Update,
            id,
        }) if id == second.id()
    ));
    assert_eq!(positions(&healthy).await, vec![("first".to_owned(), 1)]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn replace_moves_a_task_onto_an_occupied_position(service: TestService) {
    service.create(shopping("first", 1)).await.expect("create");
    let second = service.create(shopping("second", 2)).await.expect("create");

    let replaced = service
        .replace(
            second.id(),
            TaskPayload::new()
                .with_sort_order(1)
                .with_done(true)
                .with_content("second, now first")
                .with_kind("work"),
        )
        .await
        .expect("replace");

    assert!(replaced.is_done());
    assert_eq!(replaced.kind(), TaskKind::Work);
    assert_eq!(replaced.uuid(), second.uuid());
    assert_eq!(replaced.created_at(), second.created_at());
    assert_eq!(
        positions(&service).await,
        vec![("second, now first".to_owned(), 1), ("first".to_owned(), 2)]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn keeping_the_same_position_shifts_nothing(service: TestService) {
    let task = service.create(shopping("mine", 1)).await.expect("create");
    service.create(shopping("next", 2)).await.expect("create");

    service
        .patch(task.id(), TaskPayload::new().with_sort_order(1))
        .await
        .expect("patch");

    assert_eq!(
        positions(&service).await,
        vec![("mine".to_owned(), 1), ("next".to_owned(), 2)]
    );
}

#[rstest]
#[case::missing_sort_order(
    TaskPayload::new().with_content("x").with_kind("work").with_done(true),
    TaskValidationError::InvalidSortOrder
)]
#[case::missing_done(
    TaskPayload::new().with_content("x").with_kind("work").with_sort_order(1),
    TaskValidationError::InvalidDone
)]
#[tokio::test(flavor = "multi_thread")]
async fn replace_requires_sort_order_and_done(
    #[case] payload: TaskPayload,
    #[case] expected: TaskValidationError,
) {
    let service = service_over(InMemoryTaskStore::new());
    let task = service.create(shopping("x", 1)).await.expect("create");

    let result = service.replace(task.id(), payload).await;

    assert!(matches!(
        result,
        Err(TaskServiceError::Validation(ref err)) if *err == expected
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn patch_of_content_leaves_other_fields(service: TestService) {
    let task = service.create(shopping("before", 3)).await.expect("create");

    service
        .patch(task.id(), TaskPayload::new().with_content("after"))
        .await
        .expect("patch");
    let patched = service.get(task.id()).await.expect("get");

    assert_eq!(patched.content().as_str(), "after");
    assert_eq!(patched.kind(), task.kind());
    assert_eq!(patched.sort_order(), task.sort_order());
    assert_eq!(patched.is_done(), task.is_done());
    assert_eq!(patched.uuid(), task.uuid());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_patch_writes_nothing_but_still_checks_existence() {
    let store = InMemoryTaskStore::new();
    let healthy = service_over(store.clone());
    let no_transactions = service_over(store.failing_on(StoreOperation::Begin));
    let task = healthy.create(shopping("x", 1)).await.expect("create");

    no_transactions
        .patch(task.id(), TaskPayload::new())
        .await
        .expect("empty patch");
    let missing = no_transactions
        .patch(TaskId::new(999), TaskPayload::new())
        .await;

    assert!(matches!(missing, Err(TaskServiceError::NotFound { .. })));
    assert_eq!(healthy.get(task.id()).await.expect("get"), task);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn remove_twice_is_not_found_the_second_time(service: TestService) {
    let task = service.create(shopping("x", 1)).await.expect("create");

    service.remove(task.id()).await.expect("remove");
    let again = service.remove(task.id()).await;

    assert!(matches!(
        again,
        Err(TaskServiceError::NotFound {
            operation: TaskOperation::Remove,
            ..
        })
    ));
    assert!(matches!(
        service.get(task.id()).await,
        Err(TaskServiceError::NotFound {
            operation: TaskOperation::Get,
            ..
        })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn remove_leaves_gaps_in_sort_order(service: TestService) {
    service.create(shopping("a", 1)).await.expect("create");
    let middle = service.create(shopping("b", 2)).await.expect("create");
    service.create(shopping("c", 3)).await.expect("create");

    service.remove(middle.id()).await.expect("remove");

    assert_eq!(
        positions(&service).await,
        vec![("a".to_owned(), 1), ("c".to_owned(), 3)]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn read_failures_surface_as_storage_errors() {
    let service = service_over(InMemoryTaskStore::new().failing_on(StoreOperation::ListAll));

    let result = service.list().await;

    assert!(matches!(
        result,
        Err(TaskServiceError::Storage(ref err)) if err.operation() == StoreOperation::ListAll
    ));
}
