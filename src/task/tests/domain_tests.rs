//! Domain-focused tests for task values and write shapes.

use super::FixedClock;
use crate::task::domain::{
    NewTask, SortOrder, TaskChanges, TaskContent, TaskId, TaskKind, TaskValidationError,
};
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> FixedClock {
    FixedClock::at_noon()
}

fn full_changes() -> TaskChanges {
    TaskChanges {
        kind: Some(TaskKind::Work),
        content: Some(TaskContent::new("Write the report").expect("valid content")),
        sort_order: Some(SortOrder::new(3)),
        done: None,
    }
}

#[rstest]
#[case("shopping", TaskKind::Shopping)]
#[case("work", TaskKind::Work)]
fn task_kind_parses_supported_names(#[case] raw: &str, #[case] expected: TaskKind) {
    assert_eq!(TaskKind::try_from(raw), Ok(expected));
    assert_eq!(expected.as_str(), raw);
}

#[rstest]
#[case("Work")]
#[case("home")]
#[case("")]
fn task_kind_rejects_other_names(#[case] raw: &str) {
    let result = TaskKind::try_from(raw).map_err(TaskValidationError::from);
    assert_eq!(result, Err(TaskValidationError::InvalidKind(raw.to_owned())));
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\n\t")]
fn task_content_rejects_blank_text(#[case] raw: &str) {
    assert_eq!(TaskContent::new(raw), Err(TaskValidationError::EmptyContent));
}

#[rstest]
fn task_content_keeps_surrounding_whitespace() {
    let content = TaskContent::new("  milk  ").expect("valid content");
    assert_eq!(content.as_str(), "  milk  ");
}

#[rstest]
fn sort_order_next_stops_at_overflow() {
    assert_eq!(SortOrder::new(4).next(), Some(SortOrder::new(5)));
    assert_eq!(SortOrder::new(i64::MAX).next(), None);
}

#[rstest]
fn new_task_defaults_done_and_reads_the_clock(clock: FixedClock) {
    let new_task = NewTask::from_changes(full_changes(), &clock).expect("complete changes");

    assert!(!new_task.is_done());
    assert_eq!(new_task.created_at(), clock.0);
    assert_eq!(new_task.kind(), TaskKind::Work);
    assert_eq!(new_task.sort_order(), SortOrder::new(3));
    assert!(!new_task.uuid().into_inner().is_nil());
}

#[rstest]
fn new_task_generates_distinct_uuids(clock: FixedClock) {
    let first = NewTask::from_changes(full_changes(), &clock).expect("complete changes");
    let second = NewTask::from_changes(full_changes(), &clock).expect("complete changes");
    assert_ne!(first.uuid(), second.uuid());
}

#[rstest]
#[case::content(TaskChanges { content: None, ..full_changes() }, TaskValidationError::EmptyContent)]
#[case::kind(TaskChanges { kind: None, ..full_changes() }, TaskValidationError::InvalidKind(String::new()))]
#[case::sort_order(TaskChanges { sort_order: None, ..full_changes() }, TaskValidationError::InvalidSortOrder)]
#[case::everything(TaskChanges::default(), TaskValidationError::EmptyContent)]
fn new_task_requires_every_creation_field(
    clock: FixedClock,
    #[case] changes: TaskChanges,
    #[case] expected: TaskValidationError,
) {
    assert_eq!(NewTask::from_changes(changes, &clock), Err(expected));
}

#[rstest]
fn with_changes_applies_only_supplied_fields(clock: FixedClock) {
    let task = NewTask::from_changes(full_changes(), &clock)
        .expect("complete changes")
        .into_task(TaskId::new(7));
    let changes = TaskChanges {
        done: Some(true),
        ..TaskChanges::default()
    };

    let updated = task.with_changes(&changes);

    assert!(updated.is_done());
    assert_eq!(updated.id(), task.id());
    assert_eq!(updated.uuid(), task.uuid());
    assert_eq!(updated.content(), task.content());
    assert_eq!(updated.kind(), task.kind());
    assert_eq!(updated.sort_order(), task.sort_order());
    assert_eq!(updated.created_at(), task.created_at());
}

#[rstest]
fn task_changes_are_empty_only_without_fields() {
    let changes = TaskChanges {
        kind: Some(TaskKind::Shopping),
        sort_order: Some(SortOrder::new(2)),
        ..TaskChanges::default()
    };

    assert!(!changes.is_empty());
    assert!(TaskChanges::default().is_empty());
}
