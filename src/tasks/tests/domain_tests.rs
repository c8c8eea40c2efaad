//! Domain-focused tests for task values.

use crate::tasks::domain::{NewTask, Task, TaskDomainError, TaskId};
use rstest::rstest;

#[rstest]
fn new_task_accepts_a_description() {
    let task = NewTask::new("hello").expect("valid description");
    assert_eq!(task.description(), "hello");
}

#[rstest]
#[case::empty("")]
#[case::spaces("   ")]
#[case::tabs("\t\n")]
fn new_task_rejects_blank_descriptions(#[case] description: &str) {
    let result = NewTask::new(description);
    assert_eq!(result, Err(TaskDomainError::EmptyDescription));
}

#[rstest]
fn new_task_preserves_inner_whitespace() {
    let task = NewTask::new("  padded  ").expect("valid description");
    assert_eq!(task.into_description(), "  padded  ");
}

#[rstest]
fn persisted_tasks_expose_their_fields() {
    let task = Task::from_persisted(TaskId::from_raw(7), "hello".to_owned(), false);
    assert_eq!(task.id(), TaskId::from_raw(7));
    assert_eq!(task.id().into_inner(), 7);
    assert_eq!(task.description(), "hello");
    assert!(!task.completed());
}
