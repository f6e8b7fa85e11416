//! Implicit dependency detection.
//!
//! Two tasks that modify the same file cannot run independently even when
//! neither declares a dependency on the other. For every file touched by
//! more than one task, the touching tasks are put in a total order
//! (ascending priority, then ascending task id) and every task depends on
//! all tasks ahead of it in that order.

use crate::core::task::{Task, TaskId};
use std::collections::BTreeMap;

/// Implied dependencies per task: dependent -> dependency -> shared files.
pub type ImplicitDependencies = BTreeMap<TaskId, BTreeMap<TaskId, Vec<String>>>;

/// Detect implicit dependencies between tasks that modify the same file.
///
/// Every task in `tasks` has an entry in the result, empty when nothing is
/// implied. The file list on each edge names the shared files that caused it.
pub fn detect_implicit_dependencies<'a, I>(tasks: I) -> ImplicitDependencies
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut implicit: ImplicitDependencies = BTreeMap::new();
    let mut file_to_tasks: BTreeMap<&str, Vec<&Task>> = BTreeMap::new();

    for task in tasks {
        implicit.entry(task.task_id.clone()).or_default();
        for file in &task.files_modified {
            file_to_tasks.entry(file.as_str()).or_default().push(task);
        }
    }

    for (file, mut touching) in file_to_tasks {
        if touching.len() < 2 {
            continue;
        }

        touching.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.task_id.cmp(&b.task_id))
        });

        for (i, later) in touching.iter().enumerate().skip(1) {
            let deps = implicit.entry(later.task_id.clone()).or_default();
            for earlier in &touching[..i] {
                deps.entry(earlier.task_id.clone())
                    .or_default()
                    .push(file.to_string());
            }
        }
    }

    implicit
}
