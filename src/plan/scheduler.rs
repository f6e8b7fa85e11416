//! Deterministic topological scheduling.
//!
//! Produces a single execution order from the dependency graph. Among the
//! tasks whose dependencies are all satisfied, the smallest task id always
//! goes next. Tasks caught in cycles never become ready; they are appended
//! in ascending id order so every task still appears exactly once.

use crate::core::dag::DependencyGraph;
use crate::core::task::TaskId;
use crate::{tlog_trace, tlog_warn};
use std::collections::{BTreeSet, HashMap};

/// Result of scheduling a dependency graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    /// Every task in the graph, exactly once.
    pub order: Vec<TaskId>,
    /// Tasks that could not be ordered because of a cycle, ascending.
    /// They are also the tail of `order`.
    pub unresolved: Vec<TaskId>,
}

impl Schedule {
    /// Check whether scheduling had to break a cycle.
    pub fn has_cycle(&self) -> bool {
        !self.unresolved.is_empty()
    }
}

/// Linearize the graph into a deterministic execution order.
///
/// A task's in-degree is the number of its own dependencies; it becomes
/// ready when all of them have been emitted. Cycles are not an error: the
/// unreachable tasks are reported in [`Schedule::unresolved`] and logged.
pub fn topological_order(graph: &DependencyGraph) -> Schedule {
    let mut in_degree: HashMap<&TaskId, usize> = graph
        .task_ids()
        .map(|id| (id, graph.dependencies(id).len()))
        .collect();

    let mut ready: BTreeSet<&TaskId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();

    let mut order = Vec::with_capacity(graph.task_count());
    while let Some(next) = ready.pop_first() {
        tlog_trace!("schedule {} (ready: {})", next, ready.len());
        order.push(next.clone());

        for dependent in graph.dependents(next) {
            if let Some(remaining) = in_degree.get_mut(dependent) {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    ready.insert(dependent);
                }
            }
        }
    }

    let unresolved: Vec<TaskId> = graph
        .task_ids()
        .filter(|id| in_degree.get(id).is_some_and(|degree| *degree > 0))
        .cloned()
        .collect();

    if !unresolved.is_empty() {
        let names: Vec<&str> = unresolved.iter().map(TaskId::as_str).collect();
        tlog_warn!("Circular dependency detected involving: {}", names.join(", "));
        order.extend(unresolved.iter().cloned());
    }

    Schedule { order, unresolved }
}
