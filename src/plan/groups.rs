//! Packing the execution order into barrier-separated parallel groups.
//!
//! Groups are built greedily. Each unplaced task in execution order seeds a
//! new group, and every later unplaced task that is independent of the seed,
//! has all dependencies placed in earlier groups, and shares no file with
//! any member joins it. A downstream executor may run a group's members
//! concurrently but must finish a group before starting the next.

use crate::core::dag::DependencyGraph;
use crate::core::task::{Task, TaskId};
use crate::tlog_debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Upper bound on agents suggested for a single group.
pub const MAX_AGENTS: usize = 5;

/// A batch of tasks that may run concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelGroup {
    /// Sequential identifier, `GROUP-001` onwards.
    pub group_id: String,
    /// Members in execution order. Never empty.
    pub tasks: Vec<TaskId>,
    /// Whether the executor must wait for every member before moving on.
    /// Always true.
    pub barrier_after: bool,
    /// Suggested concurrency, capped at [`MAX_AGENTS`].
    pub estimated_agents: usize,
}

impl ParallelGroup {
    /// Create the group with 1-based sequence number `number`.
    pub fn new(number: usize, tasks: Vec<TaskId>) -> Self {
        let estimated_agents = tasks.len().min(MAX_AGENTS);
        Self {
            group_id: format!("GROUP-{:03}", number),
            tasks,
            barrier_after: true,
            estimated_agents,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Check whether the group has more than one member.
    pub fn is_parallel(&self) -> bool {
        self.tasks.len() > 1
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.tasks.contains(id)
    }
}

/// Partition `order` into parallel groups.
///
/// `tasks` supplies the file sets used for conflict checks; a task missing
/// from it is treated as modifying nothing. Groups come out in the order
/// their seed task appears in `order`.
pub fn plan_parallel_groups(
    tasks: &BTreeMap<TaskId, Task>,
    graph: &DependencyGraph,
    order: &[TaskId],
) -> Vec<ParallelGroup> {
    let mut placed: HashSet<&TaskId> = HashSet::new();
    let mut groups = Vec::new();

    for (position, seed) in order.iter().enumerate() {
        if placed.contains(seed) {
            continue;
        }

        let mut members = vec![seed];
        if dependencies_placed(graph, seed, &placed) {
            for candidate in &order[position + 1..] {
                if placed.contains(candidate) {
                    continue;
                }
                if graph.depends_on(seed, candidate) || graph.depends_on(candidate, seed) {
                    continue;
                }
                if !dependencies_placed(graph, candidate, &placed) {
                    continue;
                }
                if members.iter().any(|m| conflicts(tasks, m, candidate)) {
                    continue;
                }
                members.push(candidate);
            }
        }

        placed.extend(members.iter().copied());
        let group = ParallelGroup::new(groups.len() + 1, members.into_iter().cloned().collect());
        tlog_debug!("{}: {:?}", group.group_id, group.tasks);
        groups.push(group);
    }

    groups
}

/// Check whether every dependency of `id` sits in an already closed group.
fn dependencies_placed(graph: &DependencyGraph, id: &TaskId, placed: &HashSet<&TaskId>) -> bool {
    graph.dependencies(id).iter().all(|dep| placed.contains(dep))
}

fn conflicts(tasks: &BTreeMap<TaskId, Task>, a: &TaskId, b: &TaskId) -> bool {
    match (tasks.get(a), tasks.get(b)) {
        (Some(a), Some(b)) => a.conflicts_with(b),
        _ => false,
    }
}
