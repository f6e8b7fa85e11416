//! Execution planning.
//!
//! Turns a task map into an [`ExecutionGraph`]: the dependency graph is
//! scheduled into a single order, and the order is packed into parallel
//! groups separated by barriers.

pub mod groups;
pub mod scheduler;

pub use groups::{plan_parallel_groups, ParallelGroup, MAX_AGENTS};
pub use scheduler::{topological_order, Schedule};

use crate::core::{normalize_phase, DependencyGraph, Task, TaskId};
use crate::tlog;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Plan format version written to every execution graph.
pub const PLAN_VERSION: &str = "20.0";

/// Phase recorded when no phase filter was applied.
pub const ALL_PHASES: &str = "ALL";

/// The complete execution plan for one planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionGraph {
    pub version: String,
    /// Phase filter applied, or [`ALL_PHASES`].
    pub phase: String,
    pub generated_at: DateTime<Utc>,
    /// Tasks that survived the phase filter.
    pub tasks: BTreeMap<TaskId, Task>,
    pub parallel_groups: Vec<ParallelGroup>,
    pub execution_order: Vec<TaskId>,
    pub total_tasks: usize,
    /// Members of all groups with more than one task.
    pub parallelizable_tasks: usize,
    /// Number of single-task groups.
    pub sequential_tasks: usize,
    /// Tasks ordered by cycle recovery rather than by their dependencies.
    #[serde(skip)]
    pub unresolved: Vec<TaskId>,
}

impl ExecutionGraph {
    /// Plan `tasks`, optionally restricted to one phase.
    pub fn build(tasks: &BTreeMap<TaskId, Task>, phase: Option<&str>) -> Self {
        Self::build_at(tasks, phase, Utc::now())
    }

    /// Plan `tasks` with an explicit generation timestamp.
    ///
    /// Two calls with equal inputs return equal graphs.
    pub fn build_at(
        tasks: &BTreeMap<TaskId, Task>,
        phase: Option<&str>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let phase = normalize_phase(phase);
        let graph = DependencyGraph::build(tasks, phase);
        let Schedule { order, unresolved } = topological_order(&graph);

        let filtered: BTreeMap<TaskId, Task> = order
            .iter()
            .filter_map(|id| tasks.get(id).map(|task| (id.clone(), task.clone())))
            .collect();
        let parallel_groups = plan_parallel_groups(&filtered, &graph, &order);

        let parallelizable_tasks = parallel_groups
            .iter()
            .filter(|g| g.is_parallel())
            .map(ParallelGroup::len)
            .sum();
        let sequential_tasks = parallel_groups.iter().filter(|g| g.len() == 1).count();

        tlog!(
            "Planned {} tasks into {} groups ({} edges)",
            order.len(),
            parallel_groups.len(),
            graph.dependency_count()
        );

        Self {
            version: PLAN_VERSION.to_string(),
            phase: phase.unwrap_or(ALL_PHASES).to_string(),
            generated_at,
            tasks: filtered,
            parallel_groups,
            total_tasks: order.len(),
            execution_order: order,
            parallelizable_tasks,
            sequential_tasks,
            unresolved,
        }
    }

    /// Check whether cycle recovery was needed.
    pub fn has_cycle(&self) -> bool {
        !self.unresolved.is_empty()
    }

    /// Find the group a task was placed in.
    pub fn group_of(&self, id: &TaskId) -> Option<&ParallelGroup> {
        self.parallel_groups.iter().find(|g| g.contains(id))
    }

    /// Position of a task in the execution order.
    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.execution_order.iter().position(|t| t == id)
    }
}
