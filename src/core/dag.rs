//! Dependency graph for a planning run.
//!
//! This module provides the DependencyGraph structure that merges explicit
//! task dependencies with dependencies implied by shared files. Unlike a
//! strict DAG the graph accepts cycles; the scheduler resolves them.

use crate::core::implicit::detect_implicit_dependencies;
use crate::core::task::{Task, TaskId};
use crate::tlog_debug;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Why one task must complete before another.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum DependencyType {
    /// Declared by the dependent task.
    Explicit,
    /// Both tasks modify the same files.
    FileDependency {
        /// Files that both tasks touch.
        files: Vec<String>,
    },
}

impl std::fmt::Display for DependencyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DependencyType::Explicit => write!(f, "explicit"),
            DependencyType::FileDependency { files } => {
                write!(f, "files: {}", files.len())
            }
        }
    }
}

/// Treat a blank phase filter as no filter at all.
pub fn normalize_phase(phase: Option<&str>) -> Option<&str> {
    phase.filter(|p| !p.trim().is_empty())
}

/// The merged dependency graph.
///
/// Nodes are task ids. An edge `a -> b` means `a` must complete before `b`
/// can start, i.e. `b` depends on `a`. Nodes are inserted in ascending id
/// order so node indices are stable across runs.
pub struct DependencyGraph {
    graph: DiGraph<TaskId, DependencyType>,
    index: HashMap<TaskId, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph for `tasks`, optionally restricted to one phase.
    ///
    /// Tasks outside the phase are excluded entirely: they get no node and
    /// are not valid dependency targets. Explicit references to unknown ids
    /// are dropped without error.
    pub fn build(tasks: &BTreeMap<TaskId, Task>, phase: Option<&str>) -> Self {
        let phase = normalize_phase(phase);
        let selected: BTreeMap<&TaskId, &Task> = tasks
            .iter()
            .filter(|(_, task)| phase.map_or(true, |p| task.phase == p))
            .collect();

        let mut dag = Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        };
        for id in selected.keys() {
            let node = dag.graph.add_node((*id).clone());
            dag.index.insert((*id).clone(), node);
        }

        for (id, task) in &selected {
            for dep in &task.dependencies {
                if dag.contains(dep) {
                    dag.link(dep, id, DependencyType::Explicit);
                } else {
                    tlog_debug!("{}: dropping unknown dependency {}", id, dep);
                }
            }
        }

        let implicit = detect_implicit_dependencies(selected.values().copied());
        for (id, deps) in implicit {
            for (dep, files) in deps {
                tlog_debug!("{}: implied dependency on {} via {:?}", id, dep, files);
                dag.link(&dep, &id, DependencyType::FileDependency { files });
            }
        }

        dag
    }

    /// Add or merge an edge `from -> to`. Explicit edges win over implied ones.
    fn link(&mut self, from: &TaskId, to: &TaskId, dep_type: DependencyType) {
        let (Some(&a), Some(&b)) = (self.index.get(from), self.index.get(to)) else {
            return;
        };

        match self.graph.find_edge(a, b) {
            None => {
                self.graph.add_edge(a, b, dep_type);
            }
            Some(edge) => match (&mut self.graph[edge], dep_type) {
                (
                    DependencyType::FileDependency { files },
                    DependencyType::FileDependency { files: more },
                ) => files.extend(more),
                (existing, DependencyType::Explicit) => *existing = DependencyType::Explicit,
                _ => {}
            },
        }
    }

    /// Check whether the graph has a node for the task.
    pub fn contains(&self, id: &TaskId) -> bool {
        self.index.contains_key(id)
    }

    /// Number of tasks in the graph.
    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of dependency edges in the graph.
    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// All task ids in ascending order.
    pub fn task_ids(&self) -> impl Iterator<Item = &TaskId> {
        // Nodes were added in ascending order
        self.graph.node_weights()
    }

    /// Check whether `dependent` depends directly on `dependency`.
    pub fn depends_on(&self, dependent: &TaskId, dependency: &TaskId) -> bool {
        self.dependency_type(dependent, dependency).is_some()
    }

    /// Get the edge type if `dependent` depends directly on `dependency`.
    pub fn dependency_type(
        &self,
        dependent: &TaskId,
        dependency: &TaskId,
    ) -> Option<&DependencyType> {
        let from = self.index.get(dependency)?;
        let to = self.index.get(dependent)?;
        let edge = self.graph.find_edge(*from, *to)?;
        self.graph.edge_weight(edge)
    }

    /// The tasks `id` depends on, in ascending order.
    pub fn dependencies(&self, id: &TaskId) -> BTreeSet<&TaskId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// The tasks that depend on `id`, in ascending order.
    pub fn dependents(&self, id: &TaskId) -> BTreeSet<&TaskId> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors(&self, id: &TaskId, direction: Direction) -> BTreeSet<&TaskId> {
        match self.index.get(id) {
            Some(&node) => self
                .graph
                .neighbors_directed(node, direction)
                .map(|n| &self.graph[n])
                .collect(),
            None => BTreeSet::new(),
        }
    }

    /// The graph as a plain mapping from task id to its dependency ids.
    pub fn adjacency(&self) -> BTreeMap<TaskId, BTreeSet<TaskId>> {
        self.task_ids()
            .map(|id| {
                let deps = self.dependencies(id).into_iter().cloned().collect();
                (id.clone(), deps)
            })
            .collect()
    }
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("tasks", &self.task_count())
            .field("dependencies", &self.dependency_count())
            .finish()
    }
}
