//! Task data model for the execution graph.
//!
//! Tasks are the immutable input units of a planning run. Each task
//! declares its dependencies, the files it modifies, and a priority used
//! to order tasks that conflict on a shared file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Phase assigned to tasks that do not declare one.
pub const DEFAULT_PHASE: &str = "UNKNOWN";

/// Priority assigned to tasks that do not declare one.
pub const DEFAULT_PRIORITY: u32 = 5;

/// Complexity assigned to tasks that do not declare one.
pub const DEFAULT_COMPLEXITY: &str = "MEDIUM";

/// Identifier of a task, normalized to upper case.
///
/// Ordering is lexicographic on the normalized string, which is the
/// tie-break used everywhere the planner has to choose between tasks.
/// Deserialized ids are normalized the same way as constructed ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// Create a task identifier, upper-casing the input.
    pub fn new(id: &str) -> Self {
        Self(id.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self::new(&id)
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl std::borrow::Borrow<str> for TaskId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Tests a task expects to add, update, or re-run for regressions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDelta {
    pub add: Vec<String>,
    pub update: Vec<String>,
    pub regression: Vec<String>,
}

/// A single task record.
///
/// Built once by the document parser (or [`Task::new`] plus the `with_*`
/// builders) and never mutated by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique, upper-cased identifier.
    pub task_id: TaskId,
    /// Human-readable title.
    pub title: String,
    /// Document the task was parsed from. Empty for tasks built in code.
    #[serde(default)]
    pub file_path: String,
    /// Grouping tag used by the phase filter.
    pub phase: String,
    /// Declared dependencies, in declaration order. May name unknown tasks.
    pub dependencies: Vec<TaskId>,
    /// Resource paths this task modifies.
    pub files_modified: BTreeSet<String>,
    #[serde(default)]
    pub test_delta: TestDelta,
    /// Lower values win when two tasks modify the same file.
    pub priority: u32,
    pub complexity: String,
}

impl Task {
    /// Create a task with default phase, priority, and complexity.
    pub fn new(task_id: &str, title: &str) -> Self {
        Self {
            task_id: TaskId::new(task_id),
            title: title.to_string(),
            file_path: String::new(),
            phase: DEFAULT_PHASE.to_string(),
            dependencies: Vec::new(),
            files_modified: BTreeSet::new(),
            test_delta: TestDelta::default(),
            priority: DEFAULT_PRIORITY,
            complexity: DEFAULT_COMPLEXITY.to_string(),
        }
    }

    pub fn with_phase(mut self, phase: &str) -> Self {
        self.phase = phase.to_string();
        self
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dependencies = deps.into_iter().map(|d| TaskId::new(d.as_ref())).collect();
        self
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files_modified = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_complexity(mut self, complexity: &str) -> Self {
        self.complexity = complexity.to_string();
        self
    }

    pub fn with_file_path(mut self, path: &str) -> Self {
        self.file_path = path.to_string();
        self
    }

    pub fn with_test_delta(mut self, delta: TestDelta) -> Self {
        self.test_delta = delta;
        self
    }

    /// Check whether this task modifies any file the other task modifies.
    pub fn conflicts_with(&self, other: &Task) -> bool {
        !self.files_modified.is_disjoint(&other.files_modified)
    }
}
