//! Core domain models for planning.
//!
//! This module contains the task record and the dependency graph built
//! from explicit and file-implied dependencies.

pub mod dag;
pub mod implicit;
pub mod task;

pub use dag::{normalize_phase, DependencyGraph, DependencyType};
pub use implicit::{detect_implicit_dependencies, ImplicitDependencies};
pub use task::{Task, TaskId, TestDelta};
