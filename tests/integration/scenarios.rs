//! Small plans with hand-checked outcomes.

use crate::fixtures::{group_members, id, task_map, web_app_tasks};
use taskplan::core::{DependencyGraph, DependencyType, Task};
use taskplan::plan::{ExecutionGraph, ALL_PHASES, PLAN_VERSION};

#[test]
fn test_independent_tasks_share_first_group() {
    let tasks = task_map(vec![
        Task::new("T1", "first").with_files(["a"]),
        Task::new("T3", "third").with_files(["b"]),
    ]);
    let graph = ExecutionGraph::build(&tasks, None);

    assert_eq!(group_members(&graph), vec![vec!["T1", "T3"]]);
    assert!(graph.parallel_groups[0].is_parallel());
    assert_eq!(graph.parallelizable_tasks, 2);
    assert_eq!(graph.sequential_tasks, 0);
}

#[test]
fn test_explicit_chain_orders_and_separates() {
    let tasks = task_map(vec![
        Task::new("T1", "first").with_files(["a"]),
        Task::new("T2", "second").with_dependencies(["T1"]).with_files(["b"]),
    ]);
    let graph = ExecutionGraph::build(&tasks, None);

    assert!(graph.position(&id("T1")) < graph.position(&id("T2")));
    assert_eq!(group_members(&graph), vec![vec!["T1"], vec!["T2"]]);
    assert_eq!(graph.sequential_tasks, 2);
}

#[test]
fn test_shared_file_implies_dependency_by_priority() {
    // T5 sorts first by id but T4 has the higher priority.
    let tasks = task_map(vec![
        Task::new("T5", "later").with_files(["c"]).with_priority(2),
        Task::new("T4", "earlier").with_files(["c"]).with_priority(1),
    ]);

    let dag = DependencyGraph::build(&tasks, None);
    assert!(dag.depends_on(&id("T5"), &id("T4")));
    assert!(!dag.depends_on(&id("T4"), &id("T5")));
    assert_eq!(
        dag.dependency_type(&id("T5"), &id("T4")),
        Some(&DependencyType::FileDependency {
            files: vec!["c".to_string()]
        })
    );

    let graph = ExecutionGraph::build(&tasks, None);
    assert_eq!(graph.execution_order, vec![id("T4"), id("T5")]);
    assert_ne!(
        graph.group_of(&id("T4")).map(|g| &g.group_id),
        graph.group_of(&id("T5")).map(|g| &g.group_id)
    );
}

#[test]
fn test_mutual_dependency_is_recovered() {
    let tasks = task_map(vec![
        Task::new("B", "b").with_dependencies(["A"]),
        Task::new("A", "a").with_dependencies(["B"]),
    ]);
    let graph = ExecutionGraph::build(&tasks, None);

    assert_eq!(graph.execution_order, vec![id("A"), id("B")]);
    assert_eq!(graph.unresolved, vec![id("A"), id("B")]);
    assert!(graph.has_cycle());
    assert_eq!(graph.total_tasks, 2);
    assert_eq!(group_members(&graph), vec![vec!["A"], vec!["B"]]);
}

#[test]
fn test_web_app_plan() {
    let tasks = task_map(web_app_tasks());
    let graph = ExecutionGraph::build(&tasks, None);

    assert_eq!(graph.version, PLAN_VERSION);
    assert_eq!(graph.phase, ALL_PHASES);
    assert_eq!(graph.total_tasks, 8);
    assert!(!graph.has_cycle());
    assert_eq!(
        group_members(&graph),
        vec![
            vec!["TASK-001", "TASK-004", "TASK-007"],
            vec!["TASK-002"],
            vec!["TASK-003", "TASK-005", "TASK-008"],
            vec!["TASK-006"],
        ]
    );
    assert_eq!(graph.parallelizable_tasks, 6);
    assert_eq!(graph.sequential_tasks, 2);

    let ids: Vec<&str> = graph.parallel_groups.iter().map(|g| g.group_id.as_str()).collect();
    assert_eq!(ids, vec!["GROUP-001", "GROUP-002", "GROUP-003", "GROUP-004"]);
    assert!(graph.parallel_groups.iter().all(|g| g.barrier_after));
}

#[test]
fn test_web_app_implied_edges() {
    let tasks = task_map(web_app_tasks());
    let dag = DependencyGraph::build(&tasks, None);

    // Shared src/models/mod.rs: TASK-002 has the higher priority.
    assert!(dag.depends_on(&id("TASK-003"), &id("TASK-002")));
    // Shared src/api/mod.rs: TASK-005 has the higher priority.
    assert!(dag.depends_on(&id("TASK-006"), &id("TASK-005")));
    // TASK-404 does not exist.
    assert!(!dag.contains(&id("TASK-404")));
    assert_eq!(dag.dependencies(&id("TASK-006")).len(), 2);
}

#[test]
fn test_phase_filter_drops_cross_phase_dependencies() {
    let tasks = task_map(web_app_tasks());
    let graph = ExecutionGraph::build(&tasks, Some("API"));

    assert_eq!(graph.phase, "API");
    assert_eq!(graph.total_tasks, 3);
    assert_eq!(
        graph.tasks.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
        vec!["TASK-005", "TASK-006", "TASK-008"]
    );
    assert_eq!(
        group_members(&graph),
        vec![vec!["TASK-005", "TASK-008"], vec!["TASK-006"]]
    );
}

#[test]
fn test_unknown_phase_yields_empty_plan() {
    let tasks = task_map(web_app_tasks());
    let graph = ExecutionGraph::build(&tasks, Some("RELEASE"));

    assert_eq!(graph.total_tasks, 0);
    assert!(graph.execution_order.is_empty());
    assert!(graph.parallel_groups.is_empty());
    assert!(graph.tasks.is_empty());
}

#[test]
fn test_wide_group_caps_estimated_agents() {
    let tasks = task_map(crate::fixtures::independent_tasks(8));
    let graph = ExecutionGraph::build(&tasks, None);

    assert_eq!(graph.parallel_groups.len(), 1);
    assert_eq!(graph.parallel_groups[0].len(), 8);
    assert_eq!(graph.parallel_groups[0].estimated_agents, taskplan::plan::MAX_AGENTS);
}
