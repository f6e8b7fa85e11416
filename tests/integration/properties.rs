//! Ordering, partition, and conflict guarantees over arbitrary task sets.

use std::collections::{BTreeMap, HashSet};
use std::ops::Range;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use crate::fixtures::task_map;
use taskplan::core::{DependencyGraph, Task, TaskId};
use taskplan::plan::ExecutionGraph;

const PHASES: [&str; 2] = ["BUILD", "TEST"];

/// Dependency targets are drawn from this many ids; those past the task
/// count name tasks that do not exist.
const ID_SPACE: usize = 16;

fn task_id(n: usize) -> String {
    format!("task-{:02}", n)
}

/// One task: dependency targets, file indices, priority, phase index.
fn arb_task() -> impl Strategy<Value = (Vec<usize>, Vec<usize>, u32, usize)> {
    (
        prop::collection::vec(0..ID_SPACE, 0..4),
        prop::collection::vec(0usize..6, 0..3),
        1u32..=5,
        0..PHASES.len(),
    )
}

/// Task sets whose dependencies point in any direction, including at the
/// task itself and at unknown ids, over a small pool of shared files.
fn arb_tasks(count: Range<usize>) -> impl Strategy<Value = BTreeMap<TaskId, Task>> {
    prop::collection::vec(arb_task(), count).prop_map(|specs| {
        let tasks = specs
            .into_iter()
            .enumerate()
            .map(|(i, (deps, files, priority, phase))| {
                Task::new(&task_id(i), "generated")
                    .with_phase(PHASES[phase])
                    .with_dependencies(deps.into_iter().map(task_id))
                    .with_files(files.into_iter().map(|f| format!("src/module_{}.rs", f)))
                    .with_priority(priority)
            })
            .collect();
        task_map(tasks)
    })
}

fn arb_phase() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![Just(None), Just(Some(PHASES[0])), Just(Some(PHASES[1]))]
}

fn selected_ids<'a>(tasks: &'a BTreeMap<TaskId, Task>, phase: Option<&str>) -> Vec<&'a TaskId> {
    tasks
        .values()
        .filter(|t| phase.map_or(true, |p| t.phase == p))
        .map(|t| &t.task_id)
        .collect()
}

fn check_total_and_partitioned(
    tasks: &BTreeMap<TaskId, Task>,
    phase: Option<&str>,
    graph: &ExecutionGraph,
) -> Result<(), TestCaseError> {
    let mut ordered: Vec<&TaskId> = graph.execution_order.iter().collect();
    ordered.sort();
    ordered.dedup();
    prop_assert_eq!(ordered.len(), graph.execution_order.len(), "duplicate in order");
    prop_assert_eq!(ordered, selected_ids(tasks, phase));
    prop_assert_eq!(graph.total_tasks, graph.execution_order.len());

    let mut seen = HashSet::new();
    for group in &graph.parallel_groups {
        prop_assert!(!group.is_empty());
        for id in &group.tasks {
            prop_assert!(seen.insert(id), "{} placed twice", id);
        }
    }
    prop_assert_eq!(seen.len(), graph.execution_order.len());
    Ok(())
}

fn check_groups_independent(
    tasks: &BTreeMap<TaskId, Task>,
    dag: &DependencyGraph,
    graph: &ExecutionGraph,
) -> Result<(), TestCaseError> {
    for group in &graph.parallel_groups {
        for (i, a) in group.tasks.iter().enumerate() {
            for b in &group.tasks[i + 1..] {
                prop_assert!(!tasks[a].conflicts_with(&tasks[b]), "{} and {} share files", a, b);
                prop_assert!(!dag.depends_on(a, b) && !dag.depends_on(b, a), "{} and {} linked", a, b);
            }
        }
    }
    Ok(())
}

/// Every task ordered by its dependencies (all of them, when there is no
/// cycle) comes after each dependency, in the order and in the groups.
fn check_dependencies_first(
    dag: &DependencyGraph,
    graph: &ExecutionGraph,
) -> Result<(), TestCaseError> {
    let unresolved: HashSet<&TaskId> = graph.unresolved.iter().collect();
    let group_index: BTreeMap<&TaskId, usize> = graph
        .parallel_groups
        .iter()
        .enumerate()
        .flat_map(|(n, g)| g.tasks.iter().map(move |t| (t, n)))
        .collect();

    for (id, deps) in dag.adjacency() {
        if unresolved.contains(&id) {
            continue;
        }
        for dep in deps {
            prop_assert!(
                graph.position(&dep) < graph.position(&id),
                "{} scheduled before its dependency {}",
                id,
                dep
            );
            prop_assert!(group_index[&dep] < group_index[&id]);
        }
    }
    Ok(())
}

fn check_unresolved_trail(graph: &ExecutionGraph) -> Result<(), TestCaseError> {
    let mut sorted = graph.unresolved.clone();
    sorted.sort();
    prop_assert_eq!(&graph.unresolved, &sorted);
    prop_assert!(graph.execution_order.ends_with(&graph.unresolved));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_plan_covers_every_selected_task_once(
        tasks in arb_tasks(1..12),
        phase in arb_phase()
    ) {
        let graph = ExecutionGraph::build(&tasks, phase);
        check_total_and_partitioned(&tasks, phase, &graph)?;
        check_unresolved_trail(&graph)?;
    }

    #[test]
    fn test_groups_are_conflict_free_and_independent(
        tasks in arb_tasks(1..12),
        phase in arb_phase()
    ) {
        let dag = DependencyGraph::build(&tasks, phase);
        let graph = ExecutionGraph::build(&tasks, phase);
        check_groups_independent(&tasks, &dag, &graph)?;
    }

    #[test]
    fn test_dependencies_come_first(
        tasks in arb_tasks(1..12),
        phase in arb_phase()
    ) {
        let dag = DependencyGraph::build(&tasks, phase);
        let graph = ExecutionGraph::build(&tasks, phase);
        check_dependencies_first(&dag, &graph)?;
    }

    #[test]
    fn test_counters_match_groups(tasks in arb_tasks(1..12)) {
        let graph = ExecutionGraph::build(&tasks, None);

        let singletons = graph.parallel_groups.iter().filter(|g| g.len() == 1).count();
        prop_assert_eq!(graph.sequential_tasks, singletons);
        prop_assert_eq!(graph.parallelizable_tasks + singletons, graph.total_tasks);
    }

    #[test]
    fn test_identical_input_gives_identical_output(
        tasks in arb_tasks(1..12),
        phase in arb_phase()
    ) {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let first = ExecutionGraph::build_at(&tasks, phase, at);
        let second = ExecutionGraph::build_at(&tasks.clone(), phase, at);

        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_forced_cycle_keeps_plan_total(tasks in arb_tasks(2..12)) {
        let mut tasks = tasks;
        let first = TaskId::new(&task_id(0));
        let last = TaskId::new(&task_id(tasks.len() - 1));
        for (from, to) in [(&first, &last), (&last, &first)] {
            if let Some(task) = tasks.get_mut(from) {
                task.dependencies.push(to.clone());
            }
        }
        let graph = ExecutionGraph::build(&tasks, None);

        prop_assert!(graph.has_cycle());
        prop_assert!(graph.unresolved.contains(&first));
        prop_assert!(graph.unresolved.contains(&last));
        check_total_and_partitioned(&tasks, None, &graph)?;
        check_unresolved_trail(&graph)?;

        let dag = DependencyGraph::build(&tasks, None);
        check_groups_independent(&tasks, &dag, &graph)?;
        check_dependencies_first(&dag, &graph)?;
    }
}
