//! Planning pipeline entry point.
//!
//! Ties the collaborators together for one run: load the project config,
//! parse task documents, build the execution graph, and write it out.
//! The project root is supplied by the caller; nothing here searches for it.

use crate::config::Config;
use crate::core::normalize_phase;
use crate::output::write_execution_graph;
use crate::parser::{load_tasks, ParseError};
use crate::plan::ExecutionGraph;
use crate::{tlog, tlog_warn, Error, Result};
use std::path::{Path, PathBuf};

/// Overrides for a single run. `None` falls back to the project config.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub phase: Option<String>,
    pub output: Option<PathBuf>,
}

/// Outcome of a planning run.
#[derive(Debug)]
pub struct Analysis {
    pub graph: ExecutionGraph,
    /// Where the graph was written.
    pub output: PathBuf,
    /// Task documents that were skipped.
    pub parse_failures: Vec<ParseError>,
}

/// Plan every task document under `root` and write the execution graph.
pub fn analyze(root: &Path, options: &AnalyzeOptions) -> Result<Analysis> {
    if !root.is_dir() {
        return Err(Error::Validation(format!(
            "project root {} is not a directory",
            root.display()
        )));
    }

    let config = Config::load(root)?;
    let tasks_dir = config.tasks_dir(root);
    // An explicit blank phase still overrides the config and means all tasks.
    let phase = options.phase.as_deref().or(config.phase.as_deref());
    let phase = normalize_phase(phase);
    let output = options
        .output
        .clone()
        .unwrap_or_else(|| config.output_path(root));

    tlog!(
        "Analyzing {} (phase: {})",
        tasks_dir.display(),
        phase.unwrap_or("all")
    );

    let load = load_tasks(&tasks_dir)?;
    if !load.failures.is_empty() {
        tlog_warn!("{} task documents could not be parsed", load.failures.len());
    }

    let graph = ExecutionGraph::build(&load.tasks, phase);
    write_execution_graph(&graph, &output)?;
    tlog!("Execution graph written to {}", output.display());

    Ok(Analysis {
        graph,
        output,
        parse_failures: load.failures,
    })
}
