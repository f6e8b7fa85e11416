//! Persisting execution graphs.

use crate::plan::ExecutionGraph;
use crate::{tlog_debug, Result};
use std::fs;
use std::path::Path;

/// Write `graph` as pretty-printed JSON, replacing any previous plan.
///
/// Parent directories are created as needed.
pub fn write_execution_graph(graph: &ExecutionGraph, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            tlog_debug!("Creating output directory: {}", parent.display());
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(graph)?)?;
    tlog_debug!("Execution graph written to {}", path.display());
    Ok(())
}

/// Read a previously written execution graph.
///
/// Public for the executors that consume a plan; the planner itself only
/// writes. Task ids in the file are normalized on the way in.
pub fn read_execution_graph(path: &Path) -> Result<ExecutionGraph> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}
