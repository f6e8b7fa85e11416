use std::path::PathBuf;

use clap::Parser;

use taskplan::config::discover_root;
use taskplan::{analyze, tlog, tlog_error, AnalyzeOptions, Analysis, Result};

/// Taskplan - dependency analyzer producing parallel execution plans
#[derive(Parser, Debug)]
#[command(name = "taskplan")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    TASKPLAN_DEBUG=1     Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Only plan tasks in this phase
    #[arg(short, long)]
    pub phase: Option<String>,

    /// Output file path (default: <root>/.factory/execution_graph.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Project root (default: nearest ancestor containing .factory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Enable debug logging (writes to ~/.taskplan/taskplan.log)
    #[arg(short = 'd', long)]
    pub debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    taskplan::log::init_with_debug(cli.debug);

    let root = match cli.root {
        Some(root) => root,
        None => discover_root(&std::env::current_dir()?),
    };
    tlog!("Project root: {}", root.display());

    let options = AnalyzeOptions {
        phase: cli.phase,
        output: cli.output,
    };
    let analysis = analyze(&root, &options).inspect_err(|e| tlog_error!("{}", e))?;

    print_summary(&analysis);
    if taskplan::log::is_debug() {
        if let Some(path) = taskplan::log::log_path() {
            eprintln!("Debug log: {}", path.display());
        }
    }
    Ok(())
}

fn print_summary(analysis: &Analysis) {
    for failure in &analysis.parse_failures {
        eprintln!("Warning: Failed to parse {}", failure);
    }

    let graph = &analysis.graph;
    if graph.has_cycle() {
        let names: Vec<&str> = graph.unresolved.iter().map(|id| id.as_str()).collect();
        eprintln!(
            "Warning: Circular dependency detected involving: {}",
            names.join(", ")
        );
    }

    println!("Dependency analysis complete:");
    println!("  Total tasks: {}", graph.total_tasks);
    println!("  Parallel groups: {}", graph.parallel_groups.len());
    println!("  Parallelizable tasks: {}", graph.parallelizable_tasks);
    println!("  Sequential tasks: {}", graph.sequential_tasks);
    println!("  Output: {}", analysis.output.display());
}
