pub mod analyze;
pub mod config;
pub mod core;
pub mod error;
pub mod log;
pub mod output;
pub mod parser;
pub mod plan;

pub use analyze::{analyze, Analysis, AnalyzeOptions};
pub use error::{Error, Result};
pub use plan::{ExecutionGraph, ParallelGroup};
