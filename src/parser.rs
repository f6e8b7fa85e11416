//! Task document parsing.
//!
//! Task documents are markdown files, one task per file, named after the
//! task id (`task-001.md` becomes `TASK-001`). Metadata is pulled out of the
//! prose with a handful of loose patterns:
//!
//! ```text
//! # Add user schema
//! Phase: FOUNDATION
//! Priority: 1
//! Complexity: HIGH
//! Dependencies: TASK-000
//! Files to modify: `db/schema.sql`, `src/models/user.rs`
//! Test Delta:
//! Add: `tests/user_schema.rs`
//! ```
//!
//! A document that cannot be turned into a task yields a [`ParseError`]
//! instead; loading a directory collects successes and failures separately.

use crate::core::task::{
    Task, TaskId, TestDelta, DEFAULT_COMPLEXITY, DEFAULT_PHASE, DEFAULT_PRIORITY,
};
use crate::{tlog_debug, tlog_warn, Result};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// First level-one heading.
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").unwrap());

static PHASE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Phase:\s*(\S+)").unwrap());

/// Dependencies block, up to a blank line, a heading, or the end of text.
static DEPENDENCIES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Dependencies:\s*(.+?)(?:\n\n|\n#|$)").unwrap()
});

static TASK_REF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"TASK-[A-Z0-9-]+").unwrap());

/// `Files:`, `File to modify:`, `Files to create:` and friends.
static FILES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Files?(?:\s+to\s+(?:modify|change|update|create))?\s*:\s*(.+?)(?:\n\n|\n#|$)")
        .unwrap()
});

/// A path with an extension, optionally wrapped in backticks or quotes.
static FILE_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[`"]?([a-zA-Z0-9_/.-]+\.[a-zA-Z]+)[`"]?"#).unwrap()
});

static TEST_DELTA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Test\s*Delta\s*:\s*(.+?)(?:\n\n|\n#|$)").unwrap()
});

static TEST_ADD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[Aa]dd:\s*(.+?)(?:\n|$)").unwrap());

static TEST_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[`"]?([a-zA-Z0-9_/.-]+)[`"]?"#).unwrap()
});

static PRIORITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Priority:\s*(\d+)").unwrap());

static COMPLEXITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Complexity:\s*(\w+)").unwrap());

/// Why a task document could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The file could not be read as UTF-8 text.
    Unreadable,
    /// The file name does not yield a task id.
    InvalidFileName,
    /// The `Priority:` value is not a valid number.
    InvalidPriority,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorKind::Unreadable => write!(f, "unreadable"),
            ParseErrorKind::InvalidFileName => write!(f, "invalid file name"),
            ParseErrorKind::InvalidPriority => write!(f, "invalid priority"),
        }
    }
}

/// A task document that could not be turned into a task.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}: {kind}: {message}", .path.display())]
pub struct ParseError {
    pub path: PathBuf,
    pub kind: ParseErrorKind,
    pub message: String,
}

impl ParseError {
    fn new(path: &Path, kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            kind,
            message: message.into(),
        }
    }
}

/// Tasks loaded from a directory, plus the documents that failed to parse.
#[derive(Debug, Default)]
pub struct TaskLoad {
    pub tasks: BTreeMap<TaskId, Task>,
    pub failures: Vec<ParseError>,
}

/// Parse a task document already read into memory.
///
/// `path` supplies the task id (its stem) and is recorded on the task.
pub fn parse_task(path: &Path, content: &str) -> std::result::Result<Task, ParseError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            ParseError::new(path, ParseErrorKind::InvalidFileName, "no usable file stem")
        })?;
    let task_id = TaskId::new(stem);

    let title = capture(&TITLE_RE, content)
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| task_id.to_string());

    let phase = capture(&PHASE_RE, content).unwrap_or(DEFAULT_PHASE).to_string();

    let dependencies: Vec<TaskId> = capture(&DEPENDENCIES_RE, content)
        .map(|block| {
            TASK_REF_RE
                .find_iter(block)
                .map(|m| TaskId::new(m.as_str()))
                .collect()
        })
        .unwrap_or_default();

    let files_modified: BTreeSet<String> = capture(&FILES_RE, content)
        .map(|block| {
            FILE_PATH_RE
                .captures_iter(block)
                .map(|c| c[1].to_string())
                .collect()
        })
        .unwrap_or_default();

    let mut test_delta = TestDelta::default();
    if let Some(block) = capture(&TEST_DELTA_RE, content) {
        for line in TEST_ADD_RE.captures_iter(block) {
            let names = line.get(1).map_or("", |m| m.as_str());
            test_delta
                .add
                .extend(TEST_NAME_RE.captures_iter(names).map(|c| c[1].to_string()));
        }
    }

    let priority = match capture(&PRIORITY_RE, content) {
        Some(digits) => digits.parse::<u32>().map_err(|e| {
            ParseError::new(
                path,
                ParseErrorKind::InvalidPriority,
                format!("{}: {}", digits, e),
            )
        })?,
        None => DEFAULT_PRIORITY,
    };

    let complexity = capture(&COMPLEXITY_RE, content)
        .unwrap_or(DEFAULT_COMPLEXITY)
        .to_string();

    Ok(Task {
        task_id,
        title,
        file_path: path.display().to_string(),
        phase,
        dependencies,
        files_modified,
        test_delta,
        priority,
        complexity,
    })
}

/// Read and parse a single task document.
pub fn parse_task_file(path: &Path) -> std::result::Result<Task, ParseError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ParseError::new(path, ParseErrorKind::Unreadable, e.to_string()))?;
    parse_task(path, &content)
}

/// Load every `*.md` task document in `dir`.
///
/// A missing directory yields no tasks. Documents are visited in sorted
/// path order; when two files normalize to the same task id the later one
/// wins. Only failing to list the directory is an error.
pub fn load_tasks(dir: &Path) -> Result<TaskLoad> {
    let mut load = TaskLoad::default();
    if !dir.is_dir() {
        tlog_debug!("Tasks directory {} does not exist", dir.display());
        return Ok(load);
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    paths.sort();

    for path in paths {
        match parse_task_file(&path) {
            Ok(task) => {
                tlog_debug!("Parsed {} from {}", task.task_id, path.display());
                if let Some(previous) = load.tasks.insert(task.task_id.clone(), task) {
                    tlog_warn!(
                        "{} redefined by {} (was {})",
                        previous.task_id,
                        path.display(),
                        previous.file_path
                    );
                }
            }
            Err(e) => {
                tlog_warn!("Failed to parse {}", e);
                load.failures.push(e);
            }
        }
    }

    Ok(load)
}

fn capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
}
