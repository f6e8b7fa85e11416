//! Structured logging for debugging taskplan.
//!
//! Log levels:
//! - ERROR: Failures that abort a planning run
//! - WARN: Recoverable anomalies (dependency cycles, unparseable task documents)
//! - INFO: High-level run notifications (root, task counts, output path)
//! - DEBUG: Planning decisions (dropped references, implied edges, batches)
//! - TRACE: Per-step scheduler traces
//!
//! Debug mode can be enabled with `--debug` flag or `TASKPLAN_DEBUG=1` env var.
//! `TASKPLAN_LOG=<level>` picks a level outright and wins over both.
//! Nothing is written until [`init_with_debug`] has been called.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::OnceLock;

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

/// Log levels for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown log level: {}", s))
    }
}

/// Pick the active level from the `--debug` flag and the two env vars.
fn resolve_level(debug: bool, env_debug: Option<&str>, env_level: Option<&str>) -> LogLevel {
    if let Some(level) = env_level.and_then(|v| v.parse().ok()) {
        return level;
    }
    let env_debug = env_debug.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    if debug || env_debug {
        LogLevel::Debug
    } else {
        LogLevel::Info
    }
}

/// Initialize logging to ~/.taskplan/taskplan.log with explicit debug mode setting.
pub fn init_with_debug(debug: bool) {
    let env_debug = std::env::var("TASKPLAN_DEBUG").ok();
    let env_level = std::env::var("TASKPLAN_LOG").ok();
    let level = resolve_level(debug, env_debug.as_deref(), env_level.as_deref());

    DEBUG_ENABLED.store(level >= LogLevel::Debug, Ordering::SeqCst);
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);

    if let Some(log_dir) = dirs::home_dir().map(|h| h.join(".taskplan")) {
        let _ = std::fs::create_dir_all(&log_dir);
        let path = log_dir.join("taskplan.log");
        // Each run starts a fresh log
        let _ = std::fs::write(&path, "");
        LOG_PATH.set(path).ok();
    }
}

/// Check if debug mode is enabled.
pub fn is_debug() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Path of the log file, once initialized.
pub fn log_path() -> Option<&'static Path> {
    LOG_PATH.get().map(PathBuf::as_path)
}

/// Check whether messages at `level` are currently written.
pub fn enabled(level: LogLevel) -> bool {
    level as u8 <= LOG_LEVEL.load(Ordering::Relaxed)
}

/// Append one line at `level` to the log file.
pub fn log_at(level: LogLevel, msg: &str) {
    if !enabled(level) {
        return;
    }
    let Some(path) = LOG_PATH.get() else {
        return;
    };

    let line = format!(
        "[{}] [{:<5}] {}\n",
        chrono::Local::now().format("%H:%M:%S%.3f"),
        level.as_str(),
        msg
    );
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let _ = file.write_all(line.as_bytes());
    }
}

/// Log macro for INFO level.
#[macro_export]
macro_rules! tlog {
    ($($arg:tt)*) => {
        $crate::log::log_at($crate::log::LogLevel::Info, &format!($($arg)*))
    };
}

/// Log macro for ERROR level.
#[macro_export]
macro_rules! tlog_error {
    ($($arg:tt)*) => {
        $crate::log::log_at($crate::log::LogLevel::Error, &format!($($arg)*))
    };
}

/// Log macro for WARN level.
#[macro_export]
macro_rules! tlog_warn {
    ($($arg:tt)*) => {
        $crate::log::log_at($crate::log::LogLevel::Warn, &format!($($arg)*))
    };
}

/// Log macro for DEBUG level. The message is not formatted unless enabled.
#[macro_export]
macro_rules! tlog_debug {
    ($($arg:tt)*) => {
        if $crate::log::enabled($crate::log::LogLevel::Debug) {
            $crate::log::log_at($crate::log::LogLevel::Debug, &format!($($arg)*))
        }
    };
}

/// Log macro for TRACE level. The message is not formatted unless enabled.
#[macro_export]
macro_rules! tlog_trace {
    ($($arg:tt)*) => {
        if $crate::log::enabled($crate::log::LogLevel::Trace) {
            $crate::log::log_at($crate::log::LogLevel::Trace, &format!($($arg)*))
        }
    };
}
