use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{tlog_debug, Result};

/// Marker directory identifying a project root.
pub const FACTORY_DIR: &str = ".factory";

/// Config file name inside [`FACTORY_DIR`].
pub const CONFIG_FILE: &str = "taskplan.toml";

pub const DEFAULT_TASKS_DIR: &str = "plan/tasks";

pub const DEFAULT_OUTPUT: &str = ".factory/execution_graph.json";

/// Per-project planner settings.
///
/// Relative paths are resolved against the project root.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub tasks_dir: Option<String>,
    pub output: Option<String>,
    /// Phase to plan when none is given on the command line.
    pub phase: Option<String>,
}

impl Config {
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(FACTORY_DIR).join(CONFIG_FILE)
    }

    /// Load the config for `root`, falling back to defaults if absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::config_path(root);
        tlog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            tlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(&path)?)?;
        tlog_debug!(
            "Config loaded: tasks_dir={:?}, output={:?}, phase={:?}",
            config.tasks_dir,
            config.output,
            config.phase
        );
        Ok(config)
    }

    pub fn tasks_dir(&self, root: &Path) -> PathBuf {
        resolve(root, self.tasks_dir.as_deref().unwrap_or(DEFAULT_TASKS_DIR))
    }

    pub fn output_path(&self, root: &Path) -> PathBuf {
        resolve(root, self.output.as_deref().unwrap_or(DEFAULT_OUTPUT))
    }
}

/// Find the nearest ancestor of `start` (inclusive) containing [`FACTORY_DIR`].
///
/// Falls back to `start` itself when no ancestor has one.
pub fn discover_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(FACTORY_DIR).is_dir())
        .unwrap_or(start)
        .to_path_buf()
}

fn resolve(root: &Path, path: &str) -> PathBuf {
    let expanded = expand_tilde(path);
    if expanded.is_absolute() {
        expanded
    } else {
        root.join(expanded)
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
