//! Runtime configuration resolved from the environment.

use std::path::PathBuf;

use crate::logging::default_log_level;

const APP_DIR: &str = "taskpulse";

/// Where data lives and how loudly to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub tasks_path: PathBuf,
    pub filters_path: PathBuf,
    pub log_level: String,
}

impl Config {
    /// Resolves paths and log level.
    ///
    /// The tasks file is taken, in order, from:
    /// 1. `TASKS_DB` environment variable.
    /// 2. `<data_local_dir>/taskpulse/tasks.json`.
    /// 3. `./tasks.json` (fallback).
    ///
    /// `TASKPULSE_FILTERS` overrides the filters file, which otherwise sits
    /// next to the tasks file. `TASKPULSE_LOG` sets the log level.
    pub fn from_env() -> Self {
        let tasks_path = std::env::var("TASKS_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir().join("tasks.json"));
        let filters_path = std::env::var("TASKPULSE_FILTERS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| sibling(&tasks_path, "filters.json"));
        let log_level = std::env::var("TASKPULSE_LOG")
            .unwrap_or_else(|_| default_log_level().to_string());
        Self {
            tasks_path,
            filters_path,
            log_level,
        }
    }

    /// Config rooted at an explicit tasks file, filters alongside it.
    pub fn with_tasks_path(tasks_path: impl Into<PathBuf>) -> Self {
        let tasks_path = tasks_path.into();
        Self {
            filters_path: sibling(&tasks_path, "filters.json"),
            tasks_path,
            log_level: default_log_level().to_string(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn sibling(path: &std::path::Path, name: &str) -> PathBuf {
    let mut p = path.to_path_buf();
    p.pop();
    p.push(name);
    p
}
