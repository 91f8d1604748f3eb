use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::filter::Filter;
use crate::models::Task;

/// Loads all tasks from `path`.
///
/// Returns an empty vector if the file does not exist. Malformed content,
/// including records that break task invariants, is an error.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    load_list(path)
}

/// Loads a single task by its ID.
pub fn load_task(path: &Path, id: u64) -> Result<Option<Task>> {
    Ok(load_tasks(path)?.into_iter().find(|t| t.id == id))
}

/// Saves the given list of tasks to `path`, overwriting the file.
pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<()> {
    save_list(path, tasks)
}

/// Loads user-defined filters from `path`.
pub fn load_filters(path: &Path) -> Result<Vec<Filter>> {
    load_list(path)
}

/// Saves user-defined filters to `path`, overwriting the file.
pub fn save_filters(path: &Path, filters: &[Filter]) -> Result<()> {
    save_list(path, filters)
}

fn load_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        debug!("event=storage_load module=storage status=missing path={}", path.display());
        return Ok(Vec::new());
    }
    let mut f = OpenOptions::new().read(true).open(path)?;
    let mut s = String::new();
    f.read_to_string(&mut s)?;
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    let items: Vec<T> = serde_json::from_str(&s).map_err(|err| {
        warn!(
            "event=storage_load module=storage status=error path={} error={}",
            path.display(),
            err
        );
        err
    })?;
    debug!(
        "event=storage_load module=storage status=ok path={} count={}",
        path.display(),
        items.len()
    );
    Ok(items)
}

fn save_list<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let s = serde_json::to_string_pretty(items)?;
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    f.write_all(s.as_bytes())?;
    debug!(
        "event=storage_save module=storage status=ok path={} count={}",
        path.display(),
        items.len()
    );
    Ok(())
}
