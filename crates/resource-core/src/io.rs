//! Working-directory persistence for event state.
//!
//! The `id` and `event.json` files are the only state carried between
//! invocations: the start/create/fetch paths write them, the end path reads
//! them back to recover the event ID and the merge baseline.

use std::io::Write;
use std::path::Path;

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::{ResourceError, Result};

const ID_FILE: &str = "id";
const EVENT_FILE: &str = "event.json";

/// Atomically write `data` to `path` via a tempfile in the same directory.
/// Prevents a crashed invocation from leaving a torn state file behind.
fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let wrap = |source: std::io::Error| ResourceError::WriteState {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(wrap)?;
    tmp.write_all(data).map_err(wrap)?;
    tmp.persist(path).map_err(|e| wrap(e.error))?;
    Ok(())
}

/// Persist the event handle and snapshot under `dir`.
pub fn write_event_state(dir: &Path, id: &str, event: &Value) -> Result<()> {
    let body = serde_json::to_vec(event).map_err(ResourceError::Encode)?;
    atomic_write(&dir.join(ID_FILE), id.as_bytes())?;
    atomic_write(&dir.join(EVENT_FILE), &body)?;
    Ok(())
}

/// Read back the event handle and snapshot persisted by an earlier step.
pub fn read_event_state(dir: &Path) -> Result<(String, Value)> {
    let id_path = dir.join(ID_FILE);
    let id = std::fs::read_to_string(&id_path).map_err(|source| ResourceError::ReadState {
        path: id_path,
        source,
    })?;

    let event_path = dir.join(EVENT_FILE);
    let body = std::fs::read(&event_path).map_err(|source| ResourceError::ReadState {
        path: event_path.clone(),
        source,
    })?;
    let snapshot = serde_json::from_slice(&body).map_err(|source| ResourceError::ParseState {
        path: event_path,
        source,
    })?;

    Ok((id.trim().to_string(), snapshot))
}
