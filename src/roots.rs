//! Directory -> project root lookups with a time-to-live.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::clock::Clock;
use crate::error::{SyncError, SyncResult};
use crate::remote::LocalService;

#[derive(Clone, Debug)]
pub struct ProjectRootEntry {
    pub directory: PathBuf,
    pub root: Option<PathBuf>,
    pub discovered_at: Instant,
}

pub struct RootCache {
    service: Arc<dyn LocalService>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entries: Mutex<HashMap<PathBuf, ProjectRootEntry>>,
}

impl RootCache {
    pub fn new(service: Arc<dyn LocalService>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            service,
            clock,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Root of the project containing `file_path`, or `None` if the service
    /// knows of none. Failed lookups are not cached.
    pub fn project_root(&self, file_path: &Path) -> SyncResult<Option<PathBuf>> {
        if file_path.as_os_str().is_empty() {
            return Ok(None);
        }
        let directory = parent_dir(file_path);
        let now = self.clock.now();

        if let Some(entry) = self.lock()?.get(&directory) {
            if now.saturating_duration_since(entry.discovered_at) < self.ttl {
                debug!(dir = %directory.display(), "root cache hit");
                return Ok(entry.root.clone());
            }
        }

        debug!(dir = %directory.display(), "root cache miss");
        let root = self.service.find_root(&directory)?;
        let entry = ProjectRootEntry {
            directory: directory.clone(),
            root: root.clone(),
            discovered_at: self.clock.now(),
        };
        self.lock()?.insert(directory, entry);
        Ok(root)
    }

    /// Forgets the entry for `dir`, e.g. after initializing a project there.
    pub fn invalidate_dir(&self, dir: &Path) -> SyncResult<()> {
        self.lock()?.remove(dir);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> SyncResult<std::sync::MutexGuard<'_, HashMap<PathBuf, ProjectRootEntry>>> {
        self.entries
            .lock()
            .map_err(|_| SyncError::Invariant("root cache lock poisoned".to_string()))
    }
}

pub(crate) fn parent_dir(file_path: &Path) -> PathBuf {
    match file_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
#[path = "tests/roots_tests.rs"]
mod tests;
