//! Per-file version history, filtered from the project history and throttled.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::clock::Clock;
use crate::error::{SyncError, SyncResult};
use crate::identity::CanonicalIdentity;
use crate::model::VersionRecord;
use crate::remote::LocalService;
use crate::roots::RootCache;

#[derive(Clone, Debug)]
pub struct HistoryCacheEntry {
    pub file_path: PathBuf,
    pub records: Vec<VersionRecord>,
    pub fetched_at: Instant,
}

pub struct HistoryCache {
    service: Arc<dyn LocalService>,
    roots: Arc<RootCache>,
    clock: Arc<dyn Clock>,
    min_refetch: Duration,
    entry: Mutex<Option<HistoryCacheEntry>>,
}

impl HistoryCache {
    pub fn new(
        service: Arc<dyn LocalService>,
        roots: Arc<RootCache>,
        clock: Arc<dyn Clock>,
        min_refetch: Duration,
    ) -> Self {
        Self {
            service,
            roots,
            clock,
            min_refetch,
            entry: Mutex::new(None),
        }
    }

    /// Versions that touched `file_path`, in service order.
    ///
    /// Switching files drops the cache. Within `min_refetch` of the last
    /// fetch for the same file the cached records are returned as-is.
    pub fn history(&self, file_path: &Path) -> SyncResult<Vec<VersionRecord>> {
        {
            let mut entry = self.lock()?;
            if entry.as_ref().is_some_and(|e| e.file_path != file_path) {
                debug!(file = %file_path.display(), "open file changed; history dropped");
                *entry = None;
            }
            if let Some(e) = entry.as_ref() {
                let age = self.clock.now().saturating_duration_since(e.fetched_at);
                if age < self.min_refetch {
                    return Ok(e.records.clone());
                }
            }
        }

        let records = self.fetch(file_path)?;
        *self.lock()? = Some(HistoryCacheEntry {
            file_path: file_path.to_path_buf(),
            records: records.clone(),
            fetched_at: self.clock.now(),
        });
        Ok(records)
    }

    /// Drops the cached history if it belongs to `file_path`.
    pub fn invalidate(&self, file_path: &Path) -> SyncResult<()> {
        let mut entry = self.lock()?;
        if entry.as_ref().is_some_and(|e| e.file_path == file_path) {
            *entry = None;
        }
        Ok(())
    }

    pub fn invalidate_all(&self) -> SyncResult<()> {
        *self.lock()? = None;
        Ok(())
    }

    fn fetch(&self, file_path: &Path) -> SyncResult<Vec<VersionRecord>> {
        let Some(root) = self.roots.project_root(file_path)? else {
            return Ok(Vec::new());
        };
        let all = self.service.history(&root)?;
        let total = all.len();
        let kept = filter_history(all, file_path);
        debug!(file = %file_path.display(), total, kept = kept.len(), "history fetched");
        Ok(kept)
    }

    fn lock(&self) -> SyncResult<MutexGuard<'_, Option<HistoryCacheEntry>>> {
        self.entry
            .lock()
            .map_err(|_| SyncError::Invariant("history cache lock poisoned".to_string()))
    }
}

/// Keeps the records with at least one file whose basename matches the
/// loosely normalized name of `file_path`.
pub fn filter_history(records: Vec<VersionRecord>, file_path: &Path) -> Vec<VersionRecord> {
    let identity = CanonicalIdentity::of(file_path);
    records
        .into_iter()
        .filter(|r| r.files.keys().any(|k| identity.matches_entry(k)))
        .collect()
}

#[cfg(test)]
#[path = "tests/history_tests.rs"]
mod tests;
