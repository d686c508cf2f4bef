//! Command-level operations composed from the caches, the service and the
//! restore sequencer. One `Session` holds every process-wide cache.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{SyncError, SyncResult};
use crate::history::HistoryCache;
use crate::host::HostDocument;
use crate::identity::{relative_to_root, retrieved_name, strict_recover};
use crate::model::{ClientConfig, CommitReceipt, VersionRecord};
use crate::remote::{LocalService, RemoteClient};
use crate::restore::{RestoreError, RestoreOutcome, RestoreSequencer, same_file};
use crate::roots::{RootCache, parent_dir};
use crate::status::{StatusBoard, StatusPoller};

pub const DEFAULT_COMMIT_LABEL: &str = "New Version";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitMode {
    /// Save the open document first so its latest state is versioned.
    SaveFirst,
    /// Version the file exactly as it is on disk.
    LastSaved,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitReport {
    pub receipt: CommitReceipt,
    pub file: PathBuf,
    /// `LastSaved` commit while the document had unsaved edits.
    pub unsaved_changes_excluded: bool,
}

pub struct Session {
    config: ClientConfig,
    service: Arc<dyn LocalService>,
    clock: Arc<dyn Clock>,
    roots: Arc<RootCache>,
    history: HistoryCache,
}

impl Session {
    pub fn new(config: ClientConfig, service: Arc<dyn LocalService>, clock: Arc<dyn Clock>) -> Self {
        let roots = Arc::new(RootCache::new(
            Arc::clone(&service),
            Arc::clone(&clock),
            config.root_ttl(),
        ));
        let history = HistoryCache::new(
            Arc::clone(&service),
            Arc::clone(&roots),
            Arc::clone(&clock),
            config.history_min_refetch(),
        );
        Self {
            config,
            service,
            clock,
            roots,
            history,
        }
    }

    /// Session talking to the configured loopback service in real time.
    pub fn connect(config: ClientConfig) -> SyncResult<Self> {
        let client = RemoteClient::new(&config)?;
        Ok(Self::new(config, Arc::new(client), Arc::new(SystemClock)))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn roots(&self) -> &RootCache {
        &self.roots
    }

    /// A poller publishing to `board`; spawn it once per process.
    pub fn status_poller(&self, board: Arc<StatusBoard>) -> StatusPoller {
        StatusPoller::new(
            Arc::clone(&self.service),
            board,
            Arc::clone(&self.clock),
            &self.config,
        )
    }

    pub fn project_root(&self, host: &dyn HostDocument) -> SyncResult<Option<PathBuf>> {
        let file = require_document(host)?;
        self.roots.project_root(&file)
    }

    /// Makes the open file's directory a project root.
    pub fn init_project(&self, host: &dyn HostDocument) -> SyncResult<PathBuf> {
        let file = require_document(host)?;
        let dir = parent_dir(&file);
        self.service.init_project(&dir)?;
        self.roots.invalidate_dir(&dir)?;
        self.history.invalidate(&file)?;
        Ok(dir)
    }

    pub fn commit(
        &self,
        host: &mut dyn HostDocument,
        label: &str,
        mode: CommitMode,
    ) -> SyncResult<CommitReport> {
        let file = require_document(host)?;
        let unsaved_changes_excluded = match mode {
            CommitMode::SaveFirst => {
                host.save()?;
                false
            }
            CommitMode::LastSaved => host.is_modified(),
        };
        let root = self.require_root(&file)?;

        let label = match label.trim() {
            "" => DEFAULT_COMMIT_LABEL,
            l => l,
        };
        let receipt = self.service.commit(&root, label, std::slice::from_ref(&file))?;
        self.history.invalidate(&file)?;
        if unsaved_changes_excluded {
            warn!(file = %file.display(), "committed last saved state; unsaved edits not included");
        }
        Ok(CommitReport {
            receipt,
            file,
            unsaved_changes_excluded,
        })
    }

    /// Versions of the open file, newest first as the service orders them.
    pub fn versions(&self, host: &dyn HostDocument) -> SyncResult<Vec<VersionRecord>> {
        let file = require_document(host)?;
        self.history.history(&file)
    }

    /// Like [`Session::versions`] but ignores the refetch throttle.
    pub fn refresh_versions(&self, host: &dyn HostDocument) -> SyncResult<Vec<VersionRecord>> {
        let file = require_document(host)?;
        self.history.invalidate(&file)?;
        self.history.history(&file)
    }

    pub fn rename_version(
        &self,
        host: &dyn HostDocument,
        version_id: &str,
        new_label: &str,
    ) -> SyncResult<()> {
        let label = new_label.trim();
        if version_id.is_empty() || label.is_empty() {
            return Err(SyncError::InvalidInput(
                "version id and new label must not be empty".to_string(),
            ));
        }
        let file = require_document(host)?;
        let root = self.require_root(&file)?;
        self.service.rename_version(&root, version_id, label)?;
        self.history.invalidate(&file)?;
        Ok(())
    }

    /// Overwrites the open file (or the original it was retrieved from) with
    /// `version_id` and reopens it.
    pub fn restore_version(
        &self,
        host: &mut dyn HostDocument,
        version_id: &str,
    ) -> Result<RestoreOutcome, RestoreError> {
        if version_id.is_empty() {
            return Err(RestoreError::Precondition(SyncError::InvalidInput(
                "version id must not be empty".to_string(),
            )));
        }
        let result = RestoreSequencer::new(self.service.as_ref(), &self.roots).restore(host, version_id);

        let remote_changed = match &result {
            Ok(_) => true,
            Err(e) => e.remote_succeeded(),
        };
        // the open path may have moved from a retrieved copy to its original
        if remote_changed {
            if let Err(err) = self.history.invalidate_all() {
                warn!(%err, "could not invalidate history after restore");
            }
        }
        result
    }

    /// Writes `version_id` of the open file next to the original as
    /// `<name>-v<number>-retrieved.<ext>` without touching the open document.
    pub fn retrieve_copy(&self, host: &dyn HostDocument, version_id: &str) -> SyncResult<PathBuf> {
        let live = require_document(host)?;
        let root = self.require_root(&live)?;
        let version = self.find_version(&live, &root, version_id)?;

        let tracked = relative_to_root(&strict_recover(&live), &live, &root)?;
        let dest = retrieved_name(&tracked.file, &version.version_number);
        if same_file(&dest, &live) {
            return Err(SyncError::InvalidInput(format!(
                "{} is the open document; open another file before retrieving over it",
                dest.display()
            )));
        }

        let temp = self.service.extract_temp(&root, version_id, &tracked.relative)?;
        std::fs::copy(&temp, &dest).map_err(|e| SyncError::local_io("copy", &dest, e))?;
        info!(version = version_id, dest = %dest.display(), "version retrieved");
        Ok(dest)
    }

    fn find_version(&self, file: &Path, root: &Path, version_id: &str) -> SyncResult<VersionRecord> {
        if let Some(v) = self
            .history
            .history(file)?
            .into_iter()
            .find(|v| v.id == version_id)
        {
            return Ok(v);
        }
        self.service
            .history(root)?
            .into_iter()
            .find(|v| v.id == version_id)
            .ok_or_else(|| SyncError::InvalidInput(format!("unknown version {version_id}")))
    }

    fn require_root(&self, file: &Path) -> SyncResult<PathBuf> {
        self.roots
            .project_root(file)?
            .ok_or_else(|| SyncError::NoProjectRoot(file.to_path_buf()))
    }
}

fn require_document(host: &dyn HostDocument) -> SyncResult<PathBuf> {
    host.current_path()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(SyncError::NoDocument)
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
