//! Overwriting the open document's file with a committed version.
//!
//! Stages run in a fixed order:
//! `ResolveTarget -> LockCheck -> [ReleaseLock] -> RemoteRestore -> Reopen`.
//! The host's handle on the target is released before the service rewrites
//! the file, and a document is reopened afterwards whether or not the
//! service succeeded.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::host::HostDocument;
use crate::identity::strict_recover;
use crate::remote::LocalService;
use crate::roots::RootCache;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestoreStage {
    Idle,
    ResolveTarget,
    LockCheck,
    ReleaseLock,
    RemoteRestore,
    Reopen,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub version_id: String,
    pub target: PathBuf,
    /// The open document was dropped to free its file handle.
    pub released_lock: bool,
    /// Unsaved changes in the open document were lost by the release.
    pub discarded_changes: bool,
    pub stages: Vec<RestoreStage>,
}

#[derive(Debug, Error)]
pub enum RestoreError {
    /// Failed before the service was asked to restore anything.
    #[error(transparent)]
    Precondition(SyncError),

    #[error("restore failed: {source}")]
    RemoteRestore {
        target: PathBuf,
        #[source]
        source: SyncError,
        /// Set when the best-effort reopen after the failure also failed.
        reopen_error: Option<SyncError>,
    },

    #[error("restored {} but failed to open it: {source}", .target.display())]
    Reopen {
        target: PathBuf,
        #[source]
        source: SyncError,
    },
}

impl RestoreError {
    /// True when the service reported the version was written.
    pub fn remote_succeeded(&self) -> bool {
        matches!(self, Self::Reopen { .. })
    }
}

pub struct RestoreSequencer<'a> {
    service: &'a dyn LocalService,
    roots: &'a RootCache,
    stage: RestoreStage,
    visited: Vec<RestoreStage>,
}

impl<'a> RestoreSequencer<'a> {
    pub fn new(service: &'a dyn LocalService, roots: &'a RootCache) -> Self {
        Self {
            service,
            roots,
            stage: RestoreStage::Idle,
            visited: Vec::new(),
        }
    }

    pub fn stage(&self) -> RestoreStage {
        self.stage
    }

    fn enter(&mut self, stage: RestoreStage) {
        debug!(from = ?self.stage, to = ?stage, "restore stage");
        self.stage = stage;
        if stage != RestoreStage::Idle {
            self.visited.push(stage);
        }
    }

    pub fn restore(
        &mut self,
        host: &mut dyn HostDocument,
        version_id: &str,
    ) -> Result<RestoreOutcome, RestoreError> {
        self.visited.clear();
        let result = self.run(host, version_id);
        self.enter(RestoreStage::Idle);
        result
    }

    fn run(
        &mut self,
        host: &mut dyn HostDocument,
        version_id: &str,
    ) -> Result<RestoreOutcome, RestoreError> {
        self.enter(RestoreStage::ResolveTarget);
        let live = host
            .current_path()
            .ok_or(RestoreError::Precondition(SyncError::NoDocument))?;
        let root = self
            .roots
            .project_root(&live)
            .map_err(RestoreError::Precondition)?
            .ok_or_else(|| RestoreError::Precondition(SyncError::NoProjectRoot(live.clone())))?;
        let target = strict_recover(&live);

        self.enter(RestoreStage::LockCheck);
        let target_is_open = same_file(&live, &target);
        let discarded_changes = target_is_open && host.is_modified();

        if target_is_open {
            self.enter(RestoreStage::ReleaseLock);
            host.discard_and_load_blank()
                .map_err(RestoreError::Precondition)?;
        }

        self.enter(RestoreStage::RemoteRestore);
        if let Err(source) = self.service.restore(&root, version_id) {
            warn!(version = version_id, %source, "remote restore failed");
            let mut reopen_error = None;
            if target_is_open {
                self.enter(RestoreStage::Reopen);
                reopen_error = host.open(&target).err();
            }
            return Err(RestoreError::RemoteRestore {
                target,
                source,
                reopen_error,
            });
        }

        self.enter(RestoreStage::Reopen);
        host.open(&target).map_err(|source| RestoreError::Reopen {
            target: target.clone(),
            source,
        })?;

        info!(version = version_id, target = %target.display(), "version restored");
        Ok(RestoreOutcome {
            version_id: version_id.to_string(),
            target,
            released_lock: target_is_open,
            discarded_changes,
            stages: self.visited.clone(),
        })
    }
}

/// Whether two paths name the same file: filesystem identity when both
/// resolve, lexical comparison otherwise.
pub fn same_file(a: &Path, b: &Path) -> bool {
    if let (Ok(ca), Ok(cb)) = (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        return ca == cb;
    }
    let (na, nb) = (normalize_lexically(a), normalize_lexically(b));
    if cfg!(windows) {
        na.to_string_lossy().to_lowercase() == nb.to_string_lossy().to_lowercase()
    } else {
        na == nb
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in path.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/restore_tests.rs"]
mod tests;
